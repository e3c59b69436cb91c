use crate::{AppConfig, DirSyncError};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "dirsync.toml";

/// Load the application config, falling back to defaults when no config
/// file exists. A `dirsync.toml` next to the executable takes precedence
/// over the per-user config directory (portable mode).
pub fn load_config(prefer_portable: bool) -> Result<AppConfig, DirSyncError> {
    let (path, portable) = resolve_config_path(prefer_portable)?;

    let mut config = if path.exists() {
        read_config(&path)?
    } else {
        AppConfig::default()
    };
    config.portable_mode = portable;

    Ok(config)
}

fn read_config(path: &Path) -> Result<AppConfig, DirSyncError> {
    let data = fs::read_to_string(path)?;
    toml::from_str(&data).map_err(|e| DirSyncError::Serialization(e.to_string()))
}

fn resolve_config_path(prefer_portable: bool) -> Result<(PathBuf, bool), DirSyncError> {
    if let Some(portable_path) = portable_config_path() {
        if prefer_portable || portable_path.exists() {
            return Ok((portable_path, true));
        }
    }

    let dirs = ProjectDirs::from("", "dirsync-tools", "dirsync")
        .ok_or_else(|| DirSyncError::Config("Unable to determine config directory".to_string()))?;
    Ok((dirs.config_dir().join(CONFIG_FILE_NAME), false))
}

fn portable_config_path() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(|dir| dir.join(CONFIG_FILE_NAME)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_config_parses_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            "ignore_patterns = [\"*.o\", \"build/\"]\nmax_depth = 10\n",
        )
        .unwrap();

        let config = read_config(&path).unwrap();
        assert_eq!(config.ignore_patterns, vec!["*.o", "build/"]);
        assert_eq!(config.max_depth, Some(10));
    }

    #[test]
    fn test_read_config_rejects_malformed_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "ignore_patterns = not-a-list").unwrap();

        let err = read_config(&path).unwrap_err();
        assert!(matches!(err, DirSyncError::Serialization(_)));
    }

    #[test]
    fn test_config_fields_default_when_absent() {
        let loaded: AppConfig = toml::from_str("").unwrap();
        assert!(loaded.ignore_patterns.is_empty());
        assert_eq!(loaded.max_depth, None);
        assert!(!loaded.portable_mode);
    }
}
