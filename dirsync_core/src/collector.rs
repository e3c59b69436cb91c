use dirsync_common::{AppConfig, DirSyncError, FileSet, RelativePath, DEFAULT_MAX_DEPTH};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result of one traversal: the file set plus non-fatal warnings.
#[derive(Debug)]
pub struct Scan {
    pub files: FileSet,
    pub warnings: Vec<String>,
}

/// One pending directory on the traversal frontier.
struct Frame {
    dir: PathBuf,
    prefix: RelativePath,
    depth: usize,
}

/// Bounded-depth directory walker producing relative file paths.
///
/// Traversal is iterative over an explicit frontier queue, so depth is
/// bounded independently of the execution stack. Symbolic links are never
/// descended into, and a visited set guards against re-queued directories,
/// which guarantees termination on cyclic structures.
pub struct PathCollector {
    max_depth: usize,
    ignore: Option<Gitignore>,
}

impl PathCollector {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            max_depth: config.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
            ignore: Self::build_ignore(config),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Build a Gitignore from custom ignore patterns in config
    fn build_ignore(config: &AppConfig) -> Option<Gitignore> {
        if config.ignore_patterns.is_empty() {
            return None;
        }

        let mut builder = GitignoreBuilder::new("");
        for pattern in &config.ignore_patterns {
            if let Err(err) = builder.add_line(None, pattern) {
                debug!("Failed to add ignore pattern '{}': {}", pattern, err);
            } else {
                debug!("Added ignore pattern: {}", pattern);
            }
        }

        match builder.build() {
            Ok(ignore) => Some(ignore),
            Err(e) => {
                debug!("Failed to build ignore matcher: {}", e);
                None
            }
        }
    }

    /// Walk `root` and collect the relative paths of all regular files.
    ///
    /// A missing or unreadable root is fatal for this call; unreadable
    /// entries below it are skipped with a warning and traversal continues.
    pub fn collect(&self, root: &Path) -> Result<Scan, DirSyncError> {
        let meta = fs::metadata(root).map_err(|e| {
            DirSyncError::Path(format!("cannot read root {}: {}", root.display(), e))
        })?;
        if !meta.is_dir() {
            return Err(DirSyncError::NotADirectory(root.display().to_string()));
        }

        let mut files = FileSet::new();
        let mut warnings = Vec::new();
        let mut visited: HashSet<PathBuf> = HashSet::new();

        let mut frontier = VecDeque::new();
        frontier.push_back(Frame {
            dir: root.to_path_buf(),
            prefix: RelativePath::new(""),
            depth: 0,
        });

        while let Some(frame) = frontier.pop_front() {
            if !visited.insert(frame.dir.clone()) {
                debug!("Already visited {}, skipping", frame.dir.display());
                continue;
            }

            let entries = match fs::read_dir(&frame.dir) {
                Ok(entries) => entries,
                Err(e) => {
                    warnings.push(format!(
                        "could not read directory {}: {}",
                        frame.dir.display(),
                        e
                    ));
                    continue;
                }
            };

            for entry in entries {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warnings.push(format!(
                            "could not access an entry in {}: {}",
                            frame.dir.display(),
                            e
                        ));
                        continue;
                    }
                };

                let name = entry.file_name().to_string_lossy().into_owned();
                let rel = frame.prefix.join(&name);

                // DirEntry::file_type does not follow symlinks
                let file_type = match entry.file_type() {
                    Ok(file_type) => file_type,
                    Err(e) => {
                        warnings.push(format!("could not stat {}: {}", rel, e));
                        continue;
                    }
                };

                if file_type.is_symlink() {
                    debug!("Skipping symlink {}", rel);
                    continue;
                }

                if self.is_ignored(&rel, file_type.is_dir()) {
                    debug!("Ignoring {}", rel);
                    continue;
                }

                if file_type.is_dir() {
                    if frame.depth + 1 > self.max_depth {
                        debug!("Depth limit reached, pruning {}", rel);
                        continue;
                    }
                    frontier.push_back(Frame {
                        dir: entry.path(),
                        prefix: rel,
                        depth: frame.depth + 1,
                    });
                } else if file_type.is_file() {
                    files.insert(rel);
                } else {
                    debug!("Skipping special file {}", rel);
                }
            }
        }

        info!("Found {} files under {}", files.len(), root.display());
        Ok(Scan { files, warnings })
    }

    /// Check if a path or any of its parent directories should be ignored
    fn is_ignored(&self, rel: &RelativePath, is_dir: bool) -> bool {
        let Some(ref ignore) = self.ignore else {
            return false;
        };

        let path = rel.to_path();
        if ignore.matched(path, is_dir).is_ignore() {
            return true;
        }

        let mut current = path;
        while let Some(parent) = current.parent() {
            if !parent.as_os_str().is_empty() && ignore.matched(parent, true).is_ignore() {
                return true;
            }
            current = parent;
        }
        false
    }
}

impl Default for PathCollector {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn paths(scan: &Scan) -> Vec<&str> {
        scan.files.iter().map(|p| p.as_str()).collect()
    }

    #[test]
    fn test_collect_basic() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("file1.txt"), b"test").unwrap();
        fs::write(temp.path().join("file2.txt"), b"test").unwrap();
        fs::create_dir(temp.path().join("subdir")).unwrap();
        fs::write(temp.path().join("subdir/file3.txt"), b"test").unwrap();

        let collector = PathCollector::default();
        let scan = collector.collect(temp.path()).unwrap();

        // Only regular files, never directories
        assert_eq!(scan.files.len(), 3);
        assert!(scan.files.contains(&RelativePath::new("file1.txt")));
        assert!(scan.files.contains(&RelativePath::new("file2.txt")));
        assert!(scan.files.contains(&RelativePath::new("subdir/file3.txt")));
        assert!(!scan.files.contains(&RelativePath::new("subdir")));
        assert!(scan.warnings.is_empty());
    }

    #[test]
    fn test_collect_relative_paths_forward_slashed() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a/b")).unwrap();
        fs::write(temp.path().join("a/b/c.txt"), b"test").unwrap();

        let collector = PathCollector::default();
        let scan = collector.collect(temp.path()).unwrap();

        assert_eq!(paths(&scan), vec!["a/b/c.txt"]);
    }

    #[test]
    fn test_collect_missing_root_is_fatal() {
        let temp = TempDir::new().unwrap();
        let collector = PathCollector::default();
        let err = collector.collect(&temp.path().join("nope")).unwrap_err();
        assert!(matches!(err, DirSyncError::Path(_)));
    }

    #[test]
    fn test_collect_file_root_is_fatal() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        fs::write(&file, b"test").unwrap();

        let collector = PathCollector::default();
        let err = collector.collect(&file).unwrap_err();
        assert!(matches!(err, DirSyncError::NotADirectory(_)));
    }

    #[test]
    fn test_collect_depth_cap_prunes_silently() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("top.txt"), b"test").unwrap();
        fs::create_dir_all(temp.path().join("one/two")).unwrap();
        fs::write(temp.path().join("one/mid.txt"), b"test").unwrap();
        fs::write(temp.path().join("one/two/deep.txt"), b"test").unwrap();

        let collector = PathCollector::default().with_max_depth(1);
        let scan = collector.collect(temp.path()).unwrap();

        assert!(scan.files.contains(&RelativePath::new("top.txt")));
        assert!(scan.files.contains(&RelativePath::new("one/mid.txt")));
        assert!(!scan.files.contains(&RelativePath::new("one/two/deep.txt")));
        // Pruning is silent, not a warning
        assert!(scan.warnings.is_empty());
    }

    #[test]
    fn test_collect_depth_zero_only_root_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("top.txt"), b"test").unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join("sub/nested.txt"), b"test").unwrap();

        let collector = PathCollector::default().with_max_depth(0);
        let scan = collector.collect(temp.path()).unwrap();

        assert_eq!(paths(&scan), vec!["top.txt"]);
    }

    #[test]
    fn test_collect_ignore_patterns() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("keep.txt"), b"test").unwrap();
        fs::write(temp.path().join("skip.o"), b"test").unwrap();
        fs::create_dir(temp.path().join("build")).unwrap();
        fs::write(temp.path().join("build/out.txt"), b"test").unwrap();

        let config = AppConfig {
            ignore_patterns: vec!["*.o".to_string(), "build/".to_string()],
            ..AppConfig::default()
        };
        let collector = PathCollector::new(&config);
        let scan = collector.collect(temp.path()).unwrap();

        assert_eq!(paths(&scan), vec!["keep.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_collect_symlink_cycle_terminates() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join("sub/real.txt"), b"test").unwrap();
        // Link back to an ancestor; traversal must not loop through it
        std::os::unix::fs::symlink(temp.path(), temp.path().join("sub/loop")).unwrap();

        let collector = PathCollector::default();
        let scan = collector.collect(temp.path()).unwrap();

        assert_eq!(paths(&scan), vec!["sub/real.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_collect_symlinked_file_skipped() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("real.txt"), b"test").unwrap();
        std::os::unix::fs::symlink(temp.path().join("real.txt"), temp.path().join("alias.txt"))
            .unwrap();

        let collector = PathCollector::default();
        let scan = collector.collect(temp.path()).unwrap();

        assert_eq!(paths(&scan), vec!["real.txt"]);
    }

    #[test]
    fn test_collect_discovery_order_is_breadth_first() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join("sub/deep.txt"), b"test").unwrap();
        fs::write(temp.path().join("top.txt"), b"test").unwrap();

        let collector = PathCollector::default();
        let scan = collector.collect(temp.path()).unwrap();

        // Root-level files are discovered before any subdirectory contents
        let order = paths(&scan);
        assert_eq!(order.len(), 2);
        assert_eq!(order.last(), Some(&"sub/deep.txt"));
    }
}
