use dirsync_common::RelativePath;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What one erasure removed, plus the entries it could not remove.
#[derive(Debug, Default)]
pub struct Erasure {
    /// Removed files (not directories), relative to the erased root,
    /// in removal order.
    pub deleted: Vec<RelativePath>,
    pub warnings: Vec<String>,
}

enum Task {
    /// Remove the files in a directory and queue its subdirectories.
    Visit(PathBuf, RelativePath),
    /// Remove a directory after its contents are gone.
    Remove(PathBuf, RelativePath),
}

/// Remove every entry under `dir`, leaving `dir` itself present but empty.
///
/// Best-effort: a failed delete is recorded as a warning and the remaining
/// entries are still processed, so one locked file cannot block cleanup of
/// the rest of the tree. Uses an explicit stack, directories are removed
/// after their contents (post-order). Symbolic links are unlinked, never
/// followed.
pub fn erase_contents(dir: &Path) -> Erasure {
    let mut erasure = Erasure::default();
    let mut stack = vec![Task::Visit(dir.to_path_buf(), RelativePath::new(""))];

    while let Some(task) = stack.pop() {
        match task {
            Task::Visit(current, prefix) => {
                visit_dir(&current, &prefix, &mut stack, &mut erasure);
            }
            Task::Remove(current, rel) => {
                if let Err(e) = fs::remove_dir(&current) {
                    erasure
                        .warnings
                        .push(format!("could not remove directory {}: {}", rel, e));
                } else {
                    debug!("Removed directory {}", rel);
                }
            }
        }
    }

    info!(
        "Erased {} files under {}",
        erasure.deleted.len(),
        dir.display()
    );
    erasure
}

fn visit_dir(current: &Path, prefix: &RelativePath, stack: &mut Vec<Task>, erasure: &mut Erasure) {
    let entries = match fs::read_dir(current) {
        Ok(entries) => entries,
        Err(e) => {
            erasure.warnings.push(format!(
                "could not read directory {}: {}",
                current.display(),
                e
            ));
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                erasure.warnings.push(format!(
                    "could not access an entry in {}: {}",
                    current.display(),
                    e
                ));
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().into_owned();
        let rel = prefix.join(&name);

        // file_type does not follow symlinks: a symlinked directory is
        // unlinked like a file, never descended into
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

        if is_dir {
            // LIFO order: the Visit runs (and queues nested work) before
            // the matching Remove is reached
            stack.push(Task::Remove(entry.path(), rel.clone()));
            stack.push(Task::Visit(entry.path(), rel));
        } else if let Err(e) = fs::remove_file(entry.path()) {
            erasure
                .warnings
                .push(format!("could not delete {}: {}", rel, e));
        } else {
            debug!("Deleted {}", rel);
            erasure.deleted.push(rel);
        }
    }
}
