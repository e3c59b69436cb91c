use crate::collector::PathCollector;
use crate::eraser::erase_contents;
use crate::reconciler::reconcile;
use dirsync_common::{
    AppConfig, ComparisonResult, DirSyncError, FileSet, RelativePath, SyncMode, SyncOptions,
};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Orchestrates one synchronization run:
/// scan both roots, optionally mirror-clean the destination, reconcile,
/// then copy according to the requested mode.
pub struct Synchronizer {
    options: SyncOptions,
    collector: PathCollector,
}

impl Synchronizer {
    pub fn new(config: &AppConfig, options: SyncOptions) -> Self {
        let collector = PathCollector::new(config).with_max_depth(options.max_depth);
        Self { options, collector }
    }

    pub fn with_options(options: SyncOptions) -> Self {
        Self::new(&AppConfig::default(), options)
    }

    /// Run one synchronization from `source` to `destination`.
    ///
    /// Always returns a structured result; a missing root aborts the run
    /// before any mutation and surfaces as the result's single error.
    pub fn run(&self, source: &Path, destination: &Path) -> ComparisonResult {
        let mut result = ComparisonResult::new(source, destination);
        if let Err(err) = self.run_inner(source, destination, &mut result) {
            result.errors.push(err.to_string());
        }
        result
    }

    fn run_inner(
        &self,
        source: &Path,
        destination: &Path,
        result: &mut ComparisonResult,
    ) -> Result<(), DirSyncError> {
        // Validating: both roots must be readable directories before any
        // mutation is considered
        validate_root(source, "source")?;
        validate_root(destination, "destination")?;

        // Scanning
        info!("Scanning source {}", source.display());
        let source_scan = self.collector.collect(source)?;
        info!("Scanning destination {}", destination.display());
        let mut destination_scan = self.collector.collect(destination)?;
        result.warnings.extend(source_scan.warnings);
        result.warnings.append(&mut destination_scan.warnings);

        let source_files = source_scan.files;
        let mut destination_files = destination_scan.files;

        // MirrorClean: any divergence (count mismatch or a source path
        // missing from the destination) triggers a full erase. Checked on
        // the unfiltered sets, before any erase, matching the stated
        // algorithm. Identical trees see no erase and no copy.
        let diverged = trees_diverge(&source_files, &destination_files);
        if self.options.mode == SyncMode::Mirror && diverged && !destination_files.is_empty() {
            info!(
                "Mirror mode: clearing destination {}",
                destination.display()
            );
            let erasure = erase_contents(destination);
            result.warnings.extend(erasure.warnings);
            result.deleted = erasure.deleted;
            destination_files = FileSet::new();
        }

        // Reconciling
        let reconciliation = reconcile(
            &source_files,
            &destination_files,
            self.options.filter.as_ref(),
        );
        result.unique_to_source = reconciliation.unique_a;
        result.common = reconciliation.common;
        result.unique_to_destination = reconciliation.unique_b;

        // Copying. When a mirror run found divergence, every (filtered)
        // source path is copied, which is what makes the destination an
        // exact replica; an already-identical destination is left alone.
        let to_copy: Vec<RelativePath> = match self.options.mode {
            SyncMode::Report => Vec::new(),
            SyncMode::Copy => result.unique_to_source.clone(),
            SyncMode::Mirror if diverged => match self.options.filter.as_ref() {
                Some(filter) => source_files.filtered(filter).iter().cloned().collect(),
                None => source_files.iter().cloned().collect(),
            },
            SyncMode::Mirror => Vec::new(),
        };

        for rel in to_copy {
            let from = source.join(rel.to_path());
            let to = destination.join(rel.to_path());
            match copy_file(&from, &to) {
                Ok(bytes) => {
                    debug!("Copied {} ({} bytes)", rel, bytes);
                    result.copied.push(rel);
                }
                Err(e) => {
                    result.errors.push(format!("failed to copy {}: {}", rel, e));
                }
            }
        }

        if !result.copied.is_empty() {
            info!(
                "Copied {} files to {}",
                result.copied.len(),
                destination.display()
            );
        }
        Ok(())
    }
}

fn validate_root(path: &Path, role: &str) -> Result<(), DirSyncError> {
    if !path.is_dir() {
        return Err(DirSyncError::NotADirectory(format!(
            "{} root {} does not exist or is not a directory",
            role,
            path.display()
        )));
    }
    Ok(())
}

fn trees_diverge(source: &FileSet, destination: &FileSet) -> bool {
    source.len() != destination.len() || source.iter().any(|path| !destination.contains(path))
}

/// Copy one file, overwriting any existing destination file and creating
/// missing parent directories. The source mtime is carried over best-effort.
fn copy_file(from: &Path, to: &Path) -> Result<u64, DirSyncError> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }

    let bytes = fs::copy(from, to)?;

    if let Ok(metadata) = fs::metadata(from) {
        if let Ok(modified) = metadata.modified() {
            let _ = filetime::set_file_mtime(to, filetime::FileTime::from_system_time(modified));
        }
    }

    Ok(bytes)
}
