use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default bound on traversal depth, generous enough for any realistic tree.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// A forward-slash-normalized path relative to a traversal root.
///
/// Identifies a regular file within one tree; equality is exact string
/// equality after normalization. Never represents a directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelativePath(String);

impl RelativePath {
    /// Normalize separators to forward slashes and strip leading/trailing ones.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let normalized = raw.as_ref().replace('\\', "/");
        Self(normalized.trim_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// Append one path component (or a nested relative path).
    pub fn join(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Self::new(name)
        } else {
            Self::new(format!("{}/{}", self.0, name))
        }
    }

    /// True when `self` equals `ancestor` or lies inside its subtree.
    pub fn is_under(&self, ancestor: &RelativePath) -> bool {
        self == ancestor || self.0.starts_with(&format!("{}/", ancestor.0))
    }

    /// Prefix match in either direction, as used by the `--only` filter:
    /// either path may be an ancestor of the other.
    pub fn overlaps(&self, other: &RelativePath) -> bool {
        self.is_under(other) || other.is_under(self)
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The set of relative file paths found under one traversal root.
///
/// Preserves discovery order for reporting while keeping O(1) membership.
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    paths: Vec<RelativePath>,
    index: HashSet<RelativePath>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a path, keeping discovery order. Returns false on duplicates.
    pub fn insert(&mut self, path: RelativePath) -> bool {
        if self.index.insert(path.clone()) {
            self.paths.push(path);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, path: &RelativePath) -> bool {
        self.index.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RelativePath> {
        self.paths.iter()
    }

    /// The subset overlapping `filter`, in the same order.
    pub fn filtered(&self, filter: &RelativePath) -> FileSet {
        self.paths
            .iter()
            .filter(|path| path.overlaps(filter))
            .cloned()
            .collect()
    }
}

impl FromIterator<RelativePath> for FileSet {
    fn from_iter<I: IntoIterator<Item = RelativePath>>(iter: I) -> Self {
        let mut set = FileSet::new();
        for path in iter {
            set.insert(path);
        }
        set
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = &'a RelativePath;
    type IntoIter = std::slice::Iter<'a, RelativePath>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

/// How the synchronizer treats the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncMode {
    /// Classify only, perform no filesystem mutation.
    Report,
    /// Copy files unique to the source into the destination.
    Copy,
    /// Make the destination an exact replica via erase-then-copy-all.
    Mirror,
}

/// Options for one synchronization run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub mode: SyncMode,
    /// Restrict classification and copying to one file or subtree.
    pub filter: Option<RelativePath>,
    pub max_depth: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            mode: SyncMode::Copy,
            filter: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Structured outcome of one synchronization run.
///
/// Built incrementally while the run executes; lists are append-only and
/// reflect exactly the operations actually attempted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub unique_to_source: Vec<RelativePath>,
    pub common: Vec<RelativePath>,
    pub unique_to_destination: Vec<RelativePath>,
    /// Files removed from the destination (mirror mode only).
    pub deleted: Vec<RelativePath>,
    pub copied: Vec<RelativePath>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ComparisonResult {
    pub fn new(source: &Path, destination: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            unique_to_source: Vec::new(),
            common: Vec::new(),
            unique_to_destination: Vec::new(),
            deleted: Vec::new(),
            copied: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Ignore patterns (e.g., "*.o", "node_modules/")
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Override of the default traversal depth bound
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Enable portable mode (config alongside binary)
    #[serde(default)]
    pub portable_mode: bool,
}
