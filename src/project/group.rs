//! Package groups: per-package file-reference containers.

use std::path::PathBuf;

/// Graph node keyed by package name, owning the package's file references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageGroup {
    pub name: String,
    /// Package source directory
    pub path: PathBuf,
    /// Whether the package is developed in place
    pub local: bool,
    /// File references, relative to `path`, sorted
    pub files: Vec<PathBuf>,
}

impl PackageGroup {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, local: bool) -> Self {
        PackageGroup {
            name: name.into(),
            path: path.into(),
            local,
            files: Vec::new(),
        }
    }

    /// Add file references, keeping the list sorted and free of duplicates.
    ///
    /// Returns how many references were new.
    pub fn add_files(&mut self, files: impl IntoIterator<Item = PathBuf>) -> usize {
        let before = self.files.len();
        self.files.extend(files);
        self.files.sort();
        self.files.dedup();
        self.files.len() - before
    }
}
