//! Sandbox state: what the previous installation left behind.
//!
//! The sandbox root holds one directory per fetched package and a
//! `state.toml` recording which packages were added, changed or deleted
//! since the project was last written:
//!
//! ```toml
//! added = ["A"]
//! changed = ["C"]
//! deleted = ["D"]
//!
//! [packages.Local]
//! path = "../Local"
//! local = true
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::util::fs::write_atomic;

/// File name of the state record inside the sandbox root.
pub const STATE_FILE_NAME: &str = "state.toml";

/// Where a package's sources live.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageSource {
    /// Source directory. Relative paths resolve against the sandbox root, or
    /// against the workspace root for local packages.
    pub path: Option<PathBuf>,

    /// Whether the package is developed in place rather than fetched
    pub local: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct StateFile {
    added: BTreeSet<String>,
    changed: BTreeSet<String>,
    deleted: BTreeSet<String>,
    packages: BTreeMap<String, PackageSource>,
}

/// Prior installation state plus on-disk package source locations.
///
/// The three package sets are fixed for the duration of a run.
#[derive(Debug, Clone)]
pub struct SandboxState {
    root: PathBuf,
    workspace_root: PathBuf,
    added: BTreeSet<String>,
    changed: BTreeSet<String>,
    deleted: BTreeSet<String>,
    packages: BTreeMap<String, PackageSource>,
    project_path: Option<PathBuf>,
}

impl SandboxState {
    /// An empty state for the sandbox at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        SandboxState {
            workspace_root: root.parent().map(Path::to_path_buf).unwrap_or_default(),
            root,
            added: BTreeSet::new(),
            changed: BTreeSet::new(),
            deleted: BTreeSet::new(),
            packages: BTreeMap::new(),
            project_path: None,
        }
    }

    /// Load the state recorded in `<root>/state.toml`.
    ///
    /// A missing state file means nothing was added, changed or deleted.
    pub fn load(root: &Path, workspace_root: &Path) -> Result<Self> {
        let path = root.join(STATE_FILE_NAME);
        let file = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read sandbox state: {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("failed to parse sandbox state: {}", path.display()))?
        } else {
            tracing::debug!("no sandbox state at {}, assuming a clean sandbox", path.display());
            StateFile::default()
        };

        Ok(SandboxState {
            root: root.to_path_buf(),
            workspace_root: workspace_root.to_path_buf(),
            added: file.added,
            changed: file.changed,
            deleted: file.deleted,
            packages: file.packages,
            project_path: None,
        })
    }

    pub fn with_workspace_root(mut self, workspace_root: impl Into<PathBuf>) -> Self {
        self.workspace_root = workspace_root.into();
        self
    }

    pub fn with_added<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.added.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_changed<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.changed.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_deleted<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deleted.extend(names.into_iter().map(Into::into));
        self
    }

    /// Record where a package's sources live.
    pub fn with_package(mut self, name: impl Into<String>, source: PackageSource) -> Self {
        self.packages.insert(name.into(), source);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn added(&self) -> &BTreeSet<String> {
        &self.added
    }

    pub fn changed(&self) -> &BTreeSet<String> {
        &self.changed
    }

    pub fn deleted(&self) -> &BTreeSet<String> {
        &self.deleted
    }

    /// Whether the package is sourced from a local directory.
    pub fn is_local(&self, name: &str) -> bool {
        self.packages.get(name).is_some_and(|p| p.local)
    }

    /// Directory holding the sources of `name`.
    pub fn source_path(&self, name: &str) -> PathBuf {
        match self.packages.get(name) {
            Some(PackageSource {
                path: Some(path),
                local: true,
            }) => self.workspace_root.join(path),
            Some(PackageSource {
                path: Some(path), ..
            }) => self.root.join(path),
            _ => self.root.join(name),
        }
    }

    /// Project file being converged in this run, once preparation set it.
    pub fn project_path(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }

    pub fn set_project_path(&mut self, path: impl Into<PathBuf>) {
        self.project_path = Some(path.into());
    }

    /// Record that the project now reflects every package: clears the
    /// added, changed and deleted sets on disk and keeps package sources.
    pub fn settle(&mut self) -> Result<()> {
        self.added.clear();
        self.changed.clear();
        self.deleted.clear();

        let file = StateFile {
            added: BTreeSet::new(),
            changed: BTreeSet::new(),
            deleted: BTreeSet::new(),
            packages: self.packages.clone(),
        };
        let contents = toml::to_string_pretty(&file).context("failed to serialize sandbox state")?;
        write_atomic(&self.root.join(STATE_FILE_NAME), &contents)
    }
}
