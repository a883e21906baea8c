//! Workspace - central configuration hub.
//!
//! A Workspace is the directory holding Berth.toml, with every configured
//! install path resolved against it.

use std::path::{Path, PathBuf};

use anyhow::Result;
use thiserror::Error;

use crate::core::sandbox::SandboxState;
use crate::core::spec::TargetSet;
use crate::project::ConfigurationKind;
use crate::util::config::Config;

/// Name of the workspace manifest.
pub const MANIFEST_NAME: &str = "Berth.toml";

/// Error locating the workspace manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("could not find {} in {} or any parent directory", MANIFEST_NAME, .dir.display())]
    NotFound { dir: PathBuf },
}

/// Look for the manifest directly inside `dir`.
pub fn find_manifest(dir: &Path) -> Result<PathBuf, ManifestError> {
    let path = dir.join(MANIFEST_NAME);
    if path.is_file() {
        Ok(path)
    } else {
        Err(ManifestError::NotFound {
            dir: dir.to_path_buf(),
        })
    }
}

/// A loaded workspace.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    manifest_path: PathBuf,
    config: Config,
}

impl Workspace {
    /// Load the workspace described by the manifest at `manifest_path`.
    pub fn new(manifest_path: &Path) -> Result<Self> {
        let config = Config::load(manifest_path)?;
        Ok(Self::with_config(manifest_path, config))
    }

    /// Build a workspace from an already parsed configuration.
    pub fn with_config(manifest_path: &Path, config: Config) -> Self {
        let root = manifest_path
            .parent()
            .unwrap_or(Path::new("."))
            .to_path_buf();

        Workspace {
            root,
            manifest_path: manifest_path.to_path_buf(),
            config,
        }
    }

    /// Get the workspace root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Project file converged by `berth install`.
    pub fn project_path(&self) -> PathBuf {
        self.root.join(&self.config.install.project)
    }

    pub fn sandbox_root(&self) -> PathBuf {
        self.root.join(&self.config.install.sandbox)
    }

    pub fn targets_path(&self) -> PathBuf {
        self.root.join(&self.config.install.targets)
    }

    pub fn support_files_dir(&self) -> PathBuf {
        self.root.join(&self.config.install.support_files)
    }

    /// User-declared build configurations in name order.
    pub fn user_configurations(&self) -> Vec<(String, ConfigurationKind)> {
        self.config.user_configurations()
    }

    /// Load the sandbox state for this workspace.
    pub fn load_sandbox(&self) -> Result<SandboxState> {
        SandboxState::load(&self.sandbox_root(), &self.root)
    }

    /// Load the resolver's desired target graph.
    pub fn load_targets(&self) -> Result<TargetSet> {
        TargetSet::load(&self.targets_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_resolve_against_root() {
        let tmp = TempDir::new().unwrap();
        let manifest = tmp.path().join(MANIFEST_NAME);
        std::fs::write(
            &manifest,
            "[install]\nproject = \"Build/App.project.toml\"\n\n[build-configurations]\nBeta = \"release\"\n",
        )
        .unwrap();

        let ws = Workspace::new(&manifest).unwrap();
        assert_eq!(ws.root(), tmp.path());
        assert_eq!(ws.project_path(), tmp.path().join("Build/App.project.toml"));
        assert_eq!(ws.sandbox_root(), tmp.path().join("Pods"));
        assert_eq!(ws.targets_path(), tmp.path().join("Pods/targets.toml"));
        assert_eq!(
            ws.user_configurations(),
            vec![("Beta".to_string(), ConfigurationKind::Release)]
        );
    }

    #[test]
    fn test_find_manifest_missing() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            find_manifest(tmp.path()),
            Err(ManifestError::NotFound { .. })
        ));
    }
}
