//! Berth.toml workspace configuration.
//!
//! ```toml
//! [install]
//! project = "Pods/Pods.project.toml"
//! sandbox = "Pods"
//! targets = "Pods/targets.toml"
//! support-files = "Pods/Target Support Files"
//!
//! [build-configurations]
//! Beta = "release"
//! ```
//!
//! Every key is optional; paths are relative to the directory holding
//! Berth.toml.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::project::ConfigurationKind;

/// Berth configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Install paths
    pub install: InstallConfig,

    /// User-declared build configurations, name -> kind
    pub build_configurations: BTreeMap<String, ConfigurationKind>,
}

/// Locations read and written by `berth install`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct InstallConfig {
    /// Project file to converge
    pub project: PathBuf,

    /// Sandbox root holding package sources and `state.toml`
    pub sandbox: PathBuf,

    /// Desired target graph produced by the resolver
    pub targets: PathBuf,

    /// Directory for generated support files
    pub support_files: PathBuf,
}

impl Default for InstallConfig {
    fn default() -> Self {
        InstallConfig {
            project: PathBuf::from("Pods/Pods.project.toml"),
            sandbox: PathBuf::from("Pods"),
            targets: PathBuf::from("Pods/targets.toml"),
            support_files: PathBuf::from("Pods/Target Support Files"),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// User-declared build configurations in name order.
    pub fn user_configurations(&self) -> Vec<(String, ConfigurationKind)> {
        self.build_configurations
            .iter()
            .map(|(name, kind)| (name.clone(), *kind))
            .collect()
    }
}
