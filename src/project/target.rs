//! Build targets, configurations and products.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::platform::Platform;

/// Names of the configurations every target and project starts with.
pub const BUILT_IN_CONFIGURATIONS: [(&str, ConfigurationKind); 2] = [
    ("Debug", ConfigurationKind::Debug),
    ("Release", ConfigurationKind::Release),
];

/// Kind of a build configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigurationKind {
    Debug,
    Release,
}

impl fmt::Display for ConfigurationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationKind::Debug => write!(f, "debug"),
            ConfigurationKind::Release => write!(f, "release"),
        }
    }
}

/// A named build configuration and its setting overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub name: String,
    pub kind: ConfigurationKind,
    #[serde(default)]
    pub settings: BTreeMap<String, String>,
}

impl Configuration {
    pub fn new(name: impl Into<String>, kind: ConfigurationKind) -> Self {
        Configuration {
            name: name.into(),
            kind,
            settings: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.settings.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }
}

/// Register a configuration in `list`, reusing an existing one of the same
/// name.
pub fn register_configuration<'a>(
    list: &'a mut Vec<Configuration>,
    name: &str,
    kind: ConfigurationKind,
) -> &'a mut Configuration {
    let index = match list.iter().position(|c| c.name == name) {
        Some(index) => index,
        None => {
            list.push(Configuration::new(name, kind));
            list.len() - 1
        }
    };
    &mut list[index]
}

/// Configurations every new target or project starts with.
pub fn built_in_configurations() -> Vec<Configuration> {
    BUILT_IN_CONFIGURATIONS
        .iter()
        .map(|(name, kind)| Configuration::new(*name, *kind))
        .collect()
}

/// Opaque handle to the artifact a target produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductRef(String);

impl ProductRef {
    pub fn new(name: impl Into<String>) -> Self {
        ProductRef(name.into())
    }

    /// Static library product for a target label.
    pub fn static_library(label: &str) -> Self {
        ProductRef(format!("lib{}.a", label))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A product and the package group it lives under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub reference: ProductRef,
    pub group: Option<String>,
}

/// Which kind of spec a target was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Aggregate,
    Pod,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Aggregate => write!(f, "aggregate"),
            TargetKind::Pod => write!(f, "pod"),
        }
    }
}

/// A build target in the project graph.
///
/// Dependency edges are not stored here; they are edges of the
/// [`ProjectGraph`](crate::project::ProjectGraph).
#[derive(Debug, Clone, PartialEq)]
pub struct BuildTarget {
    /// Unique within the project
    pub label: String,
    pub kind: TargetKind,
    pub platform: Platform,
    /// Package whose group owns the product (pod targets only)
    pub package: Option<String>,
    pub product: ProductRef,
    /// Target-wide settings shared by every configuration
    pub settings: BTreeMap<String, String>,
    pub configurations: Vec<Configuration>,
    /// Products linked into this target, in link order
    pub link_phase: Vec<ProductRef>,
    /// Files compiled by this target, relative to its package group
    pub compile_sources: Vec<PathBuf>,
}

impl BuildTarget {
    /// A target with the built-in configurations and no settings.
    pub fn new(label: impl Into<String>, kind: TargetKind, platform: Platform) -> Self {
        let label = label.into();
        BuildTarget {
            product: ProductRef::static_library(&label),
            label,
            kind,
            platform,
            package: None,
            settings: BTreeMap::new(),
            configurations: built_in_configurations(),
            link_phase: Vec::new(),
            compile_sources: Vec::new(),
        }
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn add_configuration(&mut self, name: &str, kind: ConfigurationKind) -> &mut Configuration {
        register_configuration(&mut self.configurations, name, kind)
    }

    pub fn configuration(&self, name: &str) -> Option<&Configuration> {
        self.configurations.iter().find(|c| c.name == name)
    }

    /// Append `product` to the link phase unless already there.
    pub fn link(&mut self, product: &ProductRef) -> bool {
        if self.link_phase.contains(product) {
            return false;
        }
        self.link_phase.push(product.clone());
        true
    }
}
