//! Desired build targets produced by the resolver.
//!
//! A [`TargetSet`] is an arena of [`TargetSpec`]s indexed by [`SpecId`].
//! Aggregates reference their pod children by id, and every spec carries a
//! set-once binding to the [`TargetId`] of the build target that realizes
//! it in the project.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::core::platform::Platform;
use crate::installer::ReconcileError;
use crate::project::TargetId;

/// Index of a spec inside its [`TargetSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpecId(usize);

impl SpecId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Composite target: one per user-declared target, linking the build units
/// of the packages it uses.
#[derive(Debug, Clone)]
pub struct AggregateSpec {
    pub name: String,
    pub label: String,
    pub platform: Platform,
    /// Package names declared for this target in the manifest
    pub dependencies: Vec<String>,
    pub pod_targets: Vec<SpecId>,
    empty: bool,
    empty_override: Option<bool>,
    target: Option<TargetId>,
}

impl AggregateSpec {
    pub fn new(label: impl Into<String>, platform: Platform) -> Self {
        let label = label.into();
        AggregateSpec {
            name: label.clone(),
            label,
            platform,
            dependencies: Vec::new(),
            pod_targets: Vec::new(),
            empty: true,
            empty_override: None,
            target: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_pods(mut self, pods: Vec<SpecId>) -> Self {
        self.pod_targets = pods;
        self.refresh_empty();
        self
    }

    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self.refresh_empty();
        self
    }

    /// Force the emptiness flag instead of deriving it.
    pub fn with_empty(mut self, empty: bool) -> Self {
        self.empty_override = Some(empty);
        self.refresh_empty();
        self
    }

    fn refresh_empty(&mut self) {
        self.empty = self
            .empty_override
            .unwrap_or(self.pod_targets.is_empty() && self.dependencies.is_empty());
    }

    /// Whether the manifest declares nothing for this target.
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn target(&self) -> Option<TargetId> {
        self.target
    }
}

/// Build unit compiled for one package on one platform.
#[derive(Debug, Clone)]
pub struct PodSpec {
    pub name: String,
    pub label: String,
    pub platform: Platform,
    /// Owning package
    pub package: String,
    /// Names of the packages this build unit depends on
    pub dependencies: Vec<String>,
    /// Glob patterns, relative to the package source, selecting its files
    pub source_files: Vec<String>,
    target: Option<TargetId>,
}

impl PodSpec {
    pub fn new(label: impl Into<String>, package: impl Into<String>, platform: Platform) -> Self {
        let label = label.into();
        PodSpec {
            name: label.clone(),
            label,
            platform,
            package: package.into(),
            dependencies: Vec::new(),
            source_files: default_source_files(),
            target: None,
        }
    }

    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn with_source_files(mut self, patterns: Vec<String>) -> Self {
        self.source_files = patterns;
        self
    }

    pub fn target(&self) -> Option<TargetId> {
        self.target
    }
}

/// A desired build unit.
#[derive(Debug, Clone)]
pub enum TargetSpec {
    Aggregate(AggregateSpec),
    Pod(PodSpec),
}

impl TargetSpec {
    pub fn name(&self) -> &str {
        match self {
            TargetSpec::Aggregate(a) => &a.name,
            TargetSpec::Pod(p) => &p.name,
        }
    }

    /// Unique build identifier, matched against existing project targets.
    pub fn label(&self) -> &str {
        match self {
            TargetSpec::Aggregate(a) => &a.label,
            TargetSpec::Pod(p) => &p.label,
        }
    }

    pub fn platform(&self) -> &Platform {
        match self {
            TargetSpec::Aggregate(a) => &a.platform,
            TargetSpec::Pod(p) => &p.platform,
        }
    }

    pub fn dependencies(&self) -> &[String] {
        match self {
            TargetSpec::Aggregate(a) => &a.dependencies,
            TargetSpec::Pod(p) => &p.dependencies,
        }
    }

    /// The bound build target, if any.
    pub fn target(&self) -> Option<TargetId> {
        match self {
            TargetSpec::Aggregate(a) => a.target,
            TargetSpec::Pod(p) => p.target,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.target().is_some()
    }

    pub fn as_aggregate(&self) -> Option<&AggregateSpec> {
        match self {
            TargetSpec::Aggregate(a) => Some(a),
            TargetSpec::Pod(_) => None,
        }
    }

    pub fn as_pod(&self) -> Option<&PodSpec> {
        match self {
            TargetSpec::Pod(p) => Some(p),
            TargetSpec::Aggregate(_) => None,
        }
    }

    fn binding_mut(&mut self) -> &mut Option<TargetId> {
        match self {
            TargetSpec::Aggregate(a) => &mut a.target,
            TargetSpec::Pod(p) => &mut p.target,
        }
    }
}

/// The desired target graph.
#[derive(Debug, Clone, Default)]
pub struct TargetSet {
    specs: Vec<TargetSpec>,
    by_label: HashMap<String, SpecId>,
}

impl TargetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pod spec. Labels must be unique across the set.
    pub fn add_pod(&mut self, pod: PodSpec) -> Result<SpecId> {
        self.push(TargetSpec::Pod(pod))
    }

    /// Add an aggregate spec. Its children must already be pods of this set.
    pub fn add_aggregate(&mut self, aggregate: AggregateSpec) -> Result<SpecId> {
        for &child in &aggregate.pod_targets {
            match self.specs.get(child.0) {
                Some(TargetSpec::Pod(_)) => {}
                _ => bail!(
                    "aggregate `{}` references {} which is not a pod target",
                    aggregate.label,
                    child
                ),
            }
        }
        self.push(TargetSpec::Aggregate(aggregate))
    }

    fn push(&mut self, spec: TargetSpec) -> Result<SpecId> {
        if self.by_label.contains_key(spec.label()) {
            bail!("duplicate target label `{}`", spec.label());
        }
        let id = SpecId(self.specs.len());
        self.by_label.insert(spec.label().to_string(), id);
        self.specs.push(spec);
        Ok(id)
    }

    /// Get a spec by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this set.
    pub fn get(&self, id: SpecId) -> &TargetSpec {
        &self.specs[id.0]
    }

    pub fn aggregate(&self, id: SpecId) -> Option<&AggregateSpec> {
        self.specs.get(id.0).and_then(TargetSpec::as_aggregate)
    }

    pub fn pod(&self, id: SpecId) -> Option<&PodSpec> {
        self.specs.get(id.0).and_then(TargetSpec::as_pod)
    }

    pub fn find_by_label(&self, label: &str) -> Option<SpecId> {
        self.by_label.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Iterate over all specs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (SpecId, &TargetSpec)> {
        self.specs.iter().enumerate().map(|(i, s)| (SpecId(i), s))
    }

    pub fn aggregates(&self) -> impl Iterator<Item = (SpecId, &AggregateSpec)> {
        self.iter()
            .filter_map(|(id, s)| s.as_aggregate().map(|a| (id, a)))
    }

    pub fn pods(&self) -> impl Iterator<Item = (SpecId, &PodSpec)> {
        self.iter().filter_map(|(id, s)| s.as_pod().map(|p| (id, p)))
    }

    /// Pod specs belonging to `package`, in insertion order.
    pub fn pods_for_package(&self, package: &str) -> Vec<SpecId> {
        self.pods()
            .filter(|(_, p)| p.package == package)
            .map(|(id, _)| id)
            .collect()
    }

    /// Distinct package names across all pod specs.
    pub fn package_names(&self) -> BTreeSet<String> {
        self.pods().map(|(_, p)| p.package.clone()).collect()
    }

    /// Bind a spec to its build target. A spec binds at most once.
    pub fn bind(&mut self, id: SpecId, target: TargetId) -> Result<(), ReconcileError> {
        let spec = &mut self.specs[id.0];
        let label = spec.label().to_string();
        let slot = spec.binding_mut();
        if slot.is_some() {
            return Err(ReconcileError::AlreadyBound { label });
        }
        *slot = Some(target);
        Ok(())
    }

    /// Release the binding of whichever spec points at `target`.
    ///
    /// Called when the target is deleted from the project; the spec can then
    /// be bound to a freshly built target.
    pub fn release(&mut self, target: TargetId) -> Option<SpecId> {
        for (i, spec) in self.specs.iter_mut().enumerate() {
            let slot = spec.binding_mut();
            if *slot == Some(target) {
                *slot = None;
                return Some(SpecId(i));
            }
        }
        None
    }

    /// Load the target graph written by the resolver.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read target graph: {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse target graph: {}", path.display()))
    }

    /// Parse a target graph from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let raw: TargetsFile = toml::from_str(contents)?;
        let mut set = TargetSet::new();

        for pod in raw.pods {
            let mut spec = PodSpec::new(pod.label, pod.package, pod.platform)
                .with_dependencies(pod.dependencies)
                .with_source_files(pod.source_files);
            if let Some(name) = pod.name {
                spec.name = name;
            }
            set.add_pod(spec)?;
        }

        for agg in raw.aggregates {
            let mut pods = Vec::with_capacity(agg.pods.len());
            for label in &agg.pods {
                match set.find_by_label(label) {
                    Some(id) => pods.push(id),
                    None => bail!(
                        "aggregate `{}` references unknown pod target `{}`",
                        agg.label,
                        label
                    ),
                }
            }

            let mut spec = AggregateSpec::new(agg.label, agg.platform)
                .with_dependencies(agg.dependencies)
                .with_pods(pods);
            if let Some(name) = agg.name {
                spec = spec.with_name(name);
            }
            if let Some(empty) = agg.empty {
                spec = spec.with_empty(empty);
            }
            set.add_aggregate(spec)?;
        }

        Ok(set)
    }
}

fn default_source_files() -> Vec<String> {
    vec!["**/*".to_string()]
}

/// On-disk layout of `targets.toml`.
#[derive(Debug, Deserialize)]
struct TargetsFile {
    #[serde(default, rename = "aggregate")]
    aggregates: Vec<RawAggregate>,
    #[serde(default, rename = "pod")]
    pods: Vec<RawPod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawAggregate {
    label: String,
    name: Option<String>,
    platform: Platform,
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default)]
    pods: Vec<String>,
    empty: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawPod {
    label: String,
    name: Option<String>,
    package: String,
    platform: Platform,
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default = "default_source_files")]
    source_files: Vec<String>,
}
