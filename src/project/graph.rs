//! The project graph - the mutable model behind the project file.
//!
//! Targets live in a stable graph arena: a [`TargetId`] stays valid until
//! its target is removed, and graph edges are the dependency edges between
//! targets. Removing a target drops every edge that touches it.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::installer::ReconcileError;
use crate::project::group::PackageGroup;
use crate::project::target::{
    built_in_configurations, register_configuration, BuildTarget, Configuration,
    ConfigurationKind, Product, ProductRef,
};

/// Identifier of a build target inside a [`ProjectGraph`].
pub type TargetId = NodeIndex;

/// In-memory project: targets, dependency edges, package groups, products
/// and project-level configurations.
#[derive(Debug, Clone)]
pub struct ProjectGraph {
    targets: StableDiGraph<BuildTarget, ()>,
    labels: HashMap<String, TargetId>,
    groups: BTreeMap<String, PackageGroup>,
    products: BTreeMap<ProductRef, Product>,
    configurations: Vec<Configuration>,
    manifest_path: Option<PathBuf>,
}

impl ProjectGraph {
    /// An empty project with the built-in configurations.
    pub fn new() -> Self {
        ProjectGraph {
            targets: StableDiGraph::new(),
            labels: HashMap::new(),
            groups: BTreeMap::new(),
            products: BTreeMap::new(),
            configurations: built_in_configurations(),
            manifest_path: None,
        }
    }

    /// Insert a target and register its product under the target's package
    /// group.
    pub fn add_target(&mut self, target: BuildTarget) -> Result<TargetId, ReconcileError> {
        if self.labels.contains_key(&target.label) {
            return Err(ReconcileError::DuplicateLabel {
                label: target.label,
            });
        }

        let label = target.label.clone();
        let product = Product {
            reference: target.product.clone(),
            group: target.package.clone(),
        };
        let id = self.targets.add_node(target);
        self.labels.insert(label, id);
        self.products.insert(product.reference.clone(), product);
        Ok(id)
    }

    /// Delete a target and its product. Edges touching it go with it.
    pub fn remove_target(&mut self, id: TargetId) -> Option<BuildTarget> {
        let target = self.targets.remove_node(id)?;
        self.labels.remove(&target.label);
        self.products.remove(&target.product);
        Some(target)
    }

    pub fn target(&self, id: TargetId) -> Option<&BuildTarget> {
        self.targets.node_weight(id)
    }

    pub fn target_mut(&mut self, id: TargetId) -> Option<&mut BuildTarget> {
        self.targets.node_weight_mut(id)
    }

    /// Like [`target`](Self::target), but a missing target is an error.
    pub fn expect_target(&self, id: TargetId) -> Result<&BuildTarget, ReconcileError> {
        self.target(id).ok_or(ReconcileError::UnknownTarget { id: id.index() })
    }

    pub fn expect_target_mut(&mut self, id: TargetId) -> Result<&mut BuildTarget, ReconcileError> {
        self.targets
            .node_weight_mut(id)
            .ok_or(ReconcileError::UnknownTarget { id: id.index() })
    }

    pub fn find_target(&self, label: &str) -> Option<TargetId> {
        self.labels.get(label).copied()
    }

    /// All targets, ordered by label.
    pub fn targets(&self) -> Vec<(TargetId, &BuildTarget)> {
        let mut targets: Vec<_> = self
            .targets
            .node_indices()
            .map(|id| (id, &self.targets[id]))
            .collect();
        targets.sort_by(|a, b| a.1.label.cmp(&b.1.label));
        targets
    }

    pub fn target_count(&self) -> usize {
        self.targets.node_count()
    }

    /// Add a dependency edge `from -> to`.
    ///
    /// Returns `false` if the edge already existed.
    pub fn add_dependency(&mut self, from: TargetId, to: TargetId) -> Result<bool, ReconcileError> {
        self.expect_target(from)?;
        self.expect_target(to)?;

        if self.targets.find_edge(from, to).is_some() {
            return Ok(false);
        }
        self.targets.add_edge(from, to, ());
        Ok(true)
    }

    pub fn has_dependency(&self, from: TargetId, to: TargetId) -> bool {
        self.targets.find_edge(from, to).is_some()
    }

    /// Direct dependencies of a target, ordered by label.
    pub fn dependencies(&self, id: TargetId) -> Vec<TargetId> {
        self.neighbors_by_label(id, Direction::Outgoing)
    }

    /// Targets depending on `id`, ordered by label.
    pub fn dependents(&self, id: TargetId) -> Vec<TargetId> {
        self.neighbors_by_label(id, Direction::Incoming)
    }

    fn neighbors_by_label(&self, id: TargetId, direction: Direction) -> Vec<TargetId> {
        let mut ids: Vec<_> = self.targets.neighbors_directed(id, direction).collect();
        ids.sort_by(|a, b| self.targets[*a].label.cmp(&self.targets[*b].label));
        ids.dedup();
        ids
    }

    /// Remove every dependency edge into or out of `id`.
    ///
    /// Returns the number of edges removed.
    pub fn remove_edges_of(&mut self, id: TargetId) -> usize {
        let mut edges: Vec<_> = self
            .targets
            .edges_directed(id, Direction::Incoming)
            .chain(self.targets.edges_directed(id, Direction::Outgoing))
            .map(|e| e.id())
            .collect();
        // A self edge shows up in both directions
        edges.sort();
        edges.dedup();
        let count = edges.len();
        for edge in edges {
            self.targets.remove_edge(edge);
        }
        count
    }

    pub fn edge_count(&self) -> usize {
        self.targets.edge_count()
    }

    pub fn product(&self, reference: &ProductRef) -> Option<&Product> {
        self.products.get(reference)
    }

    /// Targets whose product lives under the group of `package`.
    pub fn targets_in_group(&self, package: &str) -> Vec<TargetId> {
        let mut ids: Vec<_> = self
            .targets
            .node_indices()
            .filter(|&id| {
                self.products
                    .get(&self.targets[id].product)
                    .and_then(|p| p.group.as_deref())
                    == Some(package)
            })
            .collect();
        ids.sort_by(|a, b| self.targets[*a].label.cmp(&self.targets[*b].label));
        ids
    }

    pub fn group(&self, name: &str) -> Option<&PackageGroup> {
        self.groups.get(name)
    }

    pub fn group_mut(&mut self, name: &str) -> Option<&mut PackageGroup> {
        self.groups.get_mut(name)
    }

    /// Groups ordered by package name.
    pub fn groups(&self) -> impl Iterator<Item = &PackageGroup> {
        self.groups.values()
    }

    /// Create the group for `name`, or reuse it and refresh its location.
    pub fn ensure_group(&mut self, name: &str, path: &Path, local: bool) -> &mut PackageGroup {
        let group = self
            .groups
            .entry(name.to_string())
            .or_insert_with(|| PackageGroup::new(name, path, local));
        group.path = path.to_path_buf();
        group.local = local;
        group
    }

    pub fn remove_group(&mut self, name: &str) -> Option<PackageGroup> {
        self.groups.remove(name)
    }

    /// Project-level build configurations.
    pub fn configurations(&self) -> &[Configuration] {
        &self.configurations
    }

    pub fn configurations_mut(&mut self) -> &mut [Configuration] {
        &mut self.configurations
    }

    /// Register a project-level configuration, reusing one of the same name.
    pub fn add_configuration(&mut self, name: &str, kind: ConfigurationKind) -> &mut Configuration {
        register_configuration(&mut self.configurations, name, kind)
    }

    /// Manifest the project was generated from.
    pub fn manifest_path(&self) -> Option<&Path> {
        self.manifest_path.as_deref()
    }

    pub fn set_manifest_path(&mut self, path: impl Into<PathBuf>) {
        self.manifest_path = Some(path.into());
    }

    pub(crate) fn set_configurations(&mut self, configurations: Vec<Configuration>) {
        self.configurations = configurations;
    }

    pub(crate) fn insert_group(&mut self, group: PackageGroup) {
        self.groups.insert(group.name.clone(), group);
    }
}

impl Default for ProjectGraph {
    fn default() -> Self {
        Self::new()
    }
}
