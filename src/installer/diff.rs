//! What a run has to change, computed once after preparation.

use std::collections::BTreeSet;

use crate::core::sandbox::SandboxState;
use crate::core::spec::{SpecId, TargetSet};
use crate::installer::prepare::ProjectState;

/// Packages and aggregate targets a run will touch, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallPlan {
    pub packages_to_remove: Vec<String>,
    pub packages_to_install: Vec<String>,
    /// Aggregate specs to build targets for, ordered by name
    pub targets_to_install: Vec<SpecId>,
}

impl InstallPlan {
    pub fn compute(state: ProjectState, sandbox: &SandboxState, specs: &TargetSet) -> Self {
        InstallPlan {
            packages_to_remove: packages_to_remove(state, sandbox),
            packages_to_install: packages_to_install(state, sandbox, specs),
            targets_to_install: targets_to_install(state, specs),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.packages_to_remove.is_empty()
            && self.packages_to_install.is_empty()
            && self.targets_to_install.is_empty()
    }
}

/// Deleted and changed packages of a reopened project. A fresh project has
/// nothing to remove.
pub fn packages_to_remove(state: ProjectState, sandbox: &SandboxState) -> Vec<String> {
    if state.is_fresh() {
        return Vec::new();
    }
    sandbox
        .deleted()
        .union(sandbox.changed())
        .cloned()
        .collect()
}

/// Every pod package of a fresh project. On reopen: added and changed
/// packages plus the packages of pods that found no existing target.
pub fn packages_to_install(
    state: ProjectState,
    sandbox: &SandboxState,
    specs: &TargetSet,
) -> Vec<String> {
    if state.is_fresh() {
        return specs.package_names().into_iter().collect();
    }

    let mut names: BTreeSet<String> = sandbox.added().union(sandbox.changed()).cloned().collect();
    names.extend(
        specs
            .pods()
            .filter(|(_, pod)| pod.target().is_none())
            .map(|(_, pod)| pod.package.clone()),
    );
    names.into_iter().collect()
}

/// Non-empty aggregates ordered by name; on reopen only the unbound ones.
pub fn targets_to_install(state: ProjectState, specs: &TargetSet) -> Vec<SpecId> {
    let mut aggregates: Vec<_> = specs
        .aggregates()
        .filter(|(_, aggregate)| !aggregate.is_empty())
        .filter(|(_, aggregate)| state.is_fresh() || aggregate.target().is_none())
        .collect();
    aggregates.sort_by(|(_, a), (_, b)| a.name.cmp(&b.name).then_with(|| a.label.cmp(&b.label)));
    aggregates.into_iter().map(|(id, _)| id).collect()
}
