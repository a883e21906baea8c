//! Project-level build configuration setup.

use std::collections::BTreeMap;

use crate::core::platform::{DeploymentTarget, PlatformFamily};
use crate::core::spec::TargetSet;
use crate::project::{ConfigurationKind, ProjectGraph};

/// Setting that keeps installed products unstripped.
pub const STRIP_INSTALLED_PRODUCT: &str = "STRIP_INSTALLED_PRODUCT";

/// Lowest deployment target among the aggregates of each family.
///
/// Families no aggregate targets are absent.
pub fn minimum_deployment_targets(specs: &TargetSet) -> BTreeMap<PlatformFamily, DeploymentTarget> {
    let mut minimums: BTreeMap<PlatformFamily, DeploymentTarget> = BTreeMap::new();
    for (_, aggregate) in specs.aggregates() {
        let platform = &aggregate.platform;
        minimums
            .entry(platform.family)
            .and_modify(|current| {
                if platform.deployment_target < *current {
                    *current = platform.deployment_target.clone();
                }
            })
            .or_insert_with(|| platform.deployment_target.clone());
    }
    minimums
}

/// Register the user's configurations and apply project-wide overrides.
pub fn configure_project(
    graph: &mut ProjectGraph,
    specs: &TargetSet,
    user_configurations: &[(String, ConfigurationKind)],
) {
    for (name, kind) in user_configurations {
        graph.add_configuration(name, *kind);
    }

    let minimums = minimum_deployment_targets(specs);
    for configuration in graph.configurations_mut() {
        for (family, target) in &minimums {
            configuration.set(family.deployment_target_key(), target.as_str());
        }
        configuration.set(STRIP_INSTALLED_PRODUCT, "NO");
    }

    tracing::debug!(
        "configured {} build configurations for {} platform families",
        graph.configurations().len(),
        minimums.len()
    );
}
