//! Package-level reconciliation: removal and installation of one package.

use anyhow::Result;

use crate::core::spec::{PodSpec, TargetSet};
use crate::installer::context::InstallContext;
use crate::installer::target_builder::TargetBuilder;
use crate::project::ProjectGraph;

/// Targets touched by one package operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageChange {
    /// Labels of targets created or deleted
    pub targets: Vec<String>,
    /// Number of support-file generation requests
    pub support_files: usize,
}

/// Delete the package group `name` with every target whose product lives
/// under it. Bindings to the deleted targets are released.
///
/// A package without a group was never installed; nothing happens.
pub fn remove_package(
    graph: &mut ProjectGraph,
    specs: &mut TargetSet,
    name: &str,
) -> Result<PackageChange> {
    if graph.group(name).is_none() {
        tracing::debug!("no group for `{}`, nothing to remove", name);
        return Ok(PackageChange::default());
    }

    let mut change = PackageChange::default();
    for target_id in graph.targets_in_group(name) {
        let edges = graph.remove_edges_of(target_id);
        specs.release(target_id);
        if let Some(target) = graph.remove_target(target_id) {
            tracing::debug!("removed target `{}` and {} edges", target.label, edges);
            change.targets.push(target.label);
        }
    }
    graph.remove_group(name);

    tracing::info!("Removed {}", name);
    Ok(change)
}

/// Install package `name`: its group, file references, the targets of its
/// pods and their support files.
///
/// Pods that are still bound keep their target.
pub fn install_package(
    ctx: &mut InstallContext<'_>,
    graph: &mut ProjectGraph,
    name: &str,
) -> Result<PackageChange> {
    let path = ctx.sandbox.source_path(name);
    let local = ctx.sandbox.is_local(name);
    graph.ensure_group(name, &path, local);

    let pod_ids = ctx.specs.pods_for_package(name);
    if pod_ids.is_empty() {
        tracing::warn!("package `{}` has no pod targets", name);
    }

    {
        let pods: Vec<&PodSpec> = pod_ids.iter().filter_map(|&id| ctx.specs.pod(id)).collect();
        ctx.file_references
            .install_file_references(&*ctx.sandbox, graph, name, &pods)?;
    }

    let builder = TargetBuilder::new(&ctx.settings.configurations, ctx.extension);
    let mut change = PackageChange::default();
    for id in pod_ids {
        let target_id = match ctx.specs.get(id).target() {
            Some(existing) => existing,
            None => {
                let created = builder.build(graph, ctx.specs, id)?;
                change.targets.push(ctx.specs.get(id).label().to_string());
                created
            }
        };
        ctx.support_files.generate_support_files(graph, target_id)?;
        change.support_files += 1;
    }

    tracing::info!(
        "Installed {}{}",
        name,
        if local { " (local)" } else { "" }
    );
    Ok(change)
}
