//! Dependency wiring between bound targets.
//!
//! Runs in two phases: every aggregate depends on each of its pods, then
//! every pod depends on the sibling pods providing its declared packages.
//! A spec without a target at this point is a consistency violation and
//! stops the run.

use anyhow::Result;

use crate::core::spec::{AggregateSpec, SpecId, TargetSet};
use crate::installer::ReconcileError;
use crate::project::{ProjectGraph, TargetId};

/// Both wiring phases. Returns the number of newly inserted edges.
pub fn wire_dependencies(graph: &mut ProjectGraph, specs: &TargetSet) -> Result<usize> {
    let children = wire_aggregate_children(graph, specs)?;
    let siblings = wire_sibling_dependencies(graph, specs)?;
    tracing::debug!("wired {} aggregate and {} sibling edges", children, siblings);
    Ok(children + siblings)
}

/// Phase 1: aggregate target → each child's target.
pub fn wire_aggregate_children(graph: &mut ProjectGraph, specs: &TargetSet) -> Result<usize> {
    let mut added = 0;
    for (_, aggregate) in non_empty_aggregates(specs) {
        let aggregate_target = aggregate_target(aggregate)?;
        for &child in &aggregate.pod_targets {
            let child_target = pod_target(specs, aggregate, child)?;
            if graph.add_dependency(aggregate_target, child_target)? {
                added += 1;
            }
        }
    }
    Ok(added)
}

/// Phase 2: child target → sibling target for each declared dependency,
/// resolved by package name among the same aggregate's pods.
pub fn wire_sibling_dependencies(graph: &mut ProjectGraph, specs: &TargetSet) -> Result<usize> {
    let mut added = 0;
    for (_, aggregate) in non_empty_aggregates(specs) {
        for &child in &aggregate.pod_targets {
            let Some(pod) = specs.pod(child) else {
                continue;
            };
            let child_target = pod_target(specs, aggregate, child)?;

            for dependency in &pod.dependencies {
                let sibling = aggregate
                    .pod_targets
                    .iter()
                    .copied()
                    .find(|&id| specs.pod(id).is_some_and(|p| &p.package == dependency))
                    .ok_or_else(|| ReconcileError::UnresolvedDependency {
                        aggregate: aggregate.label.clone(),
                        pod: pod.label.clone(),
                        dependency: dependency.clone(),
                    })?;
                let sibling_target = pod_target(specs, aggregate, sibling)?;

                if sibling_target == child_target {
                    tracing::debug!("`{}` lists its own package `{}`", pod.label, dependency);
                    continue;
                }
                if graph.add_dependency(child_target, sibling_target)? {
                    added += 1;
                }
            }
        }
    }
    Ok(added)
}

/// Aggregates that own a target, sorted by name.
pub(crate) fn non_empty_aggregates(specs: &TargetSet) -> Vec<(SpecId, &AggregateSpec)> {
    let mut aggregates: Vec<_> = specs
        .aggregates()
        .filter(|(_, aggregate)| !aggregate.is_empty())
        .collect();
    aggregates.sort_by(|(_, a), (_, b)| a.name.cmp(&b.name).then_with(|| a.label.cmp(&b.label)));
    aggregates
}

pub(crate) fn aggregate_target(aggregate: &AggregateSpec) -> Result<TargetId, ReconcileError> {
    aggregate
        .target()
        .ok_or_else(|| ReconcileError::UnboundAggregate {
            label: aggregate.label.clone(),
        })
}

pub(crate) fn pod_target(
    specs: &TargetSet,
    aggregate: &AggregateSpec,
    pod: SpecId,
) -> Result<TargetId, ReconcileError> {
    let spec = specs.get(pod);
    spec.target().ok_or_else(|| ReconcileError::UnboundTarget {
        aggregate: aggregate.label.clone(),
        pod: spec.label().to_string(),
    })
}
