//! Product linking: aggregates link the products of their pods.

use anyhow::Result;

use crate::core::spec::TargetSet;
use crate::installer::dependencies::{aggregate_target, non_empty_aggregates, pod_target};
use crate::project::ProjectGraph;

/// Append each child's product to its aggregate's link phase unless already
/// there. Returns the number of products newly linked.
///
/// Entries for pods that left the aggregate are not pruned.
pub fn link_products(graph: &mut ProjectGraph, specs: &TargetSet) -> Result<usize> {
    let mut linked = 0;
    for (_, aggregate) in non_empty_aggregates(specs) {
        let aggregate_id = aggregate_target(aggregate)?;
        for &child in &aggregate.pod_targets {
            let child_id = pod_target(specs, aggregate, child)?;
            let product = graph.expect_target(child_id)?.product.clone();
            if graph.expect_target_mut(aggregate_id)?.link(&product) {
                tracing::debug!("{} links {}", aggregate.label, product);
                linked += 1;
            }
        }
    }
    Ok(linked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::spec::{AggregateSpec, PodSpec};
    use crate::installer::ReconcileError;
    use crate::project::{BuildTarget, ProductRef, TargetKind};
    use crate::test_support::ios;

    fn bound() -> (ProjectGraph, TargetSet) {
        let mut specs = TargetSet::new();
        let a = specs.add_pod(PodSpec::new("Pods-App-A", "A", ios("8.0"))).unwrap();
        let b = specs.add_pod(PodSpec::new("Pods-App-B", "B", ios("8.0"))).unwrap();
        let app = specs
            .add_aggregate(AggregateSpec::new("Pods-App", ios("8.0")).with_pods(vec![a, b]))
            .unwrap();

        let mut graph = ProjectGraph::new();
        for (id, kind) in [(a, TargetKind::Pod), (b, TargetKind::Pod), (app, TargetKind::Aggregate)] {
            let label = specs.get(id).label().to_string();
            let target = graph.add_target(BuildTarget::new(label, kind, ios("8.0"))).unwrap();
            specs.bind(id, target).unwrap();
        }
        (graph, specs)
    }

    #[test]
    fn test_links_child_products_once() {
        let (mut graph, specs) = bound();

        assert_eq!(link_products(&mut graph, &specs).unwrap(), 2);
        assert_eq!(link_products(&mut graph, &specs).unwrap(), 0);

        let app = graph.target(graph.find_target("Pods-App").unwrap()).unwrap();
        assert_eq!(
            app.link_phase,
            vec![
                ProductRef::static_library("Pods-App-A"),
                ProductRef::static_library("Pods-App-B"),
            ]
        );
    }

    #[test]
    fn test_unbound_child_fails() {
        let (mut graph, mut specs) = bound();
        specs.release(graph.find_target("Pods-App-A").unwrap());

        let err = link_products(&mut graph, &specs).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReconcileError>(),
            Some(ReconcileError::UnboundTarget { .. })
        ));
    }
}
