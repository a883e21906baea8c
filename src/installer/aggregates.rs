//! Aggregate-target reconciliation.

use anyhow::Result;

use crate::core::spec::SpecId;
use crate::installer::context::InstallContext;
use crate::installer::target_builder::TargetBuilder;
use crate::installer::ReconcileError;
use crate::project::ProjectGraph;

/// Build a target for each planned aggregate. Returns the created labels.
pub fn install_aggregates(
    ctx: &mut InstallContext<'_>,
    graph: &mut ProjectGraph,
    aggregates: &[SpecId],
) -> Result<Vec<String>> {
    let builder = TargetBuilder::new(&ctx.settings.configurations, ctx.extension);
    let mut created = Vec::with_capacity(aggregates.len());
    for &id in aggregates {
        builder.build(graph, ctx.specs, id)?;
        let label = ctx.specs.get(id).label().to_string();
        tracing::info!("Installed target {}", label);
        created.push(label);
    }
    Ok(created)
}

/// Request support files for every non-empty aggregate, whether it was
/// built in this run or reused.
pub fn generate_aggregate_support_files(
    ctx: &mut InstallContext<'_>,
    graph: &ProjectGraph,
) -> Result<usize> {
    let mut generated = 0;
    for (_, aggregate) in ctx.specs.aggregates() {
        if aggregate.is_empty() {
            continue;
        }
        let Some(target) = aggregate.target() else {
            return Err(ReconcileError::UnboundAggregate {
                label: aggregate.label.clone(),
            }
            .into());
        };
        ctx.support_files.generate_support_files(graph, target)?;
        generated += 1;
    }
    Ok(generated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::spec::{AggregateSpec, PodSpec, TargetSet};
    use crate::installer::diff::targets_to_install;
    use crate::installer::prepare::ProjectState;
    use crate::project::TargetKind;
    use crate::test_support::{ios, InstallFixture};

    fn specs() -> TargetSet {
        let mut specs = TargetSet::new();
        let a = specs.add_pod(PodSpec::new("Pods-App-A", "A", ios("8.0"))).unwrap();
        specs
            .add_aggregate(AggregateSpec::new("Pods-App", ios("8.0")).with_pods(vec![a]))
            .unwrap();
        specs
            .add_aggregate(AggregateSpec::new("Pods-Empty", ios("8.0")))
            .unwrap();
        specs
    }

    #[test]
    fn test_install_non_empty_aggregates() {
        let mut fixture = InstallFixture::new(specs());
        let mut graph = ProjectGraph::new();
        let planned = targets_to_install(ProjectState::Fresh, &fixture.specs);

        let created = install_aggregates(&mut fixture.context(), &mut graph, &planned).unwrap();

        assert_eq!(created, vec!["Pods-App"]);
        let id = graph.find_target("Pods-App").unwrap();
        assert_eq!(graph.target(id).unwrap().kind, TargetKind::Aggregate);
        assert!(graph.find_target("Pods-Empty").is_none());
    }

    #[test]
    fn test_support_files_for_every_non_empty_aggregate() {
        let mut fixture = InstallFixture::new(specs());
        let mut graph = ProjectGraph::new();
        let planned = targets_to_install(ProjectState::Fresh, &fixture.specs);
        install_aggregates(&mut fixture.context(), &mut graph, &planned).unwrap();

        let generated = generate_aggregate_support_files(&mut fixture.context(), &graph).unwrap();

        assert_eq!(generated, 1);
        assert_eq!(fixture.support_files.labels(), &["Pods-App".to_string()]);
    }

    #[test]
    fn test_support_files_need_bound_aggregate() {
        let mut fixture = InstallFixture::new(specs());
        let graph = ProjectGraph::new();

        let err = generate_aggregate_support_files(&mut fixture.context(), &graph).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReconcileError>(),
            Some(ReconcileError::UnboundAggregate { label }) if label == "Pods-App"
        ));
    }
}
