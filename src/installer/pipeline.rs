//! The reconciliation run as an ordered list of steps.

use std::fmt;

use anyhow::{bail, Result};
use serde::Serialize;

use crate::core::spec::TargetSet;
use crate::installer::aggregates::{generate_aggregate_support_files, install_aggregates};
use crate::installer::configurations::configure_project;
use crate::installer::context::InstallContext;
use crate::installer::dependencies::wire_dependencies;
use crate::installer::diff::InstallPlan;
use crate::installer::links::link_products;
use crate::installer::packages::{install_package, remove_package};
use crate::installer::prepare::{prepare_project, ProjectState};
use crate::installer::report::ReconcileReport;
use crate::project::{save_project, ProjectGraph};

/// One step of a run after preparation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    ConfigureBuild,
    RemovePackages,
    InstallPackages,
    InstallAggregates,
    GenerateSupportFiles,
    WireDependencies,
    LinkProducts,
}

impl Step {
    /// Every step in execution order.
    pub const PIPELINE: [Step; 7] = [
        Step::ConfigureBuild,
        Step::RemovePackages,
        Step::InstallPackages,
        Step::InstallAggregates,
        Step::GenerateSupportFiles,
        Step::WireDependencies,
        Step::LinkProducts,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Step::ConfigureBuild => "configure-build",
            Step::RemovePackages => "remove-packages",
            Step::InstallPackages => "install-packages",
            Step::InstallAggregates => "install-aggregates",
            Step::GenerateSupportFiles => "generate-support-files",
            Step::WireDependencies => "wire-dependencies",
            Step::LinkProducts => "link-products",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drives one run: owns the project graph, borrows everything else through
/// the [`InstallContext`].
///
/// Steps may be run one at a time with [`Reconciler::run_step`] as long as
/// they stay in pipeline order; [`Reconciler::run`] runs the rest.
pub struct Reconciler<'a> {
    ctx: InstallContext<'a>,
    graph: ProjectGraph,
    plan: InstallPlan,
    report: ReconcileReport,
    last: Option<Step>,
}

impl<'a> Reconciler<'a> {
    /// Open or create the project and compute the plan.
    pub fn prepare(mut ctx: InstallContext<'a>) -> Result<Self> {
        let (graph, state) = prepare_project(&mut ctx)?;
        let plan = InstallPlan::compute(state, &*ctx.sandbox, &*ctx.specs);
        tracing::debug!(
            "plan: remove {:?}, install {:?}, {} aggregates",
            plan.packages_to_remove,
            plan.packages_to_install,
            plan.targets_to_install.len()
        );

        Ok(Reconciler {
            ctx,
            graph,
            plan,
            report: ReconcileReport::new(state),
            last: None,
        })
    }

    pub fn state(&self) -> ProjectState {
        self.report.project
    }

    pub fn plan(&self) -> &InstallPlan {
        &self.plan
    }

    pub fn graph(&self) -> &ProjectGraph {
        &self.graph
    }

    pub fn specs(&self) -> &TargetSet {
        &*self.ctx.specs
    }

    pub fn report(&self) -> &ReconcileReport {
        &self.report
    }

    /// Run a single step. Steps cannot be repeated or run out of order.
    pub fn run_step(&mut self, step: Step) -> Result<()> {
        if let Some(last) = self.last {
            if step <= last {
                bail!("step `{}` cannot run after `{}`", step, last);
            }
        }
        tracing::debug!("step {}", step);

        match step {
            Step::ConfigureBuild => {
                configure_project(
                    &mut self.graph,
                    &*self.ctx.specs,
                    &self.ctx.settings.configurations,
                );
            }
            Step::RemovePackages => {
                for name in &self.plan.packages_to_remove {
                    let change = remove_package(&mut self.graph, self.ctx.specs, name)?;
                    self.report.targets_removed.extend(change.targets);
                    self.report.packages_removed.push(name.clone());
                }
            }
            Step::InstallPackages => {
                for name in &self.plan.packages_to_install {
                    let change = install_package(&mut self.ctx, &mut self.graph, name)?;
                    self.report.targets_created.extend(change.targets);
                    self.report.support_files += change.support_files;
                    self.report.packages_installed.push(name.clone());
                }
            }
            Step::InstallAggregates => {
                let created =
                    install_aggregates(&mut self.ctx, &mut self.graph, &self.plan.targets_to_install)?;
                self.report.targets_created.extend(created.iter().cloned());
                self.report.aggregates_installed = created;
            }
            Step::GenerateSupportFiles => {
                self.report.support_files +=
                    generate_aggregate_support_files(&mut self.ctx, &self.graph)?;
            }
            Step::WireDependencies => {
                self.report.edges_added += wire_dependencies(&mut self.graph, &*self.ctx.specs)?;
            }
            Step::LinkProducts => {
                self.report.links_added += link_products(&mut self.graph, &*self.ctx.specs)?;
            }
        }

        self.last = Some(step);
        Ok(())
    }

    /// Run every remaining step.
    pub fn run(mut self) -> Result<(ProjectGraph, ReconcileReport)> {
        for step in Step::PIPELINE {
            if self.last.is_some_and(|last| step <= last) {
                continue;
            }
            self.run_step(step)?;
        }
        tracing::info!("Reconciled project: {}", self.report.summary());
        Ok(self.finish())
    }

    /// Write the project file. Only complete runs should be persisted.
    pub fn persist(&self) -> Result<()> {
        if self.last != Some(Step::LinkProducts) {
            bail!("cannot persist an incomplete run");
        }
        save_project(&self.graph, &self.ctx.settings.project_path)
    }

    pub fn finish(self) -> (ProjectGraph, ReconcileReport) {
        (self.graph, self.report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sandbox::SandboxState;
    use crate::installer::ReconcileError;
    use crate::project::{load_project, ConfigurationKind};
    use crate::test_support::{app_targets, ios, InstallFixture};

    #[test]
    fn test_pipeline_order() {
        let mut sorted = Step::PIPELINE.to_vec();
        sorted.sort();
        assert_eq!(sorted, Step::PIPELINE.to_vec());
    }

    #[test]
    fn test_fresh_install_wires_and_links() {
        let mut fixture = InstallFixture::new(app_targets(&["B"]));
        let (graph, report) = fixture.reconcile().unwrap();

        assert_eq!(report.project, ProjectState::Fresh);
        assert_eq!(report.packages_installed, vec!["A", "B"]);
        assert_eq!(report.aggregates_installed, vec!["Pods-App"]);
        assert_eq!(report.edges_added, 3);
        assert_eq!(report.links_added, 2);
        assert_eq!(report.support_files, 3);

        let a = graph.find_target("Pods-App-A").unwrap();
        let b = graph.find_target("Pods-App-B").unwrap();
        let app = graph.find_target("Pods-App").unwrap();
        assert!(graph.has_dependency(a, b));
        assert!(graph.has_dependency(app, a));
        assert!(graph.has_dependency(app, b));

        let b_product = graph.target(b).unwrap().product.clone();
        assert!(graph.target(app).unwrap().link_phase.contains(&b_product));
        for configuration in graph.configurations() {
            assert_eq!(configuration.get("IPHONEOS_DEPLOYMENT_TARGET"), Some("8.0"));
            assert_eq!(configuration.get("STRIP_INSTALLED_PRODUCT"), Some("NO"));
        }
    }

    #[test]
    fn test_steps_one_at_a_time() {
        let mut fixture = InstallFixture::new(app_targets(&["B"]));
        let mut reconciler = Reconciler::prepare(fixture.context()).unwrap();
        assert_eq!(reconciler.state(), ProjectState::Fresh);
        assert_eq!(reconciler.plan().packages_to_install, vec!["A", "B"]);

        reconciler.run_step(Step::ConfigureBuild).unwrap();
        reconciler.run_step(Step::RemovePackages).unwrap();
        reconciler.run_step(Step::InstallPackages).unwrap();
        assert_eq!(reconciler.graph().target_count(), 2);
        assert!(reconciler
            .specs()
            .pods()
            .all(|(_, pod)| pod.target().is_some()));

        reconciler.run_step(Step::InstallAggregates).unwrap();
        assert_eq!(reconciler.graph().target_count(), 3);
        assert_eq!(reconciler.graph().edge_count(), 0);

        let err = reconciler.run_step(Step::ConfigureBuild).unwrap_err();
        assert!(err.to_string().contains("cannot run after"));
        assert!(reconciler.persist().is_err());

        let (graph, report) = reconciler.run().unwrap();
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(report.links_added, 2);
    }

    #[test]
    fn test_rerun_is_noop() {
        let mut fixture = InstallFixture::new(app_targets(&["B"]));
        let (first, _) = fixture.reconcile_and_save().unwrap();
        let saved = std::fs::read_to_string(&fixture.settings.project_path).unwrap();

        fixture.next_run(app_targets(&["B"]), fixture.sandbox.clone());
        let (second, report) = fixture.reconcile_and_save().unwrap();

        assert_eq!(report.project, ProjectState::Reopened);
        assert!(report.is_noop(), "{:?}", report);
        assert!(report.packages_installed.is_empty());
        assert_eq!(first.target_count(), second.target_count());
        assert_eq!(first.edge_count(), second.edge_count());
        assert_eq!(
            std::fs::read_to_string(&fixture.settings.project_path).unwrap(),
            saved
        );
    }

    #[test]
    fn test_changed_package_is_rebuilt() {
        let mut fixture = InstallFixture::new(app_targets(&["B"]));
        let (before, _) = fixture.reconcile_and_save().unwrap();
        let old_settings = before
            .target(before.find_target("Pods-App-B").unwrap())
            .unwrap()
            .settings
            .clone();

        let sandbox = fixture.sandbox.clone().with_changed(["B"]);
        fixture.next_run(app_targets(&["B"]), sandbox);
        let (graph, report) = fixture.reconcile().unwrap();

        assert_eq!(report.packages_removed, vec!["B"]);
        assert_eq!(report.packages_installed, vec!["B"]);
        assert_eq!(report.targets_removed, vec!["Pods-App-B"]);
        assert_eq!(report.targets_created, vec!["Pods-App-B"]);
        // Edges into B were dropped with the old target and wired again
        assert_eq!(report.edges_added, 2);

        let b = graph.find_target("Pods-App-B").unwrap();
        assert_eq!(graph.target(b).unwrap().settings, old_settings);
        let spec = fixture.specs.find_by_label("Pods-App-B").unwrap();
        assert_eq!(fixture.specs.get(spec).target(), Some(b));
        assert!(graph.group("B").is_some());
        assert!(graph.has_dependency(graph.find_target("Pods-App-A").unwrap(), b));
    }

    #[test]
    fn test_deleted_package_is_removed() {
        let mut fixture = InstallFixture::new(app_targets(&[]));
        let mut with_d = app_targets(&[]);
        with_d
            .add_pod(crate::core::spec::PodSpec::new("Pods-Tool-D", "D", ios("8.0")))
            .unwrap();
        fixture.next_run(with_d, fixture.sandbox.clone());
        fixture.reconcile_and_save().unwrap();
        assert!(load_project(&fixture.settings.project_path)
            .unwrap()
            .group("D")
            .is_some());

        let sandbox = fixture.sandbox.clone().with_deleted(["D"]);
        fixture.next_run(app_targets(&[]), sandbox);
        let (graph, report) = fixture.reconcile().unwrap();

        assert_eq!(report.packages_removed, vec!["D"]);
        assert!(report.packages_installed.is_empty());
        assert_eq!(report.targets_removed, vec!["Pods-Tool-D"]);
        assert!(graph.group("D").is_none());
        assert!(graph.find_target("Pods-Tool-D").is_none());
        assert!(graph
            .targets()
            .iter()
            .all(|(_, target)| target.package.as_deref() != Some("D")));
    }

    #[test]
    fn test_unresolved_dependency_halts_run() {
        let mut fixture = InstallFixture::new(app_targets(&["C"]));
        let err = fixture.reconcile().unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ReconcileError>(),
            Some(ReconcileError::UnresolvedDependency { dependency, .. }) if dependency == "C"
        ));
        assert!(!fixture.settings.project_path.exists());
    }

    #[test]
    fn test_deployment_target_minimum_across_aggregates() {
        let mut specs = TargetSet::new();
        for (label, dt) in [("Pods-X", "9.0"), ("Pods-Y", "8.0"), ("Pods-Z", "10.0")] {
            specs
                .add_aggregate(
                    crate::core::spec::AggregateSpec::new(label, ios(dt))
                        .with_dependencies(vec!["A".to_string()]),
                )
                .unwrap();
        }
        let mut fixture = InstallFixture::new(specs);
        let (graph, _) = fixture.reconcile().unwrap();

        for configuration in graph.configurations() {
            assert_eq!(configuration.get("IPHONEOS_DEPLOYMENT_TARGET"), Some("8.0"));
            assert_eq!(configuration.get("MACOSX_DEPLOYMENT_TARGET"), None);
        }
    }

    #[test]
    fn test_user_configurations_reach_project_and_targets() {
        let mut fixture = InstallFixture::new(app_targets(&["B"]))
            .with_configurations(&[("Beta", ConfigurationKind::Release)]);
        let (graph, _) = fixture.reconcile().unwrap();

        let beta = graph
            .configurations()
            .iter()
            .find(|c| c.name == "Beta")
            .unwrap();
        assert_eq!(beta.kind, ConfigurationKind::Release);
        assert_eq!(beta.get("STRIP_INSTALLED_PRODUCT"), Some("NO"));
        for (_, target) in graph.targets() {
            assert!(target.configuration("Beta").is_some(), "{}", target.label);
        }
    }

    #[test]
    fn test_sandbox_records_project_path() {
        let mut fixture = InstallFixture::new(app_targets(&[]));
        fixture.reconcile().unwrap();
        let sandbox: &SandboxState = &fixture.sandbox;
        assert_eq!(
            sandbox.project_path(),
            Some(fixture.settings.project_path.as_path())
        );
    }
}
