//! Project preparation: open the existing project or start a fresh one.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::core::spec::TargetSet;
use crate::installer::context::InstallContext;
use crate::project::{load_project, ProjectGraph};

/// How the project graph for this run came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectState {
    /// No usable project existed; everything is installed from scratch
    Fresh,
    /// The persisted project was decoded and its targets matched to specs
    Reopened,
}

impl ProjectState {
    pub fn is_fresh(self) -> bool {
        self == ProjectState::Fresh
    }
}

/// Whether an existing project must be discarded and rebuilt.
///
/// Reserved hook: no compatibility rule is defined yet, so existing projects
/// are always reopened. Format-version mismatches are caught by the decoder.
pub fn is_incompatible(_project_path: &Path) -> bool {
    false
}

/// Open or create the project graph for this run.
///
/// On reopen every existing target whose label matches a spec is bound to
/// that spec. The manifest path is recorded on the graph and the project
/// path on the sandbox in both cases.
pub fn prepare_project(ctx: &mut InstallContext<'_>) -> Result<(ProjectGraph, ProjectState)> {
    let project_path = &ctx.settings.project_path;

    let (mut graph, state) = if !project_path.exists() || is_incompatible(project_path) {
        tracing::info!("Creating project {}", project_path.display());
        (ProjectGraph::new(), ProjectState::Fresh)
    } else {
        tracing::info!("Opening project {}", project_path.display());
        let graph = load_project(project_path)?;
        let matched = match_targets(&graph, ctx.specs)?;
        tracing::debug!(
            "matched {} of {} existing targets to specs",
            matched,
            graph.target_count()
        );
        (graph, ProjectState::Reopened)
    };

    graph.set_manifest_path(&ctx.settings.manifest_path);
    ctx.sandbox.set_project_path(project_path);
    Ok((graph, state))
}

/// Bind every spec whose label names an existing target. Returns the number
/// of bindings made; unmatched specs stay unbound.
pub fn match_targets(graph: &ProjectGraph, specs: &mut TargetSet) -> Result<usize> {
    let mut matched = 0;
    for (target_id, target) in graph.targets() {
        match specs.find_by_label(&target.label) {
            Some(spec) => {
                specs.bind(spec, target_id)?;
                matched += 1;
            }
            None => tracing::debug!("target `{}` has no spec", target.label),
        }
    }
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::spec::PodSpec;
    use crate::project::{save_project, BuildTarget, TargetKind};
    use crate::test_support::{ios, InstallFixture};

    #[test]
    fn test_fresh_project() {
        let mut fixture = InstallFixture::new(TargetSet::new());
        let mut ctx = fixture.context();
        let (graph, state) = prepare_project(&mut ctx).unwrap();

        assert_eq!(state, ProjectState::Fresh);
        let names: Vec<_> = graph.configurations().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Debug", "Release"]);
        assert_eq!(graph.manifest_path(), Some(fixture.settings.manifest_path.as_path()));
        assert_eq!(
            fixture.sandbox.project_path(),
            Some(fixture.settings.project_path.as_path())
        );
    }

    #[test]
    fn test_reopen_binds_by_label() {
        let mut specs = TargetSet::new();
        let a = specs.add_pod(PodSpec::new("Pods-A", "A", ios("8.0"))).unwrap();
        let b = specs.add_pod(PodSpec::new("Pods-B", "B", ios("8.0"))).unwrap();
        let mut fixture = InstallFixture::new(specs);

        let mut existing = ProjectGraph::new();
        existing
            .add_target(BuildTarget::new("Pods-A", TargetKind::Pod, ios("8.0")).with_package("A"))
            .unwrap();
        existing
            .add_target(BuildTarget::new("Pods-Gone", TargetKind::Pod, ios("8.0")))
            .unwrap();
        save_project(&existing, &fixture.settings.project_path).unwrap();

        let mut ctx = fixture.context();
        let (graph, state) = prepare_project(&mut ctx).unwrap();

        assert_eq!(state, ProjectState::Reopened);
        assert_eq!(fixture.specs.get(a).target(), graph.find_target("Pods-A"));
        assert!(fixture.specs.get(a).is_bound());
        assert!(!fixture.specs.get(b).is_bound());
        assert!(graph.find_target("Pods-Gone").is_some());
    }

    #[test]
    fn test_is_incompatible_is_reserved() {
        assert!(!is_incompatible(Path::new("Pods/Pods.project.toml")));
    }
}
