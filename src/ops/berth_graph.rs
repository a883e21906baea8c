//! Implementation of `berth graph`.

use anyhow::{bail, Result};

use crate::core::Workspace;
use crate::project::{load_project, ProjectGraph, TargetKind};

/// Load the persisted project of a workspace.
pub fn load_graph(ws: &Workspace) -> Result<ProjectGraph> {
    let path = ws.project_path();
    if !path.exists() {
        bail!(
            "no project at {}\nhelp: Run `berth install` to create it",
            path.display()
        );
    }
    load_project(&path)
}

/// Render every target with its dependencies and link phase.
pub fn format_graph(graph: &ProjectGraph) -> String {
    let mut out = String::new();

    for (id, target) in graph.targets() {
        let kind = match (&target.kind, &target.package) {
            (TargetKind::Pod, Some(package)) => format!("pod {}", package),
            (kind, _) => kind.to_string(),
        };
        out.push_str(&format!("{} [{}, {}]\n", target.label, kind, target.platform));

        let mut lines: Vec<String> = graph
            .dependencies(id)
            .into_iter()
            .filter_map(|dep| graph.target(dep))
            .map(|dep| format!("depends on {}", dep.label))
            .collect();
        lines.sort();
        lines.extend(target.link_phase.iter().map(|product| format!("links {}", product)));

        let count = lines.len();
        for (i, line) in lines.into_iter().enumerate() {
            let branch = if i + 1 == count { "└── " } else { "├── " };
            out.push_str(branch);
            out.push_str(&line);
            out.push('\n');
        }
    }

    out
}
