//! Construction of one build target from one target spec.

use anyhow::Result;

use crate::core::platform::LEGACY_ARCHS;
use crate::core::spec::{SpecId, TargetSet, TargetSpec};
use crate::installer::collaborators::TargetExtension;
use crate::project::{BuildTarget, ConfigurationKind, ProjectGraph, TargetId, TargetKind};

pub const PRODUCT_NAME: &str = "PRODUCT_NAME";
pub const SDKROOT: &str = "SDKROOT";
pub const ARCHS: &str = "ARCHS";

/// Builds targets for unbound specs and binds them.
pub struct TargetBuilder<'a> {
    configurations: &'a [(String, ConfigurationKind)],
    extension: &'a dyn TargetExtension,
}

impl<'a> TargetBuilder<'a> {
    pub fn new(
        configurations: &'a [(String, ConfigurationKind)],
        extension: &'a dyn TargetExtension,
    ) -> Self {
        TargetBuilder {
            configurations,
            extension,
        }
    }

    /// Create the target for `id`, run the kind-specific extension and bind
    /// the spec to the new target.
    ///
    /// Fails with `AlreadyBound` if the spec already has a target and with
    /// `DuplicateLabel` if the graph already holds its label.
    pub fn build(
        &self,
        graph: &mut ProjectGraph,
        specs: &mut TargetSet,
        id: SpecId,
    ) -> Result<TargetId> {
        let target = self.base_target(specs.get(id));
        let label = target.label.clone();

        let target_id = graph.add_target(target)?;
        specs.bind(id, target_id)?;
        self.extension.extend(graph, target_id, specs.get(id), specs)?;

        tracing::debug!("created target `{}`", label);
        Ok(target_id)
    }

    fn base_target(&self, spec: &TargetSpec) -> BuildTarget {
        let platform = spec.platform().clone();
        let mut target = match spec {
            TargetSpec::Aggregate(aggregate) => {
                BuildTarget::new(&aggregate.label, TargetKind::Aggregate, platform)
            }
            TargetSpec::Pod(pod) => {
                BuildTarget::new(&pod.label, TargetKind::Pod, platform).with_package(&pod.package)
            }
        };

        let family = target.platform.family;
        let deployment_target = target.platform.deployment_target.as_str().to_string();
        target
            .settings
            .insert(PRODUCT_NAME.to_string(), target.label.clone());
        target
            .settings
            .insert(SDKROOT.to_string(), family.sdk_root().to_string());
        target
            .settings
            .insert(family.deployment_target_key().to_string(), deployment_target);

        // Only the built-in variants carry the architecture pin
        if target.platform.requires_legacy_archs() {
            for configuration in &mut target.configurations {
                configuration.set(ARCHS, LEGACY_ARCHS);
            }
        }

        for (name, kind) in self.configurations {
            target.add_configuration(name, *kind);
        }

        target
    }
}
