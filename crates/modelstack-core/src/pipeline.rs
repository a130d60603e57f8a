use crate::config::{Config, ConvergeConfig};
use crate::converge::Converger;
use crate::error::Result;
use crate::params::ParameterStore;
use crate::paths;
use crate::propagate::{propagate, propagate_all};
use crate::provider::StackProvider;
use crate::types::StackDescriptor;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Stage configuration
// ---------------------------------------------------------------------------

/// How a completed stage's outputs flow into the parameter store.
#[derive(Debug, Clone)]
pub enum StageExports {
    /// Only the listed outputs, renamed output key -> parameter key.
    Mapped(BTreeMap<String, String>),
    /// Every output under its own key.
    All,
}

/// External parameters that let a stage be skipped entirely, for callers who
/// bring pre-existing infrastructure (e.g. an existing network).
#[derive(Debug, Clone)]
pub struct StageBypass {
    /// The stage is skipped when this key is present in the externally
    /// supplied parameters.
    pub trigger_key: String,
    /// (external key, parameter key) pairs persisted in place of converging.
    pub imports: Vec<(String, String)>,
}

/// One deployable unit of the pipeline. Stack names, template files,
/// parameter bindings, and output mappings are data, so variants of the
/// pipeline are configuration rather than code.
#[derive(Debug, Clone)]
pub struct StageSpec {
    pub id: String,
    pub stack_name: String,
    pub template_file: String,
    /// (template parameter key, store key) pairs resolved against the
    /// parameter store when the stage starts.
    pub bindings: Vec<(String, String)>,
    pub exports: StageExports,
    pub bypass: Option<StageBypass>,
}

#[derive(Debug, Clone)]
pub struct PipelineSpec {
    pub stages: Vec<StageSpec>,
}

impl PipelineSpec {
    /// The standard two-stage serving pipeline: network, then cluster.
    pub fn standard(stack_prefix: &str) -> Self {
        let network_exports: BTreeMap<String, String> = [
            ("VpcId".to_string(), "VpcId".to_string()),
            ("SubnetIds".to_string(), "SubnetIds".to_string()),
        ]
        .into();

        Self {
            stages: vec![
                StageSpec {
                    id: "network".to_string(),
                    stack_name: format!("{stack_prefix}-network"),
                    template_file: "network.yaml".to_string(),
                    bindings: Vec::new(),
                    exports: StageExports::Mapped(network_exports),
                    bypass: Some(StageBypass {
                        trigger_key: "vpc_id".to_string(),
                        imports: vec![
                            ("vpc_id".to_string(), "VpcId".to_string()),
                            ("subnet_ids".to_string(), "SubnetIds".to_string()),
                        ],
                    }),
                },
                StageSpec {
                    id: "cluster".to_string(),
                    stack_name: format!("{stack_prefix}-cluster"),
                    template_file: "cluster.yaml".to_string(),
                    bindings: vec![
                        ("VpcId".to_string(), "VpcId".to_string()),
                        ("SubnetIds".to_string(), "SubnetIds".to_string()),
                    ],
                    exports: StageExports::All,
                    bypass: None,
                },
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Sequences stage convergence, wiring each stage's exports into the next
/// stage's bindings through the parameter store. Strictly serialized; a
/// failed stage aborts the run and later stages are never attempted. Remote
/// stacks are left as the provider reports them — rollback is the provider's
/// concern.
pub struct Pipeline<'a> {
    provider: &'a dyn StackProvider,
    converge: ConvergeConfig,
    template_root: PathBuf,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        provider: &'a dyn StackProvider,
        converge: ConvergeConfig,
        template_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            provider,
            converge,
            template_root: template_root.into(),
        }
    }

    pub fn from_config(provider: &'a dyn StackProvider, config: &Config, root: &Path) -> Self {
        Self::new(
            provider,
            config.converge.clone(),
            paths::templates_dir(root),
        )
    }

    /// Run every stage in order. The store is persisted after each stage so
    /// an interrupted run resumes from its last checkpoint.
    pub fn run(
        &self,
        spec: &PipelineSpec,
        store: &mut ParameterStore,
        external: &BTreeMap<String, String>,
    ) -> Result<()> {
        for stage in &spec.stages {
            self.run_stage(stage, store, external)?;
            store.save()?;
        }
        Ok(())
    }

    fn run_stage(
        &self,
        stage: &StageSpec,
        store: &mut ParameterStore,
        external: &BTreeMap<String, String>,
    ) -> Result<()> {
        if let Some(bypass) = &stage.bypass {
            if external.contains_key(&bypass.trigger_key) {
                info!(stage = %stage.id, "externally supplied parameters present, skipping stage");
                let imports: Vec<(String, String)> = bypass
                    .imports
                    .iter()
                    .filter_map(|(ext_key, param_key)| {
                        external.get(ext_key).map(|v| (param_key.clone(), v.clone()))
                    })
                    .collect();
                store.merge(imports);
                return Ok(());
            }
        }

        paths::validate_stack_name(&stage.stack_name)?;

        let mut parameters = Vec::new();
        for (param_key, store_key) in &stage.bindings {
            match store.get(store_key) {
                Some(value) => parameters.push((param_key.clone(), value.to_string())),
                None => debug!(stage = %stage.id, key = %store_key, "no stored value for binding"),
            }
        }

        let descriptor = StackDescriptor::new(
            stage.stack_name.clone(),
            self.template_root.join(&stage.template_file),
        )
        .with_parameters(parameters);

        info!(stage = %stage.id, stack = %descriptor.name, "converging stack");
        let converger = Converger::new(self.provider, &self.converge);
        let outputs = converger.ensure_converged(&descriptor)?;

        let updates = match &stage.exports {
            StageExports::Mapped(mapping) => propagate(&outputs, mapping),
            StageExports::All => propagate_all(&outputs),
        };
        debug!(stage = %stage.id, count = updates.len(), "propagating stage outputs");
        store.merge(updates);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
