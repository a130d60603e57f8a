use anyhow::{bail, Context};
use modelstack_core::{
    catalog,
    config::Config,
    params::ParameterStore,
    paths,
    pipeline::{Pipeline, PipelineSpec},
    provider::HttpStackProvider,
};
use std::collections::BTreeMap;
use std::path::Path;

pub struct DeployArgs {
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub model_id: Option<String>,
    pub model_tag: Option<String>,
    pub framework_type: Option<String>,
    pub service_type: Option<String>,
    pub backend_type: Option<String>,
    pub model_artifact: Option<String>,
    pub instance_type: Option<String>,
    pub extra_params: Option<String>,
}

/// `modelstack deploy` — converge the serving pipeline end to end.
///
/// Supplying `vpc_id` (and usually `subnet_ids`) through `--extra-params`
/// bypasses network-stack convergence and persists the given identifiers
/// directly; the cluster stack is always converged.
pub fn run(root: &Path, args: DeployArgs) -> anyhow::Result<()> {
    let mut config = Config::load(root).context("failed to load config")?;
    if let Some(region) = args.region {
        config.region = region;
    }
    let endpoint = args
        .endpoint
        .or_else(|| config.endpoint.clone())
        .context("no provider endpoint configured: set 'endpoint' in .modelstack/config.yaml or pass --endpoint")?;

    let external = parse_extra_params(args.extra_params.as_deref())?;

    let mut store = ParameterStore::load(paths::parameters_path(root))
        .context("failed to load parameter store")?;

    if let Some(model_id) = &args.model_id {
        let recipe = catalog::find(model_id)?;
        if let Some(instance_type) = &args.instance_type {
            if !recipe.supports_instance(instance_type) {
                bail!(
                    "model '{}' does not support instance type '{}' (supported: {})",
                    model_id,
                    instance_type,
                    recipe.instance_types.join(", ")
                );
            }
        }
        if let Some(service_type) = &args.service_type {
            if !recipe.supports_service(service_type) {
                bail!(
                    "model '{}' does not support service type '{}' (supported: {})",
                    model_id,
                    service_type,
                    recipe.services.join(", ")
                );
            }
        }
        if recipe.needs_artifact && args.model_artifact.is_none() {
            bail!("model '{model_id}' requires --model-artifact");
        }

        let model_params = [
            ("ModelId", Some(model_id.clone())),
            ("ModelTag", args.model_tag),
            ("FrameworkType", args.framework_type),
            ("ServiceType", args.service_type),
            ("BackendType", args.backend_type),
            ("ModelArtifact", args.model_artifact),
            ("InstanceType", args.instance_type),
        ];
        store.merge(
            model_params
                .into_iter()
                .filter_map(|(k, v)| v.map(|v| (k.to_string(), v))),
        );
    }
    store.merge([("Region", config.region.clone())]);

    let provider = HttpStackProvider::new(&endpoint, &config.region)
        .context("failed to build provider client")?;
    let pipeline = Pipeline::from_config(&provider, &config, root);
    let spec = PipelineSpec::standard(&config.stack_prefix);

    println!(
        "Deploying pipeline '{}' in {} ({} stages)",
        config.stack_prefix,
        config.region,
        spec.stages.len()
    );
    pipeline.run(&spec, &mut store, &external)?;

    println!("\nDeployment complete.");
    for key in ["VpcId", "SubnetIds", "ClusterName"] {
        if let Some(value) = store.get(key) {
            println!("  {key}: {value}");
        }
    }

    // Best effort; a failed or slow release check never fails a deploy.
    super::update::notify_quietly();
    Ok(())
}

fn parse_extra_params(raw: Option<&str>) -> anyhow::Result<BTreeMap<String, String>> {
    let Some(raw) = raw else {
        return Ok(BTreeMap::new());
    };
    let values: BTreeMap<String, serde_json::Value> =
        serde_json::from_str(raw).context("--extra-params is not a JSON object")?;
    Ok(values
        .into_iter()
        .map(|(k, v)| {
            let v = match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (k, v)
        })
        .collect())
}
