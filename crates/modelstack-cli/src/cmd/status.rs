use crate::output::print_json;
use anyhow::Context;
use modelstack_core::{
    config::Config,
    error::DeployError,
    pipeline::PipelineSpec,
    provider::{HttpStackProvider, StackProvider},
};
use std::path::Path;

#[derive(serde::Serialize)]
struct StackStatusReport {
    stack: String,
    status: Option<String>,
    outputs: Vec<modelstack_core::types::OutputRecord>,
}

/// `modelstack status` — describe one stack, or every stack in the standard
/// pipeline when no name is given. An absent stack is reported, not an error.
pub fn run(
    root: &Path,
    stack: Option<&str>,
    endpoint: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let endpoint = endpoint
        .map(str::to_string)
        .or_else(|| config.endpoint.clone())
        .context("no provider endpoint configured: set 'endpoint' in .modelstack/config.yaml or pass --endpoint")?;
    let provider = HttpStackProvider::new(&endpoint, &config.region)
        .context("failed to build provider client")?;

    let names: Vec<String> = match stack {
        Some(name) => vec![name.to_string()],
        None => PipelineSpec::standard(&config.stack_prefix)
            .stages
            .iter()
            .map(|s| s.stack_name.clone())
            .collect(),
    };

    let mut reports = Vec::new();
    for name in names {
        let report = match provider.describe(&name) {
            Ok(view) => StackStatusReport {
                stack: name,
                status: Some(view.status.as_str().to_string()),
                outputs: view.outputs,
            },
            Err(DeployError::StackNotFound(_)) => StackStatusReport {
                stack: name,
                status: None,
                outputs: Vec::new(),
            },
            Err(e) => return Err(e).context("describe failed"),
        };
        reports.push(report);
    }

    if json {
        print_json(&reports)?;
    } else {
        for report in &reports {
            match &report.status {
                Some(status) => println!("{:<28} {}", report.stack, status),
                None => println!("{:<28} (not deployed)", report.stack),
            }
            for output in &report.outputs {
                println!("    {} = {}", output.key, output.value);
            }
        }
    }
    Ok(())
}
