use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use modelstack_core::{params::ParameterStore, paths};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Subcommand)]
pub enum ParamsSubcommand {
    /// Show all stored deployment parameters
    Show,
    /// Set one parameter (non-destructive merge)
    Set { key: String, value: String },
}

pub fn run(root: &Path, subcmd: ParamsSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ParamsSubcommand::Show => show(root, json),
        ParamsSubcommand::Set { key, value } => set(root, &key, &value),
    }
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let store = ParameterStore::load(paths::parameters_path(root))
        .context("failed to load parameter store")?;

    if json {
        let map: BTreeMap<&str, &str> = store.iter().collect();
        print_json(&map)?;
    } else if store.is_empty() {
        println!("No parameters stored. Run: modelstack deploy");
    } else {
        let rows: Vec<Vec<String>> = store
            .iter()
            .map(|(k, v)| vec![k.to_string(), v.to_string()])
            .collect();
        print_table(&["KEY", "VALUE"], rows);
    }
    Ok(())
}

fn set(root: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let mut store = ParameterStore::load(paths::parameters_path(root))
        .context("failed to load parameter store")?;
    store.merge([(key, value)]);
    store.save().context("failed to save parameter store")?;
    println!("{key} = {value}");
    Ok(())
}
