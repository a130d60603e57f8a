use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use modelstack_core::catalog;

#[derive(Subcommand)]
pub enum ModelsSubcommand {
    /// List all model recipes in the builtin catalog
    List,
    /// Show one model recipe in detail
    Show { model_id: String },
}

pub fn run(subcmd: ModelsSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ModelsSubcommand::List => list(json),
        ModelsSubcommand::Show { model_id } => show(&model_id, json),
    }
}

fn list(json: bool) -> anyhow::Result<()> {
    let recipes = catalog::recipes();
    if json {
        print_json(&recipes)?;
    } else {
        let rows: Vec<Vec<String>> = recipes
            .iter()
            .map(|r| {
                vec![
                    r.model_id.to_string(),
                    r.engines.join(","),
                    r.services.join(","),
                    r.description.to_string(),
                ]
            })
            .collect();
        print_table(&["MODEL", "ENGINES", "SERVICES", "DESCRIPTION"], rows);
    }
    Ok(())
}

fn show(model_id: &str, json: bool) -> anyhow::Result<()> {
    let recipe = catalog::find(model_id).context("unknown model")?;
    if json {
        print_json(recipe)?;
    } else {
        println!("Model:          {}", recipe.model_id);
        println!("Description:    {}", recipe.description);
        println!("Engines:        {}", recipe.engines.join(", "));
        println!("Instance types: {}", recipe.instance_types.join(", "));
        println!("Services:       {}", recipe.services.join(", "));
        println!("Frameworks:     {}", recipe.frameworks.join(", "));
        println!("Needs artifact: {}", recipe.needs_artifact);
    }
    Ok(())
}
