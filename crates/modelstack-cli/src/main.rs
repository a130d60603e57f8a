mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{models::ModelsSubcommand, params::ParamsSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "modelstack",
    about = "Deploy model serving infrastructure — network, cluster, and model stacks",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .modelstack/ or .git/)
    #[arg(long, global = true, env = "MODELSTACK_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize modelstack in the current project
    Init,

    /// Converge the serving pipeline (network stack, then cluster stack)
    Deploy {
        /// Provider region (default: from config)
        #[arg(long)]
        region: Option<String>,

        /// Provider API endpoint (default: from config)
        #[arg(long, env = "MODELSTACK_ENDPOINT")]
        endpoint: Option<String>,

        /// Model to deploy, validated against the catalog
        #[arg(long)]
        model_id: Option<String>,

        /// Tag distinguishing multiple deployments of the same model
        #[arg(long)]
        model_tag: Option<String>,

        /// API framework type (e.g. openai-compatible, custom)
        #[arg(long)]
        framework_type: Option<String>,

        /// Service type (e.g. cluster, endpoint, local)
        #[arg(long)]
        service_type: Option<String>,

        /// Serving backend type (e.g. vllm, custom)
        #[arg(long)]
        backend_type: Option<String>,

        /// Object-storage location of the model artifact
        #[arg(long)]
        model_artifact: Option<String>,

        /// Instance type for the serving workers
        #[arg(long)]
        instance_type: Option<String>,

        /// JSON object of extra parameters; supplying vpc_id/subnet_ids
        /// here bypasses network-stack convergence
        #[arg(long)]
        extra_params: Option<String>,
    },

    /// Show the remote status and outputs of a pipeline stack
    Status {
        /// Stack name (default: every stack in the standard pipeline)
        stack: Option<String>,

        /// Provider API endpoint (default: from config)
        #[arg(long, env = "MODELSTACK_ENDPOINT")]
        endpoint: Option<String>,
    },

    /// Inspect and edit the deployment parameter store
    Params {
        #[command(subcommand)]
        subcommand: ParamsSubcommand,
    },

    /// Browse the builtin model recipe catalog
    Models {
        #[command(subcommand)]
        subcommand: ModelsSubcommand,
    },

    /// Check whether a newer release is available
    Update,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Deploy { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root_path = cli.root.as_deref();
    let root = root::resolve_root(root_path);

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Deploy {
            region,
            endpoint,
            model_id,
            model_tag,
            framework_type,
            service_type,
            backend_type,
            model_artifact,
            instance_type,
            extra_params,
        } => cmd::deploy::run(
            &root,
            cmd::deploy::DeployArgs {
                region,
                endpoint,
                model_id,
                model_tag,
                framework_type,
                service_type,
                backend_type,
                model_artifact,
                instance_type,
                extra_params,
            },
        ),
        Commands::Status { stack, endpoint } => {
            cmd::status::run(&root, stack.as_deref(), endpoint.as_deref(), cli.json)
        }
        Commands::Params { subcommand } => cmd::params::run(&root, subcommand, cli.json),
        Commands::Models { subcommand } => cmd::models::run(subcommand, cli.json),
        Commands::Update => cmd::update::run(cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
