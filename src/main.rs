//! Crossgraph - trace Crossplane and KRO resource dependency graphs
//!
//! Resolves the ownership/composition tree below a claim, composite or
//! instance and prints it as a table or JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use crossgraph::config::ConfigLoader;
use crossgraph::graph::walker::{ResolveOptions, TraversalProfile};
use crossgraph::resolve::reference::ObjectReference;
use crossgraph::services::ResourceService;

/// Trace Crossplane and KRO resource dependency graphs
#[derive(Parser, Debug)]
#[command(name = "crossgraph")]
#[command(about = "Trace Crossplane and KRO resource dependency graphs", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd')]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the dependency graph below a root object
    Trace {
        /// Name of the root object
        name: String,

        /// Kind of the root object (e.g. NetworkClaim, WebApp)
        #[arg(long, short = 'k')]
        kind: String,

        /// apiVersion of the root object (e.g. example.org/v1alpha1)
        #[arg(long)]
        api_version: String,

        /// Namespace of the root object
        #[arg(long, short = 'n')]
        namespace: Option<String>,

        /// Traversal profile; inferred from the root when omitted
        #[arg(long, value_enum)]
        profile: Option<ProfileArg>,

        /// Output format
        #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,

        /// Bounded concurrency for sibling fetches
        #[arg(long)]
        fan_out: Option<usize>,

        /// Overall deadline in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Fetch a single object without walking its references
    Get {
        /// Name of the object
        name: String,

        /// Kind of the object
        #[arg(long, short = 'k')]
        kind: String,

        /// apiVersion of the object
        #[arg(long)]
        api_version: String,

        /// Namespace of the object
        #[arg(long, short = 'n')]
        namespace: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ProfileArg {
    Claim,
    Composite,
    Instance,
}

impl From<ProfileArg> for TraversalProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Claim => TraversalProfile::Claim,
            ProfileArg::Composite => TraversalProfile::Composite,
            ProfileArg::Instance => TraversalProfile::Instance,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Table,
    Json,
}

/// CLI flag, then the NAMESPACE environment variable, then the configured
/// default. "all" or "-A" disables the ambient namespace entirely.
fn ambient_namespace(
    flag: Option<String>,
    config: &crossgraph::config::Config,
) -> Option<String> {
    flag.or_else(crossgraph::kube::get_default_namespace)
        .or_else(|| Some(config.default_namespace.clone()))
        .filter(|ns| !ns.is_empty() && ns.as_str() != "all" && ns.as_str() != "-A")
}

/// Initialize logging based on debug flag
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let config = ConfigLoader::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load configuration: {}, using defaults", e);
        ConfigLoader::load_defaults()
    });

    tracing::debug!("Initializing Kubernetes client");
    let client = crossgraph::kube::create_client().await?;
    let service = ResourceService::new(client);

    match args.command {
        Command::Trace {
            name,
            kind,
            api_version,
            namespace,
            profile,
            output,
            fan_out,
            timeout,
        } => {
            let namespace = ambient_namespace(namespace, &config);
            let root = ObjectReference::new(&api_version, &kind, &name, namespace.as_deref());

            let timeout_seconds = timeout.unwrap_or(config.timeout_seconds);
            let options = ResolveOptions {
                fan_out: fan_out.unwrap_or(config.fan_out),
                deadline: (timeout_seconds > 0).then(|| {
                    tokio::time::Instant::now() + std::time::Duration::from_secs(timeout_seconds)
                }),
            };

            let graph = service
                .resolve_graph(&root, profile.map(Into::into), options)
                .await?;

            match output {
                OutputFormat::Table => print!("{}", crossgraph::render::to_table(&graph)),
                OutputFormat::Json => println!(
                    "{}",
                    crossgraph::render::to_json(&graph).context("Failed to serialize graph")?
                ),
            }
        }
        Command::Get {
            name,
            kind,
            api_version,
            namespace,
        } => {
            let namespace = ambient_namespace(namespace, &config);
            let reference = ObjectReference::new(&api_version, &kind, &name, namespace.as_deref());
            let value = service.fetch_raw(&reference).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&value).context("Failed to serialize object")?
            );
        }
    }

    Ok(())
}
