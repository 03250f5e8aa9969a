use anyhow::{Result, bail};
use ctrmeta::cli::{self, Args, Commands, ConfigDiscovery};
use ctrmeta::context::Context;
use ctrmeta::metadata::{MetadataStore, StoreConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the JSON output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ctrmeta=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let Some(command) = args.command.clone() else {
        bail!("No command specified. Use 'ctrmeta --help' to see available commands.");
    };

    if let Commands::ShowConfig = command {
        ConfigDiscovery::show_discovery_info(args.config.as_deref());
        return Ok(());
    }

    let config = load_config(&args)?;
    let store = MetadataStore::open(&config).await?;
    if !store.is_persistent() {
        warn!("No store root configured, changes will not be kept");
    }

    let ctx = build_context(&args, &config);
    let cancel = ctx.cancellation_token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling operation");
            cancel.cancel();
        }
    });

    let output = cli::execute(&store, &ctx, command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn load_config(args: &Args) -> Result<StoreConfig> {
    let mut config = ConfigDiscovery::discover_config(args.config.as_deref())?;
    if let Some(root) = &args.root {
        config.root = Some(root.clone());
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.operation_timeout_ms = timeout_ms;
    }
    Ok(config)
}

fn build_context(args: &Args, config: &StoreConfig) -> Context {
    let namespace = args
        .namespace
        .clone()
        .unwrap_or_else(|| config.default_namespace.clone());

    let ctx = Context::new(namespace);
    match config.operation_timeout() {
        Some(timeout) => ctx.with_timeout(timeout),
        None => ctx,
    }
}
