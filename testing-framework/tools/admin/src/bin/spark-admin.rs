use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use spark_admin::{AdminState, admin_app};
use spark_core::{ChainClient as _, SparkConfig};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(about = "Spark admin service", version)]
struct Args {
    /// YAML config file; falls back to `SPARK_CONFIG`.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    port: Option<u16>,
    #[arg(long)]
    node_url: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Args::parse();

    let config_path = cli.config.or_else(spark_env::spark_config_path);
    let mut config = SparkConfig::load(config_path.as_deref()).with_context(|| match &config_path {
        Some(path) => format!("failed to load spark config from {}", path.display()),
        None => "failed to load spark config from the environment".to_owned(),
    })?;
    if let Some(port) = cli.port {
        config.admin_port = port;
    }
    if let Some(node_url) = cli.node_url {
        config.node_url = node_url;
    }

    let port = config.admin_port;
    let node_url = config.node_url.clone();
    let state = AdminState::http(config).context("failed to build the chain client")?;
    let chain = state.chain().await;
    info!(
        node = %node_url,
        funder = %chain.default_address(),
        "chain client ready"
    );
    let app = admin_app(Arc::new(state));

    info!(port, "admin server running on http://0.0.0.0:{port}/admin");
    let listener = TcpListener::bind(&format!("0.0.0.0:{port}"))
        .await
        .with_context(|| format!("failed to bind admin server on 0.0.0.0:{port}"))?;

    axum::serve(listener, app)
        .await
        .context("admin server terminated unexpectedly")?;

    Ok(())
}
