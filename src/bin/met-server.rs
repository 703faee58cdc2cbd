use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use log::info;

use metserver_rs::config::ConfigLoader;
use metserver_rs::logging;
use metserver_rs::sampler::Sampler;
use metserver_rs::scheduler::RefreshScheduler;
use metserver_rs::server::MetServer;
use metserver_rs::snapshot::SnapshotStore;
use tokio::signal;
use tokio::sync::watch;

#[derive(Parser)]
#[command(name = "met-server")]
#[command(about = "Weather station snapshot server")]
#[command(version = "0.1.0")]
struct Cli {
    /// Config file (otherwise metserver.toml / metserver.json in cwd)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen host override
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Listen port override
    #[arg(short, long)]
    port: Option<u16>,

    /// Verbose logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("met-server: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let loader = match &cli.config {
        Some(path) => {
            if !path.exists() {
                return Err(format!("config file not found: {}", path.display()).into());
            }
            ConfigLoader::with_paths(vec![path.clone()])
        }
        None => ConfigLoader::new(),
    };
    let mut config = loader.load()?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    logging::init(&config.logging, cli.debug)?;

    let mode = config.validate()?;
    info!("met source mode: {:?}", mode);

    let sampler = Arc::new(Sampler::from_config(&config)?);

    info!("taking initial sample");
    let initial = sampler.sample().await;
    info!("initial reading: {}", initial);
    let store = SnapshotStore::new(initial);

    let mut scheduler = RefreshScheduler::start(
        Duration::from_secs(config.sampling.interval_secs),
        sampler,
        store.clone(),
    );

    let server = MetServer::bind(
        &config.server.host,
        config.server.port,
        store,
        config.server.max_clients,
        config.server.throttle,
    )
    .await?;
    info!("listening on {}", server.local_addr()?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("interrupt received, shutting down");
            let _ = shutdown_tx.send(true);
        }
    });

    server.run(shutdown_rx).await;
    scheduler.stop().await;
    info!("server shut down");
    Ok(())
}
