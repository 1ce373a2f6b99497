mod actions;
mod config;
mod server;
mod utils;

use async_std::channel::{self, Sender};
use async_std::task;
use clap::Parser;
use config::DaemonConfig;
use futures::StreamExt;
use server::command_registry::RegistryHandle;
use server::commands::init_commands;
use server::server::DaemonServer;
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
use signal_hook_async_std::Signals;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use utils::error::Result;

/// remotecmd daemon - executes commands sent by remotecmd clients
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    host: Option<String>,

    /// TCP port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Log file path
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    /// Read the configuration file, if any, and apply command line overrides
    fn load_config(&self) -> Result<DaemonConfig> {
        let mut config = match &self.config {
            Some(path) => DaemonConfig::load(path)?,
            None => DaemonConfig::default(),
        };

        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(log_file) = &self.log_file {
            config.log.path = log_file.clone();
        }

        Ok(config)
    }
}

#[async_std::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = args.load_config()?;

    // Held until exit so buffered log lines are flushed
    let _log_guard = utils::tracing::setup_tracing(&config.log)?;

    let registry = init_commands(&config)?;
    info!("Loaded {} commands", registry.len());
    debug!("Available commands:\n{}", registry.list_commands());
    let registry = RegistryHandle::new(registry);

    let server = match DaemonServer::bind(&config, registry.clone()).await {
        Ok(server) => server,
        Err(e) => {
            error!("Received error on server socket: {}", e);
            return Err(e.into());
        }
    };
    info!("Server is listening on {}", server.local_addr()?);

    let (shutdown_tx, shutdown_rx) = channel::bounded(1);
    let signals = Signals::new([SIGINT, SIGTERM, SIGHUP])?;
    let signals_handle = signals.handle();
    let signal_task = task::spawn(handle_signals(signals, shutdown_tx, registry, args));

    server.run(shutdown_rx).await?;

    signals_handle.close();
    signal_task.await;
    info!("Server socket closed.");

    Ok(())
}

/// Handle process signals
///
/// SIGINT and SIGTERM stop the accept loop; SIGHUP reloads the configuration
/// and publishes a freshly built command registry.
async fn handle_signals(
    mut signals: Signals,
    shutdown_tx: Sender<()>,
    registry: RegistryHandle,
    args: Args,
) {
    while let Some(signal) = signals.next().await {
        match signal {
            SIGHUP => reload_commands(&args, &registry),
            SIGINT | SIGTERM => {
                info!("Server was terminated by signal {}", signal);
                let _ = shutdown_tx.send(()).await;
                break;
            }
            _ => {}
        }
    }
}

fn reload_commands(args: &Args, registry: &RegistryHandle) {
    info!("Reloading configuration");
    match args.load_config().and_then(|config| init_commands(&config)) {
        Ok(commands) => {
            debug!("Reloaded commands:\n{}", commands.list_commands());
            registry.publish(commands)
        }
        Err(e) => warn!("Keeping current commands, reload failed: {}", e),
    }
}
