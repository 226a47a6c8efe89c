// # ipwatchd - dynamic DNS daemon
//
// Thin integration layer: reads the configuration file, installs logging,
// wires the HTTP lookup, the Cloudflare provider and the file state store
// into a Poller, and runs it until SIGINT/SIGTERM or the first failed check.
//
// ## Example
//
// ```bash
// ipwatchd --config /etc/ipwatch/config.toml
// ```
//
// On first start without a config file a default one is written and the
// daemon exits with status 1; fill in the credentials and start again.

use anyhow::{Context, Result};
use clap::Parser;
use ipwatch_cloudflare::CloudflareProvider;
use ipwatch_core::{Config, FileStateStore, Poller, PollerEvent};
use ipwatch_lookup::HttpIpLookup;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Environment variable overriding `log-level` from the config file
const LOG_LEVEL_ENV: &str = "IPWATCH_LOG_LEVEL";

/// Exit codes for different termination scenarios
///
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (failed check)
#[derive(Debug, Clone, Copy)]
enum IpwatchExitCode {
    CleanShutdown = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<IpwatchExitCode> for ExitCode {
    fn from(code: IpwatchExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Parser, Debug)]
#[command(name = "ipwatchd")]
#[command(about = "Keeps a Cloudflare A record pointed at this host's public IPv4 address")]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./config.toml")]
    config: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration first (before logger init)
    let config = match Config::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", e);
            return IpwatchExitCode::ConfigError.into();
        }
    };

    let level_name = std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| config.log_level.clone());
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&level_name))
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return IpwatchExitCode::ConfigError.into();
    }

    info!("Loaded configuration from {}", args.config);

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return IpwatchExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run_daemon(config).await {
            Ok(()) => IpwatchExitCode::CleanShutdown,
            Err(e) => {
                error!("ipwatchd stopped: {:#}", e);
                if is_config_error(&e) {
                    IpwatchExitCode::ConfigError
                } else {
                    IpwatchExitCode::RuntimeError
                }
            }
        }
    });

    code.into()
}

fn parse_level(name: &str) -> Level {
    match name.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn is_config_error(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ipwatch_core::Error>()
        .is_some_and(ipwatch_core::Error::is_config)
}

/// Wire the components and run the poller
async fn run_daemon(config: Config) -> Result<()> {
    let lookup = HttpIpLookup::new(config.lookup_url.clone());
    let provider = CloudflareProvider::from_config(&config)?;
    let state_store = FileStateStore::new(&config.state_file);

    info!("IP lookup: {}", lookup.url());
    info!("State file: {}", state_store.path().display());

    let (poller, events) = Poller::new(
        Box::new(lookup),
        Box::new(provider),
        Box::new(state_store),
        config,
    )?;

    tokio::spawn(log_events(events));

    let shutdown = shutdown_signal().context("Failed to install signal handlers")?;
    poller.run_until(shutdown).await?;

    info!("Shutting down daemon");
    Ok(())
}

async fn log_events(mut events: mpsc::Receiver<PollerEvent>) {
    while let Some(event) = events.recv().await {
        debug!("Poller event: {:?}", event);
    }
}

/// Install SIGTERM/SIGINT handlers and return a future resolving on either
#[cfg(unix)]
fn shutdown_signal() -> Result<impl std::future::Future<Output = ()>> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    Ok(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received {}", name);
    })
}

/// Fallback for non-Unix platforms: CTRL-C only
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl std::future::Future<Output = ()>> {
    Ok(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to wait for CTRL-C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received CTRL-C");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("nonsense"), Level::INFO);
    }

    #[test]
    fn test_config_errors_map_to_config_exit() {
        let err = anyhow::Error::from(ipwatch_core::Error::config("value for key \"zone-id\" is empty"));
        assert!(is_config_error(&err));

        let err = anyhow::Error::from(ipwatch_core::Error::network("empty response"));
        assert!(!is_config_error(&err));
    }

    #[test]
    fn test_args_default_config_path() {
        let args = Args::parse_from(["ipwatchd"]);
        assert_eq!(args.config, "./config.toml");

        let args = Args::parse_from(["ipwatchd", "--config", "/etc/ipwatch.toml"]);
        assert_eq!(args.config, "/etc/ipwatch.toml");
    }
}
