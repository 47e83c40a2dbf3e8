// # ddnsd - Cloudflare DDNS Daemon
//
// This daemon is a THIN integration layer over ddns-core. It is
// responsible for:
// 1. Parsing the command line and loading the JSON config file
// 2. Initializing logging and the runtime
// 3. Startup prechecks: connectivity, account, zone
// 4. Wiring the Cloudflare client and address source into the Scheduler
// 5. Running until SIGINT/SIGTERM
//
// No reconciliation logic lives here.
//
// ## Example
//
// ```bash
// ddnsd --generate-config > config.json
// $EDITOR config.json
// ddnsd -c config.json
// ```

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use ddns_core::traits::ZoneLookupResult;
use ddns_core::{
    AddressSource, DdnsConfig, RecordDirectory, Reconciler, Scheduler, StaticAddressSource,
    ValidatedConfig,
};
use ddns_ip_http::TraceAddressSource;
use ddns_provider_cloudflare::CloudflareClient;
use std::future::Future;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.generate_config {
        return match DdnsConfig::example_json() {
            Ok(json) => {
                println!("{}", json);
                DdnsExitCode::CleanShutdown.into()
            }
            Err(e) => {
                eprintln!("Failed to generate example config: {}", e);
                DdnsExitCode::ConfigError.into()
            }
        };
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::from(cli.log_level))
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Cloudflare DDNS Tool {}", env!("CARGO_PKG_VERSION"));

    // Validation happens before any network call
    let config = match DdnsConfig::from_file(&cli.config).and_then(|c| c.validate()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        let mut scheduler = match startup(&config).await {
            Ok(scheduler) => scheduler,
            Err(e) => {
                error!("{:#}", e);
                return DdnsExitCode::ConfigError;
            }
        };

        match run_daemon(&mut scheduler).await {
            Ok(passes) => {
                info!("Shutting down daemon after {} pass(es)", passes);
                DdnsExitCode::CleanShutdown
            }
            Err(e) => {
                error!("Daemon error: {:#}", e);
                DdnsExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Run the startup prechecks and build the scheduler
///
/// Every failure here is fatal: the daemon exits before the first pass.
async fn startup(config: &ValidatedConfig) -> Result<Scheduler> {
    let client = CloudflareClient::new(config.credentials.clone())?;

    client.check_connectivity().await?;

    let accounts = client
        .list_accounts()
        .await
        .context("Failed to get account name")?;
    let account = accounts
        .first()
        .ok_or_else(|| ddns_core::Error::unresolved("no accounts visible to these credentials"))?;
    info!("Account: {}", account.name);

    let zone_id = match client
        .find_zone_id(&config.zone_name)
        .await
        .context("Failed to get zone ID")?
    {
        ZoneLookupResult::Found(zone_id) => zone_id,
        ZoneLookupResult::NotFound => {
            return Err(ddns_core::Error::unresolved(format!(
                "zone {} not found",
                config.zone_name
            ))
            .into());
        }
        ZoneLookupResult::Malformed(reason) => {
            return Err(ddns_core::Error::unresolved(format!(
                "zone lookup for {}: {}",
                config.zone_name, reason
            ))
            .into());
        }
    };
    info!("Zone ID: {}", zone_id);

    let addresses: Box<dyn AddressSource> = if config.address.is_auto() {
        Box::new(TraceAddressSource::new()?)
    } else {
        Box::new(StaticAddressSource::new(config.address.clone())?)
    };
    info!(
        "Mode: {}, type: {}, address source: {}",
        config.mode,
        config.selector.as_str(),
        addresses.source_name()
    );

    let reconciler = Reconciler::new(config.target(zone_id), Box::new(client), addresses);
    Ok(Scheduler::new(reconciler, config.interval))
}

/// Run passes until a shutdown signal arrives
async fn run_daemon(scheduler: &mut Scheduler) -> Result<usize> {
    let shutdown = shutdown_signal()?;
    Ok(scheduler.run_until(shutdown).await)
}

/// Resolves on the first SIGTERM or SIGINT
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    Ok(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received shutdown signal: {}", name);
    })
}

/// Resolves on CTRL-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    Ok(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to wait for CTRL-C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal: SIGINT");
    })
}
