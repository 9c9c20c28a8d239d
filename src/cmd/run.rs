//! `portward run`: start the reverse proxies.
//!
//! Gathers proxy entries from `-e/--endpoint` flags or the YAML config
//! file (mixing both is an error), resolves access tokens through the
//! `cloudflared` CLI, and hands the resulting specs to the
//! orchestrator. Ctrl+C / SIGTERM are translated into the
//! orchestrator's cancellation channel.

use tokio::sync::watch;

use crate::cli::RunArgs;
use crate::config::{self, endpoint::parse_endpoint, model::ProxyEntry};
use crate::error::PortwardError;
use crate::logging;
use crate::proxy::orchestrator::Orchestrator;
use crate::proxy::resolve_endpoints;
use crate::token::CloudflaredCli;

pub async fn execute(args: RunArgs) -> Result<(), PortwardError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let Some(entries) = gather_entries(&args).await? else {
        print_usage_hint();
        return Ok(());
    };

    tracing::debug!(proxies = entries.len(), "resolving access tokens");
    let specs = resolve_endpoints(&entries, &CloudflaredCli::new()).await?;

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = cancel_tx.send(true);
    });

    Orchestrator::default().run(specs, cancel_rx).await
}

/// Entries from flags or config file. `Ok(None)` means neither was
/// provided, which is not an error; the caller prints usage instead.
async fn gather_entries(args: &RunArgs) -> Result<Option<Vec<ProxyEntry>>, PortwardError> {
    if !args.endpoints.is_empty() {
        if args.config.is_some() {
            return Err(PortwardError::ConflictingSources);
        }

        let mut entries = Vec::with_capacity(args.endpoints.len());
        for endpoint in &args.endpoints {
            let mut entry = parse_endpoint(endpoint)?;
            entry.skip_tls = args.skip_tls;
            entries.push(entry);
        }
        return Ok(Some(entries));
    }

    match config::load(args.config.as_deref()).await? {
        Some(config) => Ok(Some(config.proxies)),
        None => Ok(None),
    }
}

fn print_usage_hint() {
    println!(
        "No proxy endpoints configured.\n\n  \
         portward run -e app.example.com       Proxy one application\n  \
         portward run -c proxies.yaml          Start from a config file\n  \
         portward run --help                   See all options"
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
