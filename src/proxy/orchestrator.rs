//! Concurrent lifecycle management of all proxy instances.
//!
//! One worker task per endpoint, all sharing a single stop channel.
//! The orchestrator blocks on the caller's cancellation signal, then
//! broadcasts stop to every instance at once and joins the workers
//! under a fixed deadline. Per-instance failures never reach the
//! return value: a misconfigured endpoint must not prevent the
//! others from running or block process shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::error::PortwardError;
use crate::proxy::instance::ProxyInstance;
use crate::proxy::listener::{HttpListenerFactory, ListenerFactory};
use crate::proxy::ports::{PortSelector, RandomPortSelector};
use crate::proxy::EndpointSpec;

/// How long instances get to drain after the stop signal. Measured
/// from the moment cancellation is observed, independent of any
/// deadline the caller's own signal may carry.
pub const SHUTDOWN_DEADLINE: Duration = Duration::from_secs(5);

pub struct Orchestrator {
    listeners: Arc<dyn ListenerFactory>,
    ports: Arc<dyn PortSelector>,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(Arc::new(HttpListenerFactory), Arc::new(RandomPortSelector))
    }
}

impl Orchestrator {
    #[must_use]
    pub fn new(listeners: Arc<dyn ListenerFactory>, ports: Arc<dyn PortSelector>) -> Self {
        Self { listeners, ports }
    }

    /// Run every proxy until `cancel` signals, then shut all of them
    /// down and join the workers.
    ///
    /// Only an empty spec list is an error. Individual bind or
    /// shutdown failures are logged by the owning worker and do not
    /// affect the return value.
    pub async fn run(
        &self,
        specs: Vec<EndpointSpec>,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<(), PortwardError> {
        if specs.is_empty() {
            return Err(PortwardError::NoEndpoints);
        }

        let (stop_tx, _) = watch::channel(false);
        let mut workers = JoinSet::new();

        for spec in specs {
            let listener = self.listeners.make_listener(&spec);
            let instance = ProxyInstance::new(spec, listener, Arc::clone(&self.ports));
            workers.spawn(instance.run(stop_tx.subscribe()));
        }

        tracing::info!(proxies = workers.len(), "all proxies launched, press Ctrl+C to stop");

        let _ = cancel.changed().await;
        tracing::info!("shutdown signal received, gracefully shutting down proxies");

        // One send signals every worker at once.
        let _ = stop_tx.send(true);

        let drain = async {
            while workers.join_next().await.is_some() {}
        };
        if tokio::time::timeout(SHUTDOWN_DEADLINE, drain).await.is_err() {
            tracing::error!(
                deadline_secs = SHUTDOWN_DEADLINE.as_secs(),
                "some proxies did not shut down within the deadline, aborting them"
            );
            workers.shutdown().await;
        }

        tracing::info!("all proxies have been shut down");
        Ok(())
    }
}
