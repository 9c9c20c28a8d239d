//! One proxy worker: bind, serve, retry once on a port conflict.
//!
//! Failures stay inside the instance. A proxy that cannot start is
//! logged and its worker exits; sibling proxies keep running.

use std::sync::Arc;

use tokio::sync::watch;

use crate::proxy::listener::{ProxyListener, ServeError};
use crate::proxy::ports::PortSelector;
use crate::proxy::EndpointSpec;

pub struct ProxyInstance {
    spec: EndpointSpec,
    listener: Arc<dyn ProxyListener>,
    ports: Arc<dyn PortSelector>,
}

impl ProxyInstance {
    #[must_use]
    pub fn new(
        spec: EndpointSpec,
        listener: Arc<dyn ProxyListener>,
        ports: Arc<dyn PortSelector>,
    ) -> Self {
        Self {
            spec,
            listener,
            ports,
        }
    }

    /// Run until shutdown or a terminal bind failure. Exactly one
    /// retry is attempted, and only for a port conflict; a second
    /// failure of any kind is terminal for this instance.
    pub async fn run(self, shutdown: watch::Receiver<bool>) {
        let upstream = self.spec.target_url.to_string();

        tracing::info!(
            "starting proxy server on http://localhost:{}, forwarding to {upstream}",
            self.spec.local_port
        );

        match self
            .listener
            .serve(self.spec.local_port, shutdown.clone())
            .await
        {
            Ok(()) => {}
            Err(ServeError::PortInUse(port)) => {
                let replacement = self.ports.select();
                tracing::warn!(
                    "port {port} for target {upstream} is in use, retrying on port {replacement}"
                );
                if let Err(e) = self.listener.serve(replacement, shutdown).await {
                    tracing::error!(error = %e, "proxy for {upstream} failed to start");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "proxy for {upstream} failed to start");
            }
        }
    }
}
