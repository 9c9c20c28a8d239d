//! The listener seam: bind a port, serve, shut down.
//!
//! [`ProxyListener`] is what the orchestration layer actually drives,
//! so it can be tested without sockets. [`HttpListener`] is the real
//! implementation: a `tokio` TCP listener running an axum router whose
//! fallback forwards everything to the target. [`ListenerFactory`]
//! builds one listener per endpoint, so tests can swap in stubs.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use tokio::sync::watch;

use crate::proxy::client::build_http_client;
use crate::proxy::forward::{build_router, ProxyState};
use crate::proxy::rewrite::RequestRewriter;
use crate::proxy::EndpointSpec;

/// Why a listener stopped serving. Never escalated past the owning
/// worker; the orchestrator's return value does not carry these.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    /// The requested port is already bound by another process. The
    /// only recoverable bind failure; triggers the single retry.
    #[error("port {0} is already in use")]
    PortInUse(u16),

    #[error("failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("serve failed: {0}")]
    Serve(#[source] std::io::Error),
}

/// A thing that can bind a port, serve until told to stop, and report
/// how it ended.
#[async_trait]
pub trait ProxyListener: Send + Sync {
    /// Serve on `port` until `shutdown` signals. `Ok(())` is the
    /// shutdown-triggered success path.
    async fn serve(&self, port: u16, shutdown: watch::Receiver<bool>) -> Result<(), ServeError>;
}

/// Builds one listener per endpoint spec.
pub trait ListenerFactory: Send + Sync {
    fn make_listener(&self, spec: &EndpointSpec) -> Arc<dyn ProxyListener>;
}

/// Real HTTP listener: axum serving the forward router.
pub struct HttpListener {
    router: Router,
}

#[async_trait]
impl ProxyListener for HttpListener {
    async fn serve(
        &self,
        port: u16,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), ServeError> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                ServeError::PortInUse(port)
            } else {
                ServeError::Bind { port, source: e }
            }
        })?;

        let graceful = async move {
            let _ = shutdown.changed().await;
        };

        axum::serve(listener, self.router.clone())
            .with_graceful_shutdown(graceful)
            .await
            .map_err(ServeError::Serve)
    }
}

pub struct HttpListenerFactory;

impl ListenerFactory for HttpListenerFactory {
    fn make_listener(&self, spec: &EndpointSpec) -> Arc<dyn ProxyListener> {
        let state = Arc::new(ProxyState {
            rewriter: RequestRewriter::new(spec),
            client: build_http_client(spec.skip_tls_verify),
        });
        Arc::new(HttpListener {
            router: build_router(state),
        })
    }
}
