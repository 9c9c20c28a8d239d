//! The core proxy subsystem.
//!
//! [`EndpointSpec`] describes one proxy; [`resolve_endpoints`] turns
//! config entries into specs by resolving access tokens. Submodules
//! cover request rewriting ([`rewrite`]), the outbound HTTP client
//! ([`client`]), the per-request forward handler ([`forward`]), the
//! listener seam ([`listener`]), replacement-port selection
//! ([`ports`]), the per-endpoint worker ([`instance`]), and the
//! orchestrator that runs all of them ([`orchestrator`]).

pub mod client;
pub mod forward;
pub mod instance;
pub mod listener;
pub mod orchestrator;
pub mod ports;
pub mod rewrite;

use url::Url;

use crate::config::model::ProxyEntry;
use crate::error::PortwardError;
use crate::token::{TokenError, TokenProvider};

/// Validated, immutable description of one proxy.
#[derive(Debug, Clone)]
pub struct EndpointSpec {
    /// Target the proxy forwards to. Always `https` when built through
    /// [`resolve_endpoints`].
    pub target_url: Url,
    /// Requested listen port. Validity is decided by the bind call,
    /// not re-checked here.
    pub local_port: u16,
    /// Bearer token injected as `cf-access-token`. `None` means the
    /// target has no Access application; traffic goes out unauthenticated.
    pub access_token: Option<String>,
    pub skip_tls_verify: bool,
}

/// Resolve config entries into endpoint specs, fetching one access
/// token per target address.
///
/// A target without an Access application is proxied without the auth
/// header. Any other token failure aborts the whole startup; this
/// runs before any listener binds.
pub async fn resolve_endpoints(
    entries: &[ProxyEntry],
    tokens: &dyn TokenProvider,
) -> Result<Vec<EndpointSpec>, PortwardError> {
    let mut specs = Vec::with_capacity(entries.len());

    for entry in entries {
        let address = entry.address();

        let access_token = match tokens.access_token(&address).await {
            Ok(token) => Some(token),
            Err(TokenError::AccessAppNotFound) => {
                tracing::warn!(
                    address,
                    "access application not found, continuing without authentication"
                );
                None
            }
            Err(e) => return Err(e.into()),
        };

        let target_url = Url::parse(&format!("https://{address}")).map_err(|source| {
            PortwardError::InvalidTarget {
                address: address.clone(),
                source,
            }
        })?;

        specs.push(EndpointSpec {
            target_url,
            local_port: entry.local_port,
            access_token,
            skip_tls_verify: entry.skip_tls,
        });
    }

    Ok(specs)
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    struct FixedToken(&'static str);

    #[async_trait]
    impl TokenProvider for FixedToken {
        async fn access_token(&self, _address: &str) -> Result<String, TokenError> {
            Ok(self.0.to_string())
        }
    }

    struct NoAccessApp;

    #[async_trait]
    impl TokenProvider for NoAccessApp {
        async fn access_token(&self, _address: &str) -> Result<String, TokenError> {
            Err(TokenError::AccessAppNotFound)
        }
    }

    struct Broken;

    #[async_trait]
    impl TokenProvider for Broken {
        async fn access_token(&self, _address: &str) -> Result<String, TokenError> {
            Err(TokenError::LoginFailed("some-cf-error".into()))
        }
    }

    fn entry(hostname: &str, local_port: u16) -> ProxyEntry {
        ProxyEntry {
            hostname: hostname.into(),
            local_port,
            destination_port: 443,
            skip_tls: false,
        }
    }

    #[tokio::test]
    async fn resolves_token_and_target_url() {
        let entries = vec![entry("app1.example.com", 8080)];
        let specs = resolve_endpoints(&entries, &FixedToken("token123"))
            .await
            .unwrap();

        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].target_url.scheme(), "https");
        assert_eq!(specs[0].target_url.host_str(), Some("app1.example.com"));
        assert_eq!(specs[0].local_port, 8080);
        assert_eq!(specs[0].access_token.as_deref(), Some("token123"));
    }

    #[tokio::test]
    async fn missing_access_app_proxies_without_token() {
        let entries = vec![entry("app1.example.com", 8080)];
        let specs = resolve_endpoints(&entries, &NoAccessApp).await.unwrap();

        assert_eq!(specs.len(), 1);
        assert!(specs[0].access_token.is_none());
    }

    #[tokio::test]
    async fn other_token_error_aborts_startup() {
        let entries = vec![entry("app1.example.com", 8080), entry("app2.example.com", 8082)];
        let result = resolve_endpoints(&entries, &Broken).await;

        assert!(matches!(
            result,
            Err(PortwardError::Token(TokenError::LoginFailed(_)))
        ));
    }

    #[tokio::test]
    async fn non_default_destination_port_lands_in_url() {
        let mut e = entry("app1.example.com", 8080);
        e.destination_port = 8443;
        let specs = resolve_endpoints(&[e], &FixedToken("t")).await.unwrap();

        assert_eq!(specs[0].target_url.port(), Some(8443));
    }
}
