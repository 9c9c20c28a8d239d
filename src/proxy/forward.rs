//! The per-request forward handler and the axum router around it.
//!
//! Every request hitting a proxy's local port lands in
//! [`forward_handler`] via the router fallback: rewrite the URI and
//! headers for the target, send through the shared hyper client,
//! collect the upstream response, and hand it back. Upstream failures
//! become `502 Bad Gateway`; there is no retry.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use http_body_util::{BodyExt, Full};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::proxy::client::HttpClient;
use crate::proxy::rewrite::{strip_response_hop_by_hop, RequestRewriter};

/// Upper bound on buffered request bodies (16 MiB).
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Shared state of one proxy instance's router.
pub struct ProxyState {
    pub rewriter: RequestRewriter,
    pub client: HttpClient,
}

#[must_use]
pub fn build_router(state: Arc<ProxyState>) -> Router {
    Router::new()
        .fallback(forward_handler)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

pub async fn forward_handler(
    State(state): State<Arc<ProxyState>>,
    method: Method,
    uri: Uri,
    req_headers: HeaderMap,
    body: Bytes,
) -> Response {
    let outbound_uri = match state.rewriter.rewrite_uri(&uri) {
        Ok(u) => u,
        Err(e) => {
            tracing::error!(uri = %uri, error = %e, "failed to rewrite request URI");
            return StatusCode::BAD_GATEWAY.into_response();
        }
    };
    let outbound_headers = state.rewriter.rewrite_headers(&req_headers);

    tracing::debug!(
        uri = %outbound_uri,
        headers = ?outbound_headers,
        "forwarding request"
    );

    let mut builder = hyper::Request::builder()
        .method(method)
        .uri(outbound_uri.clone());
    for (key, value) in &outbound_headers {
        builder = builder.header(key, value);
    }

    let outbound = match builder.body(Full::new(body)) {
        Ok(req) => req,
        Err(e) => {
            tracing::error!(uri = %outbound_uri, error = %e, "failed to build outbound request");
            return StatusCode::BAD_GATEWAY.into_response();
        }
    };

    match state.client.request(outbound).await {
        Ok(response) => {
            let status = response.status();
            let mut resp_headers = response.headers().clone();

            let body_bytes = match response.into_body().collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(e) => {
                    tracing::error!(uri = %outbound_uri, error = %e, "failed to read upstream body");
                    return StatusCode::BAD_GATEWAY.into_response();
                }
            };

            strip_response_hop_by_hop(&mut resp_headers);

            let mut builder = Response::builder().status(status);
            for (key, value) in &resp_headers {
                builder = builder.header(key, value);
            }
            builder
                .body(axum::body::Body::from(body_bytes))
                .unwrap_or_else(|e| {
                    tracing::error!(error = %e, "failed to build response");
                    StatusCode::BAD_GATEWAY.into_response()
                })
        }
        Err(e) => {
            tracing::error!(uri = %outbound_uri, error = %e, "upstream request failed");
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}
