//! Per-request rewrite logic: scheme, authority, `Host`, auth header.
//!
//! A [`RequestRewriter`] is built once per endpoint and applied to
//! every inbound request. It does no I/O and never touches the body,
//! which keeps the forwarding contract unit testable without sockets.

use std::sync::LazyLock;

use http::uri::Uri;
use http::{HeaderMap, HeaderName, HeaderValue};

use crate::proxy::EndpointSpec;

/// Header carrying the Cloudflare Access bearer token.
pub const ACCESS_TOKEN_HEADER: HeaderName = HeaderName::from_static("cf-access-token");

static HOP_BY_HOP: LazyLock<Vec<HeaderName>> = LazyLock::new(|| {
    [
        "connection",
        "keep-alive",
        "transfer-encoding",
        "te",
        "trailer",
        "upgrade",
        "proxy-authorization",
        "proxy-authenticate",
    ]
    .iter()
    .filter_map(|name| name.parse::<HeaderName>().ok())
    .collect()
});

#[derive(Debug, Clone)]
pub struct RequestRewriter {
    target: url::Url,
    access_token: Option<String>,
}

impl RequestRewriter {
    #[must_use]
    pub fn new(spec: &EndpointSpec) -> Self {
        Self {
            target: spec.target_url.clone(),
            access_token: spec.access_token.clone(),
        }
    }

    /// `host` or `host:port` of the target; the port appears only when
    /// the target URL carries an explicit non-default one.
    #[must_use]
    pub fn authority(&self) -> String {
        let host = self.target.host_str().unwrap_or_default();
        self.target
            .port()
            .map_or_else(|| host.to_string(), |port| format!("{host}:{port}"))
    }

    /// Redirect the request URI at the target, keeping path and query.
    pub fn rewrite_uri(&self, original: &Uri) -> Result<Uri, axum::http::Error> {
        let path_and_query = original
            .path_and_query()
            .map_or("/", |pq| pq.as_str());

        Uri::builder()
            .scheme(self.target.scheme())
            .authority(self.authority())
            .path_and_query(path_and_query)
            .build()
    }

    /// Clone the inbound headers, strip hop-by-hop headers, rewrite
    /// `Host`, and inject the access token when one is present and
    /// non-empty. A missing token means the header is omitted; the
    /// downstream may reject unauthenticated traffic, which is its call.
    #[must_use]
    pub fn rewrite_headers(&self, original: &HeaderMap) -> HeaderMap {
        let mut headers = original.clone();

        for name in HOP_BY_HOP.iter() {
            headers.remove(name);
        }

        if let Ok(host) = HeaderValue::from_str(&self.authority()) {
            headers.insert(hyper::header::HOST, host);
        }

        if let Some(token) = self.access_token.as_deref().filter(|t| !t.is_empty()) {
            if let Ok(value) = HeaderValue::from_str(token) {
                headers.insert(ACCESS_TOKEN_HEADER, value);
            }
        }

        headers
    }
}

/// Strip hop-by-hop headers and `content-length` from an upstream
/// response. The body has already been fully collected, so the
/// origin's framing headers are no longer accurate; axum sets the
/// correct `content-length` from the actual body bytes.
pub fn strip_response_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
    headers.remove(hyper::header::CONTENT_LENGTH);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(token: Option<&str>) -> EndpointSpec {
        EndpointSpec {
            target_url: url::Url::parse("https://app.example.com").unwrap(),
            local_port: 8080,
            access_token: token.map(String::from),
            skip_tls_verify: false,
        }
    }

    #[test]
    fn rewrites_scheme_host_and_token() {
        let rewriter = RequestRewriter::new(&spec(Some("test-token")));

        let uri = rewriter
            .rewrite_uri(&"/".parse::<Uri>().unwrap())
            .unwrap();
        assert_eq!(uri.to_string(), "https://app.example.com/");

        let headers = rewriter.rewrite_headers(&HeaderMap::new());
        assert_eq!(headers.get("host").unwrap(), "app.example.com");
        assert_eq!(headers.get("cf-access-token").unwrap(), "test-token");
    }

    #[test]
    fn preserves_path_and_query() {
        let rewriter = RequestRewriter::new(&spec(None));
        let uri = rewriter
            .rewrite_uri(&"/api/v1/items?page=2".parse::<Uri>().unwrap())
            .unwrap();
        assert_eq!(
            uri.to_string(),
            "https://app.example.com/api/v1/items?page=2"
        );
    }

    #[test]
    fn explicit_port_lands_in_authority_and_host() {
        let mut s = spec(None);
        s.target_url = url::Url::parse("https://app.example.com:8443").unwrap();
        let rewriter = RequestRewriter::new(&s);

        assert_eq!(rewriter.authority(), "app.example.com:8443");
        let headers = rewriter.rewrite_headers(&HeaderMap::new());
        assert_eq!(headers.get("host").unwrap(), "app.example.com:8443");
    }

    #[test]
    fn no_token_means_no_header() {
        let rewriter = RequestRewriter::new(&spec(None));
        let headers = rewriter.rewrite_headers(&HeaderMap::new());
        assert!(headers.get("cf-access-token").is_none());
    }

    #[test]
    fn empty_token_means_no_header() {
        let rewriter = RequestRewriter::new(&spec(Some("")));
        let headers = rewriter.rewrite_headers(&HeaderMap::new());
        assert!(headers.get("cf-access-token").is_none());
    }

    #[test]
    fn strips_hop_by_hop_and_overwrites_host() {
        let rewriter = RequestRewriter::new(&spec(Some("t")));

        let mut original = HeaderMap::new();
        original.insert("host", "localhost:8080".parse().unwrap());
        original.insert("connection", "keep-alive".parse().unwrap());
        original.insert("content-type", "application/json".parse().unwrap());

        let headers = rewriter.rewrite_headers(&original);
        assert_eq!(headers.get("host").unwrap(), "app.example.com");
        assert!(headers.get("connection").is_none());
        assert_eq!(headers.get("content-type").unwrap(), "application/json");
    }

    #[test]
    fn response_strip_removes_framing_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("transfer-encoding", "chunked".parse().unwrap());
        headers.insert("content-length", "42".parse().unwrap());
        headers.insert("content-type", "text/plain".parse().unwrap());

        strip_response_hop_by_hop(&mut headers);
        assert!(headers.get("transfer-encoding").is_none());
        assert!(headers.get("content-length").is_none());
        assert!(headers.get("content-type").is_some());
    }
}
