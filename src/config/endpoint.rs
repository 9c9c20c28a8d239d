//! Endpoint-string grammar: `[LOCAL_PORT:]HOSTNAME[:DEST_PORT]`.
//!
//! Omitted `LOCAL_PORT` defaults to 8888, omitted `DEST_PORT` to 443.
//! The two-part form is ambiguous: `9000:app.example.com` vs
//! `app.example.com:8443`. It is disambiguated by whether the first
//! segment parses as a `u16`, which makes a purely numeric hostname
//! unreachable through this grammar. That is a known, accepted
//! limitation; do not "fix" it silently.

use crate::config::model::{ProxyEntry, DEFAULT_DESTINATION_PORT, DEFAULT_LOCAL_PORT};
use crate::error::PortwardError;

/// Parse one endpoint string into a [`ProxyEntry`].
///
/// `skip_tls` is a per-invocation flag, not part of the grammar, so it
/// always starts out `false` here.
pub fn parse_endpoint(endpoint: &str) -> Result<ProxyEntry, PortwardError> {
    if endpoint.is_empty() {
        return Err(PortwardError::EmptyEndpoint);
    }

    let parts: Vec<&str> = endpoint.split(':').collect();

    let (hostname, local_port, destination_port) = match parts.as_slice() {
        [hostname] => (*hostname, DEFAULT_LOCAL_PORT, DEFAULT_DESTINATION_PORT),

        [first, second] => {
            if let Ok(local) = first.parse::<u16>() {
                (*second, local, DEFAULT_DESTINATION_PORT)
            } else {
                let dest =
                    second
                        .parse::<u16>()
                        .map_err(|source| PortwardError::InvalidDestinationPort {
                            value: (*second).to_string(),
                            source,
                        })?;
                (*first, DEFAULT_LOCAL_PORT, dest)
            }
        }

        [local, hostname, dest] => {
            let local = local
                .parse::<u16>()
                .map_err(|source| PortwardError::InvalidLocalPort {
                    value: (*local).to_string(),
                    source,
                })?;
            let dest =
                dest.parse::<u16>()
                    .map_err(|source| PortwardError::InvalidDestinationPort {
                        value: (*dest).to_string(),
                        source,
                    })?;
            (*hostname, local, dest)
        }

        _ => {
            return Err(PortwardError::MalformedEndpoint {
                endpoint: endpoint.to_string(),
            })
        }
    };

    if hostname.is_empty() {
        return Err(PortwardError::EmptyHostname);
    }

    Ok(ProxyEntry {
        hostname: hostname.to_string(),
        local_port,
        destination_port,
        skip_tls: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(hostname: &str, local_port: u16, destination_port: u16) -> ProxyEntry {
        ProxyEntry {
            hostname: hostname.into(),
            local_port,
            destination_port,
            skip_tls: false,
        }
    }

    #[test]
    fn hostname_only() {
        assert_eq!(
            parse_endpoint("myapp.example.com").unwrap(),
            entry("myapp.example.com", DEFAULT_LOCAL_PORT, DEFAULT_DESTINATION_PORT)
        );
    }

    #[test]
    fn local_port_and_hostname() {
        assert_eq!(
            parse_endpoint("9000:myapp.example.com").unwrap(),
            entry("myapp.example.com", 9000, DEFAULT_DESTINATION_PORT)
        );
    }

    #[test]
    fn hostname_and_destination_port() {
        assert_eq!(
            parse_endpoint("myapp.example.com:8443").unwrap(),
            entry("myapp.example.com", DEFAULT_LOCAL_PORT, 8443)
        );
    }

    #[test]
    fn full_format() {
        assert_eq!(
            parse_endpoint("9000:myapp.example.com:8443").unwrap(),
            entry("myapp.example.com", 9000, 8443)
        );
    }

    #[test]
    fn too_many_parts() {
        assert!(matches!(
            parse_endpoint("1:2:3:4"),
            Err(PortwardError::MalformedEndpoint { .. })
        ));
    }

    #[test]
    fn empty_string() {
        assert!(matches!(
            parse_endpoint(""),
            Err(PortwardError::EmptyEndpoint)
        ));
    }

    #[test]
    fn empty_hostname() {
        assert!(matches!(
            parse_endpoint("9000::8443"),
            Err(PortwardError::EmptyHostname)
        ));
    }

    #[test]
    fn invalid_local_port() {
        assert!(matches!(
            parse_endpoint("abc:host:123"),
            Err(PortwardError::InvalidLocalPort { .. })
        ));
    }

    #[test]
    fn invalid_destination_port() {
        assert!(matches!(
            parse_endpoint("host:abc"),
            Err(PortwardError::InvalidDestinationPort { .. })
        ));
    }

    #[test]
    fn destination_port_out_of_range() {
        assert!(matches!(
            parse_endpoint("host:70000"),
            Err(PortwardError::InvalidDestinationPort { .. })
        ));
    }

    // Ambiguity rule: a numeric first segment always wins as LOCAL_PORT.
    #[test]
    fn numeric_first_segment_is_local_port() {
        assert_eq!(
            parse_endpoint("8443:myapp.example.com").unwrap(),
            entry("myapp.example.com", 8443, DEFAULT_DESTINATION_PORT)
        );
    }
}
