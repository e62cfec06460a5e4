//! Network address lookup — a single unauthenticated request to an
//! external "what is my IP" service.

use crate::IdentityError;
use async_trait::async_trait;
use ballot_types::NetworkAddress;
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;

/// Default timeout for the whole lookup request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Resolves the visitor's externally observable address.
#[async_trait]
pub trait AddressLookup: Send + Sync {
    async fn lookup(&self) -> Result<NetworkAddress, IdentityError>;
}

/// JSON form returned by services such as `https://api.ipify.org?format=json`.
#[derive(Debug, Deserialize)]
struct IpResponse {
    ip: String,
}

/// Address lookup over HTTP.
///
/// Accepts either a JSON body `{"ip": "..."}` or a plain-text body holding
/// just the address.
pub struct HttpAddressLookup {
    url: String,
    /// `None` when the client could not be built. Every lookup then fails
    /// fast instead of running without a timeout.
    http_client: Option<reqwest::Client>,
}

impl HttpAddressLookup {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Self {
        let http_client = match reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT.min(timeout))
            .build()
        {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "failed to build address lookup client, addresses will be unknown");
                None
            }
        };
        Self::with_client(url, http_client)
    }

    pub(crate) fn with_client(url: impl Into<String>, http_client: Option<reqwest::Client>) -> Self {
        Self {
            url: url.into(),
            http_client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AddressLookup for HttpAddressLookup {
    async fn lookup(&self) -> Result<NetworkAddress, IdentityError> {
        let Some(http_client) = &self.http_client else {
            return Err(IdentityError::UnknownAddress("no HTTP client available".into()));
        };
        let response = http_client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                IdentityError::UnknownAddress(format!("request timed out: {e}"))
            } else if e.is_connect() {
                IdentityError::UnknownAddress(format!("connection failed: {e}"))
            } else {
                IdentityError::UnknownAddress(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(IdentityError::UnknownAddress(format!(
                "HTTP status {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| IdentityError::UnknownAddress(format!("failed to read body: {e}")))?;
        parse_address_body(&body)
    }
}

/// Extract and validate the address from a lookup response body.
pub fn parse_address_body(body: &str) -> Result<NetworkAddress, IdentityError> {
    let body = body.trim();
    let raw = if body.starts_with('{') {
        serde_json::from_str::<IpResponse>(body)
            .map_err(|e| IdentityError::UnknownAddress(format!("invalid JSON response: {e}")))?
            .ip
    } else {
        body.to_string()
    };
    let ip: IpAddr = raw
        .trim()
        .parse()
        .map_err(|_| IdentityError::UnknownAddress(format!("not an IP address: {raw:?}")))?;
    Ok(NetworkAddress::new(ip.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_body() {
        let addr = parse_address_body(r#"{"ip":"203.0.113.7"}"#).unwrap();
        assert_eq!(addr.as_str(), "203.0.113.7");
    }

    #[test]
    fn parses_plain_body() {
        let addr = parse_address_body("2001:db8::1\n").unwrap();
        assert_eq!(addr.as_str(), "2001:db8::1");
    }

    #[test]
    fn rejects_html_error_page() {
        let err = parse_address_body("<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, IdentityError::UnknownAddress(_)));
    }

    #[test]
    fn rejects_json_without_ip() {
        assert!(parse_address_body(r#"{"address":"203.0.113.7"}"#).is_err());
    }

    #[tokio::test]
    async fn unreachable_service_is_unknown_address() {
        // Port 9 (discard) on localhost is closed in test environments.
        let lookup = HttpAddressLookup::with_timeout("http://127.0.0.1:9/", Duration::from_millis(500));
        let err = lookup.lookup().await.unwrap_err();
        assert!(matches!(err, IdentityError::UnknownAddress(_)));
    }

    #[tokio::test]
    async fn missing_client_fails_fast() {
        let lookup = HttpAddressLookup::with_client("http://192.0.2.1/", None);
        let err = tokio::time::timeout(Duration::from_millis(100), lookup.lookup())
            .await
            .expect("lookup without a client must not wait")
            .unwrap_err();
        assert!(matches!(err, IdentityError::UnknownAddress(_)));
    }
}
