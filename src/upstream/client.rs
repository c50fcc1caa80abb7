//! Elexon BMRS API client
//!
//! Thin wrapper over `reqwest` that issues GET requests against the upstream
//! root and turns every failure into a [`ProxyError`].

use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{ProxyError, Result};

// == Path Validation ==
/// Splits a relative upstream path into its segments.
///
/// Empty segments are dropped. Dot segments (plain or percent-encoded) and
/// segments containing a backslash are rejected, so a path can never climb
/// above the upstream root.
///
/// # Errors
/// `BadRequest` for an empty path or a forbidden segment.
pub fn split_path(path: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return Err(ProxyError::BadRequest(
            "upstream path is required".to_string(),
        ));
    }

    for segment in &segments {
        if segment.contains('\\') {
            return Err(ProxyError::BadRequest(format!(
                "upstream path segment '{}' must not contain '\\'",
                segment
            )));
        }

        let unescaped = segment.to_ascii_lowercase().replace("%2e", ".");
        if unescaped == "." || unescaped == ".." {
            return Err(ProxyError::BadRequest(
                "upstream path must not contain '.' or '..' segments".to_string(),
            ));
        }
    }

    Ok(segments)
}

// == Upstream Client ==
/// HTTP client bound to one upstream base URL.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    base: Url,
    base_url: String,
}

impl UpstreamClient {
    // == Constructor ==
    /// Builds a client for `base_url` with a per-request timeout.
    ///
    /// # Errors
    /// `Internal` if the base URL does not parse or cannot take path segments.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let base = Url::parse(&base_url)
            .map_err(|e| ProxyError::Internal(format!("invalid upstream URL '{}': {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ProxyError::Internal(format!(
                "upstream URL '{}' cannot carry a path",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProxyError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base,
            base_url,
        })
    }

    /// Builds a client from the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.upstream_base_url.clone(), config.upstream_timeout())
    }

    // == Base URL ==
    /// Root every request path is joined onto, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // == URL For ==
    /// Full URL for an upstream path.
    ///
    /// Each segment is appended on its own, so characters such as `?`, `#`,
    /// `%` or `\` are percent-encoded rather than reinterpreted.
    pub fn url_for(&self, path: &str) -> Result<Url> {
        let segments = split_path(path)?;

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ProxyError::Internal("upstream URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    // == Fetch ==
    /// GETs `path` with `params` and parses the JSON body.
    ///
    /// `format=json` is always sent, replacing any caller-supplied `format`.
    pub async fn fetch(&self, path: &str, params: &[(String, String)]) -> Result<Value> {
        let url = self.url_for(path)?;
        let mut query: Vec<(&str, &str)> = params
            .iter()
            .filter(|(k, _)| k != "format")
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        query.push(("format", "json"));

        info!(url = %url, params = ?query, "upstream GET");

        let response = self
            .client
            .get(url.clone())
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                error!(url = %url, error = %e, "upstream request failed");
                ProxyError::UpstreamUnavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(url = %url, status = status.as_u16(), "upstream returned error status");
            return Err(ProxyError::UpstreamStatus {
                status: status.as_u16(),
                message: format!("{} for url: {}", status, url),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ProxyError::UpstreamUnavailable(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| {
            error!(url = %url, error = %e, "upstream body is not JSON");
            ProxyError::InvalidUpstreamPayload(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> UpstreamClient {
        UpstreamClient::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_url_for_joins_without_double_slash() {
        let client = client("https://example.test/api/v1/");

        assert_eq!(client.base_url(), "https://example.test/api/v1");
        assert_eq!(
            client.url_for("/datasets/FREQ").unwrap().as_str(),
            "https://example.test/api/v1/datasets/FREQ"
        );
        assert_eq!(
            client.url_for("demand/outturn").unwrap().as_str(),
            "https://example.test/api/v1/demand/outturn"
        );
    }

    #[test]
    fn test_url_for_bare_host() {
        let client = client("http://127.0.0.1:9");
        assert_eq!(
            client.url_for("datasets/FREQ").unwrap().as_str(),
            "http://127.0.0.1:9/datasets/FREQ"
        );
    }

    #[test]
    fn test_url_for_encodes_query_and_percent_characters() {
        let client = client("https://example.test/bmrs/api/v1");

        let url = client.url_for("datasets?x=1#frag").unwrap();
        assert_eq!(url.path(), "/bmrs/api/v1/datasets%3Fx=1%23frag");
        assert_eq!(url.query(), None);

        let url = client.url_for("datasets/50%").unwrap();
        assert_eq!(url.path(), "/bmrs/api/v1/datasets/50%25");
    }

    #[test]
    fn test_split_path_rejects_dot_segments() {
        for path in ["..", "datasets/../secret", ".", "%2e%2e/secret", "%2E./x", "a/.%2e"] {
            assert!(
                matches!(split_path(path), Err(ProxyError::BadRequest(_))),
                "{} should be rejected",
                path
            );
        }
    }

    #[test]
    fn test_split_path_rejects_backslash() {
        assert!(matches!(
            split_path("..\\..\\secret"),
            Err(ProxyError::BadRequest(_))
        ));
        assert!(matches!(
            split_path("datasets\\BOAL"),
            Err(ProxyError::BadRequest(_))
        ));
    }

    #[test]
    fn test_split_path_rejects_empty() {
        assert!(matches!(split_path(""), Err(ProxyError::BadRequest(_))));
        assert!(matches!(split_path("//"), Err(ProxyError::BadRequest(_))));
    }

    #[test]
    fn test_split_path_keeps_ordinary_segments() {
        assert_eq!(
            split_path("/datasets//BOAL/").unwrap(),
            vec!["datasets", "BOAL"]
        );
        assert_eq!(split_path("v1.2/x..y").unwrap(), vec!["v1.2", "x..y"]);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_unavailable() {
        // Port 9 (discard) on loopback is closed on any sane test host
        let client = client("http://127.0.0.1:9");

        let result = client.fetch("datasets/FREQ", &[]).await;
        assert!(matches!(result, Err(ProxyError::UpstreamUnavailable(_))));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        assert!(matches!(
            UpstreamClient::new("not a url", Duration::from_secs(1)),
            Err(ProxyError::Internal(_))
        ));
    }
}
