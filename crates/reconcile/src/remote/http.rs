//! HTTP remote backed by a Radarr-compatible v3 REST API.
//!
//! One [`HttpRemote`] per remote service, created once and cloned into
//! every controller; the underlying agent shares its connection pool
//! across clones. Authentication is an `X-Api-Key` header on every call.
//! No retries and no timeouts are configured here; the handle inherits
//! whatever deadline the host environment imposes.

use crate::remote::{ApiFailure, ApiResult, Remote};
use serde_json::Value;
use ureq::Agent;
use ureq::http::Response;

/// Header carrying the API key on every request.
const API_KEY_HEADER: &str = "X-Api-Key";

/// REST connection handle for a single remote service.
///
/// # Example
///
/// ```no_run
/// use reconcile::remote::{HttpRemote, Remote};
///
/// let remote = HttpRemote::new("http://localhost:7878", "abcdef0123456789");
/// let movies = remote.list("movie").unwrap();
/// println!("{} movies under management", movies.len());
/// ```
#[derive(Clone)]
pub struct HttpRemote {
    /// HTTP agent; status codes are classified explicitly rather than
    /// surfacing as errors, so failed-response bodies stay readable.
    agent: Agent,
    /// Service base URL without trailing slash.
    base_url: String,
    /// API key sent with every request.
    api_key: String,
}

impl HttpRemote {
    /// Create a connection handle for the given base URL and API key.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            agent,
            base_url,
            api_key: api_key.into(),
        }
    }

    /// Get the configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the URL for a resource collection.
    fn collection_url(&self, resource: &str) -> String {
        format!("{}/api/v3/{}", self.base_url, resource)
    }

    /// Build the URL for a single entity.
    fn item_url(&self, resource: &str, id: i64) -> String {
        format!("{}/api/v3/{}/{}", self.base_url, resource, id)
    }

    /// Classify a response and decode its JSON body.
    fn decode<T: serde::de::DeserializeOwned>(
        mut response: Response<ureq::Body>,
    ) -> ApiResult<T> {
        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            return response.body_mut().read_json().map_err(|e| ApiFailure::Status {
                code: status,
                message: format!("undecodable response body: {e}"),
            });
        }
        Err(Self::failure(status, response))
    }

    /// Classify a response whose body is irrelevant (delete).
    fn expect_empty(response: Response<ureq::Body>) -> ApiResult<()> {
        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            return Ok(());
        }
        Err(Self::failure(status, response))
    }

    /// Map a non-2xx response to an [`ApiFailure`], carrying the
    /// remote-supplied detail verbatim when the body provides one.
    fn failure(status: u16, mut response: Response<ureq::Body>) -> ApiFailure {
        match status {
            401 | 403 => ApiFailure::Unauthorized,
            404 => ApiFailure::NotFound,
            code => {
                let body = response.body_mut().read_to_string().unwrap_or_default();
                ApiFailure::Status {
                    code,
                    message: error_detail(&body, code),
                }
            }
        }
    }

    fn transport(error: ureq::Error) -> ApiFailure {
        ApiFailure::Transport(error.to_string())
    }
}

/// Extract a human-readable message from an error response body.
///
/// Radarr reports plain-object errors as `{"message": ...}` and
/// validation failures as an array of `{"errorMessage": ...}` entries;
/// anything else is passed through as raw text.
fn error_detail(body: &str, code: u16) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return format!("HTTP {code}");
    }
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if let Some(message) = value.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
        if let Some(message) = value
            .as_array()
            .and_then(|items| items.first())
            .and_then(|item| item.get("errorMessage"))
            .and_then(Value::as_str)
        {
            return message.to_string();
        }
    }
    trimmed.to_string()
}

impl Remote for HttpRemote {
    fn list(&self, resource: &str) -> ApiResult<Vec<Value>> {
        let url = self.collection_url(resource);
        log::debug!("GET {url}");
        let response = self
            .agent
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .call()
            .map_err(Self::transport)?;
        Self::decode(response)
    }

    fn get(&self, resource: &str, id: i64) -> ApiResult<Value> {
        let url = self.item_url(resource, id);
        log::debug!("GET {url}");
        let response = self
            .agent
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .call()
            .map_err(Self::transport)?;
        Self::decode(response)
    }

    fn create(&self, resource: &str, body: &Value) -> ApiResult<Value> {
        let url = self.collection_url(resource);
        log::debug!("POST {url}");
        let response = self
            .agent
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send_json(body)
            .map_err(Self::transport)?;
        Self::decode(response)
    }

    fn update(&self, resource: &str, id: i64, body: &Value) -> ApiResult<Value> {
        let url = self.item_url(resource, id);
        log::debug!("PUT {url}");
        let response = self
            .agent
            .put(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send_json(body)
            .map_err(Self::transport)?;
        Self::decode(response)
    }

    fn delete(&self, resource: &str, id: i64) -> ApiResult<()> {
        let url = self.item_url(resource, id);
        log::debug!("DELETE {url}");
        let response = self
            .agent
            .delete(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .call()
            .map_err(Self::transport)?;
        Self::expect_empty(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_url() {
        let remote = HttpRemote::new("http://localhost:7878", "key");
        assert_eq!(
            remote.collection_url("movie"),
            "http://localhost:7878/api/v3/movie"
        );
    }

    #[test]
    fn test_item_url() {
        let remote = HttpRemote::new("http://localhost:7878", "key");
        assert_eq!(
            remote.item_url("downloadclient", 12),
            "http://localhost:7878/api/v3/downloadclient/12"
        );
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let remote = HttpRemote::new("http://localhost:7878/", "key");
        assert_eq!(remote.base_url(), "http://localhost:7878");
        assert_eq!(
            remote.collection_url("tag"),
            "http://localhost:7878/api/v3/tag"
        );
    }

    #[test]
    fn test_error_detail_message_object() {
        let detail = error_detail(r#"{"message": "Movie already exists"}"#, 400);
        assert_eq!(detail, "Movie already exists");
    }

    #[test]
    fn test_error_detail_validation_array() {
        let detail = error_detail(
            r#"[{"propertyName": "Path", "errorMessage": "Path must be valid"}]"#,
            400,
        );
        assert_eq!(detail, "Path must be valid");
    }

    #[test]
    fn test_error_detail_raw_text() {
        assert_eq!(error_detail("Bad Gateway", 502), "Bad Gateway");
    }

    #[test]
    fn test_error_detail_empty_body() {
        assert_eq!(error_detail("", 500), "HTTP 500");
        assert_eq!(error_detail("   ", 500), "HTTP 500");
    }
}
