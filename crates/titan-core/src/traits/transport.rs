// # API Transport Trait
//
// Defines the interface the core uses to reach the appliance REST API.
//
// ## Implementations
//
// - OAuth1-signed reqwest client: `titan-oauth1` crate
// - Scripted doubles: `tests/common` of this crate
//
// ## Usage
//
// ```rust,ignore
// use titan_core::traits::{ApiRequest, ApiTransport};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let transport = /* ApiTransport implementation */;
//
//     let response = transport
//         .send(ApiRequest::get("https://titan.example.net/restapi/users"))
//         .await?;
//     println!("{} {}", response.status, response.body);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// HTTP method used by the appliance API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    /// Upper-case method name, as it appears on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request to the appliance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL
    pub url: String,
    /// Form fields, sent as `application/x-www-form-urlencoded` when non-empty
    pub form: Vec<(String, String)>,
}

impl ApiRequest {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            form: Vec::new(),
        }
    }

    /// Create a form POST request
    pub fn post_form(url: impl Into<String>, form: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            form,
        }
    }

    /// Create a DELETE request
    pub fn delete(url: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            url: url.into(),
            form: Vec::new(),
        }
    }

    /// Look up a form field by name
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Raw answer from the appliance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl ApiResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the appliance answered 200
    ///
    /// The API reports success with 200 only; other 2xx codes are treated as
    /// failures like any other status.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Trait for appliance transports
///
/// A transport turns an [`ApiRequest`] into an [`ApiResponse`]. It owns
/// authentication (request signing) and nothing else.
///
/// # Responsibilities
///
/// - ✅ Sign and send exactly one HTTP request per call
/// - ✅ Return any HTTP answer as `Ok`, whatever its status
/// - ✅ Map connection/DNS/TLS failures to [`crate::Error::Transport`]
/// - ❌ Interpret status codes or decode bodies (owned by the core)
/// - ❌ Retry or back off (callers decide retry policy)
/// - ❌ Apply deadlines or cancellation (owned by [`crate::TitanContext`])
///
/// # Thread Safety
///
/// Implementations must be usable from several tasks at once, since the
/// aggregator may fetch accounts concurrently.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Send one request and return the raw answer
    ///
    /// # Returns
    ///
    /// - `Ok(ApiResponse)`: The appliance answered (any status)
    /// - `Err(Error::Transport)`: No answer was received
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, crate::Error>;

    /// Transport name (for logging/debugging)
    fn transport_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_value_lookup() {
        let request = ApiRequest::post_form(
            "https://titan/restapi/users/5/locations/dynamicip",
            vec![
                ("ip".to_string(), "1.2.3.4".to_string()),
                ("name".to_string(), "home".to_string()),
            ],
        );

        assert_eq!(request.method, Method::Post);
        assert_eq!(request.form_value("ip"), Some("1.2.3.4"));
        assert_eq!(request.form_value("name"), Some("home"));
        assert_eq!(request.form_value("tag"), None);
    }

    #[test]
    fn only_200_is_ok() {
        assert!(ApiResponse::new(200, "").is_ok());
        assert!(!ApiResponse::new(201, "").is_ok());
        assert!(!ApiResponse::new(500, "").is_ok());
    }

    #[test]
    fn method_names() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Post.as_str(), "POST");
        assert_eq!(Method::Delete.as_str(), "DELETE");
    }
}
