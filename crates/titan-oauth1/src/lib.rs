// # WebTitan OAuth1 Transport
//
// This crate provides the reqwest-backed `ApiTransport` used to talk to a
// WebTitan appliance. Every request is signed with OAuth 1.0a (HMAC-SHA1)
// using the consumer/token pair of one `OAuthCredential`.
//
// ## Responsibilities
//
// - ✅ Sign every outgoing request (query and form fields included)
// - ✅ Send form bodies as `application/x-www-form-urlencoded`
// - ✅ Map connection-level failures to `Error::Transport`
// - ✅ Hand back status and body untouched; judging them is the caller's job
// - ❌ NO retry logic (failures surface to the caller)
// - ❌ NO request deadline (owned by `TitanContext`)
// - ❌ NO credential validation (empty fields surface as remote 401/403)
//
// ## Security Requirements
//
// - Consumer and token secrets NEVER appear in logs or `Debug` output
//
// ## Usage
//
// ```rust,ignore
// use std::sync::Arc;
// use titan_oauth1::SigningClient;
//
// let transport = SigningClient::build(&config.credential)?;
// let ctx = TitanContext::new(&config, Arc::new(transport))?;
// ```

pub mod oauth1;

use async_trait::async_trait;
use oauth1::OAuth1Signer;
use reqwest::header::AUTHORIZATION;
use titan_core::traits::{ApiRequest, ApiResponse, ApiTransport, Method};
use titan_core::{Error, OAuthCredential, Result};

/// User agent sent with every request
const USER_AGENT: &str = concat!("titan-client/", env!("CARGO_PKG_VERSION"));

/// Factory for signed transports
pub struct SigningClient;

impl SigningClient {
    /// Build a transport that signs every request with `credential`
    ///
    /// # Returns
    ///
    /// - `Ok(SignedHttpClient)`: Ready to be wrapped in a `TitanContext`
    /// - `Err(Error::Config)`: If the HTTP client cannot be initialized
    pub fn build(credential: &OAuthCredential) -> Result<SignedHttpClient> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(SignedHttpClient {
            client,
            signer: OAuth1Signer::new(credential),
        })
    }
}

/// OAuth1-signing HTTP transport
///
/// Stateless apart from the credential: one instance may be shared by every
/// component of a context.
pub struct SignedHttpClient {
    client: reqwest::Client,
    signer: OAuth1Signer,
}

// Custom Debug implementation that hides the credential secrets
impl std::fmt::Debug for SignedHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedHttpClient")
            .field("signer", &self.signer)
            .finish()
    }
}

impl SignedHttpClient {
    fn request_builder(&self, request: &ApiRequest) -> Result<reqwest::RequestBuilder> {
        let authorization = self
            .signer
            .authorization_header(request.method, &request.url, &request.form)?;

        let builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
            Method::Delete => self.client.delete(&request.url),
        }
        .header(AUTHORIZATION, authorization);

        Ok(if request.form.is_empty() {
            builder
        } else {
            builder.form(&request.form)
        })
    }
}

#[async_trait]
impl ApiTransport for SignedHttpClient {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let response = self
            .request_builder(&request)?
            .send()
            .await
            .map_err(|e| Error::transport(&request.url, format!("HTTP request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(&request.url, format!("Failed to read body: {}", e)))?;

        tracing::trace!("{} {} -> {} ({} bytes)", request.method, request.url, status, body.len());
        Ok(ApiResponse::new(status, body))
    }

    fn transport_name(&self) -> &'static str {
        "oauth1"
    }
}
