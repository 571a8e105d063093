//! OAuth 1.0a request signing (HMAC-SHA1)
//!
//! The signer is pure: [`OAuth1Signer::authorization_header_with`] takes the
//! nonce and timestamp as inputs so the output can be checked against fixed
//! vectors. [`OAuth1Signer::authorization_header`] fills both in.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use reqwest::Url;
use sha1::Sha1;
use titan_core::{Error, Method, OAuthCredential, Result};

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const VERSION: &str = "1.0";

/// Signs requests with one consumer/token pair
#[derive(Clone)]
pub struct OAuth1Signer {
    consumer_key: String,
    consumer_secret: String,
    token_key: String,
    token_secret: String,
}

// Custom Debug implementation that hides both secrets
impl std::fmt::Debug for OAuth1Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth1Signer")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<REDACTED>")
            .field("token_key", &self.token_key)
            .field("token_secret", &"<REDACTED>")
            .finish()
    }
}

impl OAuth1Signer {
    /// Create a signer from a credential (the base URL is not used)
    pub fn new(credential: &OAuthCredential) -> Self {
        Self {
            consumer_key: credential.consumer_key.clone(),
            consumer_secret: credential.consumer_secret.clone(),
            token_key: credential.token_key.clone(),
            token_secret: credential.token_secret.clone(),
        }
    }

    /// `Authorization` header value with a fresh nonce and the current time
    pub fn authorization_header(
        &self,
        method: Method,
        url: &str,
        form: &[(String, String)],
    ) -> Result<String> {
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        let timestamp = chrono::Utc::now().timestamp().to_string();
        self.authorization_header_with(method, url, form, &nonce, &timestamp)
    }

    /// `Authorization` header value for a given nonce and timestamp
    ///
    /// `form` holds the decoded fields of an
    /// `application/x-www-form-urlencoded` body; they take part in the
    /// signature alongside the URL's query parameters.
    pub fn authorization_header_with(
        &self,
        method: Method,
        url: &str,
        form: &[(String, String)],
        nonce: &str,
        timestamp: &str,
    ) -> Result<String> {
        let mut oauth_params = self.oauth_params(nonce, timestamp);
        let signature = self.signature(method, url, form, &oauth_params)?;
        oauth_params.push(("oauth_signature", signature));
        oauth_params.sort();

        let fields: Vec<String> = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, encode(v)))
            .collect();

        Ok(format!("OAuth {}", fields.join(", ")))
    }

    fn oauth_params(&self, nonce: &str, timestamp: &str) -> Vec<(&'static str, String)> {
        vec![
            ("oauth_consumer_key", self.consumer_key.clone()),
            ("oauth_nonce", nonce.to_string()),
            ("oauth_signature_method", SIGNATURE_METHOD.to_string()),
            ("oauth_timestamp", timestamp.to_string()),
            ("oauth_token", self.token_key.clone()),
            ("oauth_version", VERSION.to_string()),
        ]
    }

    fn signature(
        &self,
        method: Method,
        url: &str,
        form: &[(String, String)],
        oauth_params: &[(&'static str, String)],
    ) -> Result<String> {
        let base = signature_base_string(method, url, form, oauth_params)?;
        let key = format!(
            "{}&{}",
            encode(&self.consumer_secret),
            encode(&self.token_secret)
        );

        let mut mac = HmacSha1::new_from_slice(key.as_bytes())
            .map_err(|e| Error::config(format!("Invalid OAuth1 signing key: {}", e)))?;
        mac.update(base.as_bytes());

        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

/// `METHOD&enc(base_url)&enc(normalized params)`
pub fn signature_base_string(
    method: Method,
    url: &str,
    form: &[(String, String)],
    oauth_params: &[(&str, String)],
) -> Result<String> {
    let parsed =
        Url::parse(url).map_err(|e| Error::transport(url, format!("Invalid URL: {}", e)))?;

    let mut params: Vec<(String, String)> = oauth_params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    params.extend(parsed.query_pairs().map(|(k, v)| (encode(&k), encode(&v))));
    params.extend(form.iter().map(|(k, v)| (encode(k), encode(v))));
    params.sort();

    let normalized: Vec<String> = params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();

    Ok(format!(
        "{}&{}&{}",
        method.as_str(),
        encode(&base_url(&parsed)),
        encode(&normalized.join("&"))
    ))
}

// Scheme and host are already lowercased by the parser, default ports dropped
fn base_url(url: &Url) -> String {
    let port = url.port().map(|p| format!(":{}", p)).unwrap_or_default();
    format!(
        "{}://{}{}{}",
        url.scheme(),
        url.host_str().unwrap_or_default(),
        port,
        url.path()
    )
}

// RFC 3986: everything but ALPHA / DIGIT / "-" / "." / "_" / "~"
fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
