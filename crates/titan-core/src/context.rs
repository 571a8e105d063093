//! Session context
//!
//! A [`TitanContext`] is built once per process (or per appliance) and handed
//! to every component by `Arc`. It owns everything a request needs: the
//! endpoint layout derived from the credential, the transport, the request
//! deadline and the cancellation signal. Components never reach for ambient
//! global state.

use crate::config::TitanConfig;
use crate::endpoints::Endpoints;
use crate::error::{Error, Result};
use crate::traits::{ApiRequest, ApiResponse, ApiTransport};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Shared state for every call made against one appliance
pub struct TitanContext {
    endpoints: Endpoints,
    transport: Arc<dyn ApiTransport>,
    request_timeout: Option<Duration>,
    fetch_concurrency: usize,
    cancel_tx: Arc<watch::Sender<bool>>,
}

impl std::fmt::Debug for TitanContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TitanContext")
            .field("endpoints", &self.endpoints)
            .field("transport", &self.transport.transport_name())
            .field("request_timeout", &self.request_timeout)
            .field("fetch_concurrency", &self.fetch_concurrency)
            .finish()
    }
}

impl TitanContext {
    /// Create a context from configuration and a transport
    ///
    /// # Returns
    ///
    /// - `Ok(TitanContext)`: Ready to be shared
    /// - `Err(Error::Config)`: If the session settings are invalid
    pub fn new(config: &TitanConfig, transport: Arc<dyn ApiTransport>) -> Result<Self> {
        config.session.validate()?;

        let (cancel_tx, _) = watch::channel(false);

        Ok(Self {
            endpoints: Endpoints::new(config.credential.base_url.as_str()),
            transport,
            request_timeout: config.session.request_timeout(),
            fetch_concurrency: config.session.fetch_concurrency,
            cancel_tx: Arc::new(cancel_tx),
        })
    }

    /// Override the per-request deadline (`None` = transport default)
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Override how many accounts the aggregator fetches at once
    ///
    /// # Returns
    ///
    /// - `Ok(TitanContext)`: With the new concurrency
    /// - `Err(Error::Config)`: If `fetch_concurrency` is 0
    pub fn with_fetch_concurrency(mut self, fetch_concurrency: usize) -> Result<Self> {
        if fetch_concurrency == 0 {
            return Err(Error::config("fetch_concurrency must be > 0"));
        }
        self.fetch_concurrency = fetch_concurrency;
        Ok(self)
    }

    /// Endpoint layout of the appliance
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Maximum number of concurrent account fetches
    pub fn fetch_concurrency(&self) -> usize {
        self.fetch_concurrency
    }

    /// Handle that cancels every in-flight and future request of this context
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            tx: Arc::clone(&self.cancel_tx),
        }
    }

    /// Send one request, applying the deadline and the cancellation signal
    ///
    /// Deadline expiry and cancellation are reported as
    /// [`Error::Transport`], the same as connection failures.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let endpoint = request.url.clone();
        let method = request.method;
        let cancel_rx = self.cancel_tx.subscribe();

        if *cancel_rx.borrow() {
            return Err(Error::transport(endpoint, "request cancelled"));
        }

        debug!("{} {}", method, endpoint);

        let send = self.transport.send(request);
        let result = tokio::select! {
            result = with_deadline(send, self.request_timeout, &endpoint) => result,
            _ = wait_cancelled(cancel_rx) => {
                warn!("{} {} cancelled", method, endpoint);
                Err(Error::transport(endpoint.as_str(), "request cancelled"))
            }
        };

        if let Ok(ref response) = result {
            debug!("{} {} -> {}", method, endpoint, response.status);
        }
        result
    }

    /// GET a list endpoint and decode its envelope
    ///
    /// Anything but a 200 is an [`Error::HttpStatus`]; a body that does not
    /// decode is an [`Error::Decode`]. Decoding is all-or-nothing.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.execute(ApiRequest::get(url)).await?;

        if !response.is_ok() {
            return Err(Error::HttpStatus {
                endpoint: url.to_string(),
                status: response.status,
                body: response.body,
            });
        }

        serde_json::from_str(&response.body).map_err(|e| Error::decode(url, e.to_string()))
    }
}

/// Cancels requests issued through a [`TitanContext`]
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Cancel every in-flight request and fail every later one
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Whether [`CancelHandle::cancel`] has been called
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

async fn with_deadline<F>(send: F, timeout: Option<Duration>, endpoint: &str) -> Result<ApiResponse>
where
    F: std::future::Future<Output = Result<ApiResponse>>,
{
    match timeout {
        Some(limit) => match tokio::time::timeout(limit, send).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Request to {} exceeded deadline of {:?}", endpoint, limit);
                Err(Error::transport(
                    endpoint,
                    format!("deadline of {:?} exceeded", limit),
                ))
            }
        },
        None => send.await,
    }
}

// Resolves once the flag flips to true; never resolves if the sender is gone
async fn wait_cancelled(mut rx: watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OAuthCredential;
    use async_trait::async_trait;

    /// Answers every request after `delay` with a fixed response
    struct DelayedTransport {
        delay: Duration,
        response: ApiResponse,
    }

    #[async_trait]
    impl ApiTransport for DelayedTransport {
        async fn send(&self, _request: ApiRequest) -> Result<ApiResponse> {
            tokio::time::sleep(self.delay).await;
            Ok(self.response.clone())
        }

        fn transport_name(&self) -> &'static str {
            "delayed"
        }
    }

    fn context(delay: Duration, response: ApiResponse) -> TitanContext {
        let config = TitanConfig::new(OAuthCredential::new("https://titan.test", "", "", "", ""));
        TitanContext::new(&config, Arc::new(DelayedTransport { delay, response })).unwrap()
    }

    #[tokio::test]
    async fn deadline_maps_to_transport_error() {
        let ctx = context(Duration::from_millis(500), ApiResponse::new(200, "{}"))
            .with_request_timeout(Some(Duration::from_millis(20)));

        let err = ctx
            .execute(ApiRequest::get("https://titan.test/restapi/users"))
            .await
            .unwrap_err();
        assert!(err.is_transport(), "expected transport error, got {:?}", err);
    }

    #[tokio::test]
    async fn cancellation_maps_to_transport_error() {
        let ctx = Arc::new(
            context(Duration::from_secs(30), ApiResponse::new(200, "{}")).with_request_timeout(None),
        );
        let handle = ctx.cancel_handle();

        let worker = {
            let ctx = Arc::clone(&ctx);
            tokio::spawn(async move {
                ctx.execute(ApiRequest::get("https://titan.test/restapi/users"))
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();

        let err = worker.await.unwrap().unwrap_err();
        assert!(err.is_transport());
        assert!(handle.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_context_fails_fast() {
        let ctx = context(Duration::ZERO, ApiResponse::new(200, "{}"));
        ctx.cancel_handle().cancel();

        let err = ctx
            .execute(ApiRequest::get("https://titan.test/restapi/users"))
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn non_200_is_http_status_error() {
        let ctx = context(Duration::ZERO, ApiResponse::new(403, "forbidden"));

        let err = ctx
            .get_json::<serde_json::Value>("https://titan.test/restapi/users")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(403));
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let ctx = context(Duration::ZERO, ApiResponse::new(200, "<html>"));

        let err = ctx
            .get_json::<serde_json::Value>("https://titan.test/restapi/users")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn zero_concurrency_rejected_at_construction() {
        let mut config = TitanConfig::default();
        config.session.fetch_concurrency = 0;
        let transport = Arc::new(DelayedTransport {
            delay: Duration::ZERO,
            response: ApiResponse::new(200, ""),
        });
        assert!(TitanContext::new(&config, transport).is_err());
    }

    #[test]
    fn zero_concurrency_rejected_by_override() {
        let ctx = context(Duration::ZERO, ApiResponse::new(200, ""));
        let err = ctx.with_fetch_concurrency(0).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "expected config error, got {:?}", err);

        let ctx = context(Duration::ZERO, ApiResponse::new(200, ""))
            .with_fetch_concurrency(4)
            .unwrap();
        assert_eq!(ctx.fetch_concurrency(), 4);
    }
}
