//! Test doubles and common utilities for contract tests
//!
//! The scripted transport answers requests from a routing table instead of
//! talking to an appliance, and records everything it was asked to send.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use titan_core::error::{Error, Result};
use titan_core::traits::{ApiRequest, ApiResponse, ApiTransport, Method};
use titan_core::{OAuthCredential, TitanConfig, TitanContext};

pub const BASE_URL: &str = "https://titan.test";

/// What the transport does for one route
#[derive(Debug, Clone)]
pub enum Reply {
    Respond(ApiResponse),
    /// Respond after sleeping
    Delayed(Duration, ApiResponse),
    /// Fail as if the connection broke
    Unreachable,
}

/// A mock ApiTransport that answers from a routing table
///
/// Unrouted requests get a 404.
pub struct ScriptedTransport {
    routes: Arc<Mutex<HashMap<(Method, String), Reply>>>,
    /// Every request, in the order it was sent
    requests: Arc<Mutex<Vec<ApiRequest>>>,
    /// Call counter for send()
    send_call_count: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            routes: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            send_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a transport that shares routes and counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            routes: Arc::clone(&other.routes),
            requests: Arc::clone(&other.requests),
            send_call_count: Arc::clone(&other.send_call_count),
        }
    }

    /// Route `method url` to `reply` (replacing any previous route)
    pub fn route(&self, method: Method, url: impl Into<String>, reply: Reply) {
        self.routes
            .lock()
            .unwrap()
            .insert((method, url.into()), reply);
    }

    /// Route `method url` to an immediate response
    pub fn respond(&self, method: Method, url: impl Into<String>, status: u16, body: impl Into<String>) {
        self.route(method, url, Reply::Respond(ApiResponse::new(status, body)));
    }

    /// Get the number of times send() was called
    pub fn send_call_count(&self) -> usize {
        self.send_call_count.load(Ordering::SeqCst)
    }

    /// Get every request sent so far
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests sent to `method url`
    pub fn calls_to(&self, method: Method, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }
}

#[async_trait]
impl ApiTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.send_call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let reply = self
            .routes
            .lock()
            .unwrap()
            .get(&(request.method, request.url.clone()))
            .cloned();

        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Delayed(delay, response)) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
            Some(Reply::Unreachable) => Err(Error::transport(request.url, "connection refused")),
            None => Ok(ApiResponse::new(404, "not found")),
        }
    }

    fn transport_name(&self) -> &'static str {
        "scripted"
    }
}

/// Context over a scripted transport that shares the given transport's counters
pub fn context_with(transport: &ScriptedTransport) -> Arc<TitanContext> {
    let config = TitanConfig::new(OAuthCredential::new(BASE_URL, "ck", "cs", "tk", "ts"));
    Arc::new(
        TitanContext::new(&config, Arc::new(ScriptedTransport::sharing_counters_with(transport)))
            .expect("context construction succeeds"),
    )
}

pub fn users_url() -> String {
    format!("{}/restapi/users", BASE_URL)
}

pub fn locations_url(customer_id: i64) -> String {
    format!("{}/restapi/users/{}/locations/dynamicip", BASE_URL, customer_id)
}

pub fn location_url(customer_id: i64, location_id: i64) -> String {
    format!(
        "{}/restapi/users/{}/locations/dynamicip/{}",
        BASE_URL, customer_id, location_id
    )
}

/// Users envelope for `(id, account_name)` pairs
pub fn users_body(accounts: &[(i64, &str)]) -> String {
    let data: Vec<_> = accounts
        .iter()
        .map(|(id, name)| {
            json!({
                "object": "user",
                "id": id,
                "account_name": name,
                "email": format!("admin@{}.test", name),
            })
        })
        .collect();

    json!({
        "object": "list",
        "code": 200,
        "count": data.len(),
        "total": data.len(),
        "data": data,
    })
    .to_string()
}

/// Locations envelope for `(id, name, ip)` triples
pub fn locations_body(locations: &[(i64, &str, &str)]) -> String {
    let data: Vec<_> = locations
        .iter()
        .map(|(id, name, ip)| {
            json!({
                "object": "location",
                "type": "dynamicip",
                "code": 0,
                "id": id,
                "name": name,
                "policyid": 1,
                "ip": ip,
            })
        })
        .collect();

    json!({
        "object": "list",
        "code": 200,
        "count": data.len(),
        "total": data.len(),
        "data": data,
    })
    .to_string()
}
