// # titan-core
//
// Core library for the WebTitan dynamic-IP location client.
//
// ## Architecture Overview
//
// This library talks to a WebTitan appliance's REST API and keeps an
// in-memory inventory of every customer's dynamic-IP locations:
// - **ApiTransport**: Trait for sending one (signed) HTTP request
// - **TitanContext**: Explicit session (endpoints, transport, deadline, cancellation)
// - **AccountDirectory**: Memoized list of customer accounts
// - **LocationFetcher**: Reads one account's location page
// - **LocationAggregator**: Builds the flat list and the IP / name indices
// - **LocationMutator**: Creates, updates and deletes single locations
//
// ## Design Principles
//
// 1. **No ambient state**: Everything a request needs travels in the context
// 2. **Transport-agnostic**: Signing and HTTP live behind `ApiTransport`
// 3. **Degrade, don't abort**: One unreadable account never sinks a run
// 4. **No hidden retries**: Every failure is surfaced to the caller
//
// ## Usage
//
// ```rust,ignore
// use std::sync::Arc;
// use titan_core::{LocationAggregator, TitanConfig, TitanContext};
//
// let ctx = Arc::new(TitanContext::new(&config, transport)?);
// let mut aggregator = LocationAggregator::new(Arc::clone(&ctx));
// let report = aggregator.aggregate().await?;
//
// if let Some(location) = aggregator.location_by_ip("203.0.113.7") {
//     println!("{} belongs to account {}", location.name, location.customer_id);
// }
// ```

pub mod aggregator;
pub mod config;
pub mod context;
pub mod directory;
pub mod endpoints;
pub mod error;
pub mod fetcher;
pub mod model;
pub mod mutator;
pub mod traits;

// Re-export core types for convenience
pub use aggregator::{
    AccountOutcome, AggregationReport, FetchStatus, LocationAggregator, LocationInventory,
};
pub use config::{LogEncoding, LoggingConfig, OAuthCredential, SessionConfig, TitanConfig};
pub use context::{CancelHandle, TitanContext};
pub use directory::AccountDirectory;
pub use endpoints::Endpoints;
pub use error::{Error, Result};
pub use fetcher::LocationFetcher;
pub use model::{CustomerAccount, Location, DYNAMIC_IP_KIND};
pub use mutator::{DeleteGuard, DeleteOutcome, LocationMutator, SkipReason, UpsertOutcome};
pub use traits::{ApiRequest, ApiResponse, ApiTransport, Method};
