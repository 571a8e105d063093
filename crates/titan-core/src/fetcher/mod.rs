//! Per-account location fetcher
//!
//! One account, one request, one page. The fetcher hands the raw page back
//! and leaves indexing to the aggregator.

use crate::context::TitanContext;
use crate::error::Result;
use crate::model::LocationPage;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Fetches the dynamic-IP locations of a single customer account
#[derive(Debug, Clone)]
pub struct LocationFetcher {
    ctx: Arc<TitanContext>,
}

impl LocationFetcher {
    /// Create a fetcher
    pub fn new(ctx: Arc<TitanContext>) -> Self {
        Self { ctx }
    }

    /// `GET /restapi/users/{account_id}/locations/dynamicip`
    ///
    /// Only the first page is read. When the appliance reports more records
    /// than it returned, the rest are not requested.
    pub async fn fetch_locations_for_account(&self, account_id: i64) -> Result<LocationPage> {
        let endpoint = self.ctx.endpoints().locations(account_id);
        info!(endpoint = %endpoint, "Retrieving WebTitan locations");

        let page: LocationPage = self.ctx.get_json(&endpoint).await.inspect_err(|e| {
            error!("Failed to retrieve locations for account {}: {}", account_id, e);
        })?;

        if page.is_truncated() {
            warn!(
                "Account {} has {} location(s) but only {} were returned; the rest are ignored",
                account_id, page.total, page.count
            );
        }

        Ok(page)
    }
}
