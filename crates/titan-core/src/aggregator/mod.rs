//! Multi-account location aggregator
//!
//! The LocationAggregator is responsible for:
//! - Making sure the account directory is populated
//! - Fetching every account's locations
//! - Merging the results into a flat list and two lookup indices
//! - Reporting which accounts could not be read
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ AccountDirectory │─── accounts ───┐
//! └──────────────────┘                │
//!                                     ▼
//!                          ┌────────────────────┐
//!                          │ LocationAggregator │
//!                          └────────────────────┘
//!                                     │
//!         ┌───────────────────────────┼───────────────────────────┐
//!         │                           │                           │
//!         ▼                           ▼                           ▼
//! ┌─────────────────┐       ┌───────────────────┐       ┌───────────────────┐
//! │ LocationFetcher │       │ LocationInventory │       │ AggregationReport │
//! │ (per account)   │       │ (list + indices)  │       │ (per-account)     │
//! └─────────────────┘       └───────────────────┘       └───────────────────┘
//! ```
//!
//! ## Flow
//!
//! 1. Populate the directory (failure aborts the run)
//! 2. Reset list and indices
//! 3. Fetch each account's locations, up to `fetch_concurrency` at a time
//! 4. Merge pages in account order; record failed accounts and move on
//! 5. Return the per-account report

mod inventory;

pub use inventory::LocationInventory;

use crate::context::TitanContext;
use crate::directory::AccountDirectory;
use crate::error::{Error, Result};
use crate::fetcher::LocationFetcher;
use crate::model::{CustomerAccount, Location};
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Outcome of one account during an aggregation run
#[derive(Debug)]
pub struct AccountOutcome {
    pub account_id: i64,
    pub account_name: String,
    pub status: FetchStatus,
}

/// Whether an account's locations made it into the inventory
#[derive(Debug)]
pub enum FetchStatus {
    /// Page fetched and merged
    Fetched { location_count: usize },
    /// Fetch failed; the account contributed nothing
    Failed { error: Error },
}

/// Per-account result of [`LocationAggregator::aggregate`]
#[derive(Debug, Default)]
pub struct AggregationReport {
    outcomes: Vec<AccountOutcome>,
}

impl AggregationReport {
    /// One outcome per account, in account order
    pub fn outcomes(&self) -> &[AccountOutcome] {
        &self.outcomes
    }

    /// Accounts whose fetch failed
    pub fn failures(&self) -> impl Iterator<Item = (&AccountOutcome, &Error)> {
        self.outcomes.iter().filter_map(|o| match &o.status {
            FetchStatus::Failed { error } => Some((o, error)),
            FetchStatus::Fetched { .. } => None,
        })
    }

    /// Number of accounts whose locations were merged
    pub fn succeeded_accounts(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, FetchStatus::Fetched { .. }))
            .count()
    }

    /// Whether at least one account could not be read
    pub fn is_degraded(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Total number of locations merged during the run
    pub fn location_count(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o.status {
                FetchStatus::Fetched { location_count } => location_count,
                FetchStatus::Failed { .. } => 0,
            })
            .sum()
    }
}

/// Builds the location inventory across every customer account
///
/// ## Lifecycle
///
/// 1. Create with [`LocationAggregator::new()`]
/// 2. Call [`LocationAggregator::aggregate()`] as often as needed; accounts
///    are fetched once, locations on every run
/// 3. Read results through the accessors
///
/// ## Threading
///
/// `aggregate` takes `&mut self`: one run at a time per instance. Inside a
/// run, account fetches may overlap (see `SessionConfig::fetch_concurrency`)
/// but merging happens on this task only, in account order, so the result is
/// the same as a sequential run.
#[derive(Debug)]
pub struct LocationAggregator {
    ctx: Arc<TitanContext>,
    directory: AccountDirectory,
    fetcher: LocationFetcher,
    inventory: LocationInventory,
}

impl LocationAggregator {
    /// Create an aggregator with an empty directory
    pub fn new(ctx: Arc<TitanContext>) -> Self {
        Self {
            directory: AccountDirectory::new(Arc::clone(&ctx)),
            fetcher: LocationFetcher::new(Arc::clone(&ctx)),
            inventory: LocationInventory::new(),
            ctx,
        }
    }

    /// Run one aggregation pass
    ///
    /// # Returns
    ///
    /// - `Ok(AggregationReport)`: Every account was attempted; check
    ///   [`AggregationReport::is_degraded`] for per-account failures
    /// - `Err(Error)`: The account directory could not be populated
    pub async fn aggregate(&mut self) -> Result<AggregationReport> {
        self.directory.fetch_accounts().await.inspect_err(|e| {
            error!("Aborting aggregation, accounts unavailable: {}", e);
        })?;

        self.inventory.clear();

        let accounts: Vec<CustomerAccount> = self.directory.accounts().to_vec();
        let concurrency = self.ctx.fetch_concurrency();
        debug!(
            "Fetching locations for {} account(s), {} at a time",
            accounts.len(),
            concurrency
        );

        let fetcher = &self.fetcher;
        // `buffered` yields in input order, which keeps last-write-wins
        // deterministic whatever the concurrency.
        let mut pages = std::pin::pin!(
            futures::stream::iter(accounts.iter())
                .map(|account| async move {
                    (account, fetcher.fetch_locations_for_account(account.id).await)
                })
                .buffered(concurrency)
        );

        let mut outcomes = Vec::with_capacity(accounts.len());
        while let Some((account, result)) = pages.next().await {
            let status = match result {
                Ok(page) => {
                    for record in &page.data {
                        self.inventory.insert(record.to_location(account.id));
                    }
                    debug!(
                        "Merged {} location(s) from account {} ({})",
                        page.data.len(),
                        account.id,
                        account.account_name
                    );
                    FetchStatus::Fetched {
                        location_count: page.data.len(),
                    }
                }
                Err(e) => {
                    error!(
                        "Skipping account {} ({}): {}",
                        account.id, account.account_name, e
                    );
                    FetchStatus::Failed { error: e }
                }
            };

            outcomes.push(AccountOutcome {
                account_id: account.id,
                account_name: account.account_name.clone(),
                status,
            });
        }

        let report = AggregationReport { outcomes };
        if report.is_degraded() {
            warn!(
                "Aggregated {} location(s) from {}/{} account(s)",
                self.inventory.len(),
                report.succeeded_accounts(),
                accounts.len()
            );
        } else {
            info!(
                "Aggregated {} location(s) from {} account(s)",
                self.inventory.len(),
                accounts.len()
            );
        }

        Ok(report)
    }

    /// Locations from the last run, in account order then page order
    pub fn locations(&self) -> &[Location] {
        self.inventory.locations()
    }

    /// Location indexed under `ip` by the last run
    pub fn location_by_ip(&self, ip: &str) -> Option<&Location> {
        self.inventory.by_ip(ip)
    }

    /// Location indexed under `name` by the last run
    pub fn location_by_name(&self, name: &str) -> Option<&Location> {
        self.inventory.by_name(name)
    }

    /// IP index of the last run as `(trimmed ip, location)` pairs
    pub fn locations_by_ip(&self) -> impl Iterator<Item = (&str, &Location)> {
        self.inventory.ip_index()
    }

    /// Name index of the last run as `(trimmed name, location)` pairs
    pub fn locations_by_name(&self) -> impl Iterator<Item = (&str, &Location)> {
        self.inventory.name_index()
    }

    /// The whole inventory from the last run
    pub fn inventory(&self) -> &LocationInventory {
        &self.inventory
    }

    /// Customer accounts known to the directory
    pub fn accounts(&self) -> &[CustomerAccount] {
        self.directory.accounts()
    }

    /// Account id for an account name
    pub fn account_id(&self, account_name: &str) -> Option<i64> {
        self.directory.account_id(account_name)
    }

    /// The account directory (e.g. to invalidate it before the next run)
    pub fn directory_mut(&mut self) -> &mut AccountDirectory {
        &mut self.directory
    }
}
