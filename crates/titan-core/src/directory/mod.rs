//! Customer account directory
//!
//! The directory fetches the appliance's customer accounts once and keeps
//! them for the lifetime of the instance. It is the only cache in the
//! client: there is no TTL, and a refresh only happens after an explicit
//! [`AccountDirectory::invalidate_accounts`].

use crate::context::TitanContext;
use crate::error::Result;
use crate::model::{CustomerAccount, UsersPage};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Memoized list of customer accounts plus a name → id index
#[derive(Debug)]
pub struct AccountDirectory {
    ctx: Arc<TitanContext>,
    accounts: Vec<CustomerAccount>,
    ids_by_name: HashMap<String, i64>,
}

impl AccountDirectory {
    /// Create an empty directory
    pub fn new(ctx: Arc<TitanContext>) -> Self {
        Self {
            ctx,
            accounts: Vec::new(),
            ids_by_name: HashMap::new(),
        }
    }

    /// Populate the directory from `GET /restapi/users`
    ///
    /// Returns immediately when accounts are already loaded. On any failure
    /// (transport, non-200, undecodable body) nothing is stored.
    pub async fn fetch_accounts(&mut self) -> Result<()> {
        if !self.accounts.is_empty() {
            debug!("Using {} memoized customer account(s)", self.accounts.len());
            return Ok(());
        }

        let endpoint = self.ctx.endpoints().users();
        info!(endpoint = %endpoint, "Retrieving WebTitan user accounts");

        let page: UsersPage = self.ctx.get_json(&endpoint).await.inspect_err(|e| {
            error!("Failed to retrieve user accounts: {}", e);
        })?;

        let accounts: Vec<CustomerAccount> = page.data.iter().map(CustomerAccount::from).collect();
        let ids_by_name = accounts
            .iter()
            .map(|a| (a.account_name.clone(), a.id))
            .collect();

        info!("Loaded {} customer account(s)", accounts.len());
        self.accounts = accounts;
        self.ids_by_name = ids_by_name;

        Ok(())
    }

    /// Forget the loaded accounts; the next fetch goes back to the appliance
    pub fn invalidate_accounts(&mut self) {
        debug!("Invalidating {} memoized customer account(s)", self.accounts.len());
        self.accounts.clear();
        self.ids_by_name.clear();
    }

    /// Whether accounts are currently loaded
    pub fn is_populated(&self) -> bool {
        !self.accounts.is_empty()
    }

    /// Loaded accounts, in the order the appliance returned them
    pub fn accounts(&self) -> &[CustomerAccount] {
        &self.accounts
    }

    /// Account id for an account name
    pub fn account_id(&self, account_name: &str) -> Option<i64> {
        self.ids_by_name.get(account_name).copied()
    }

    /// The account name → id index
    pub fn ids_by_name(&self) -> &HashMap<String, i64> {
        &self.ids_by_name
    }
}
