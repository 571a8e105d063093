//! Single-location mutations
//!
//! The LocationMutator creates, updates and deletes one location at a time.
//! It works independently of any aggregation run and never retries: every
//! failure goes back to the caller.

use crate::context::TitanContext;
use crate::error::{Error, Result};
use crate::model::Location;
use crate::traits::ApiRequest;
use std::sync::Arc;
use tracing::{debug, info};

/// What [`LocationMutator::upsert`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// POSTed to the collection; the appliance assigns the id
    Created,
    /// POSTed to the existing resource
    Updated,
}

/// What [`LocationMutator::delete`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The appliance removed the location
    Deleted,
    /// The guard refused the delete; no request was sent
    Skipped(SkipReason),
}

/// Why the delete guard refused a location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `customer_id` is 0
    MissingCustomer,
    /// `id` is 0, so nothing exists remotely
    NotCreated,
    /// `ip` is non-empty
    IpStillAssigned,
}

/// Precondition checked before any delete request
///
/// Deletion only proceeds for a created location of a known customer whose
/// IP field is empty. The IP rule is kept exactly as observed in production:
/// a location that still carries an IP is never deleted. Whether that
/// polarity is intended has not been confirmed by the appliance owners, so
/// it lives here, named, rather than inline in [`LocationMutator::delete`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteGuard;

impl DeleteGuard {
    /// `Some(reason)` when the delete must be skipped
    pub fn check(&self, location: &Location) -> Option<SkipReason> {
        if location.customer_id == 0 {
            Some(SkipReason::MissingCustomer)
        } else if location.id == 0 {
            Some(SkipReason::NotCreated)
        } else if !location.ip.is_empty() {
            Some(SkipReason::IpStillAssigned)
        } else {
            None
        }
    }
}

/// Issues create/update/delete requests for single locations
#[derive(Debug, Clone)]
pub struct LocationMutator {
    ctx: Arc<TitanContext>,
    guard: DeleteGuard,
}

impl LocationMutator {
    /// Create a mutator
    pub fn new(ctx: Arc<TitanContext>) -> Self {
        Self {
            ctx,
            guard: DeleteGuard,
        }
    }

    /// Create (`id == 0`) or update (`id != 0`) a location
    ///
    /// Both branches POST the form `ip=<ip>&name=<name>`; only the target
    /// differs. Anything but 200 is returned as [`Error::UpsertRejected`].
    pub async fn upsert(&self, location: &Location) -> Result<UpsertOutcome> {
        let endpoints = self.ctx.endpoints();
        let (endpoint, outcome) = if location.is_created() {
            (
                endpoints.location(location.customer_id, location.id),
                UpsertOutcome::Updated,
            )
        } else {
            (endpoints.locations(location.customer_id), UpsertOutcome::Created)
        };

        let form = vec![
            ("ip".to_string(), location.ip.clone()),
            ("name".to_string(), location.name.clone()),
        ];
        let response = self
            .ctx
            .execute(ApiRequest::post_form(endpoint.as_str(), form))
            .await?;

        if !response.is_ok() {
            return Err(Error::UpsertRejected {
                endpoint,
                name: location.name.clone(),
                ip: location.ip.clone(),
                status: response.status,
                body: response.body,
            });
        }

        info!(
            http_status = response.status,
            http_body = %response.body,
            "{} location {} ({})",
            match outcome {
                UpsertOutcome::Created => "Created",
                UpsertOutcome::Updated => "Updated",
            },
            location.name,
            location.ip
        );
        Ok(outcome)
    }

    /// Delete a location, subject to [`DeleteGuard`]
    ///
    /// A guarded location yields `Ok(DeleteOutcome::Skipped(_))` without any
    /// request. Anything but 200 is returned as [`Error::DeleteRejected`].
    pub async fn delete(&self, location: &Location) -> Result<DeleteOutcome> {
        if let Some(reason) = self.guard.check(location) {
            debug!(
                "Not deleting location {} of account {}: {:?}",
                location.id, location.customer_id, reason
            );
            return Ok(DeleteOutcome::Skipped(reason));
        }

        let endpoint = self
            .ctx
            .endpoints()
            .location(location.customer_id, location.id);
        let response = self.ctx.execute(ApiRequest::delete(endpoint)).await?;

        if !response.is_ok() {
            return Err(Error::DeleteRejected {
                customer_id: location.customer_id,
                location_id: location.id,
                status: response.status,
                body: response.body,
            });
        }

        info!(
            http_status = response.status,
            http_body = %response.body,
            "Deleted location {} of account {}",
            location.id,
            location.customer_id
        );
        Ok(DeleteOutcome::Deleted)
    }
}
