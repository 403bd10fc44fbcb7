//! Grant window computation.
//!
//! Purchases happen outside this crate, but the time-boxed windows they
//! produce are computed here so every caller applies the same stacking
//! and prerequisite rules. Payment, pricing and coupons stay out of
//! scope.

use crate::models::{StackingPolicy, UpgradeDefinition, UpgradeGrant};
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrantError {
    #[error("prerequisite upgrade {0} is not active")]
    MissingPrerequisite(String),
    #[error("upgrade {0} is already active and does not stack")]
    AlreadyActive(String),
}

/// Compute the grant a purchase of `upgrade` at `now` would produce,
/// given the profile's existing grant history.
///
/// Prerequisites must be active at purchase time. When a grant of the
/// same code is still running, the stacking policy decides: `Extend`
/// pushes the running window's end out by the upgrade duration,
/// `Replace` opens a fresh window at `now`, `Reject` refuses.
pub fn apply_purchase(
    existing: &[UpgradeGrant],
    upgrade: &UpgradeDefinition,
    now: DateTime<Utc>,
) -> Result<UpgradeGrant, GrantError> {
    for required in &upgrade.requires {
        let met = existing
            .iter()
            .any(|grant| grant.code == *required && grant.is_active(now));
        if !met {
            return Err(GrantError::MissingPrerequisite(required.clone()));
        }
    }

    let duration = Duration::hours(upgrade.duration_hours as i64);
    let running_end = existing
        .iter()
        .filter(|grant| grant.code == upgrade.code && grant.is_active(now))
        .filter_map(|grant| grant.end_at)
        .max();

    let (start_at, end_at) = match (running_end, upgrade.stacking) {
        (Some(_), StackingPolicy::Reject) => {
            return Err(GrantError::AlreadyActive(upgrade.code.clone()));
        }
        (Some(end), StackingPolicy::Extend) => (now, end + duration),
        (Some(_), StackingPolicy::Replace) | (None, _) => (now, now + duration),
    };

    Ok(UpgradeGrant {
        code: upgrade.code.clone(),
        start_at: Some(start_at),
        end_at: Some(end_at),
        purchase_at: now,
    })
}
