//! Effective-state calculation.
//!
//! Derives, for one profile at one instant, the plan tier it actually
//! ranks at once active upgrades are applied, plus the positional flags
//! the orchestrator needs. Absence of data (no plan, expired plan,
//! unknown codes, grants with missing timestamps) is a modeled outcome,
//! never an error: such profiles come back with the ineligible sentinel
//! or with the offending grant ignored.

use crate::catalog::{CatalogError, PlanCatalog};
use crate::models::{
    EffectiveState, PositionRule, Profile, UpgradeDefinition, UpgradeEffect, UpgradeGrant,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::warn;

/// Everything one ranking pass needs to know about a profile. The
/// orchestrator consumes the pin timestamp and the score bonus on top of
/// the public `EffectiveState`.
#[derive(Debug, Clone)]
pub struct ProfileDerivation {
    pub state: EffectiveState,
    /// Most recent purchase among active front-pin grants, when the pin
    /// qualifies. Drives "last boosted wins the front" ordering.
    pub front_pin_purchase_at: Option<DateTime<Utc>>,
    /// Sum of active flat score bonuses, clamped by the score function.
    pub priority_bonus: i64,
}

impl ProfileDerivation {
    fn ineligible() -> Self {
        Self {
            state: EffectiveState::ineligible(),
            front_pin_purchase_at: None,
            priority_bonus: 0,
        }
    }
}

/// Derive a profile's effective state plus orchestrator-side extras.
pub async fn derive_profile(
    profile: &Profile,
    catalog: &dyn PlanCatalog,
    now: DateTime<Utc>,
) -> Result<ProfileDerivation, CatalogError> {
    let assignment = match &profile.assignment {
        Some(assignment) if assignment.is_active(now) => assignment,
        _ => return Ok(ProfileDerivation::ineligible()),
    };

    let plan = match catalog.find_plan_by_code(&assignment.plan_code).await? {
        Some(plan) => plan,
        None => {
            warn!(
                profile_id = %profile.id,
                plan_code = %assignment.plan_code,
                "plan code not found in catalog, profile ineligible"
            );
            return Ok(ProfileDerivation::ineligible());
        }
    };

    let original_level = plan.level as u32;
    let variant_days = assignment.variant_days.unwrap_or(0);

    let active_grants: Vec<&UpgradeGrant> = profile
        .upgrades
        .iter()
        .filter(|grant| grant.is_active(now))
        .collect();

    // Codes in effect right now: time-active purchased grants plus the
    // upgrades the plan itself includes (no window on those). BTreeMap
    // keeps effect application order deterministic.
    let mut resolved: BTreeMap<String, UpgradeDefinition> = BTreeMap::new();
    let grant_codes = active_grants.iter().map(|grant| grant.code.as_str());
    let included_codes = plan.included_upgrades.iter().map(String::as_str);
    for code in grant_codes.chain(included_codes) {
        if resolved.contains_key(code) {
            continue;
        }
        match catalog.find_upgrade_by_code(code).await? {
            Some(upgrade) => {
                resolved.insert(code.to_string(), upgrade);
            }
            None => {
                warn!(
                    profile_id = %profile.id,
                    upgrade_code = %code,
                    "upgrade code not found in catalog, grant ignored"
                );
            }
        }
    }

    let mut effective_level = original_level;
    let mut explicit_score_boost = false;
    let mut front_pin_grant_active = false;
    let mut priority_bonus: i64 = 0;

    for upgrade in resolved.values() {
        match upgrade.effect {
            UpgradeEffect::LevelDelta(delta) => {
                explicit_score_boost = true;
                let shifted = effective_level as i64 + delta as i64;
                effective_level = shifted.clamp(1, 5) as u32;
            }
            UpgradeEffect::SetLevelTo(level) => {
                explicit_score_boost = true;
                effective_level = (level as u32).clamp(1, 5);
            }
            UpgradeEffect::PriorityBonus(bonus) => {
                priority_bonus += bonus;
            }
            UpgradeEffect::Position(PositionRule::Front) => {
                front_pin_grant_active = true;
            }
            // Back/ByScore place through the normal score path.
            UpgradeEffect::Position(_) => {}
        }
    }

    let native_best_tier = original_level == 1;
    // A profile already on the best tier cannot rise further but is
    // still flagged as boosted, and satisfies the pin prerequisite.
    let has_score_boost = explicit_score_boost || native_best_tier;
    // A front-pin grant with no qualifying score boost is ignored; the
    // prerequisite is enforced here even though purchase-time validation
    // should have guaranteed it.
    let has_front_pin = front_pin_grant_active && (explicit_score_boost || native_best_tier);

    let front_pin_purchase_at = if has_front_pin {
        active_grants
            .iter()
            .filter(|grant| {
                resolved
                    .get(&grant.code)
                    .is_some_and(|u| u.effect == UpgradeEffect::Position(PositionRule::Front))
            })
            .map(|grant| grant.purchase_at)
            .max()
    } else {
        None
    };

    Ok(ProfileDerivation {
        state: EffectiveState {
            effective_level,
            effective_variant_days: variant_days,
            has_front_pin,
            has_score_boost,
            original_level,
        },
        front_pin_purchase_at,
        priority_bonus,
    })
}

/// Effective state only, without the orchestrator extras.
pub async fn compute_effective_state(
    profile: &Profile,
    catalog: &dyn PlanCatalog,
    now: DateTime<Utc>,
) -> Result<EffectiveState, CatalogError> {
    Ok(derive_profile(profile, catalog, now).await?.state)
}
