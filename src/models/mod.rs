use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sentinel effective level for profiles that cannot be ranked
/// (no plan assignment, expired plan, or unresolvable plan code).
pub const INELIGIBLE_LEVEL: u32 = 999;

/// Plan tier reference data. Created and edited by administrators,
/// read-only to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanDefinition {
    pub code: String,
    /// 1 = most favorable tier, 5 = least favorable.
    pub level: u8,
    pub variants: Vec<PlanVariant>,
    pub features: PlanFeatures,
    /// Upgrade codes granted implicitly by holding this plan.
    pub included_upgrades: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanVariant {
    pub days: u32,
    pub price_cents: i64,
}

/// Feed surfaces a plan can appear on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedSurface {
    Home,
    Filters,
    Sponsored,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanFeatures {
    pub show_in_home: bool,
    pub show_in_filters: bool,
    pub show_in_sponsored: bool,
}

impl PlanFeatures {
    pub fn allows(&self, surface: FeedSurface) -> bool {
        match surface {
            FeedSurface::Home => self.show_in_home,
            FeedSurface::Filters => self.show_in_filters,
            FeedSurface::Sponsored => self.show_in_sponsored,
        }
    }
}

/// Upgrade reference data. The engine consumes the time-boxed grants
/// that purchases produce; it does not execute purchases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeDefinition {
    pub code: String,
    pub duration_hours: u32,
    /// Prerequisite upgrade codes that must be active at purchase time.
    pub requires: Vec<String>,
    pub stacking: StackingPolicy,
    pub effect: UpgradeEffect,
}

/// What happens when an upgrade is purchased while a grant of the same
/// code is still active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackingPolicy {
    Extend,
    Replace,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UpgradeEffect {
    /// Relative level change, negative = toward best. Clamped to tier 1.
    LevelDelta(i8),
    /// Absolute level override.
    SetLevelTo(u8),
    /// Flat score bonus, clamped downstream so it never crosses bands.
    PriorityBonus(i64),
    /// Positional effect independent of score.
    Position(PositionRule),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionRule {
    Front,
    Back,
    ByScore,
}

/// A profile's current plan subscription window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileAssignment {
    pub plan_code: String,
    pub variant_days: Option<u32>,
    pub start_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ProfileAssignment {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// One purchased upgrade window. Append-only history; multiple grants of
/// the same code may coexist, only the currently-active ones matter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeGrant {
    pub code: String,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub purchase_at: DateTime<Utc>,
}

impl UpgradeGrant {
    /// Active iff `start_at <= now < end_at`. Grants with missing
    /// timestamps are treated as inactive, never as an error.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        match (self.start_at, self.end_at) {
            (Some(start), Some(end)) => start <= now && now < end,
            _ => false,
        }
    }
}

/// Ranking candidate. The caller supplies profiles already filtered to
/// business eligibility (active, visible, owner verified).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub assignment: Option<ProfileAssignment>,
    pub upgrades: Vec<UpgradeGrant>,
}

/// Derived per-pass state. Recomputed on every ranking pass, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveState {
    pub effective_level: u32,
    pub effective_variant_days: u32,
    pub has_front_pin: bool,
    pub has_score_boost: bool,
    pub original_level: u32,
}

impl EffectiveState {
    pub fn ineligible() -> Self {
        Self {
            effective_level: INELIGIBLE_LEVEL,
            effective_variant_days: 0,
            has_front_pin: false,
            has_score_boost: false,
            original_level: INELIGIBLE_LEVEL,
        }
    }

    pub fn is_eligible(&self) -> bool {
        self.effective_level != INELIGIBLE_LEVEL
    }
}

/// A candidate with its derived state and score attached.
#[derive(Debug, Clone)]
pub struct RankedProfile {
    pub profile: Profile,
    pub state: EffectiveState,
    pub score: i64,
}

/// One contiguous run of a single effective level in the final order,
/// for callers that render tier boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRun {
    pub level: u32,
    pub start_index: usize,
    pub count: usize,
}

/// One page sliced from a full ranking pass.
#[derive(Debug, Clone)]
pub struct RankedPage {
    pub items: Vec<RankedProfile>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
    pub level_runs: Vec<LevelRun>,
}

/// Per-pass counters, logged after each ranking pass.
#[derive(Debug, Clone, Default)]
pub struct RankingStats {
    pub candidates: usize,
    pub eligible: usize,
    pub ineligible: usize,
    pub front_pinned: usize,
    pub score_groups: usize,
}
