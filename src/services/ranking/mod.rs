//! Ranking orchestration.
//!
//! Composes the effective-state calculator, the score function and the
//! fairness shuffler over a candidate set:
//!
//! 1. Derive state + score per profile (order-insensitive, awaited
//!    concurrently)
//! 2. Drop ineligible profiles
//! 3. Group by effective level, ascending (best tier first)
//! 4. Within a level: front-pinned profiles by purchase recency, then
//!    score groups descending, each group shuffled with the single
//!    rotation-window seed shared by the whole pass
//! 5. Paginate as a pure slice over that one total order
//!
//! A defective record never fails the batch; only a catalog transport
//! failure aborts the pass.

use crate::catalog::{CatalogError, PlanCatalog};
use crate::config::EngineConfig;
use crate::models::{LevelRun, Profile, RankedPage, RankedProfile, RankingStats};
use crate::services::effective_state::{derive_profile, ProfileDerivation};
use crate::services::rotation::{rotation_seed, shuffle};
use crate::services::scoring::compute_score;
use crate::utils::total_pages;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

pub type Result<T> = std::result::Result<T, EngineError>;

struct Entry {
    profile: Profile,
    derivation: ProfileDerivation,
    score: i64,
}

pub struct RankingOrchestrator {
    catalog: Arc<dyn PlanCatalog>,
    config: EngineConfig,
}

impl RankingOrchestrator {
    pub fn new(catalog: Arc<dyn PlanCatalog>, config: EngineConfig) -> Self {
        Self { catalog, config }
    }

    /// Full total order over the eligible candidates, using the rotation
    /// seed of the window containing `now`.
    pub async fn rank(
        &self,
        profiles: Vec<Profile>,
        now: DateTime<Utc>,
    ) -> Result<Vec<RankedProfile>> {
        let seed = rotation_seed(now, &self.config);
        self.rank_with_seed(profiles, now, seed).await
    }

    /// Same as [`rank`](Self::rank) with an explicit seed, for callers
    /// that need reproducible orderings.
    pub async fn rank_with_seed(
        &self,
        profiles: Vec<Profile>,
        now: DateTime<Utc>,
        seed: u64,
    ) -> Result<Vec<RankedProfile>> {
        let mut stats = RankingStats {
            candidates: profiles.len(),
            ..RankingStats::default()
        };

        // Per-profile derivation is independent; await the batch at once.
        let derivations = join_all(
            profiles
                .iter()
                .map(|profile| derive_profile(profile, self.catalog.as_ref(), now)),
        )
        .await
        .into_iter()
        .collect::<std::result::Result<Vec<_>, CatalogError>>()?;

        let mut by_level: BTreeMap<u32, Vec<Entry>> = BTreeMap::new();
        for (profile, derivation) in profiles.into_iter().zip(derivations) {
            if !derivation.state.is_eligible() {
                stats.ineligible += 1;
                continue;
            }
            stats.eligible += 1;
            let score = compute_score(&derivation.state, derivation.priority_bonus);
            by_level
                .entry(derivation.state.effective_level)
                .or_default()
                .push(Entry {
                    profile,
                    derivation,
                    score,
                });
        }

        let mut ordered: Vec<RankedProfile> = Vec::with_capacity(stats.eligible);
        for (_, entries) in by_level {
            let (mut pinned, rotating): (Vec<Entry>, Vec<Entry>) = entries
                .into_iter()
                .partition(|entry| entry.derivation.front_pin_purchase_at.is_some());

            // Most recently purchased pin shows first.
            pinned.sort_by(|a, b| {
                b.derivation
                    .front_pin_purchase_at
                    .cmp(&a.derivation.front_pin_purchase_at)
            });
            stats.front_pinned += pinned.len();
            ordered.extend(pinned.into_iter().map(into_ranked));

            let mut by_score: BTreeMap<i64, Vec<Entry>> = BTreeMap::new();
            for entry in rotating {
                by_score.entry(entry.score).or_default().push(entry);
            }
            stats.score_groups += by_score.len();

            for (_, group) in by_score.into_iter().rev() {
                // One seed for every group in the pass keeps adjacent
                // pages consistent inside a rotation window.
                let shuffled = shuffle(group, seed);
                ordered.extend(shuffled.into_iter().map(into_ranked));
            }
        }

        debug!(
            candidates = stats.candidates,
            eligible = stats.eligible,
            ineligible = stats.ineligible,
            front_pinned = stats.front_pinned,
            score_groups = stats.score_groups,
            seed,
            "ranking pass complete"
        );

        Ok(ordered)
    }

    /// Rank and slice one page. `page` is 1-based; a zero `page_size`
    /// falls back to the configured default. Level runs describe the
    /// full order, not just the slice, so callers can render tier
    /// boundaries across pages.
    pub async fn rank_page(
        &self,
        profiles: Vec<Profile>,
        now: DateTime<Utc>,
        page: usize,
        page_size: usize,
    ) -> Result<RankedPage> {
        let page = page.max(1);
        let page_size = if page_size == 0 {
            self.config.default_page_size
        } else {
            page_size
        };

        let ordered = self.rank(profiles, now).await?;
        let total = ordered.len();
        let level_runs = level_runs(&ordered);

        let offset = (page - 1).saturating_mul(page_size);
        let items: Vec<RankedProfile> = ordered
            .into_iter()
            .skip(offset)
            .take(page_size)
            .collect();

        Ok(RankedPage {
            items,
            page,
            page_size,
            total,
            total_pages: total_pages(total, page_size),
            level_runs,
        })
    }
}

fn into_ranked(entry: Entry) -> RankedProfile {
    RankedProfile {
        profile: entry.profile,
        state: entry.derivation.state,
        score: entry.score,
    }
}

/// Run-length encode the effective levels of a final order.
fn level_runs(ordered: &[RankedProfile]) -> Vec<LevelRun> {
    let mut runs: Vec<LevelRun> = Vec::new();
    for (index, ranked) in ordered.iter().enumerate() {
        match runs.last_mut() {
            Some(run) if run.level == ranked.state.effective_level => run.count += 1,
            _ => runs.push(LevelRun {
                level: ranked.state.effective_level,
                start_index: index,
                count: 1,
            }),
        }
    }
    runs
}
