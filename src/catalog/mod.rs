//! Plan/upgrade catalog lookup seam.
//!
//! The engine resolves reference data through this trait so it never
//! assumes a particular store or query language. Production callers back
//! it with their document store; tests use the in-memory implementation.

use crate::models::{PlanDefinition, UpgradeDefinition};
use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog store itself is unreachable. This is the one failure
    /// that aborts a ranking pass, since no effective level can be
    /// computed without reference data.
    #[error("catalog store unavailable: {0}")]
    Unavailable(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlanCatalog: Send + Sync {
    /// Resolve a plan definition. `Ok(None)` means the code is unknown,
    /// which makes the holding profile ineligible, not an error.
    async fn find_plan_by_code(
        &self,
        code: &str,
    ) -> Result<Option<PlanDefinition>, CatalogError>;

    /// Resolve an upgrade definition. `Ok(None)` means the grant
    /// referencing this code is ignored.
    async fn find_upgrade_by_code(
        &self,
        code: &str,
    ) -> Result<Option<UpgradeDefinition>, CatalogError>;
}

/// Map-backed catalog for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    plans: DashMap<String, PlanDefinition>,
    upgrades: DashMap<String, UpgradeDefinition>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_plan(&self, plan: PlanDefinition) {
        self.plans.insert(plan.code.clone(), plan);
    }

    pub fn insert_upgrade(&self, upgrade: UpgradeDefinition) {
        self.upgrades.insert(upgrade.code.clone(), upgrade);
    }
}

#[async_trait]
impl PlanCatalog for InMemoryCatalog {
    async fn find_plan_by_code(
        &self,
        code: &str,
    ) -> Result<Option<PlanDefinition>, CatalogError> {
        Ok(self.plans.get(code).map(|entry| entry.value().clone()))
    }

    async fn find_upgrade_by_code(
        &self,
        code: &str,
    ) -> Result<Option<UpgradeDefinition>, CatalogError> {
        Ok(self.upgrades.get(code).map(|entry| entry.value().clone()))
    }
}
