//! Profile visibility and ranking engine.
//!
//! Decides, for a catalog of listings with subscription plans, time-boxed
//! paid upgrades and rotation history, what order they appear in on
//! paginated public feeds. Plan tiers give coarse priority, upgrades pin
//! profiles to the front of their tier or bump their tier, and a
//! time-bucketed deterministic shuffle rotates tied profiles fairly
//! across windows.
//!
//! This is an in-process library: candidate filtering, HTTP, auth and
//! persistence belong to the caller. The engine consumes reference data
//! through [`catalog::PlanCatalog`], emits an ordered page, and stamps
//! rotation bookkeeping through [`services::RotationStore`].

pub mod catalog;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;

pub use catalog::{InMemoryCatalog, PlanCatalog};
pub use config::EngineConfig;
pub use services::ranking::EngineError;
pub use services::{InMemoryRotationStore, RankingOrchestrator, RotationBookkeeper, RotationStore};
