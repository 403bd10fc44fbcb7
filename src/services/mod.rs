pub mod bookkeeper;
pub mod effective_state;
pub mod grants;
pub mod ranking;
pub mod rotation;
pub mod scoring;

pub use bookkeeper::{InMemoryRotationStore, RotationBookkeeper, RotationStore};
pub use ranking::RankingOrchestrator;
