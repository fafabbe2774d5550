//! Asset classification, dispatch and production batches.

mod classify;
mod dispatch;
mod production;
mod stats;

// Classification (probe read, no side effects)
pub use classify::classify;

// Dispatch (side effects)
pub use dispatch::{BuildResult, Dispatcher};

// Production batch
pub use production::ProductionRunner;
