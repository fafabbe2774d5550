//! Core types - pure abstractions shared across the codebase.

mod error;
mod kind;
mod mode;
pub mod path;
mod state;

pub use error::{BuildError, WatchError};
pub use kind::{ClassifiedFile, FileKind};
pub use mode::BuildMode;
pub use state::{register_session, setup_shutdown_handler, shutdown_signal};
