//! Command-line interface module.

mod args;
pub mod build;
pub mod dev;
pub mod inputs;

pub use args::{Cli, Commands};

use std::sync::Arc;

use crate::asset::Dispatcher;
use crate::backend::{EsbuildBundler, NativeMinifier};
use crate::config::Config;

/// Dispatcher wired to the real backends.
pub type NativeDispatcher = Dispatcher<EsbuildBundler, NativeMinifier>;

pub fn native_dispatcher(config: &Config) -> Arc<NativeDispatcher> {
    let bundler = EsbuildBundler::new(config.bundler.clone());
    Arc::new(Dispatcher::new(bundler, NativeMinifier, config.minify))
}
