//! Configuration section definitions.

mod bundler;
mod minify;
mod watch;

pub use bundler::BundlerConfig;
pub use minify::MinifyConfig;
pub use watch::WatchConfig;
