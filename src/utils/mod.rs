//! Small shared helpers: process execution, path normalization, number formatting.

pub mod exec;
pub mod format;
pub mod path;

