//! CLI command implementations.

pub mod apply;
pub mod kinds;
pub mod show;
