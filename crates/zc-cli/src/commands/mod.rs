//! CLI command handlers.

pub mod chain;
pub mod sign;
