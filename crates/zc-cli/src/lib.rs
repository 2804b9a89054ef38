//! zc CLI library components.
//!
//! This library exposes the command handlers, configuration and key file
//! handling for testing purposes.

pub mod commands;
pub mod config;
pub mod keys;
