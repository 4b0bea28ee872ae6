//! Command implementations for relayctl

pub mod config;
pub mod prompt;
pub mod serve;
