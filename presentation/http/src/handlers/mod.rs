//! HTTP request handlers for the relay

pub mod relay;
