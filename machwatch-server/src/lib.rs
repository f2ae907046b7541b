//! MachWatch Server Library
//!
//! Exposes server components for integration testing.

pub mod api;
pub mod config;
pub mod manager;
pub mod predictor;
pub mod sinks;
pub mod state;
