//! Cross-module tests for the arena simulation.
//!
//! - `determinism.rs`: same seed and inputs give identical runs
//! - `integration.rs`: end-to-end scenarios through `Simulation` and `RoundTracker`
//! - `helpers.rs`: setup utilities shared by both

mod helpers;

pub use helpers::*;
