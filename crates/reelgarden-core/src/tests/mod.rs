//! Session-level tests.
//!
//! - `determinism.rs`: same seed, same session
//! - `integration.rs`: the spin lifecycle end to end
//! - `helpers.rs`: machine setup and a recording presentation driver

mod helpers;
mod integration;

pub use helpers::*;
