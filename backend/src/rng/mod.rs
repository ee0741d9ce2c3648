//! Deterministic random number generation
//!
//! Uses xorshift64* so that a seed fully determines a simulation run.
//! CRITICAL: all randomness in the economy (random defaulting) goes through
//! this module.

mod xorshift;

pub use xorshift::RngManager;
