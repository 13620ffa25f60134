//! Sampling engine.
//!
//! Holds the seeded random source every run draws from.

pub mod rng;

pub use rng::PiRng;
