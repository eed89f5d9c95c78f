//! Common utilities for integration tests
#![allow(dead_code)]

pub mod mock_models;
pub mod test_helpers;

// Re-export commonly used items
pub use mock_models::{BeadOnRing, QuarticWell};
pub use test_helpers::{
    double_pendulum, harmonic_system, planar_chain, relative_error, System, DQ, DQP,
};
