//! Utility functions.

pub mod stats;
