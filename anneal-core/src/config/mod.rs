//! Configuration types
//!
//! Thermal tuning constants, stored as postcard binary data when persisted.

pub mod types;

pub use types::*;
