//! Payment provider implementations
//!
//! Concrete implementations of the AlmaApi trait.

pub mod alma;

pub use alma::{AlmaConfig, AlmaMode, AlmaProvider};
