//! Shared test utilities for the owner-mirror workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`ids`] - deterministic addresses
//! - [`registry`] - [`TestRegistry`] builder for on-disk registry roots

pub mod ids;
pub mod registry;

pub use ids::{addr, addrs, ADMIN, PRINCIPAL};
pub use registry::TestRegistry;
