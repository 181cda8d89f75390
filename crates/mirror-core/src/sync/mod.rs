//! SyncEngine for reconciling mirrors with the authoritative registry
//!
//! This module provides:
//! - **configure**: First-time copy of owners and threshold
//! - **sync_batch**: Bounded, resumable append of the remaining owners
//! - **check**: Read-only drift report

mod check;
mod engine;

pub use check::{DriftReport, DriftStatus};
pub use engine::{BatchOutcome, SyncEngine, SyncRun};
