//! Shared test utilities for paramsync integration tests.
//!
//! This module provides:
//! - `SyncHarness` for isolated runs against an in-memory store
//! - Document fixture writers backed by temp directories

pub mod harness;

pub use harness::{SyncHarness, ACCOUNT_ID};
