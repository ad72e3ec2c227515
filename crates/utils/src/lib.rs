//! Shared utilities for tidings
//!
//! Currently only tracing subscriber setup for binaries and tests that embed
//! a dispatcher.

pub mod tracing;
