//! # shopcheck-core
//!
//! Core types for the shopcheck browser end-to-end suite.
//!
//! - [`TestRecord`] holds the per-phase outcome of one test invocation
//! - [`Fixtures`] is the immutable test data shared by a run
//! - [`SuiteConfig`] is loaded once from `shopcheck.toml`
//! - [`fail_open`] wraps best-effort work that must never fail a test

pub mod config;
mod error;
pub mod fail_open;
mod types;

pub use config::{BrowserSettings, SuiteConfig};
pub use error::{Result, ShopError};
pub use types::*;
