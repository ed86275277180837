//! expediente - fiscal document history explorer.
//!
//! Engine for browsing a client's historical fiscal documents: filtering,
//! grouping and sorting over the materialized collection, signed download
//! URL caching, per-item preview orchestration, and bulk export. The UI
//! layer (and everything form-shaped around it) lives elsewhere; this crate
//! exposes the view model it renders.

// Model types use `from_str` methods returning Option<Self>,
// not Result<Self, Err> as std::str::FromStr requires.
#![allow(clippy::should_implement_trait)]

pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod explorer;
pub mod models;
pub mod services;
