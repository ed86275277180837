//! CLI for the document explorer.

mod commands;

pub use commands::{init_tracing, run};
