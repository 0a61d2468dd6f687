//! HTTP API module.
//!
//! The upload server, its request/response types, and the progress log
//! shared with the pipeline.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::*;
pub use server::{router, start_server};
pub use types::*;
