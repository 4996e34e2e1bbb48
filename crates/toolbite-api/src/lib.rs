//! ToolBite HTTP surface.
//!
//! Axum handlers for the four file tools, the response emitter, error
//! rendering, router construction and process bootstrap.

pub mod api_doc;
pub mod constants;
pub mod emit;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;
pub mod utils;
