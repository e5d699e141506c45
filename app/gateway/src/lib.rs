//! hfgate: HTTP surface of the inference gateway.
//!
//! Wires request extraction, the JSON and audio routes, TOML configuration
//! and the CLI around the `inference` orchestrator.

pub mod cmd;
pub mod config;
mod error;
pub mod extract;
pub mod router;
mod serve;
pub mod state;
pub mod utils;

pub use cmd::Cli;
pub use config::GatewayConfig;
pub use error::ApiError;
pub use serve::{ServeHandle, serve, serve_registry};
pub use state::AppState;
