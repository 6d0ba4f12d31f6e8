//! concierge HTTP server.
//!
//! This crate provides the axum front end over the conversation gateway,
//! its environment-driven configuration, and the startup sequence that
//! resolves the assistant before the listener opens.

pub mod config;
pub mod error;
pub mod routes;
pub mod startup;

pub use config::ServerConfig;
pub use error::{ApiError, StartupError};
pub use routes::build_router;
