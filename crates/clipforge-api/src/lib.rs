//! Axum HTTP API server.
//!
//! This crate provides:
//! - Render dispatch endpoints against the external render farm
//! - The signed completion-webhook receiver and resume forwarding
//! - Health and Prometheus metrics endpoints

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod signature;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
