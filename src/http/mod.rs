//! HTTP API layer.
//!
//! Exposes the visibility engine and the station sweep over an
//! axum-based REST API. Everything here is feature-gated behind
//! `http-server`; the library core has no HTTP dependencies.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::{ApiError, AppError};
pub use router::create_router;
pub use state::AppState;
