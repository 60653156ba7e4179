//! REST API module.
//!
//! Community endpoints answer with bare JSON bodies; failures use the
//! [`crate::errors::ErrorResponse`] envelope.

mod community;

pub use community::*;

use axum::Json;

/// Result type for handlers.
pub type ApiResult<T> = Result<Json<T>, crate::errors::AppError>;
