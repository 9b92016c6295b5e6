//! Shared utilities

pub mod error;
pub mod extract;
pub mod time;
pub mod validation;

pub use error::{AppError, AppResult, ErrorResponse};
pub use extract::{Json, Query};
