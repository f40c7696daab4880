//! # API Route Handlers
//!
//! This module organizes all the Axum route handlers for the `sqlrag-server`.

pub mod general;
pub mod indexing;
pub mod translation;

// Re-export all handlers so the router can reach them under a single `handlers::` path.
pub use general::*;
pub use indexing::*;
pub use translation::*;

// Shared items used by multiple handler modules.
use super::{errors::AppError, state::AppState};
