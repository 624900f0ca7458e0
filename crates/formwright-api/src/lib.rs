//! Formwright API Library
//!
//! HTTP handlers, authentication and application setup for the form
//! generation and submission service.

mod api_doc;
pub mod constants;
mod handlers;
pub mod setup;
mod telemetry;
mod utils;

pub mod auth;
pub mod error;
pub mod state;

pub use error::ErrorResponse;
