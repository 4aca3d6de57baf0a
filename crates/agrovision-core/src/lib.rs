//! Domain layer for AgroVision: diagnosis and scan history models, the
//! ports the application drives (inference service, history persistence,
//! camera) and the shared error type.

pub mod capture;
pub mod config;
pub mod diagnosis;
pub mod error;
pub mod history;
pub mod image;
pub mod secret;
pub mod view;

#[cfg(test)]
mod test_support;

// Re-export common error type
pub use error::{AgroError, MediaAccessReason, Result};
