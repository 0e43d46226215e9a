//! vrag core library
//!
//! Foundations shared by every crate in the workspace:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging bootstrap
//! - Layered configuration

pub mod config;
pub mod error;
pub mod logging;

pub use config::{AppConfig, RagSettings};
pub use error::{AppError, AppResult};
