//! # presence-core
//!
//! Core crate for the doctor presence service. Contains the configuration
//! schema and loader, and the unified error system shared by every other
//! crate in the workspace.
//!
//! This crate has **no** internal dependencies on other presence crates.

pub mod config;
pub mod error;
pub mod result;

pub use config::AppConfig;
pub use error::AppError;
pub use result::AppResult;
