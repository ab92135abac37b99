//! Common error handling utilities for DentaCare Engine
//!
//! This crate provides the error type shared by the binaries and the
//! infrastructure crates, plus the stable error codes the HTTP layer puts
//! into every error response body.
//!
//! # Example
//!
//! ```rust
//! use error_common::{DentaCareError, Result};
//!
//! fn parse_port(raw: &str) -> Result<u16> {
//!     raw.parse()
//!         .map_err(|_| DentaCareError::ConfigError(format!("invalid port: {raw}")))
//! }
//!
//! assert!(parse_port("8080").is_ok());
//! assert!(parse_port("eighty").is_err());
//! ```

pub mod codes;
pub mod types;

pub use codes::*;
pub use types::*;
