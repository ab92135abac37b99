//! PostgreSQL connection management for DentaCare Engine
//!
//! Wraps a `sqlx` pool with sizing from configuration, a health probe and a
//! transaction helper. Schema migrations live with the server crate that
//! owns the schema.

pub mod connection;
pub mod error;

pub use connection::*;
pub use error::*;
