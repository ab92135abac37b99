//! Domain records shared by the store, services and handlers

pub mod appointment;
pub mod config;
pub mod contact;
pub mod field_state;
pub mod handover;
pub mod patient;
pub mod treatment_record;
pub mod user;

pub use appointment::*;
pub use config::*;
pub use contact::*;
pub use field_state::*;
pub use handover::*;
pub use patient::*;
pub use treatment_record::*;
pub use user::*;
