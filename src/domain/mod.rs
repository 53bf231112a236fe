//! Domain types and DTOs

pub mod appointments;
pub mod notifications;

pub use appointments::*;
pub use notifications::*;
