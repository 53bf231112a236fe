//! Persistence ports and their Postgres implementations.

pub mod appointments;
pub mod notifications;

pub use appointments::{AppointmentsRepository, PgAppointmentsRepository};
pub use notifications::{NotificationsRepository, PgNotificationsRepository};
