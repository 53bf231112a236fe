//! Use cases and the cache port they share.

pub mod cache;
pub mod create_appointment;
pub mod list_provider_appointments;
pub mod provider_availability;

pub use cache::{CacheProvider, RedisCache};
pub use create_appointment::CreateAppointmentService;
pub use list_provider_appointments::ListProviderAppointmentsService;
pub use provider_availability::ProviderAvailabilityService;
