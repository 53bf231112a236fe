//! Booking use case.

use std::sync::Arc;

use crate::clock::Clock;
use crate::domain::{Appointment, CreateAppointmentData, CreateNotificationData, OfficeHours};
use crate::error::{AppResult, BookingViolation};
use crate::repositories::{AppointmentsRepository, NotificationsRepository};
use crate::services::cache::{keys, CacheProvider};

pub struct CreateAppointmentService {
    appointments: Arc<dyn AppointmentsRepository>,
    notifications: Arc<dyn NotificationsRepository>,
    cache: Arc<dyn CacheProvider>,
    clock: Arc<dyn Clock>,
    office_hours: OfficeHours,
}

impl CreateAppointmentService {
    pub fn new(
        appointments: Arc<dyn AppointmentsRepository>,
        notifications: Arc<dyn NotificationsRepository>,
        cache: Arc<dyn CacheProvider>,
        clock: Arc<dyn Clock>,
        office_hours: OfficeHours,
    ) -> Self {
        Self {
            appointments,
            notifications,
            cache,
            clock,
            office_hours,
        }
    }

    /// Book `user_id` with `provider_id` in the hour slot containing `date`.
    ///
    /// Rules are checked in order and the first violation wins: the slot
    /// must not be in the past, the user cannot book themselves, the slot
    /// must be inside office hours and the provider must be free.
    pub async fn execute(&self, req: CreateAppointmentData) -> AppResult<Appointment> {
        let date = self.office_hours.start_of_hour(req.date)?;

        if date < self.clock.now() {
            return Err(BookingViolation::PastDate.into());
        }

        if req.user_id == req.provider_id {
            return Err(BookingViolation::SelfBooking.into());
        }

        if !self.office_hours.contains(date) {
            return Err(self.office_hours.violation().into());
        }

        if self
            .appointments
            .find_by_date(date, req.provider_id)
            .await?
            .is_some()
        {
            return Err(BookingViolation::AlreadyBooked.into());
        }

        let appointment = self
            .appointments
            .create(CreateAppointmentData {
                provider_id: req.provider_id,
                user_id: req.user_id,
                date,
            })
            .await?;

        let local = self.office_hours.local(date);
        let key = keys::provider_appointments(appointment.provider_id, local.date_naive());
        if let Err(e) = self.cache.invalidate(&key).await {
            // The appointment is stored; a stale listing expires with its TTL
            tracing::warn!(key = %key, error = %e, "Failed to invalidate provider schedule");
        }

        self.notifications
            .create(CreateNotificationData {
                recipient_id: appointment.provider_id,
                content: format!(
                    "New appointment on {} at {}",
                    local.format("%d/%m/%Y"),
                    local.format("%H:%M")
                ),
            })
            .await?;

        tracing::info!(
            appointment_id = %appointment.id,
            provider_id = %appointment.provider_id,
            user_id = %appointment.user_id,
            date = %appointment.date,
            "Appointment created"
        );

        Ok(appointment)
    }
}
