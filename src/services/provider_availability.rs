//! Free slots of a provider for a day and for a month.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::{calendar_day, days_of_month, DayAvailability, HourAvailability, OfficeHours};
use crate::error::AppResult;
use crate::repositories::AppointmentsRepository;

pub struct ProviderAvailabilityService {
    appointments: Arc<dyn AppointmentsRepository>,
    clock: Arc<dyn Clock>,
    office_hours: OfficeHours,
}

impl ProviderAvailabilityService {
    pub fn new(
        appointments: Arc<dyn AppointmentsRepository>,
        clock: Arc<dyn Clock>,
        office_hours: OfficeHours,
    ) -> Self {
        Self {
            appointments,
            clock,
            office_hours,
        }
    }

    /// One entry per office hour of the day.
    pub async fn day(
        &self,
        provider_id: Uuid,
        year: i32,
        month: u32,
        day: u32,
    ) -> AppResult<Vec<HourAvailability>> {
        let day = calendar_day(year, month, day)?;
        let (from, to) = self.office_hours.day_bounds(day)?;

        let booked: HashSet<DateTime<Utc>> = self
            .appointments
            .find_all_in_range_from_provider(provider_id, from, to)
            .await?
            .into_iter()
            .map(|a| a.date)
            .collect();

        self.hours_of(day, &booked, self.clock.now())
    }

    /// One entry per calendar day; a day is available while any hour is.
    pub async fn month(
        &self,
        provider_id: Uuid,
        year: i32,
        month: u32,
    ) -> AppResult<Vec<DayAvailability>> {
        let days = days_of_month(year, month)?;
        let (Some(first), Some(last)) = (days.first(), days.last()) else {
            return Ok(Vec::new());
        };
        let (from, _) = self.office_hours.day_bounds(*first)?;
        let (_, to) = self.office_hours.day_bounds(*last)?;

        let booked: HashSet<DateTime<Utc>> = self
            .appointments
            .find_all_in_range_from_provider(provider_id, from, to)
            .await?
            .into_iter()
            .map(|a| a.date)
            .collect();

        let now = self.clock.now();
        days.iter()
            .map(|day| -> AppResult<DayAvailability> {
                let hours = self.hours_of(*day, &booked, now)?;
                Ok(DayAvailability {
                    day: day.day(),
                    available: hours.iter().any(|h| h.available),
                })
            })
            .collect()
    }

    fn hours_of(
        &self,
        day: NaiveDate,
        booked: &HashSet<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<HourAvailability>> {
        self.office_hours
            .hours()
            .map(|hour| -> AppResult<HourAvailability> {
                let slot = self.office_hours.slot(day, hour)?;
                Ok(HourAvailability {
                    hour,
                    available: slot >= now && !booked.contains(&slot),
                })
            })
            .collect()
    }
}
