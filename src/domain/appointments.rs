use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Timelike,
    Utc,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::BookingViolation;

/// Appointment entity
///
/// `date` is always the start of an hour slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Appointment {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub user_id: Uuid,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data required to store an appointment
#[derive(Debug, Clone)]
pub struct CreateAppointmentData {
    pub provider_id: Uuid,
    pub user_id: Uuid,
    pub date: DateTime<Utc>,
}

/// Request body for booking an appointment; the user is the caller
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    pub provider_id: Uuid,
    pub date: DateTime<Utc>,
}

/// Query params selecting one calendar day
#[derive(Debug, Clone, Deserialize)]
pub struct DayQuery {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// Query params selecting one calendar month
#[derive(Debug, Clone, Deserialize)]
pub struct MonthQuery {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourAvailability {
    pub hour: u32,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAvailability {
    pub day: u32,
    pub available: bool,
}

/// Bookable window `[open_hour, close_hour)` in a fixed offset from UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfficeHours {
    pub open_hour: u32,
    pub close_hour: u32,
    pub utc_offset: FixedOffset,
}

impl Default for OfficeHours {
    fn default() -> Self {
        Self::new(8, 18, Utc.fix())
    }
}

impl OfficeHours {
    pub fn new(open_hour: u32, close_hour: u32, utc_offset: FixedOffset) -> Self {
        Self {
            open_hour,
            close_hour,
            utc_offset,
        }
    }

    pub fn local(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
        at.with_timezone(&self.utc_offset)
    }

    /// Truncate `at` to the start of its local hour.
    pub fn start_of_hour(&self, at: DateTime<Utc>) -> Result<DateTime<Utc>, BookingViolation> {
        let local = self.local(at);
        let into_hour = Duration::seconds(i64::from(local.minute() * 60 + local.second()))
            + Duration::nanoseconds(i64::from(local.nanosecond()));
        at.checked_sub_signed(into_hour)
            .ok_or_else(|| BookingViolation::InvalidDate(at.to_rfc3339()))
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let hour = self.local(at).hour();
        hour >= self.open_hour && hour < self.close_hour
    }

    pub fn hours(&self) -> impl Iterator<Item = u32> {
        self.open_hour..self.close_hour
    }

    /// UTC instant of `hour:00` local time on `date`.
    ///
    /// Fails for days at the edge of the representable calendar.
    pub fn slot(&self, date: NaiveDate, hour: u32) -> Result<DateTime<Utc>, BookingViolation> {
        let offset = Duration::seconds(i64::from(self.utc_offset.local_minus_utc()));
        date.and_time(NaiveTime::MIN)
            .checked_sub_signed(offset)
            .and_then(|midnight| midnight.checked_add_signed(Duration::hours(i64::from(hour))))
            .map(|naive| Utc.from_utc_datetime(&naive))
            .ok_or_else(|| BookingViolation::InvalidDate(date.to_string()))
    }

    /// Half-open UTC range covering the local calendar `date`.
    pub fn day_bounds(
        &self,
        date: NaiveDate,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), BookingViolation> {
        let start = self.slot(date, 0)?;
        let end = start
            .checked_add_signed(Duration::days(1))
            .ok_or_else(|| BookingViolation::InvalidDate(date.to_string()))?;
        Ok((start, end))
    }

    pub fn violation(&self) -> BookingViolation {
        BookingViolation::OutsideOfficeHours {
            open: self.open_hour,
            close: self.close_hour,
        }
    }
}

pub fn calendar_day(year: i32, month: u32, day: u32) -> Result<NaiveDate, BookingViolation> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| BookingViolation::InvalidDate(format!("{year}-{month}-{day}")))
}

/// Every day of the given month, in order.
pub fn days_of_month(year: i32, month: u32) -> Result<Vec<NaiveDate>, BookingViolation> {
    let first = calendar_day(year, month, 1)?;
    Ok(first
        .iter_days()
        .take_while(|d| d.month() == first.month())
        .collect())
}
