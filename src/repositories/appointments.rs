use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::is_unique_violation;
use crate::domain::{Appointment, CreateAppointmentData};
use crate::error::{AppError, AppResult, BookingViolation};

const PROVIDER_DATE_KEY: &str = "appointments_provider_id_date_key";

#[async_trait]
pub trait AppointmentsRepository: Send + Sync {
    /// The provider's appointment starting exactly at `date`, if any.
    async fn find_by_date(
        &self,
        date: DateTime<Utc>,
        provider_id: Uuid,
    ) -> AppResult<Option<Appointment>>;

    async fn create(&self, data: CreateAppointmentData) -> AppResult<Appointment>;

    /// Appointments of a provider with `from <= date < to`, ordered by date.
    async fn find_all_in_range_from_provider(
        &self,
        provider_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Appointment>>;

    async fn health_check(&self) -> AppResult<()> {
        Ok(())
    }
}

/// A lost race on the `(provider_id, date)` index is the same rule violation
/// the read check reports.
fn insert_error(err: sqlx::Error) -> AppError {
    if is_unique_violation(&err, PROVIDER_DATE_KEY) {
        AppError::from(BookingViolation::AlreadyBooked)
    } else {
        AppError::from(err)
    }
}

#[derive(Clone)]
pub struct PgAppointmentsRepository {
    pool: PgPool,
}

impl PgAppointmentsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentsRepository for PgAppointmentsRepository {
    async fn find_by_date(
        &self,
        date: DateTime<Utc>,
        provider_id: Uuid,
    ) -> AppResult<Option<Appointment>> {
        let row = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT id, provider_id, user_id, date, created_at, updated_at
            FROM appointments
            WHERE provider_id = $1 AND date = $2
            "#,
        )
        .bind(provider_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn create(&self, data: CreateAppointmentData) -> AppResult<Appointment> {
        let id = Uuid::new_v4();

        let appointment = sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments (id, provider_id, user_id, date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, provider_id, user_id, date, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.provider_id)
        .bind(data.user_id)
        .bind(data.date)
        .fetch_one(&self.pool)
        .await
        .map_err(insert_error)?;

        Ok(appointment)
    }

    async fn find_all_in_range_from_provider(
        &self,
        provider_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Appointment>> {
        let rows = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT id, provider_id, user_id, date, created_at, updated_at
            FROM appointments
            WHERE provider_id = $1 AND date >= $2 AND date < $3
            ORDER BY date ASC
            "#,
        )
        .bind(provider_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
