//! In-memory collaborators for unit tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use crate::app::AppState;
use crate::clock::Clock;
use crate::config::{Environment, Settings};
use crate::domain::{
    Appointment, CreateAppointmentData, CreateNotificationData, Notification, OfficeHours,
};
use crate::error::AppResult;
use crate::repositories::{AppointmentsRepository, NotificationsRepository};
use crate::services::cache::CacheProvider;

pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

#[derive(Default)]
pub struct FakeAppointments {
    pub rows: Mutex<Vec<Appointment>>,
    /// Fail health checks while set.
    pub down: AtomicBool,
}

impl FakeAppointments {
    pub fn insert(&self, provider_id: Uuid, user_id: Uuid, date: DateTime<Utc>) {
        self.rows.lock().push(Appointment {
            id: Uuid::new_v4(),
            provider_id,
            user_id,
            date,
            created_at: date,
            updated_at: date,
        });
    }

    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }
}

#[async_trait]
impl AppointmentsRepository for FakeAppointments {
    async fn find_by_date(
        &self,
        date: DateTime<Utc>,
        provider_id: Uuid,
    ) -> AppResult<Option<Appointment>> {
        Ok(self
            .rows
            .lock()
            .iter()
            .find(|a| a.date == date && a.provider_id == provider_id)
            .cloned())
    }

    async fn create(&self, data: CreateAppointmentData) -> AppResult<Appointment> {
        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            provider_id: data.provider_id,
            user_id: data.user_id,
            date: data.date,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().push(appointment.clone());
        Ok(appointment)
    }

    async fn find_all_in_range_from_provider(
        &self,
        provider_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Appointment>> {
        let mut found: Vec<Appointment> = self
            .rows
            .lock()
            .iter()
            .filter(|a| a.provider_id == provider_id && a.date >= from && a.date < to)
            .cloned()
            .collect();
        found.sort_by_key(|a| a.date);
        Ok(found)
    }

    async fn health_check(&self) -> AppResult<()> {
        if self.down.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("database unreachable").into());
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeNotifications {
    pub sent: Mutex<Vec<Notification>>,
}

#[async_trait]
impl NotificationsRepository for FakeNotifications {
    async fn create(&self, data: CreateNotificationData) -> AppResult<Notification> {
        let now = Utc::now();
        let notification = Notification {
            id: Uuid::new_v4(),
            recipient_id: data.recipient_id,
            content: data.content,
            read: false,
            created_at: now,
            updated_at: now,
        };
        self.sent.lock().push(notification.clone());
        Ok(notification)
    }
}

#[derive(Default)]
pub struct FakeCache {
    pub entries: Mutex<HashMap<String, String>>,
    /// Fail health checks while set.
    pub down: AtomicBool,
}

impl FakeCache {
    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }
}

#[async_trait]
impl CacheProvider for FakeCache {
    async fn save(&self, key: &str, value: String) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn recover(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn invalidate(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        if self.down.load(Ordering::SeqCst) {
            anyhow::bail!("cache unreachable");
        }
        Ok(())
    }
}

/// Clock frozen at one instant.
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(now)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Database error shaped like a Postgres constraint violation.
#[derive(Debug)]
pub struct ConstraintViolation {
    pub code: &'static str,
    pub constraint: &'static str,
}

impl ConstraintViolation {
    pub fn unique(constraint: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(Self {
            code: "23505",
            constraint,
        }))
    }
}

impl std::fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "violates constraint \"{}\"", self.constraint)
    }
}

impl std::error::Error for ConstraintViolation {}

impl sqlx::error::DatabaseError for ConstraintViolation {
    fn message(&self) -> &str {
        "duplicate key value violates unique constraint"
    }

    fn code(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.code))
    }

    fn constraint(&self) -> Option<&str> {
        Some(self.constraint)
    }

    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self
    }

    fn kind(&self) -> sqlx::error::ErrorKind {
        sqlx::error::ErrorKind::UniqueViolation
    }
}

pub const TEST_JWT_SECRET: &str = "test-secret";

fn test_settings() -> Settings {
    Settings {
        env: Environment::Dev,
        server_addr: "127.0.0.1:0".to_string(),
        database_url: "postgres://localhost/test".to_string(),
        database_max_connections: 1,
        redis_url: "redis://127.0.0.1:6379/0".to_string(),
        redis_cache_ttl_seconds: 60,
        cors_allow_origins: vec!["http://localhost:3000".to_string()],
        jwt_secret: TEST_JWT_SECRET.to_string(),
        office_hours: OfficeHours::default(),
    }
}

/// Application state over fakes, with handles to inspect them.
pub struct TestState {
    pub state: Arc<AppState>,
    pub appointments: Arc<FakeAppointments>,
    pub notifications: Arc<FakeNotifications>,
    pub cache: Arc<FakeCache>,
}

pub fn test_state(now: DateTime<Utc>) -> TestState {
    let appointments = Arc::new(FakeAppointments::default());
    let notifications = Arc::new(FakeNotifications::default());
    let cache = Arc::new(FakeCache::default());

    let state = AppState::new(
        test_settings(),
        appointments.clone(),
        notifications.clone(),
        cache.clone(),
        Arc::new(FixedClock::new(now)),
    );

    TestState {
        state,
        appointments,
        notifications,
        cache,
    }
}

pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
