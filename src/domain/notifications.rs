//! Notification domain types
//!
//! In-app notifications sent to providers when they are booked.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Notification entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data required to store a notification
#[derive(Debug, Clone)]
pub struct CreateNotificationData {
    pub recipient_id: Uuid,
    pub content: String,
}
