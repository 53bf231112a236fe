use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{CreateNotificationData, Notification};
use crate::error::AppResult;

#[async_trait]
pub trait NotificationsRepository: Send + Sync {
    async fn create(&self, data: CreateNotificationData) -> AppResult<Notification>;
}

#[derive(Clone)]
pub struct PgNotificationsRepository {
    pool: PgPool,
}

impl PgNotificationsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationsRepository for PgNotificationsRepository {
    async fn create(&self, data: CreateNotificationData) -> AppResult<Notification> {
        let id = Uuid::new_v4();

        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (id, recipient_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, recipient_id, content, read, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.recipient_id)
        .bind(&data.content)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            recipient_id = %notification.recipient_id,
            notification_id = %notification.id,
            "Notification created"
        );

        Ok(notification)
    }
}
