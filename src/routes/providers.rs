use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::DataResponse;
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::{DayQuery, MonthQuery};
use crate::error::AppError;

/// GET /providers/:provider_id/day-availability
pub async fn day_availability(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(provider_id): Path<Uuid>,
    Query(query): Query<DayQuery>,
) -> Result<impl IntoResponse, AppError> {
    let hours = state
        .provider_availability()
        .day(provider_id, query.year, query.month, query.day)
        .await?;

    Ok(DataResponse::new(hours))
}

/// GET /providers/:provider_id/month-availability
pub async fn month_availability(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(provider_id): Path<Uuid>,
    Query(query): Query<MonthQuery>,
) -> Result<impl IntoResponse, AppError> {
    let days = state
        .provider_availability()
        .month(provider_id, query.year, query.month)
        .await?;

    Ok(DataResponse::new(days))
}
