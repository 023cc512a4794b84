use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use super::bookings::BookingResponse;
use super::check_auth;
use crate::errors::AppError;
use crate::models::{BookingEventKind, BookingStatus};
use crate::services::{booking, events};
use crate::state::AppState;

// GET /api/admin/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
    pub limit: Option<usize>,
}

pub async fn get_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let limit = query.limit.unwrap_or(50);
    let status_filter = match query.status.as_deref() {
        Some(raw) => Some(
            BookingStatus::try_parse(raw)
                .ok_or_else(|| AppError::Validation(format!("unknown status {raw:?}")))?,
        ),
        None => None,
    };

    let bookings = state.store.query_recent(status_filter, limit)?;

    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

// POST /api/admin/bookings/:id/approve
pub async fn approve_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, AppError> {
    decide(&state, &headers, &id, BookingStatus::Approved)
}

// POST /api/admin/bookings/:id/reject
pub async fn reject_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, AppError> {
    decide(&state, &headers, &id, BookingStatus::Rejected)
}

fn decide(
    state: &AppState,
    headers: &HeaderMap,
    id: &str,
    status: BookingStatus,
) -> Result<Json<BookingResponse>, AppError> {
    check_auth(headers, &state.config.admin_token)?;

    let updated = booking::transition(&*state.store, id, status)?;

    events::publish(state, BookingEventKind::from(updated.status), &updated);

    Ok(Json(updated.into()))
}
