use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Booking, BookingEventKind, NewBooking};
use crate::services::{booking, events};
use crate::state::AppState;

#[derive(Serialize)]
pub struct BookingResponse {
    id: String,
    unit: String,
    apartment: String,
    date: String,
    time: String,
    duration: i32,
    status: String,
    created_at: String,
    updated_at: String,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            unit: b.unit,
            apartment: b.apartment,
            date: b.date,
            time: b.time,
            duration: b.duration,
            status: b.status.as_str().to_string(),
            created_at: b.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            updated_at: b.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

// POST /api/bookings
pub async fn submit_booking(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewBooking>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let today = state.clock.today();
    let created = booking::submit_booking(&*state.store, &body, today)?;

    events::publish(&state, BookingEventKind::Submitted, &created);

    Ok((StatusCode::CREATED, Json(created.into())))
}

// GET /api/bookings?unit=&apartment=
#[derive(Deserialize)]
pub struct ResidenceQuery {
    pub unit: Option<String>,
    pub apartment: Option<String>,
}

pub async fn list_residence_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ResidenceQuery>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let unit = query.unit.as_deref().map(str::trim).unwrap_or("");
    let apartment = query.apartment.as_deref().map(str::trim).unwrap_or("");

    if unit.is_empty() || apartment.is_empty() {
        return Err(AppError::Validation(
            "unit and apartment are required".to_string(),
        ));
    }

    let bookings = state.store.query_residence(unit, apartment)?;

    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}
