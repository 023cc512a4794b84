use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Datelike;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::MonthGrid;
use crate::services::calendar::{build_month_grid, parse_month};
use crate::services::ics::generate_ics;
use crate::state::AppState;

// GET /api/calendar?month=YYYY-MM
#[derive(Deserialize)]
pub struct CalendarQuery {
    pub month: Option<String>,
}

pub async fn month_grid(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<MonthGrid>, AppError> {
    let today = state.clock.today();
    let reference = match query.month.as_deref() {
        Some(raw) => parse_month(raw).ok_or_else(|| {
            AppError::Validation(format!("month must be YYYY-MM, got {raw:?}"))
        })?,
        None => today,
    };

    let bookings = state.store.query_month(reference.year(), reference.month())?;
    let grid = build_month_grid(reference, today, &bookings);

    if grid.skipped > 0 {
        tracing::warn!(
            year = grid.year,
            month = grid.month,
            skipped = grid.skipped,
            "calendar rendered without malformed bookings"
        );
    }

    Ok(Json(grid))
}

// GET /calendar/:booking_id(.ics)
pub async fn download_ics(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let booking_id = raw_id.strip_suffix(".ics").unwrap_or(&raw_id);

    let booking = state
        .store
        .get(booking_id)?
        .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;

    let ics = generate_ics(&booking, &state.config.building_name).ok_or_else(|| {
        tracing::warn!(booking_id, date = %booking.date, time = %booking.time, "cannot export malformed booking");
        AppError::Validation(format!("booking {booking_id} has no valid date and time"))
    })?;

    let filename = format!("lift-booking-{booking_id}.ics");

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        ics,
    )
        .into_response())
}
