pub mod admin;
pub mod bookings;
pub mod calendar;
pub mod events;
pub mod health;

use axum::http::HeaderMap;

use crate::errors::AppError;

/// Admin routes expect `Authorization: Bearer <token>`.
pub(crate) fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token.is_empty() || token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}
