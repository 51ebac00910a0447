//! Booking route handlers.
//!
//! New bookings go through the same wizard validation as the interactive
//! flow; the whole form arrives in one body and is walked step by step.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use pawcare_core::{BookingId, Email};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::api::{Booking, RescheduleRequest};
use crate::booking::{BookingForm, BookingManager, BookingWizard, partition_upcoming};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::session_keys;
use crate::state::AppState;

/// Booking lookup query.
#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub email: Option<String>,
}

/// A customer's bookings, split around today.
#[derive(Debug, Serialize)]
pub struct BookingList {
    pub upcoming: Vec<Booking>,
    pub past: Vec<Booking>,
}

/// Create a booking.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<BookingForm>,
) -> Result<(StatusCode, Json<Booking>)> {
    let mut wizard = BookingWizard::from_form(form)?;
    let booking = wizard.submit(state.client(), &state.request_token()).await?;

    session
        .insert(session_keys::BOOKING_EMAIL, booking.details.email.as_str())
        .await?;
    add_breadcrumb("booking", "Booking created", &[("booking_id", booking.id.as_str())]);
    Ok((StatusCode::CREATED, Json(booking)))
}

/// List bookings for `?email=`, or for the email last used in this session.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<LookupQuery>,
) -> Result<Json<BookingList>> {
    let raw = match query.email.filter(|e| !e.trim().is_empty()) {
        Some(email) => email,
        None => session
            .get::<String>(session_keys::BOOKING_EMAIL)
            .await?
            .ok_or_else(|| AppError::BadRequest("Please enter your email".to_string()))?,
    };
    let email = Email::parse(&raw)
        .map_err(|e| AppError::BadRequest(format!("Please enter a valid email address: {e}")))?;

    let bookings = BookingManager::new(state.client())
        .list_for(&email, &state.request_token())
        .await?;
    session
        .insert(session_keys::BOOKING_EMAIL, email.as_str())
        .await?;

    let (upcoming, past) = partition_upcoming(bookings, Utc::now().date_naive());
    Ok(Json(BookingList { upcoming, past }))
}

/// Cancel a booking.
#[instrument(skip(state))]
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Booking>> {
    let manager = BookingManager::new(state.client());
    let token = state.request_token();

    let booking = manager.find(&BookingId::new(id), &token).await?;
    let updated = manager.cancel(&booking, &token).await?;
    add_breadcrumb("booking", "Booking cancelled", &[("booking_id", updated.id.as_str())]);
    Ok(Json(updated))
}

/// Move a booking to a new date and slot.
#[instrument(skip(state, request))]
pub async fn reschedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RescheduleRequest>,
) -> Result<Json<Booking>> {
    let manager = BookingManager::new(state.client());
    let token = state.request_token();

    let booking = manager.find(&BookingId::new(id), &token).await?;
    let updated = manager
        .reschedule(&booking, &request, Utc::now().date_naive(), &token)
        .await?;
    Ok(Json(updated))
}
