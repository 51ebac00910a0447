//! Booking management commands.
//!
//! # Environment Variables
//!
//! - `PAWCARE_API_URL` - Base URL of the PawCare REST API
//! - `PAWCARE_API_TOKEN` - Optional bearer token

use chrono::{NaiveDate, Utc};
use pawcare_core::{BookingId, Email};
use pawcare_storefront::api::{Booking, RescheduleRequest};
use pawcare_storefront::booking::{BookingManager, partition_upcoming};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{CliError, client};

fn line(booking: &Booking) -> String {
    let d = &booking.details;
    format!(
        "{}  {} {:<9}  {:<10}  {} ({}) - {}",
        booking.id, d.appointment_date, d.time_slot, booking.status, d.pet_name, d.pet_type, d.product_name
    )
}

/// List bookings made with `email`, upcoming first.
///
/// # Errors
///
/// Returns an error if the email is malformed or the API call fails.
#[allow(clippy::print_stdout)]
pub async fn list(email: &str, cancel: &CancellationToken) -> Result<(), CliError> {
    let email = Email::parse(email)?;
    let client = client()?;
    let bookings = BookingManager::new(&client).list_for(&email, cancel).await?;

    let (upcoming, past) = partition_upcoming(bookings, Utc::now().date_naive());
    println!("Upcoming ({})", upcoming.len());
    for booking in &upcoming {
        println!("  {}", line(booking));
    }
    println!("Past and cancelled ({})", past.len());
    for booking in &past {
        println!("  {}", line(booking));
    }
    Ok(())
}

/// Cancel a booking.
///
/// # Errors
///
/// Returns an error if the booking cannot be cancelled or the API call fails.
#[allow(clippy::print_stdout)]
pub async fn cancel(id: String, cancel: &CancellationToken) -> Result<(), CliError> {
    let client = client()?;
    let manager = BookingManager::new(&client);

    let booking = manager.find(&BookingId::new(id), cancel).await?;
    let updated = manager.cancel(&booking, cancel).await?;
    info!(booking_id = %updated.id, "Cancelled");
    println!("{}", line(&updated));
    Ok(())
}

/// Move a booking.
///
/// # Errors
///
/// Returns an error if the new slot is invalid or the API call fails.
#[allow(clippy::print_stdout)]
pub async fn reschedule(
    id: String,
    date: NaiveDate,
    slot: String,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let client = client()?;
    let manager = BookingManager::new(&client);

    let booking = manager.find(&BookingId::new(id), cancel).await?;
    let request = RescheduleRequest {
        appointment_date: date,
        time_slot: slot,
    };
    let updated = manager
        .reschedule(&booking, &request, Utc::now().date_naive(), cancel)
        .await?;
    info!(booking_id = %updated.id, "Rescheduled");
    println!("{}", line(&updated));
    Ok(())
}
