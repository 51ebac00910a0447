//! Rescheduling and cancelling existing bookings.

use chrono::NaiveDate;
use pawcare_core::{BookingId, BookingStatus, Email};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::api::{ApiError, Booking, PetCareClient, RescheduleRequest, with_cancellation};

/// Errors from booking management actions.
#[derive(Debug, Error)]
pub enum ManageError {
    /// The booking's status does not allow the action.
    #[error("Cannot {action} a {status} booking")]
    InvalidStatus {
        action: &'static str,
        status: BookingStatus,
    },

    /// The new time slot is blank.
    #[error("Please choose a time slot")]
    MissingSlot,

    /// The new date is before today.
    #[error("Cannot reschedule to {date}, which is in the past")]
    DateInPast { date: NaiveDate },

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Whether a booking in `status` may be cancelled.
#[must_use]
pub const fn can_cancel(status: BookingStatus) -> bool {
    status.is_active()
}

/// Whether a booking in `status` may be moved to another slot.
#[must_use]
pub const fn can_reschedule(status: BookingStatus) -> bool {
    status.is_active()
}

/// Check a reschedule request against the booking and today's date.
///
/// # Errors
///
/// Returns [`ManageError::InvalidStatus`], [`ManageError::MissingSlot`], or
/// [`ManageError::DateInPast`].
pub fn validate_reschedule(
    booking: &Booking,
    request: &RescheduleRequest,
    today: NaiveDate,
) -> Result<(), ManageError> {
    if !can_reschedule(booking.status) {
        return Err(ManageError::InvalidStatus {
            action: "reschedule",
            status: booking.status,
        });
    }
    if request.time_slot.trim().is_empty() {
        return Err(ManageError::MissingSlot);
    }
    if request.appointment_date < today {
        return Err(ManageError::DateInPast {
            date: request.appointment_date,
        });
    }
    Ok(())
}

/// Split bookings into upcoming (today or later, still active) and the rest,
/// each ordered by appointment date.
#[must_use]
pub fn partition_upcoming(bookings: Vec<Booking>, today: NaiveDate) -> (Vec<Booking>, Vec<Booking>) {
    let (mut upcoming, mut past): (Vec<_>, Vec<_>) = bookings
        .into_iter()
        .partition(|b| b.status.is_active() && b.details.appointment_date >= today);
    upcoming.sort_by_key(|b| b.details.appointment_date);
    past.sort_by_key(|b| std::cmp::Reverse(b.details.appointment_date));
    (upcoming, past)
}

/// Booking actions for one customer, guarded by the status rules above.
#[derive(Debug, Clone, Copy)]
pub struct BookingManager<'a> {
    client: &'a PetCareClient,
}

impl<'a> BookingManager<'a> {
    #[must_use]
    pub const fn new(client: &'a PetCareClient) -> Self {
        Self { client }
    }

    /// Bookings made with `email`.
    ///
    /// # Errors
    ///
    /// Returns the API error.
    pub async fn list_for(
        &self,
        email: &Email,
        cancel: &CancellationToken,
    ) -> Result<Vec<Booking>, ManageError> {
        Ok(with_cancellation(cancel, self.client.list_bookings(email)).await?)
    }

    /// Fetch a booking by id.
    ///
    /// # Errors
    ///
    /// Returns the API error.
    pub async fn find(
        &self,
        id: &BookingId,
        cancel: &CancellationToken,
    ) -> Result<Booking, ManageError> {
        Ok(with_cancellation(cancel, self.client.get_booking(id)).await?)
    }

    /// Cancel `booking` if its status allows it.
    ///
    /// # Errors
    ///
    /// Returns [`ManageError::InvalidStatus`] without calling the API when the
    /// booking is already cancelled or completed, otherwise the API error.
    #[instrument(skip_all, fields(booking_id = %booking.id, status = %booking.status))]
    pub async fn cancel(
        &self,
        booking: &Booking,
        cancel: &CancellationToken,
    ) -> Result<Booking, ManageError> {
        if !can_cancel(booking.status) {
            return Err(ManageError::InvalidStatus {
                action: "cancel",
                status: booking.status,
            });
        }
        let updated = with_cancellation(cancel, self.client.cancel_booking(&booking.id)).await?;
        info!("Booking cancelled");
        Ok(updated)
    }

    /// Move `booking` to the slot in `request`.
    ///
    /// # Errors
    ///
    /// Returns a validation error from [`validate_reschedule`] without calling
    /// the API, otherwise the API error.
    #[instrument(skip_all, fields(booking_id = %booking.id, date = %request.appointment_date))]
    pub async fn reschedule(
        &self,
        booking: &Booking,
        request: &RescheduleRequest,
        today: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<Booking, ManageError> {
        validate_reschedule(booking, request, today)?;
        let updated = with_cancellation(
            cancel,
            self.client.reschedule_booking(&booking.id, request),
        )
        .await?;
        info!("Booking rescheduled");
        Ok(updated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use pawcare_core::{ItemId, PhoneNumber};

    use super::*;
    use crate::api::BookingDraft;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn booking(id: &str, status: BookingStatus, on: NaiveDate) -> Booking {
        Booking {
            id: BookingId::new(id),
            status,
            created_at: None,
            details: BookingDraft {
                product_id: ItemId::new("vac-1"),
                product_name: "Rabies".to_string(),
                appointment_date: on,
                time_slot: "9:00 AM".to_string(),
                owner_name: "Sam".to_string(),
                email: Email::parse("sam@example.com").unwrap(),
                phone: PhoneNumber::parse("5551234567").unwrap(),
                address: "1 Main St".to_string(),
                pet_name: "Rex".to_string(),
                pet_type: "dog".to_string(),
                breed: "Beagle".to_string(),
                pet_age: "3".to_string(),
                notes: None,
            },
        }
    }

    fn request(on: NaiveDate, slot: &str) -> RescheduleRequest {
        RescheduleRequest {
            appointment_date: on,
            time_slot: slot.to_string(),
        }
    }

    #[test]
    fn test_status_guards() {
        assert!(can_cancel(BookingStatus::Pending));
        assert!(can_cancel(BookingStatus::Confirmed));
        assert!(!can_cancel(BookingStatus::Cancelled));
        assert!(!can_reschedule(BookingStatus::Completed));
    }

    #[test]
    fn test_cancelled_booking_cannot_be_rescheduled() {
        let today = date(2026, 10, 19);
        let b = booking("b1", BookingStatus::Cancelled, date(2026, 11, 1));
        let err = validate_reschedule(&b, &request(date(2026, 11, 5), "10:00 AM"), today)
            .unwrap_err();
        assert!(matches!(
            err,
            ManageError::InvalidStatus { action: "reschedule", .. }
        ));
        assert_eq!(err.to_string(), "Cannot reschedule a cancelled booking");
    }

    #[test]
    fn test_reschedule_requires_slot_and_future_date() {
        let today = date(2026, 10, 19);
        let b = booking("b1", BookingStatus::Pending, date(2026, 11, 1));
        assert!(matches!(
            validate_reschedule(&b, &request(date(2026, 11, 5), "  "), today),
            Err(ManageError::MissingSlot)
        ));
        assert!(matches!(
            validate_reschedule(&b, &request(date(2026, 10, 18), "10:00 AM"), today),
            Err(ManageError::DateInPast { .. })
        ));
        assert!(validate_reschedule(&b, &request(today, "10:00 AM"), today).is_ok());
    }

    #[test]
    fn test_partition_upcoming() {
        let today = date(2026, 10, 19);
        let bookings = vec![
            booking("late", BookingStatus::Confirmed, date(2026, 12, 1)),
            booking("past", BookingStatus::Completed, date(2026, 9, 1)),
            booking("soon", BookingStatus::Pending, date(2026, 10, 20)),
            booking("dropped", BookingStatus::Cancelled, date(2026, 11, 1)),
        ];
        let (upcoming, rest) = partition_upcoming(bookings, today);
        let ids: Vec<&str> = upcoming.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["soon", "late"]);
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[0].id.as_str(), "dropped");
    }
}
