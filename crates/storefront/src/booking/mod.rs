//! Vaccination booking flows.
//!
//! - [`wizard`] - the three-step form that creates a booking
//! - [`manage`] - status-guarded reschedule and cancel actions on existing bookings

pub mod manage;
pub mod wizard;

pub use manage::{BookingManager, ManageError, can_cancel, can_reschedule, partition_upcoming, validate_reschedule};
pub use wizard::{
    AppointmentFields, BookingForm, BookingWizard, OwnerFields, PetFields, ValidationError,
    WizardError, WizardStep,
};
