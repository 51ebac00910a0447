//! Three-step booking wizard.
//!
//! ```text
//! Appointment ──next──▶ Owner ──next──▶ Pet ──submit──▶ Submitted
//!      ◀──back───────────┘   ◀──back─────┘
//! ```
//!
//! Each forward move validates only the step being left. Submission
//! re-validates everything, posts the composed [`BookingDraft`], and ends the
//! wizard; nothing can be changed or resubmitted afterwards.

use chrono::NaiveDate;
use pawcare_core::{ContactError, Email, ItemId, PhoneNumber};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::api::{ApiError, Booking, BookingDraft, PetCareClient, Product, with_cancellation};

/// Where the wizard currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// Appointment date and time slot.
    Appointment,
    /// Owner contact details.
    Owner,
    /// Pet details and confirmation.
    Pet,
    /// Booking created; terminal.
    Submitted,
}

impl WizardStep {
    /// 1-based step number shown in the progress indicator.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Appointment => 1,
            Self::Owner => 2,
            Self::Pet => 3,
            Self::Submitted => 4,
        }
    }
}

/// Field-level validation failures, checked before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more required fields are blank.
    #[error("Please fill in all required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// The phone number does not reduce to exactly ten digits.
    #[error("Please enter a valid 10-digit phone number")]
    InvalidPhone,

    /// The email address is malformed.
    #[error("Please enter a valid email address: {0}")]
    InvalidEmail(ContactError),
}

/// Errors from driving the wizard.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The wizard already produced a booking.
    #[error("This booking has already been submitted")]
    AlreadySubmitted,

    /// `next` was called on the last step.
    #[error("No step after the pet details; submit the booking instead")]
    NoNextStep,

    /// `submit` was called before reaching the last step.
    #[error("Booking is not ready to submit (currently on step {})", .0.number())]
    NotReady(WizardStep),

    /// The API rejected the booking or could not be reached.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Step 1 fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentFields {
    #[serde(default)]
    pub appointment_date: Option<NaiveDate>,
    #[serde(default)]
    pub time_slot: String,
}

/// Step 2 fields, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerFields {
    #[serde(default)]
    pub owner_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

/// Step 3 fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetFields {
    #[serde(default)]
    pub pet_name: String,
    #[serde(default)]
    pub pet_type: String,
    #[serde(default)]
    pub breed: String,
    #[serde(default)]
    pub pet_age: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Every field of the wizard in one body, for callers that collect the whole
/// form up front (the HTTP service).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingForm {
    pub product_id: ItemId,
    #[serde(default)]
    pub product_name: String,
    #[serde(flatten)]
    pub appointment: AppointmentFields,
    #[serde(flatten)]
    pub owner: OwnerFields,
    #[serde(flatten)]
    pub pet: PetFields,
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn require(missing: Vec<&'static str>) -> Result<(), ValidationError> {
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(missing))
    }
}

impl AppointmentFields {
    /// Check step 1 and return the chosen date and slot.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingFields`] when the date or slot is absent.
    pub fn validate(&self) -> Result<(NaiveDate, String), ValidationError> {
        match (self.appointment_date, blank(&self.time_slot)) {
            (Some(date), false) => Ok((date, self.time_slot.trim().to_string())),
            (date, slot_blank) => {
                let mut missing = Vec::new();
                if date.is_none() {
                    missing.push("appointment date");
                }
                if slot_blank {
                    missing.push("time slot");
                }
                Err(ValidationError::MissingFields(missing))
            }
        }
    }
}

/// Step 2 after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidOwner {
    pub owner_name: String,
    pub email: Email,
    pub phone: PhoneNumber,
    pub address: String,
}

impl OwnerFields {
    /// Check step 2: presence first, then the phone rule, then the email shape.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule.
    pub fn validate(&self) -> Result<ValidOwner, ValidationError> {
        let mut missing = Vec::new();
        if blank(&self.owner_name) {
            missing.push("owner name");
        }
        if blank(&self.email) {
            missing.push("email");
        }
        if blank(&self.phone) {
            missing.push("phone");
        }
        if blank(&self.address) {
            missing.push("address");
        }
        require(missing)?;

        let phone = PhoneNumber::parse(&self.phone).map_err(|_| ValidationError::InvalidPhone)?;
        let email = Email::parse(&self.email).map_err(ValidationError::InvalidEmail)?;

        Ok(ValidOwner {
            owner_name: self.owner_name.trim().to_string(),
            email,
            phone,
            address: self.address.trim().to_string(),
        })
    }
}

impl PetFields {
    /// Check step 3.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingFields`] listing every blank field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        for (value, name) in [
            (&self.pet_name, "pet name"),
            (&self.pet_type, "pet type"),
            (&self.breed, "breed"),
            (&self.pet_age, "pet age"),
        ] {
            if blank(value) {
                missing.push(name);
            }
        }
        require(missing)
    }
}

/// The booking wizard for one product.
#[derive(Debug, Clone)]
pub struct BookingWizard {
    product_id: ItemId,
    product_name: String,
    step: WizardStep,
    appointment: AppointmentFields,
    owner: OwnerFields,
    pet: PetFields,
}

impl BookingWizard {
    /// Start a wizard at step 1 for `product`.
    #[must_use]
    pub fn new(product: &Product) -> Self {
        Self::for_product(product.id.clone(), product.name.clone())
    }

    /// Start a wizard at step 1 from an id and display name.
    #[must_use]
    pub fn for_product(product_id: ItemId, product_name: impl Into<String>) -> Self {
        Self {
            product_id,
            product_name: product_name.into(),
            step: WizardStep::Appointment,
            appointment: AppointmentFields::default(),
            owner: OwnerFields::default(),
            pet: PetFields::default(),
        }
    }

    /// Load a complete form and walk it to the final step, validating each
    /// step on the way.
    ///
    /// # Errors
    ///
    /// Returns the first step's validation error.
    pub fn from_form(form: BookingForm) -> Result<Self, WizardError> {
        let mut wizard = Self::for_product(form.product_id, form.product_name);
        wizard.appointment = form.appointment;
        wizard.owner = form.owner;
        wizard.pet = form.pet;
        wizard.next()?;
        wizard.next()?;
        Ok(wizard)
    }

    #[must_use]
    pub const fn step(&self) -> WizardStep {
        self.step
    }

    #[must_use]
    pub const fn is_submitted(&self) -> bool {
        matches!(self.step, WizardStep::Submitted)
    }

    #[must_use]
    pub const fn appointment(&self) -> &AppointmentFields {
        &self.appointment
    }

    #[must_use]
    pub const fn owner(&self) -> &OwnerFields {
        &self.owner
    }

    #[must_use]
    pub const fn pet(&self) -> &PetFields {
        &self.pet
    }

    fn ensure_open(&self) -> Result<(), WizardError> {
        if self.is_submitted() {
            Err(WizardError::AlreadySubmitted)
        } else {
            Ok(())
        }
    }

    /// Edit step 1 fields.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::AlreadySubmitted`] once the booking exists.
    pub fn appointment_mut(&mut self) -> Result<&mut AppointmentFields, WizardError> {
        self.ensure_open()?;
        Ok(&mut self.appointment)
    }

    /// Edit step 2 fields.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::AlreadySubmitted`] once the booking exists.
    pub fn owner_mut(&mut self) -> Result<&mut OwnerFields, WizardError> {
        self.ensure_open()?;
        Ok(&mut self.owner)
    }

    /// Edit step 3 fields.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::AlreadySubmitted`] once the booking exists.
    pub fn pet_mut(&mut self) -> Result<&mut PetFields, WizardError> {
        self.ensure_open()?;
        Ok(&mut self.pet)
    }

    /// Validate the current step and advance.
    ///
    /// # Errors
    ///
    /// Returns the step's validation error, [`WizardError::NoNextStep`] on the
    /// last step, or [`WizardError::AlreadySubmitted`].
    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        self.ensure_open()?;
        self.step = match self.step {
            WizardStep::Appointment => {
                self.appointment.validate()?;
                WizardStep::Owner
            }
            WizardStep::Owner => {
                self.owner.validate()?;
                WizardStep::Pet
            }
            WizardStep::Pet => return Err(WizardError::NoNextStep),
            WizardStep::Submitted => return Err(WizardError::AlreadySubmitted),
        };
        Ok(self.step)
    }

    /// Go back one step. Does nothing on step 1.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::AlreadySubmitted`] once the booking exists.
    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        self.ensure_open()?;
        self.step = match self.step {
            WizardStep::Appointment | WizardStep::Owner => WizardStep::Appointment,
            WizardStep::Pet => WizardStep::Owner,
            WizardStep::Submitted => return Err(WizardError::AlreadySubmitted),
        };
        Ok(self.step)
    }

    /// Validate every step and compose the booking payload.
    ///
    /// # Errors
    ///
    /// Returns the first validation error in step order.
    pub fn draft(&self) -> Result<BookingDraft, ValidationError> {
        let (appointment_date, time_slot) = self.appointment.validate()?;
        let owner = self.owner.validate()?;
        self.pet.validate()?;

        Ok(BookingDraft {
            product_id: self.product_id.clone(),
            product_name: self.product_name.clone(),
            appointment_date,
            time_slot,
            owner_name: owner.owner_name,
            email: owner.email,
            phone: owner.phone,
            address: owner.address,
            pet_name: self.pet.pet_name.trim().to_string(),
            pet_type: self.pet.pet_type.trim().to_string(),
            breed: self.pet.breed.trim().to_string(),
            pet_age: self.pet.pet_age.trim().to_string(),
            notes: self
                .pet
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        })
    }

    /// Post the booking. Only allowed from the last step.
    ///
    /// The wizard stays on the last step if the call fails, so the form can
    /// be corrected and submitted again.
    ///
    /// # Errors
    ///
    /// Returns a validation error, [`WizardError::NotReady`],
    /// [`WizardError::AlreadySubmitted`], or the API error (including
    /// [`ApiError::Cancelled`] when `cancel` fires first).
    #[instrument(skip_all, fields(product_id = %self.product_id))]
    pub async fn submit(
        &mut self,
        client: &PetCareClient,
        cancel: &CancellationToken,
    ) -> Result<Booking, WizardError> {
        match self.step {
            WizardStep::Pet => {}
            WizardStep::Submitted => return Err(WizardError::AlreadySubmitted),
            other => return Err(WizardError::NotReady(other)),
        }

        let draft = self.draft()?;
        let booking = with_cancellation(cancel, client.create_booking(&draft)).await?;

        self.step = WizardStep::Submitted;
        info!(booking_id = %booking.id, "Booking submitted");
        Ok(booking)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn wizard() -> BookingWizard {
        BookingWizard::for_product(ItemId::new("vac-1"), "Rabies vaccine")
    }

    fn fill_appointment(w: &mut BookingWizard) {
        let a = w.appointment_mut().unwrap();
        a.appointment_date = NaiveDate::from_ymd_opt(2026, 11, 2);
        a.time_slot = "10:00 AM".to_string();
    }

    fn fill_owner(w: &mut BookingWizard) {
        let o = w.owner_mut().unwrap();
        o.owner_name = "Sam Rivera".to_string();
        o.email = "sam@example.com".to_string();
        o.phone = "(555) 123-4567".to_string();
        o.address = "1 Main St".to_string();
    }

    fn fill_pet(w: &mut BookingWizard) {
        let p = w.pet_mut().unwrap();
        p.pet_name = "Rex".to_string();
        p.pet_type = "dog".to_string();
        p.breed = "Beagle".to_string();
        p.pet_age = "3".to_string();
    }

    #[test]
    fn test_starts_at_appointment() {
        assert_eq!(wizard().step(), WizardStep::Appointment);
    }

    #[test]
    fn test_step1_requires_date_and_slot() {
        let mut w = wizard();
        let err = w.next().unwrap_err();
        assert!(matches!(
            err,
            WizardError::Validation(ValidationError::MissingFields(ref f)) if f == &["appointment date", "time slot"]
        ));
        assert_eq!(w.step(), WizardStep::Appointment);
    }

    #[test]
    fn test_appointment_reports_each_missing_field() {
        let date = NaiveDate::from_ymd_opt(2026, 11, 2).unwrap();
        let slot_only = AppointmentFields {
            appointment_date: None,
            time_slot: "9:00 AM".to_string(),
        };
        assert!(matches!(
            slot_only.validate(),
            Err(ValidationError::MissingFields(ref f)) if f == &["appointment date"]
        ));

        let date_only = AppointmentFields {
            appointment_date: Some(date),
            time_slot: "  ".to_string(),
        };
        assert!(matches!(
            date_only.validate(),
            Err(ValidationError::MissingFields(ref f)) if f == &["time slot"]
        ));

        let filled = AppointmentFields {
            appointment_date: Some(date),
            time_slot: " 9:00 AM ".to_string(),
        };
        assert_eq!(filled.validate().unwrap(), (date, "9:00 AM".to_string()));
    }

    #[test]
    fn test_step2_rejects_nine_digit_phone() {
        let mut w = wizard();
        fill_appointment(&mut w);
        w.next().unwrap();
        fill_owner(&mut w);
        w.owner_mut().unwrap().phone = "555-123-456".to_string();

        let err = w.next().unwrap_err();
        assert!(matches!(
            err,
            WizardError::Validation(ValidationError::InvalidPhone)
        ));
        assert_eq!(w.step(), WizardStep::Owner);
    }

    #[test]
    fn test_step2_rejects_bad_email() {
        let mut w = wizard();
        fill_appointment(&mut w);
        w.next().unwrap();
        fill_owner(&mut w);
        w.owner_mut().unwrap().email = "sam-at-example".to_string();
        assert!(matches!(
            w.next().unwrap_err(),
            WizardError::Validation(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_forward_and_back_transitions() {
        let mut w = wizard();
        assert_eq!(w.back().unwrap(), WizardStep::Appointment);

        fill_appointment(&mut w);
        assert_eq!(w.next().unwrap(), WizardStep::Owner);
        fill_owner(&mut w);
        assert_eq!(w.next().unwrap(), WizardStep::Pet);
        assert!(matches!(w.next().unwrap_err(), WizardError::NoNextStep));

        assert_eq!(w.back().unwrap(), WizardStep::Owner);
        assert_eq!(w.back().unwrap(), WizardStep::Appointment);
    }

    #[test]
    fn test_draft_composes_payload() {
        let mut w = wizard();
        fill_appointment(&mut w);
        fill_owner(&mut w);
        fill_pet(&mut w);
        w.pet_mut().unwrap().notes = Some("   ".to_string());

        let draft = w.draft().unwrap();
        assert_eq!(draft.product_id.as_str(), "vac-1");
        assert_eq!(draft.phone.as_str(), "5551234567");
        assert_eq!(draft.time_slot, "10:00 AM");
        assert!(draft.notes.is_none());
    }

    #[test]
    fn test_draft_reports_missing_pet_fields() {
        let mut w = wizard();
        fill_appointment(&mut w);
        fill_owner(&mut w);
        w.pet_mut().unwrap().pet_name = "Rex".to_string();
        assert_eq!(
            w.draft().unwrap_err(),
            ValidationError::MissingFields(vec!["pet type", "breed", "pet age"])
        );
    }

    #[test]
    fn test_from_form_lands_on_last_step() {
        let form: BookingForm = serde_json::from_str(
            r#"{
                "productId": 4,
                "productName": "Distemper",
                "appointmentDate": "2026-12-01",
                "timeSlot": "2:00 PM",
                "ownerName": "Sam",
                "email": "sam@example.com",
                "phone": "555 123 4567",
                "address": "1 Main St",
                "petName": "Rex",
                "petType": "dog",
                "breed": "Beagle",
                "petAge": "3"
            }"#,
        )
        .unwrap();
        let w = BookingWizard::from_form(form).unwrap();
        assert_eq!(w.step(), WizardStep::Pet);
        assert_eq!(w.draft().unwrap().product_id.as_str(), "4");
    }

    #[test]
    fn test_from_form_surfaces_first_failing_step() {
        let form = BookingForm {
            product_id: ItemId::new("4"),
            product_name: String::new(),
            appointment: AppointmentFields::default(),
            owner: OwnerFields::default(),
            pet: PetFields::default(),
        };
        let err = BookingWizard::from_form(form).unwrap_err();
        assert!(matches!(
            err,
            WizardError::Validation(ValidationError::MissingFields(ref f)) if f.contains(&"appointment date")
        ));
    }

    #[test]
    fn test_validation_message() {
        let err = ValidationError::MissingFields(vec!["email", "phone"]);
        assert_eq!(
            err.to_string(),
            "Please fill in all required fields: email, phone"
        );
    }
}
