//! Contact details collected by the booking and checkout forms.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Exactly ten digits, checked after every non-digit has been stripped.
static TEN_DIGITS: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // literal pattern
    Regex::new(r"^\d{10}$").unwrap()
});

/// Errors that can occur when parsing contact details.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    /// The email input is empty.
    #[error("email cannot be empty")]
    EmptyEmail,
    /// The email input is too long.
    #[error("email must be at most {max} characters")]
    EmailTooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The email does not have exactly one `@` with text on both sides.
    #[error("email must look like name@domain")]
    MalformedEmail,
    /// The email contains whitespace.
    #[error("email cannot contain spaces")]
    EmailWhitespace,
    /// The phone number does not contain exactly ten digits.
    #[error("phone number must be 10 digits")]
    InvalidPhone,
}

/// An email address, trimmed, with a lower-cased domain.
///
/// ```
/// use pawcare_core::Email;
///
/// let email = Email::parse("  Owner@Vet.Example ").unwrap();
/// assert_eq!(email.as_str(), "Owner@vet.example");
/// assert!(Email::parse("owner@").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from user input.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, too long, contains
    /// whitespace, or is not of the form `local@domain`.
    pub fn parse(input: &str) -> Result<Self, ContactError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ContactError::EmptyEmail);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(ContactError::EmailTooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if s.chars().any(char::is_whitespace) {
            return Err(ContactError::EmailWhitespace);
        }

        let (local, domain) = s.split_once('@').ok_or(ContactError::MalformedEmail)?;
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(ContactError::MalformedEmail);
        }

        Ok(Self(format!("{local}@{}", domain.to_ascii_lowercase())))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the domain part of the email (after the @).
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map_or("", |(_, domain)| domain)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = ContactError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

/// A ten-digit phone number stored without formatting.
///
/// Input like `(555) 123-4567` is accepted; the stored value is `5551234567`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse a phone number, ignoring every non-digit character.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::InvalidPhone`] unless exactly ten digits remain.
    pub fn parse(input: &str) -> Result<Self, ContactError> {
        let digits: String = input.chars().filter(char::is_ascii_digit).collect();
        if TEN_DIGITS.is_match(&digits) {
            Ok(Self(digits))
        } else {
            Err(ContactError::InvalidPhone)
        }
    }

    /// The ten digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = ContactError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}
