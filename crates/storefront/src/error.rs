//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side failures to
//! Sentry before responding. Every error body is JSON of the form
//! `{"message": "..."}`, the same shape the PawCare API uses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::api::ApiError;
use crate::booking::{ManageError, WizardError};
use crate::cart::CartError;
use crate::checkout::CheckoutError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// PawCare API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The action conflicts with the resource's current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<WizardError> for AppError {
    fn from(err: WizardError) -> Self {
        match err {
            WizardError::Api(api) => Self::Api(api),
            WizardError::AlreadySubmitted => Self::Conflict(err.to_string()),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

impl From<ManageError> for AppError {
    fn from(err: ManageError) -> Self {
        match err {
            ManageError::Api(api) => Self::Api(api),
            ManageError::InvalidStatus { .. } => Self::Conflict(err.to_string()),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Api(api) => Self::Api(api),
            CheckoutError::Total(_) => Self::Internal(err.to_string()),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Api(err) => match err {
                ApiError::NotFound(_) => StatusCode::NOT_FOUND,
                ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                ApiError::Remote { status, .. } if (400..500).contains(status) => {
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
                }
                ApiError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
                e if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Cart(CartError::MissingIdentifier { .. } | CartError::Total(_))
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Cart(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn client_message(&self) -> String {
        // Don't expose internal error details to clients
        match self {
            Self::Api(err) => err.user_message(),
            Self::Cart(err @ (CartError::MissingIdentifier { .. } | CartError::Total(_))) => {
                err.to_string()
            }
            Self::Cart(_) | Self::Session(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            Self::NotFound(msg) | Self::Conflict(msg) | Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "message": self.client_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use pawcare_core::BookingStatus;

    use super::*;
    use crate::booking::ValidationError;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("booking b-1".to_string());
        assert_eq!(err.to_string(), "Not found: booking b-1");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Conflict("test".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Cart(CartError::MissingIdentifier {
                name: "Kibble".to_string()
            })),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Cart(CartError::Total(
                pawcare_core::PriceError::Overflow
            ))),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(
            get_status(AppError::Api(ApiError::Remote {
                status: 409,
                message: "Slot taken".to_string()
            })),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::Remote {
                status: 500,
                message: "boom".to_string()
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::RateLimited(3))),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::NotFound("gone".to_string()))),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_domain_errors_map_to_client_errors() {
        let err = AppError::from(WizardError::Validation(ValidationError::InvalidPhone));
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "Please enter a valid 10-digit phone number"));

        let err = AppError::from(ManageError::InvalidStatus {
            action: "cancel",
            status: BookingStatus::Completed,
        });
        assert!(matches!(err, AppError::Conflict(_)));

        let err = AppError::from(CheckoutError::EmptyCart);
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "Your cart is empty"));
    }

    #[test]
    fn test_remote_message_passes_through() {
        let err = AppError::Api(ApiError::Remote {
            status: 409,
            message: "Slot taken".to_string(),
        });
        assert_eq!(err.client_message(), "Slot taken");

        let err = AppError::Internal("db exploded".to_string());
        assert_eq!(err.client_message(), "Internal server error");
    }
}
