// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use hotel_booking_domain::DomainError;
use hotel_booking_persistence::PersistenceError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain and persistence errors and represent the
/// API contract. The server maps each variant to one HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found, or is not visible to the caller.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The request lost a race or targets a record in the wrong state.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

fn invalid_input(field: &str, err: &DomainError) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message: err.to_string(),
    }
}

fn rule_violation(rule: &str, err: &DomainError) -> ApiError {
    ApiError::DomainRuleViolation {
        rule: rule.to_string(),
        message: err.to_string(),
    }
}

/// Translates a domain error into an API error.
///
/// Malformed values become `InvalidInput`; well-formed requests that break a
/// booking rule become `DomainRuleViolation`.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match &err {
        DomainError::InvalidBookingStatus { .. } | DomainError::InvalidDecisionStatus { .. } => {
            invalid_input("status", &err)
        }
        DomainError::InvalidPaymentStatus { .. } => invalid_input("payment_status", &err),
        DomainError::InvalidStatusTransition { .. } => rule_violation("status_transition", &err),
        DomainError::InvalidStayDuration { .. } => rule_violation("stay_duration", &err),
        DomainError::PromoNotValidForDuration { .. } => {
            rule_violation("promo_minimum_nights", &err)
        }
        DomainError::InvalidQuantity { .. } => invalid_input("quantity", &err),
        DomainError::DateParseError { .. } => invalid_input("date", &err),
        DomainError::InvalidGuest { .. } => invalid_input("guests", &err),
        DomainError::InvalidHonorific(_) => invalid_input("honorific", &err),
        DomainError::InvalidGuestCategory(_) => invalid_input("category", &err),
        DomainError::TextTooLong { field, .. } | DomainError::BlankText { field } => {
            invalid_input(field, &err)
        }
        DomainError::InvalidChargeBasis(_) => invalid_input("charge_basis", &err),
        DomainError::MissingPax { .. } => invalid_input("pax", &err),
        DomainError::AdditionalNotForRoomType { .. } => {
            rule_violation("additional_room_type", &err)
        }
        DomainError::RequiredAdditionalMissing { .. } => {
            rule_violation("required_additional", &err)
        }
        DomainError::EmptyDetailSelection => invalid_input("booking_detail_ids", &err),
        DomainError::InvalidPrice { .. } => invalid_input("price", &err),
        DomainError::InvalidCodePrefix(_) => invalid_input("code", &err),
    }
}

/// Translates a persistence error into an API error.
///
/// Storage failures are reported as `Internal` without leaking the
/// underlying database message to the client.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from("Booking"),
            message,
        },
        PersistenceError::OperatorNotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from("Operator"),
            message,
        },
        PersistenceError::OperatorAlreadyExists(login_name) => ApiError::DomainRuleViolation {
            rule: String::from("unique_login_name"),
            message: format!("Operator with login name '{login_name}' already exists"),
        },
        PersistenceError::SessionNotFound(reason) => ApiError::AuthenticationFailed { reason },
        PersistenceError::NoBookingDetailUpdated => ApiError::Conflict {
            message: err.to_string(),
        },
        PersistenceError::CodeGenerationExhausted { .. } => ApiError::Internal {
            message: err.to_string(),
        },
        PersistenceError::DatabaseError(_)
        | PersistenceError::DatabaseConnectionFailed(_)
        | PersistenceError::MigrationFailed(_)
        | PersistenceError::QueryFailed(_)
        | PersistenceError::SerializationError(_)
        | PersistenceError::InitializationError(_)
        | PersistenceError::ForeignKeyEnforcementNotEnabled
        | PersistenceError::CorruptRecord(_)
        | PersistenceError::Other(_) => {
            tracing::error!(error = %err, "Persistence failure");
            ApiError::Internal {
                message: String::from("A storage error occurred"),
            }
        }
    }
}
