// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use hotel_booking_persistence::{OperatorData, PersistenceError, SessionData, SqlitePersistence};

use crate::error::AuthError;

/// Operator roles for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Reviews submitted bookings: approves, rejects, records payments
    /// and corrects add-ons. Creates operators.
    Admin,
    /// Travel agent: builds a cart, checks it out, cancels and uploads
    /// receipts for its own sub-bookings.
    Agent,
}

impl Role {
    /// Returns the stored representation of this role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Agent => "Agent",
        }
    }

    /// Parses a stored role.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a known role.
    pub fn parse_str(value: &str) -> Result<Self, AuthError> {
        match value {
            "Admin" => Ok(Self::Admin),
            "Agent" => Ok(Self::Agent),
            _ => Err(AuthError::AuthenticationFailed {
                reason: format!("Invalid role: {value}"),
            }),
        }
    }
}

/// An authenticated operator with an associated role.
///
/// This is the identity context every booking operation consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The operator's database identifier.
    pub operator_id: i64,
    /// The role assigned to this operator.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(operator_id: i64, role: Role) -> Self {
        Self { operator_id, role }
    }

    /// Builds the actor for a stored operator.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored role is unknown.
    pub fn from_operator(operator: &OperatorData) -> Result<Self, AuthError> {
        Ok(Self::new(
            operator.operator_id,
            Role::parse_str(&operator.role)?,
        ))
    }
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Requires the Admin role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthorized` naming `action` otherwise.
    pub fn require_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        Self::require(actor, Role::Admin, action)
    }

    /// Requires the Agent role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthorized` naming `action` otherwise.
    pub fn require_agent(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        Self::require(actor, Role::Agent, action)
    }

    fn require(actor: &AuthenticatedActor, role: Role, action: &str) -> Result<(), AuthError> {
        if actor.role == role {
            return Ok(());
        }
        warn!(
            operator_id = actor.operator_id,
            action,
            required_role = role.as_str(),
            "Authorization rejected"
        );
        Err(AuthError::Unauthorized {
            action: action.to_string(),
            required_role: role.as_str().to_string(),
        })
    }
}

/// Authentication service for session-based authentication.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Default session expiration duration (30 days).
    const DEFAULT_SESSION_EXPIRATION: Duration = Duration::days(30);

    /// Verifies credentials and creates a session.
    ///
    /// Unknown login names and wrong passwords are reported identically.
    ///
    /// # Returns
    ///
    /// A tuple of (`session_token`, `authenticated_actor`, `operator_data`)
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails.
    pub fn login(
        persistence: &mut SqlitePersistence,
        login_name: &str,
        password: &str,
    ) -> Result<(String, AuthenticatedActor, OperatorData), AuthError> {
        let invalid_credentials = || AuthError::AuthenticationFailed {
            reason: String::from("Invalid login name or password"),
        };

        let operator: OperatorData = persistence
            .get_operator_by_login(login_name)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| {
                warn!(login_name, "Login attempt for unknown operator");
                invalid_credentials()
            })?;

        let password_valid: bool = persistence
            .verify_password(password, &operator.password_hash)
            .map_err(Self::map_persistence_error)?;
        if !password_valid {
            warn!(login_name, "Login attempt with wrong password");
            return Err(invalid_credentials());
        }

        let actor: AuthenticatedActor = AuthenticatedActor::from_operator(&operator)?;

        let session_token: String = Self::generate_session_token();
        let expires_at: String = (OffsetDateTime::now_utc() + Self::DEFAULT_SESSION_EXPIRATION)
            .format(&Rfc3339)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to format expiration time: {e}"),
            })?;

        persistence
            .create_session(&session_token, operator.operator_id, &expires_at)
            .map_err(Self::map_persistence_error)?;
        persistence
            .update_last_login(operator.operator_id)
            .map_err(Self::map_persistence_error)?;

        info!(
            operator_id = operator.operator_id,
            role = actor.role.as_str(),
            "Operator logged in"
        );
        Ok((session_token, actor, operator))
    }

    /// Validates a session token and returns the authenticated actor.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown or expired, or the
    /// operator is missing.
    pub fn validate_session(
        persistence: &mut SqlitePersistence,
        session_token: &str,
    ) -> Result<(AuthenticatedActor, OperatorData), AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let expires_at: OffsetDateTime = OffsetDateTime::parse(&session.expires_at, &Rfc3339)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to parse session expiration: {e}"),
            })?;
        if OffsetDateTime::now_utc() > expires_at {
            debug!(session_id = session.session_id, "Session expired");
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let operator: OperatorData = persistence
            .get_operator_by_id(session.operator_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Operator not found"),
            })?;

        let actor: AuthenticatedActor = AuthenticatedActor::from_operator(&operator)?;

        persistence
            .update_session_activity(session.session_id)
            .map_err(Self::map_persistence_error)?;

        Ok((actor, operator))
    }

    /// Logs out by deleting the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be deleted.
    pub fn logout(
        persistence: &mut SqlitePersistence,
        session_token: &str,
    ) -> Result<(), AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(Self::map_persistence_error)
    }

    fn generate_session_token() -> String {
        let timestamp: i128 = OffsetDateTime::now_utc().unix_timestamp_nanos();
        format!("session_{timestamp}_{}", rand::random::<u64>())
    }

    fn map_persistence_error(err: PersistenceError) -> AuthError {
        match err {
            PersistenceError::SessionNotFound(msg) | PersistenceError::OperatorNotFound(msg) => {
                AuthError::AuthenticationFailed { reason: msg }
            }
            _ => AuthError::AuthenticationFailed {
                reason: format!("Database error: {err}"),
            },
        }
    }
}
