// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for authenticated routes.
//!
//! Handlers that take a [`SessionOperator`] only run once the bearer
//! token has been validated against the session store.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use hotel_booking_api::{AuthenticatedActor, AuthenticationService};
use hotel_booking_persistence::OperatorData;
use tracing::{debug, warn};

use crate::{AppState, ErrorResponse};

/// Extractor for authenticated operators.
///
/// ```ignore
/// async fn handler(
///     SessionOperator(actor, operator): SessionOperator,
/// ) -> Result<Json<Response>, HttpError> {
///     // actor: AuthenticatedActor
///     // operator: OperatorData
/// }
/// ```
///
/// # Errors
///
/// Rejects with 401 when the `Authorization: Bearer <token>` header is
/// missing or malformed, or when the session is unknown or expired.
pub struct SessionOperator(pub AuthenticatedActor, pub OperatorData);

/// Reads the bearer token from the request headers.
///
/// # Errors
///
/// Returns an error if the header is missing or not a bearer token.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, SessionError> {
    let auth_header: &str = headers
        .get("Authorization")
        .ok_or_else(|| {
            debug!("Missing Authorization header");
            SessionError::MissingAuthorizationHeader
        })?
        .to_str()
        .map_err(|_| {
            warn!("Invalid Authorization header encoding");
            SessionError::InvalidAuthorizationHeader
        })?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("Authorization header does not start with 'Bearer '");
        SessionError::InvalidAuthorizationHeader
    })
}

impl FromRequestParts<AppState> for SessionOperator {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token: &str = bearer_token(&parts.headers)?;

        let mut persistence = state.persistence.lock().await;
        let (actor, operator) = AuthenticationService::validate_session(&mut persistence, token)
            .map_err(|e| {
                warn!(error = %e, "Session validation failed");
                SessionError::InvalidSession(e.to_string())
            })?;
        drop(persistence);

        debug!(
            operator_id = actor.operator_id,
            role = actor.role.as_str(),
            "Session validated"
        );

        Ok(Self(actor, operator))
    }
}

/// Session extraction errors.
#[derive(Debug)]
pub enum SessionError {
    MissingAuthorizationHeader,
    InvalidAuthorizationHeader,
    InvalidSession(String),
}

impl SessionError {
    /// Client-facing description of the failure.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::MissingAuthorizationHeader => String::from("Missing Authorization header"),
            Self::InvalidAuthorizationHeader => String::from(
                "Invalid Authorization header format. Expected: 'Bearer <token>'",
            ),
            Self::InvalidSession(reason) => format!("Session validation failed: {reason}"),
        }
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message(),
        });
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
