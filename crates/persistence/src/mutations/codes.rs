// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Unique code generation.
//!
//! A code is reserved by inserting it into `reserved_codes`. The primary
//! key `(scope, code)` rejects duplicates, in which case a new suffix is
//! drawn. These functions never open a transaction: they run inside the
//! caller's, so a failure rolls back everything the caller wrote.

use diesel::SqliteConnection;
use diesel::prelude::*;
use hotel_booking_domain::{CodeScope, MAX_CODE_ATTEMPTS};
use tracing::{debug, warn};

use crate::diesel_schema::reserved_codes;
use crate::error::{PersistenceError, is_unique_violation};

/// Reserves a fresh random code in `scope`.
///
/// # Errors
///
/// Returns `PersistenceError::CodeGenerationExhausted` if every attempt
/// collided, or a database error for any other failure.
pub fn reserve_code(
    conn: &mut SqliteConnection,
    scope: CodeScope,
) -> Result<String, PersistenceError> {
    reserve_code_with(conn, scope, rand::random::<u32>)
}

/// Reserves a code in `scope`, drawing suffixes from `next_suffix`.
///
/// # Errors
///
/// Returns `PersistenceError::CodeGenerationExhausted` after
/// [`MAX_CODE_ATTEMPTS`] collisions.
pub fn reserve_code_with<F>(
    conn: &mut SqliteConnection,
    scope: CodeScope,
    mut next_suffix: F,
) -> Result<String, PersistenceError>
where
    F: FnMut() -> u32,
{
    for attempt in 1..=MAX_CODE_ATTEMPTS {
        let code: String = scope.format(next_suffix());

        let result = diesel::insert_into(reserved_codes::table)
            .values((
                reserved_codes::scope.eq(scope.as_str()),
                reserved_codes::code.eq(&code),
            ))
            .execute(conn);

        match result {
            Ok(_) => {
                debug!(scope = scope.as_str(), code = %code, attempt, "Reserved code");
                return Ok(code);
            }
            Err(e) if is_unique_violation(&e) => {
                debug!(scope = scope.as_str(), code = %code, attempt, "Code collision, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    warn!(
        scope = scope.as_str(),
        attempts = MAX_CODE_ATTEMPTS,
        "Code generation exhausted"
    );
    Err(PersistenceError::CodeGenerationExhausted {
        scope: scope.as_str().to_string(),
        attempts: MAX_CODE_ATTEMPTS,
    })
}
