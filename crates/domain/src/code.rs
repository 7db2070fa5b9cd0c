// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Human-readable identifier format.
//!
//! Codes look like `BK-3FA9C01D`: a scope prefix, a dash, and eight
//! uppercase hexadecimal digits. Uniqueness is enforced by the persistence
//! layer, which retries generation up to [`MAX_CODE_ATTEMPTS`] times.

use serde::{Deserialize, Serialize};

/// Number of generation attempts before giving up.
pub const MAX_CODE_ATTEMPTS: usize = 10;

/// Namespace a code is unique within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeScope {
    BookingCodes,
    SubBookingCodes,
    InvoiceCodes,
}

impl CodeScope {
    /// Scope name as stored in the reservation table.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BookingCodes => "booking_codes",
            Self::SubBookingCodes => "sub_booking_codes",
            Self::InvoiceCodes => "invoice_codes",
        }
    }

    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::BookingCodes => "BK",
            Self::SubBookingCodes => "SB",
            Self::InvoiceCodes => "INV",
        }
    }

    /// Formats a code in this scope from a random suffix.
    #[must_use]
    pub fn format(&self, suffix: u32) -> String {
        format_code(self.prefix(), suffix)
    }
}

#[must_use]
pub fn format_code(prefix: &str, suffix: u32) -> String {
    format!("{prefix}-{suffix:08X}")
}

/// Returns true if `code` has the shape of a code in `scope`.
#[must_use]
pub fn is_well_formed(scope: CodeScope, code: &str) -> bool {
    code.strip_prefix(scope.prefix())
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|hex| {
            hex.len() == 8
                && hex
                    .chars()
                    .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
        })
}
