// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Stay period validation.

use crate::error::DomainError;
use time::Date;
use time::macros::format_description;

/// A validated check-in / check-out pair.
///
/// Check-out is always strictly after check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayPeriod {
    check_in: Date,
    check_out: Date,
}

impl StayPeriod {
    /// Creates a stay period.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStayDuration` unless `check_out > check_in`.
    pub fn new(check_in: Date, check_out: Date) -> Result<Self, DomainError> {
        if check_out <= check_in {
            return Err(DomainError::InvalidStayDuration {
                check_in,
                check_out,
            });
        }
        // Reject spans that do not fit a night count.
        if u32::try_from((check_out - check_in).whole_days()).is_err() {
            return Err(DomainError::InvalidStayDuration {
                check_in,
                check_out,
            });
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// Parses both dates (`YYYY-MM-DD`) and validates the period.
    ///
    /// # Errors
    ///
    /// Returns an error if either date fails to parse or the period is invalid.
    pub fn parse(check_in: &str, check_out: &str) -> Result<Self, DomainError> {
        Self::new(parse_stay_date(check_in)?, parse_stay_date(check_out)?)
    }

    #[must_use]
    pub const fn check_in(&self) -> Date {
        self.check_in
    }

    #[must_use]
    pub const fn check_out(&self) -> Date {
        self.check_out
    }

    /// Number of nights in the stay. Always at least 1.
    #[must_use]
    pub fn nights(&self) -> u32 {
        u32::try_from((self.check_out - self.check_in).whole_days()).unwrap_or(u32::MAX)
    }

    /// Checks a promo's minimum-night requirement against this stay.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PromoNotValidForDuration` if the stay is shorter
    /// than `minimum_nights`.
    pub fn validate_promo(&self, promo_id: i64, minimum_nights: u32) -> Result<(), DomainError> {
        let nights = self.nights();
        if nights < minimum_nights {
            return Err(DomainError::PromoNotValidForDuration {
                promo_id,
                minimum_nights,
                nights,
            });
        }
        Ok(())
    }
}

/// Parses a `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if the string is not a valid date.
pub fn parse_stay_date(value: &str) -> Result<Date, DomainError> {
    Date::parse(value, format_description!("[year]-[month]-[day]")).map_err(|e| {
        DomainError::DateParseError {
            date_string: value.to_string(),
            error: e.to_string(),
        }
    })
}
