// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking guest contact entries.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Oldest age still recorded as a child.
pub const MAX_CHILD_AGE: u8 = 17;

/// Maximum length of a guest name.
pub const MAX_GUEST_NAME_LENGTH: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Honorific {
    Mr,
    Mrs,
    Ms,
}

impl Honorific {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mr => "Mr",
            Self::Mrs => "Mrs",
            Self::Ms => "Ms",
        }
    }
}

impl FromStr for Honorific {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Mr" => Ok(Self::Mr),
            "Mrs" => Ok(Self::Mrs),
            "Ms" => Ok(Self::Ms),
            _ => Err(DomainError::InvalidHonorific(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuestCategory {
    Adult,
    Child,
}

impl GuestCategory {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Adult => "adult",
            Self::Child => "child",
        }
    }
}

impl FromStr for GuestCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "adult" => Ok(Self::Adult),
            "child" => Ok(Self::Child),
            _ => Err(DomainError::InvalidGuestCategory(s.to_string())),
        }
    }
}

/// A guest on a booking's contact list.
///
/// Age is required for children and must be absent for adults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub name: String,
    pub honorific: Honorific,
    pub category: GuestCategory,
    pub age: Option<u8>,
}

impl Guest {
    #[must_use]
    pub const fn new(
        name: String,
        honorific: Honorific,
        category: GuestCategory,
        age: Option<u8>,
    ) -> Self {
        Self {
            name,
            honorific,
            category,
            age,
        }
    }

    /// Validates the guest entry.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidGuest` if the name is blank or too long,
    /// or the age does not match the category.
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_guest_name(&self.name)?;
        let name = self.name.trim();

        match (self.category, self.age) {
            (GuestCategory::Adult, None) => Ok(()),
            (GuestCategory::Adult, Some(_)) => Err(DomainError::InvalidGuest {
                reason: format!("adult guest '{name}' must not carry an age"),
            }),
            (GuestCategory::Child, None) => Err(DomainError::InvalidGuest {
                reason: format!("child guest '{name}' requires an age"),
            }),
            (GuestCategory::Child, Some(age)) if age > MAX_CHILD_AGE => {
                Err(DomainError::InvalidGuest {
                    reason: format!(
                        "child guest '{name}' age {age} exceeds {MAX_CHILD_AGE}"
                    ),
                })
            }
            (GuestCategory::Child, Some(_)) => Ok(()),
        }
    }
}

/// Validates a guest name: not blank and within [`MAX_GUEST_NAME_LENGTH`].
///
/// # Errors
///
/// Returns `DomainError::InvalidGuest` if the name is blank or too long.
pub fn validate_guest_name(name: &str) -> Result<(), DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::InvalidGuest {
            reason: "guest name cannot be empty".to_string(),
        });
    }
    if name.chars().count() > MAX_GUEST_NAME_LENGTH {
        return Err(DomainError::InvalidGuest {
            reason: format!("guest name exceeds {MAX_GUEST_NAME_LENGTH} characters"),
        });
    }
    Ok(())
}

/// Validates every guest in a list.
///
/// # Errors
///
/// Returns the first validation failure encountered.
pub fn validate_guest_list(guests: &[Guest]) -> Result<(), DomainError> {
    guests.iter().try_for_each(Guest::validate)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn adult(name: &str) -> Guest {
        Guest::new(name.to_string(), Honorific::Ms, GuestCategory::Adult, None)
    }

    #[test]
    fn test_adult_without_age_is_valid() {
        assert!(adult("Jane Doe").validate().is_ok());
    }

    #[test]
    fn test_child_requires_age() {
        let child = Guest::new(
            "Sam Doe".to_string(),
            Honorific::Mr,
            GuestCategory::Child,
            None,
        );
        assert!(matches!(
            child.validate(),
            Err(DomainError::InvalidGuest { .. })
        ));
    }

    #[test]
    fn test_child_age_upper_bound() {
        let mut child = Guest::new(
            "Sam Doe".to_string(),
            Honorific::Mr,
            GuestCategory::Child,
            Some(17),
        );
        assert!(child.validate().is_ok());
        child.age = Some(18);
        assert!(child.validate().is_err());
    }

    #[test]
    fn test_adult_with_age_rejected() {
        let mut guest = adult("Jane Doe");
        guest.age = Some(30);
        assert!(guest.validate().is_err());
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(adult("   ").validate().is_err());
    }

    #[test]
    fn test_honorific_parse() {
        assert_eq!("Mrs".parse::<Honorific>().unwrap(), Honorific::Mrs);
        assert!(matches!(
            "Dr".parse::<Honorific>(),
            Err(DomainError::InvalidHonorific(_))
        ));
    }

    #[test]
    fn test_guest_list_reports_first_failure() {
        let guests = vec![adult("Jane Doe"), adult("")];
        assert!(validate_guest_list(&guests).is_err());
        assert!(validate_guest_list(&[]).is_ok());
    }
}
