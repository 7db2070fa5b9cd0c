// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::Date;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A stored or requested booking status string is not recognised.
    InvalidBookingStatus {
        /// The unrecognised status string.
        status: String,
    },
    /// A stored or requested payment status string is not recognised.
    InvalidPaymentStatus {
        /// The unrecognised status string.
        status: String,
    },
    /// The requested status transition is not permitted.
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
        /// Why the transition is rejected.
        reason: String,
    },
    /// Administrative decisions may only confirm or reject.
    InvalidDecisionStatus {
        /// The requested status.
        status: String,
    },
    /// Check-out must be strictly after check-in.
    InvalidStayDuration {
        /// The requested check-in date.
        check_in: Date,
        /// The requested check-out date.
        check_out: Date,
    },
    /// The supplied promo requires a longer stay.
    PromoNotValidForDuration {
        /// The promo identifier.
        promo_id: i64,
        /// Minimum nights required by the promo.
        minimum_nights: u32,
        /// Nights in the requested stay.
        nights: u32,
    },
    /// Requested quantity is outside the permitted range.
    InvalidQuantity {
        /// The requested quantity.
        quantity: u32,
        /// The maximum permitted quantity.
        max: u32,
    },
    /// Failed to parse date from string.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// A guest entry failed validation.
    InvalidGuest {
        /// Description of the validation failure.
        reason: String,
    },
    /// Honorific is not one of the supported values.
    InvalidHonorific(String),
    /// Guest category is not one of the supported values.
    InvalidGuestCategory(String),
    /// A free-text field exceeds its length cap.
    TextTooLong {
        /// The field name.
        field: &'static str,
        /// The supplied length in characters.
        length: usize,
        /// The maximum length in characters.
        max: usize,
    },
    /// A required free-text field is blank.
    BlankText {
        /// The field name.
        field: &'static str,
    },
    /// Add-on charge basis string is not recognised.
    InvalidChargeBasis(String),
    /// A per-pax add-on was selected without a headcount.
    MissingPax {
        /// The add-on identifier.
        additional_id: i64,
    },
    /// An add-on was selected for a room type it does not belong to.
    AdditionalNotForRoomType {
        /// The add-on identifier.
        additional_id: i64,
        /// The room type of the selected room price.
        room_type_id: i64,
    },
    /// A required add-on for the room type was not selected.
    RequiredAdditionalMissing {
        /// The add-on identifier.
        additional_id: i64,
        /// The add-on name.
        name: String,
    },
    /// No booking detail identifiers were supplied.
    EmptyDetailSelection,
    /// A price or amount is negative.
    InvalidPrice {
        /// The invalid amount.
        amount: i64,
    },
    /// Code prefix is empty or contains unsupported characters.
    InvalidCodePrefix(String),
}

impl std::fmt::Display for DomainError {
    #[allow(clippy::too_many_lines)]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBookingStatus { status } => {
                write!(f, "Invalid booking status: '{status}'")
            }
            Self::InvalidPaymentStatus { status } => {
                write!(f, "Invalid payment status: '{status}'")
            }
            Self::InvalidStatusTransition { from, to, reason } => {
                write!(f, "Cannot transition from '{from}' to '{to}': {reason}")
            }
            Self::InvalidDecisionStatus { status } => {
                write!(
                    f,
                    "Invalid decision status '{status}': must be 'confirmed' or 'rejected'"
                )
            }
            Self::InvalidStayDuration {
                check_in,
                check_out,
            } => {
                write!(
                    f,
                    "Invalid stay duration: check-out {check_out} must be after check-in {check_in}"
                )
            }
            Self::PromoNotValidForDuration {
                promo_id,
                minimum_nights,
                nights,
            } => {
                write!(
                    f,
                    "promo not valid for the selected stay duration: promo {promo_id} requires at least {minimum_nights} nights, stay is {nights}"
                )
            }
            Self::InvalidQuantity { quantity, max } => {
                write!(
                    f,
                    "Invalid quantity: {quantity}. Must be between 1 and {max}"
                )
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::InvalidGuest { reason } => write!(f, "Invalid guest: {reason}"),
            Self::InvalidHonorific(value) => {
                write!(f, "Invalid honorific '{value}': must be Mr, Mrs or Ms")
            }
            Self::InvalidGuestCategory(value) => {
                write!(f, "Invalid guest category '{value}': must be adult or child")
            }
            Self::TextTooLong { field, length, max } => {
                write!(
                    f,
                    "Field '{field}' is too long: {length} characters (max {max})"
                )
            }
            Self::BlankText { field } => write!(f, "Field '{field}' cannot be empty"),
            Self::InvalidChargeBasis(value) => {
                write!(f, "Invalid add-on charge basis: '{value}'")
            }
            Self::MissingPax { additional_id } => {
                write!(f, "Add-on {additional_id} is charged per pax and needs a pax count")
            }
            Self::AdditionalNotForRoomType {
                additional_id,
                room_type_id,
            } => {
                write!(
                    f,
                    "Add-on {additional_id} is not offered for room type {room_type_id}"
                )
            }
            Self::RequiredAdditionalMissing {
                additional_id,
                name,
            } => {
                write!(f, "Required add-on '{name}' ({additional_id}) was not selected")
            }
            Self::EmptyDetailSelection => {
                write!(f, "At least one booking detail must be selected")
            }
            Self::InvalidPrice { amount } => {
                write!(f, "Invalid price: {amount}. Must not be negative")
            }
            Self::InvalidCodePrefix(prefix) => {
                write!(f, "Invalid code prefix: '{prefix}'")
            }
        }
    }
}

impl std::error::Error for DomainError {}
