// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod booking_status;
mod code;
mod error;
mod guest;
mod snapshot;
mod stay;
mod validation;

#[cfg(test)]
mod tests;

pub use booking_status::{
    BookingStatus, PaymentStatus, aggregate_booking_status, aggregate_payment_status,
};
pub use code::{CodeScope, MAX_CODE_ATTEMPTS, format_code, is_well_formed};
pub use error::DomainError;
pub use guest::{
    Guest, GuestCategory, Honorific, MAX_CHILD_AGE, MAX_GUEST_NAME_LENGTH, validate_guest_list,
    validate_guest_name,
};
pub use snapshot::{
    AdditionalSnapshot, ChargeBasis, InvoiceBreakdown, InvoiceLine, PromoSnapshot, RoomSnapshot,
    build_invoice_breakdown,
};
pub use stay::{StayPeriod, parse_stay_date};
pub use validation::{
    AdditionalOffer, AdditionalSelection, MAX_NOTES_LENGTH, MAX_QUANTITY,
    build_additional_snapshots, validate_notes, validate_price, validate_quantity,
    validate_required_text,
};
