// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Annotations and corrections on submitted booking details.
//!
//! None of these touch detail status, snapshots or invoices.

use diesel::SqliteConnection;
use diesel::prelude::*;
use hotel_booking_domain::{BookingStatus, validate_notes, validate_price, validate_required_text};
use tracing::info;

use crate::data_models::BookingDetailAdditionalData;
use crate::diesel_schema::{booking_detail_additionals, booking_details};
use crate::error::PersistenceError;
use crate::queries::bookings::{find_detail_by_code, get_booking_detail_additional};

/// Sets the administrator notes of a booking detail.
///
/// # Errors
///
/// Returns an error if the notes are too long, or
/// `PersistenceError::NotFound` if the detail does not exist.
pub fn update_booking_detail_admin_notes(
    conn: &mut SqliteConnection,
    booking_detail_id: i64,
    notes: Option<&str>,
) -> Result<(), PersistenceError> {
    if let Some(notes) = notes {
        validate_notes("admin_notes", notes)?;
    }

    conn.immediate_transaction(|conn| {
        let rows_affected: usize = diesel::update(booking_details::table)
            .filter(booking_details::booking_detail_id.eq(booking_detail_id))
            .set(booking_details::admin_notes.eq(notes))
            .execute(conn)?;

        if rows_affected == 0 {
            return Err(PersistenceError::NotFound(format!(
                "Booking detail {booking_detail_id} not found"
            )));
        }

        info!(booking_detail_id, "Admin notes updated");
        Ok(())
    })
}

/// Corrects the name and/or price of an add-on attached to a detail.
///
/// Already issued invoices are left unchanged.
///
/// # Errors
///
/// Returns an error if the price is negative, the name is blank, or
/// `PersistenceError::NotFound` if the add-on does not exist.
pub fn correct_booking_detail_additional(
    conn: &mut SqliteConnection,
    booking_detail_additional_id: i64,
    name: Option<&str>,
    price: Option<i64>,
) -> Result<BookingDetailAdditionalData, PersistenceError> {
    if let Some(price) = price {
        validate_price(price)?;
    }
    if let Some(name) = name {
        validate_required_text("name", name)?;
    }
    let name: Option<&str> = name.map(str::trim);

    conn.immediate_transaction(|conn| {
        let not_found = || {
            PersistenceError::NotFound(format!(
                "Booking detail additional {booking_detail_additional_id} not found"
            ))
        };
        if get_booking_detail_additional(conn, booking_detail_additional_id)?.is_none() {
            return Err(not_found());
        }

        if name.is_some() || price.is_some() {
            diesel::update(booking_detail_additionals::table)
                .filter(
                    booking_detail_additionals::booking_detail_additional_id
                        .eq(booking_detail_additional_id),
                )
                .set((
                    name.map(|name| booking_detail_additionals::name.eq(name)),
                    price.map(|price| booking_detail_additionals::price.eq(price)),
                ))
                .execute(conn)?;
        }

        let corrected = get_booking_detail_additional(conn, booking_detail_additional_id)?
            .ok_or_else(not_found)?;

        info!(
            booking_detail_additional_id,
            booking_detail_id = corrected.booking_detail_id,
            price = corrected.additional.price,
            "Booking detail additional corrected"
        );
        Ok(corrected)
    })
}

/// Records the stored receipt location on one of the agent's submitted
/// sub-bookings.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the code does not exist or
/// belongs to another agent, and `PersistenceError::NoBookingDetailUpdated`
/// if the booking has not been submitted.
pub fn set_receipt_url(
    conn: &mut SqliteConnection,
    agent_id: i64,
    sub_booking_code: &str,
    receipt_url: &str,
) -> Result<i64, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let detail = find_detail_by_code(conn, sub_booking_code)?
            .filter(|d| d.agent_id == agent_id)
            .ok_or_else(|| {
                PersistenceError::NotFound(format!("Sub-booking {sub_booking_code} not found"))
            })?;

        if detail.booking_status == BookingStatus::Cart {
            return Err(PersistenceError::NoBookingDetailUpdated);
        }

        diesel::update(booking_details::table)
            .filter(booking_details::booking_detail_id.eq(detail.booking_detail_id))
            .set(booking_details::receipt_url.eq(receipt_url))
            .execute(conn)?;

        info!(agent_id, sub_booking_code, "Receipt recorded");
        Ok(detail.booking_detail_id)
    })
}
