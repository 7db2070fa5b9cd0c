// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Cart checkout.
//!
//! Checkout replaces the guest list, assigns a guest name to each listed
//! detail, submits the booking for approval and issues invoices, all in one
//! transaction. Any failure leaves the cart exactly as it was.

use diesel::SqliteConnection;
use diesel::prelude::*;
use hotel_booking_domain::{BookingStatus, Guest, validate_guest_list, validate_guest_name};
use tracing::{debug, info};

use crate::data_models::{BookingView, CheckoutResult, GuestAssignment};
use crate::diesel_schema::{booking_details, bookings};
use crate::error::PersistenceError;
use crate::mutations::cart::replace_guests;
use crate::mutations::invoices::create_invoices_for_details;
use crate::mutations::reconciliation::now_sql;
use crate::queries::bookings::{find_cart_id, get_booking_view};
use crate::queries::operators::get_agent_contact;

/// Submits the agent's cart.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `agent_id` - The agent whose cart is checked out
/// * `guests` - The complete guest list for the booking
/// * `assignments` - Guest names to set on individual cart details
///
/// # Errors
///
/// Returns an error if:
/// - A guest or assigned guest name is invalid
/// - The agent has no cart, or the cart has no details (`NotFound`)
/// - An assignment names a detail outside the cart (`NotFound`)
/// - An invoice code cannot be generated
pub fn check_out_cart(
    conn: &mut SqliteConnection,
    agent_id: i64,
    guests: &[Guest],
    assignments: &[GuestAssignment],
) -> Result<CheckoutResult, PersistenceError> {
    validate_guest_list(guests)?;
    for assignment in assignments {
        validate_guest_name(&assignment.guest_name)?;
    }

    conn.immediate_transaction(|conn| {
        let booking_id: i64 = find_cart_id(conn, agent_id)?
            .ok_or_else(|| PersistenceError::NotFound(format!("No cart for agent {agent_id}")))?;

        let cart: BookingView = get_booking_view(conn, booking_id)?
            .ok_or_else(|| PersistenceError::NotFound(format!("Booking {booking_id} not found")))?;
        if cart.details.is_empty() {
            return Err(PersistenceError::NotFound(format!(
                "Cart {booking_id} has no items"
            )));
        }

        replace_guests(conn, booking_id, guests)?;

        for assignment in assignments {
            let rows_affected: usize = diesel::update(booking_details::table)
                .filter(booking_details::booking_detail_id.eq(assignment.booking_detail_id))
                .filter(booking_details::booking_id.eq(booking_id))
                .set(booking_details::guest_name.eq(assignment.guest_name.trim()))
                .execute(conn)?;

            if rows_affected == 0 {
                debug!(
                    agent_id,
                    booking_detail_id = assignment.booking_detail_id,
                    "Guest assignment targets a detail outside the cart"
                );
                return Err(PersistenceError::NotFound(format!(
                    "Booking detail {} not found in cart",
                    assignment.booking_detail_id
                )));
            }
        }

        diesel::update(bookings::table)
            .filter(bookings::booking_id.eq(booking_id))
            .filter(bookings::booking_status.eq(BookingStatus::Cart.as_str()))
            .set((
                bookings::booking_status.eq(BookingStatus::WaitingApproval.as_str()),
                bookings::submitted_at.eq(now_sql()),
            ))
            .execute(conn)?;

        let invoice_codes: Vec<String> = create_invoices_for_details(conn, &cart.details)?;

        let booking: BookingView = get_booking_view(conn, booking_id)?
            .ok_or_else(|| PersistenceError::NotFound(format!("Booking {booking_id} not found")))?;
        let agent = get_agent_contact(conn, agent_id)?;

        info!(
            agent_id,
            booking_id,
            booking_code = %booking.booking.booking_code,
            detail_count = booking.details.len(),
            guest_count = guests.len(),
            "Cart checked out"
        );

        Ok(CheckoutResult {
            booking,
            agent,
            invoice_codes,
        })
    })
}
