// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking detail status transitions and aggregate rollup.
//!
//! A detail leaves `waiting_approval` exactly once. Every transition is a
//! guarded `UPDATE ... WHERE booking_status = 'waiting_approval'`; when the
//! guard matches fewer rows than requested the enclosing transaction fails
//! with [`PersistenceError::NoBookingDetailUpdated`] and nothing is written.
//!
//! After every transition the owning booking's aggregate status is
//! recomputed by [`recompute_aggregate`], which is the only writer of
//! `bookings.booking_status` once a booking has been submitted.

use diesel::SqliteConnection;
use diesel::prelude::*;
use hotel_booking_domain::{
    BookingStatus, DomainError, PaymentStatus, aggregate_booking_status, aggregate_payment_status,
    validate_notes,
};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::data_models::{PaymentChangeResult, StatusChangeResult};
use crate::diesel_schema::{booking_detail_status_history, booking_details, bookings};
use crate::error::PersistenceError;
use crate::queries::bookings::{
    count_waiting_details, detail_statuses_for_booking, get_booking, get_notification_contexts,
    payment_statuses_for_booking,
};

pub(crate) fn now_sql() -> diesel::expression::SqlLiteral<diesel::sql_types::Nullable<diesel::sql_types::Text>>
{
    diesel::dsl::sql::<diesel::sql_types::Nullable<diesel::sql_types::Text>>("CURRENT_TIMESTAMP")
}

/// Recomputes a booking's aggregate status from its details.
///
/// Leaves the booking untouched while any detail is still waiting.
/// Otherwise writes the highest-priority detail status and stamps
/// `approved_at`. Idempotent. Runs inside the caller's transaction.
///
/// # Returns
///
/// The status written, or `None` if the aggregate was left untouched.
///
/// # Errors
///
/// Returns an error if the database query or update fails.
pub fn recompute_aggregate(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<Option<BookingStatus>, PersistenceError> {
    let waiting: i64 = count_waiting_details(conn, booking_id)?;
    if waiting > 0 {
        debug!(booking_id, waiting, "Rollup deferred");
        return Ok(None);
    }

    let statuses: Vec<BookingStatus> = detail_statuses_for_booking(conn, booking_id)?;
    let Some(aggregate) = aggregate_booking_status(&statuses) else {
        debug!(booking_id, "No details to roll up");
        return Ok(None);
    };

    diesel::update(bookings::table)
        .filter(bookings::booking_id.eq(booking_id))
        .set((
            bookings::booking_status.eq(aggregate.as_str()),
            bookings::approved_at.eq(now_sql()),
        ))
        .execute(conn)?;

    info!(booking_id, booking_status = aggregate.as_str(), "Booking status rolled up");
    Ok(Some(aggregate))
}

/// Recomputes a booking's aggregate payment status from its details.
///
/// Runs inside the caller's transaction.
///
/// # Errors
///
/// Returns an error if the database query or update fails.
pub fn recompute_payment_aggregate(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<PaymentStatus, PersistenceError> {
    let statuses: Vec<PaymentStatus> = payment_statuses_for_booking(conn, booking_id)?;
    let aggregate: PaymentStatus = aggregate_payment_status(&statuses);

    diesel::update(bookings::table)
        .filter(bookings::booking_id.eq(booking_id))
        .set(bookings::payment_status.eq(aggregate.as_str()))
        .execute(conn)?;

    debug!(booking_id, payment_status = aggregate.as_str(), "Payment status rolled up");
    Ok(aggregate)
}

/// Moves the given details of one booking out of `waiting_approval`.
///
/// Every listed detail must still be waiting, otherwise nothing is written
/// and the caller's transaction must roll back. A history row is written
/// per detail. Runs inside the caller's transaction.
pub(crate) fn transition_details(
    conn: &mut SqliteConnection,
    booking_id: i64,
    detail_ids: &[i64],
    new_status: BookingStatus,
    actor_operator_id: i64,
    reason: Option<&str>,
) -> Result<(), PersistenceError> {
    BookingStatus::WaitingApproval.validate_transition(new_status)?;

    let rows_affected: usize = diesel::update(booking_details::table)
        .filter(booking_details::booking_id.eq(booking_id))
        .filter(booking_details::booking_detail_id.eq_any(detail_ids))
        .filter(booking_details::booking_status.eq(BookingStatus::WaitingApproval.as_str()))
        .set((
            booking_details::booking_status.eq(new_status.as_str()),
            booking_details::status_reason.eq(reason),
            booking_details::approved_at.eq(now_sql()),
        ))
        .execute(conn)?;

    if rows_affected != detail_ids.len() {
        warn!(
            booking_id,
            requested = detail_ids.len(),
            rows_affected,
            new_status = new_status.as_str(),
            "Guarded status update matched fewer details than requested"
        );
        return Err(PersistenceError::NoBookingDetailUpdated);
    }

    for detail_id in detail_ids {
        diesel::insert_into(booking_detail_status_history::table)
            .values((
                booking_detail_status_history::booking_detail_id.eq(*detail_id),
                booking_detail_status_history::previous_status
                    .eq(BookingStatus::WaitingApproval.as_str()),
                booking_detail_status_history::new_status.eq(new_status.as_str()),
                booking_detail_status_history::actor_operator_id.eq(actor_operator_id),
                booking_detail_status_history::reason.eq(reason),
            ))
            .execute(conn)?;
    }

    Ok(())
}

/// Applies an administrative decision to details of one booking.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `actor_operator_id` - The deciding administrator
/// * `booking_id` - The booking the details belong to
/// * `detail_ids` - Details to decide; all must currently be waiting
/// * `new_status` - `Confirmed` or `Rejected`
/// * `reason` - Optional reason, typically for rejections
///
/// # Errors
///
/// Returns an error if:
/// - The status is not an administrative decision, or no details were given
/// - The booking does not exist (`NotFound`)
/// - The booking is still a cart, or any detail is not waiting or not part
///   of the booking (`NoBookingDetailUpdated`)
pub fn update_booking_detail_status(
    conn: &mut SqliteConnection,
    actor_operator_id: i64,
    booking_id: i64,
    detail_ids: &[i64],
    new_status: BookingStatus,
    reason: Option<&str>,
) -> Result<StatusChangeResult, PersistenceError> {
    new_status.validate_admin_decision()?;
    if detail_ids.is_empty() {
        return Err(DomainError::EmptyDetailSelection.into());
    }
    if let Some(reason) = reason {
        validate_notes("status_reason", reason)?;
    }
    let detail_ids: Vec<i64> = detail_ids
        .iter()
        .copied()
        .collect::<BTreeSet<i64>>()
        .into_iter()
        .collect();

    conn.immediate_transaction(|conn| {
        let booking = get_booking(conn, booking_id)?
            .ok_or_else(|| PersistenceError::NotFound(format!("Booking {booking_id} not found")))?;

        if booking.booking_status == BookingStatus::Cart {
            debug!(booking_id, "Refusing decision on a cart booking");
            return Err(PersistenceError::NoBookingDetailUpdated);
        }

        transition_details(
            conn,
            booking_id,
            &detail_ids,
            new_status,
            actor_operator_id,
            reason,
        )?;

        let rolled_up: Option<BookingStatus> = recompute_aggregate(conn, booking_id)?;
        let details = get_notification_contexts(conn, &detail_ids)?;

        info!(
            booking_id,
            actor_operator_id,
            detail_count = detail_ids.len(),
            new_status = new_status.as_str(),
            "Booking details decided"
        );

        Ok(StatusChangeResult {
            booking_id,
            booking_status: rolled_up.unwrap_or(booking.booking_status),
            aggregate_updated: rolled_up.is_some(),
            details,
        })
    })
}

/// Sets the payment status of details of one booking, then rolls up the
/// booking's payment status.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the booking does not exist, and
/// `PersistenceError::NoBookingDetailUpdated` if the booking is a cart, a
/// listed detail is not part of the booking, or no listed detail changed.
pub fn update_payment_status(
    conn: &mut SqliteConnection,
    booking_id: i64,
    detail_ids: &[i64],
    new_status: PaymentStatus,
) -> Result<PaymentChangeResult, PersistenceError> {
    if detail_ids.is_empty() {
        return Err(DomainError::EmptyDetailSelection.into());
    }

    conn.immediate_transaction(|conn| {
        let booking = get_booking(conn, booking_id)?
            .ok_or_else(|| PersistenceError::NotFound(format!("Booking {booking_id} not found")))?;

        if booking.booking_status == BookingStatus::Cart {
            return Err(PersistenceError::NoBookingDetailUpdated);
        }

        let requested: Vec<i64> = detail_ids
            .iter()
            .copied()
            .collect::<BTreeSet<i64>>()
            .into_iter()
            .collect();
        let matched: Vec<i64> = booking_details::table
            .filter(booking_details::booking_id.eq(booking_id))
            .filter(booking_details::booking_detail_id.eq_any(&requested))
            .select(booking_details::booking_detail_id)
            .load(conn)?;
        if matched.len() != requested.len() {
            warn!(
                booking_id,
                requested = requested.len(),
                matched = matched.len(),
                "Payment update lists details outside the booking"
            );
            return Err(PersistenceError::NoBookingDetailUpdated);
        }

        let updated_details: usize = diesel::update(booking_details::table)
            .filter(booking_details::booking_id.eq(booking_id))
            .filter(booking_details::booking_detail_id.eq_any(detail_ids))
            .filter(booking_details::payment_status.ne(new_status.as_str()))
            .set(booking_details::payment_status.eq(new_status.as_str()))
            .execute(conn)?;

        if updated_details == 0 {
            return Err(PersistenceError::NoBookingDetailUpdated);
        }

        let payment_status: PaymentStatus = recompute_payment_aggregate(conn, booking_id)?;

        info!(
            booking_id,
            updated_details,
            payment_status = payment_status.as_str(),
            "Payment status updated"
        );

        Ok(PaymentChangeResult {
            booking_id,
            payment_status,
            updated_details,
        })
    })
}
