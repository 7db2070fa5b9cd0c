// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Agent-initiated cancellation of a single sub-booking.

use diesel::SqliteConnection;
use hotel_booking_domain::BookingStatus;
use tracing::{debug, info};

use crate::data_models::StatusChangeResult;
use crate::error::PersistenceError;
use crate::mutations::reconciliation::{recompute_aggregate, transition_details};
use crate::queries::bookings::{find_detail_by_code, get_notification_contexts};

/// Cancels one of the agent's submitted sub-bookings.
///
/// A code that does not exist and a code owned by another agent are
/// reported identically.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the code does not exist or the
/// sub-booking belongs to another agent, and
/// `PersistenceError::NoBookingDetailUpdated` if it is not awaiting approval.
pub fn cancel_booking(
    conn: &mut SqliteConnection,
    agent_id: i64,
    sub_booking_code: &str,
) -> Result<StatusChangeResult, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let detail = find_detail_by_code(conn, sub_booking_code)?
            .filter(|d| d.agent_id == agent_id)
            .ok_or_else(|| {
                PersistenceError::NotFound(format!("Sub-booking {sub_booking_code} not found"))
            })?;

        if detail.booking_status == BookingStatus::Cart
            || detail.detail_status != BookingStatus::WaitingApproval
        {
            debug!(
                sub_booking_code,
                detail_status = detail.detail_status.as_str(),
                "Sub-booking is not awaiting approval"
            );
            return Err(PersistenceError::NoBookingDetailUpdated);
        }

        transition_details(
            conn,
            detail.booking_id,
            &[detail.booking_detail_id],
            BookingStatus::Canceled,
            agent_id,
            None,
        )?;

        let rolled_up: Option<BookingStatus> = recompute_aggregate(conn, detail.booking_id)?;
        let details = get_notification_contexts(conn, &[detail.booking_detail_id])?;

        info!(
            agent_id,
            booking_id = detail.booking_id,
            sub_booking_code,
            "Sub-booking canceled"
        );

        Ok(StatusChangeResult {
            booking_id: detail.booking_id,
            booking_status: rolled_up.unwrap_or(detail.booking_status),
            aggregate_updated: rolled_up.is_some(),
            details,
        })
    })
}
