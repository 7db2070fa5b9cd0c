// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking, detail, guest and invoice queries.
//!
//! Snapshot columns are stored as JSON text and decoded here.

use diesel::SqliteConnection;
use diesel::prelude::*;
use hotel_booking_domain::{
    AdditionalSnapshot, BookingStatus, DomainError, Guest, InvoiceBreakdown, PaymentStatus,
    PromoSnapshot, RoomSnapshot,
};
use num_traits::ToPrimitive;
use std::collections::HashMap;
use tracing::debug;

use crate::data_models::{
    BookingData, BookingDetailAdditionalData, BookingDetailData, BookingGuestData, BookingView,
    DetailNotificationContext, InvoiceData, StatusHistoryData,
};
use crate::diesel_schema::{
    booking_detail_additionals, booking_detail_status_history, booking_details, booking_guests,
    bookings, invoices,
};
use crate::error::PersistenceError;
use crate::queries::operators::get_agent_contact;
use crate::queries::to_u32;

#[derive(Queryable, Selectable)]
#[diesel(table_name = bookings)]
struct BookingRow {
    booking_id: i64,
    booking_code: String,
    agent_id: i64,
    booking_status: String,
    payment_status: String,
    created_at: String,
    submitted_at: Option<String>,
    approved_at: Option<String>,
}

impl TryFrom<BookingRow> for BookingData {
    type Error = PersistenceError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            booking_id: row.booking_id,
            booking_code: row.booking_code,
            agent_id: row.agent_id,
            booking_status: parse_booking_status(&row.booking_status)?,
            payment_status: parse_payment_status(&row.payment_status)?,
            created_at: row.created_at,
            submitted_at: row.submitted_at,
            approved_at: row.approved_at,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = booking_details)]
struct BookingDetailRow {
    booking_detail_id: i64,
    booking_id: i64,
    sub_booking_code: String,
    room_price_id: i64,
    promo_id: Option<i64>,
    check_in: String,
    check_out: String,
    quantity: i32,
    guest_name: Option<String>,
    additional_notes: Option<String>,
    admin_notes: Option<String>,
    room_snapshot: String,
    promo_snapshot: Option<String>,
    price: i64,
    currency: String,
    booking_status: String,
    payment_status: String,
    status_reason: Option<String>,
    receipt_url: Option<String>,
    created_at: String,
    approved_at: Option<String>,
}

impl BookingDetailRow {
    fn into_data(
        self,
        additionals: Vec<BookingDetailAdditionalData>,
    ) -> Result<BookingDetailData, PersistenceError> {
        let room: RoomSnapshot = serde_json::from_str(&self.room_snapshot)?;
        let promo: Option<PromoSnapshot> = self
            .promo_snapshot
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(BookingDetailData {
            booking_detail_id: self.booking_detail_id,
            booking_id: self.booking_id,
            sub_booking_code: self.sub_booking_code,
            room_price_id: self.room_price_id,
            promo_id: self.promo_id,
            check_in: self.check_in,
            check_out: self.check_out,
            quantity: to_u32(self.quantity, "booking_details.quantity")?,
            guest_name: self.guest_name,
            additional_notes: self.additional_notes,
            admin_notes: self.admin_notes,
            room,
            promo,
            price: self.price,
            currency: self.currency,
            booking_status: parse_booking_status(&self.booking_status)?,
            payment_status: parse_payment_status(&self.payment_status)?,
            status_reason: self.status_reason,
            receipt_url: self.receipt_url,
            created_at: self.created_at,
            approved_at: self.approved_at,
            additionals,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = booking_detail_additionals)]
struct BookingDetailAdditionalRow {
    booking_detail_additional_id: i64,
    booking_detail_id: i64,
    room_type_additional_id: i64,
    name: String,
    charge_basis: String,
    price: i64,
    pax: Option<i32>,
}

impl TryFrom<BookingDetailAdditionalRow> for BookingDetailAdditionalData {
    type Error = PersistenceError;

    fn try_from(row: BookingDetailAdditionalRow) -> Result<Self, Self::Error> {
        Ok(Self {
            booking_detail_additional_id: row.booking_detail_additional_id,
            booking_detail_id: row.booking_detail_id,
            additional: AdditionalSnapshot {
                room_type_additional_id: row.room_type_additional_id,
                name: row.name,
                charge_basis: row.charge_basis.parse().map_err(corrupt)?,
                price: row.price,
                pax: row
                    .pax
                    .map(|pax| to_u32(pax, "booking_detail_additionals.pax"))
                    .transpose()?,
            },
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = booking_guests)]
struct BookingGuestRow {
    booking_guest_id: i64,
    booking_id: i64,
    name: String,
    honorific: String,
    category: String,
    age: Option<i32>,
}

impl TryFrom<BookingGuestRow> for BookingGuestData {
    type Error = PersistenceError;

    fn try_from(row: BookingGuestRow) -> Result<Self, Self::Error> {
        let age: Option<u8> = row
            .age
            .map(|age| {
                age.to_u8().ok_or_else(|| {
                    PersistenceError::CorruptRecord(format!(
                        "booking_guests.age holds out-of-range value {age}"
                    ))
                })
            })
            .transpose()?;

        Ok(Self {
            booking_guest_id: row.booking_guest_id,
            booking_id: row.booking_id,
            guest: Guest::new(
                row.name,
                row.honorific.parse().map_err(corrupt)?,
                row.category.parse().map_err(corrupt)?,
                age,
            ),
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = invoices)]
struct InvoiceRow {
    invoice_id: i64,
    invoice_code: String,
    booking_detail_id: i64,
    breakdown: String,
    total: i64,
    currency: String,
    created_at: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = booking_detail_status_history)]
struct StatusHistoryRow {
    history_id: i64,
    booking_detail_id: i64,
    previous_status: String,
    new_status: String,
    actor_operator_id: i64,
    reason: Option<String>,
    changed_at: String,
}

#[allow(clippy::needless_pass_by_value)]
fn corrupt(err: DomainError) -> PersistenceError {
    PersistenceError::CorruptRecord(err.to_string())
}

pub(crate) fn parse_booking_status(value: &str) -> Result<BookingStatus, PersistenceError> {
    value.parse().map_err(corrupt)
}

pub(crate) fn parse_payment_status(value: &str) -> Result<PaymentStatus, PersistenceError> {
    value.parse().map_err(corrupt)
}

/// Finds the ID of the agent's cart booking, if one exists.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_cart_id(
    conn: &mut SqliteConnection,
    agent_id: i64,
) -> Result<Option<i64>, PersistenceError> {
    let cart_id: Option<i64> = bookings::table
        .filter(bookings::agent_id.eq(agent_id))
        .filter(bookings::booking_status.eq(BookingStatus::Cart.as_str()))
        .select(bookings::booking_id)
        .first(conn)
        .optional()?;

    debug!(agent_id, ?cart_id, "Looked up cart");
    Ok(cart_id)
}

/// Counts the agent's cart bookings. Never more than one.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_carts_for_agent(
    conn: &mut SqliteConnection,
    agent_id: i64,
) -> Result<i64, PersistenceError> {
    use diesel::dsl::count_star;

    Ok(bookings::table
        .filter(bookings::agent_id.eq(agent_id))
        .filter(bookings::booking_status.eq(BookingStatus::Cart.as_str()))
        .select(count_star())
        .first(conn)?)
}

/// Retrieves the booking header row.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_booking(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<Option<BookingData>, PersistenceError> {
    let row: Option<BookingRow> = bookings::table
        .filter(bookings::booking_id.eq(booking_id))
        .select(BookingRow::as_select())
        .first(conn)
        .optional()?;

    row.map(BookingData::try_from).transpose()
}

/// Retrieves a booking with its details and guests.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_booking_view(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<Option<BookingView>, PersistenceError> {
    let Some(booking) = get_booking(conn, booking_id)? else {
        return Ok(None);
    };

    let details = get_details_for_booking(conn, booking_id)?;
    let guests = get_guests_for_booking(conn, booking_id)?;

    Ok(Some(BookingView {
        booking,
        details,
        guests,
    }))
}

/// Retrieves the agent's cart with its details and guests.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_cart_view(
    conn: &mut SqliteConnection,
    agent_id: i64,
) -> Result<Option<BookingView>, PersistenceError> {
    match find_cart_id(conn, agent_id)? {
        Some(cart_id) => get_booking_view(conn, cart_id),
        None => Ok(None),
    }
}

/// Retrieves all details of a booking in creation order.
///
/// # Errors
///
/// Returns an error if the database query fails or a snapshot cannot be decoded.
pub fn get_details_for_booking(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<Vec<BookingDetailData>, PersistenceError> {
    let rows: Vec<BookingDetailRow> = booking_details::table
        .filter(booking_details::booking_id.eq(booking_id))
        .select(BookingDetailRow::as_select())
        .order(booking_details::booking_detail_id.asc())
        .load(conn)?;

    attach_additionals(conn, rows)
}

/// Retrieves the details with the given IDs, in ID order.
///
/// # Errors
///
/// Returns an error if the database query fails or a snapshot cannot be decoded.
pub fn get_details_by_ids(
    conn: &mut SqliteConnection,
    detail_ids: &[i64],
) -> Result<Vec<BookingDetailData>, PersistenceError> {
    if detail_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<BookingDetailRow> = booking_details::table
        .filter(booking_details::booking_detail_id.eq_any(detail_ids))
        .select(BookingDetailRow::as_select())
        .order(booking_details::booking_detail_id.asc())
        .load(conn)?;

    attach_additionals(conn, rows)
}

fn attach_additionals(
    conn: &mut SqliteConnection,
    rows: Vec<BookingDetailRow>,
) -> Result<Vec<BookingDetailData>, PersistenceError> {
    let detail_ids: Vec<i64> = rows.iter().map(|r| r.booking_detail_id).collect();

    let additional_rows: Vec<BookingDetailAdditionalRow> = booking_detail_additionals::table
        .filter(booking_detail_additionals::booking_detail_id.eq_any(&detail_ids))
        .select(BookingDetailAdditionalRow::as_select())
        .order(booking_detail_additionals::booking_detail_additional_id.asc())
        .load(conn)?;

    let mut by_detail: HashMap<i64, Vec<BookingDetailAdditionalData>> = HashMap::new();
    for row in additional_rows {
        let data = BookingDetailAdditionalData::try_from(row)?;
        by_detail
            .entry(data.booking_detail_id)
            .or_default()
            .push(data);
    }

    rows.into_iter()
        .map(|row| {
            let additionals = by_detail.remove(&row.booking_detail_id).unwrap_or_default();
            row.into_data(additionals)
        })
        .collect()
}

/// Retrieves one add-on attached to a booking detail.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_booking_detail_additional(
    conn: &mut SqliteConnection,
    booking_detail_additional_id: i64,
) -> Result<Option<BookingDetailAdditionalData>, PersistenceError> {
    let row: Option<BookingDetailAdditionalRow> = booking_detail_additionals::table
        .filter(
            booking_detail_additionals::booking_detail_additional_id
                .eq(booking_detail_additional_id),
        )
        .select(BookingDetailAdditionalRow::as_select())
        .first(conn)
        .optional()?;

    row.map(BookingDetailAdditionalData::try_from).transpose()
}

/// Retrieves the guest list of a booking.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_guests_for_booking(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<Vec<BookingGuestData>, PersistenceError> {
    let rows: Vec<BookingGuestRow> = booking_guests::table
        .filter(booking_guests::booking_id.eq(booking_id))
        .select(BookingGuestRow::as_select())
        .order(booking_guests::booking_guest_id.asc())
        .load(conn)?;

    rows.into_iter().map(BookingGuestData::try_from).collect()
}

/// Current status of every detail of a booking.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn detail_statuses_for_booking(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<Vec<BookingStatus>, PersistenceError> {
    let statuses: Vec<String> = booking_details::table
        .filter(booking_details::booking_id.eq(booking_id))
        .select(booking_details::booking_status)
        .load(conn)?;

    statuses.iter().map(|s| parse_booking_status(s)).collect()
}

/// Current payment status of every detail of a booking.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn payment_statuses_for_booking(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<Vec<PaymentStatus>, PersistenceError> {
    let statuses: Vec<String> = booking_details::table
        .filter(booking_details::booking_id.eq(booking_id))
        .select(booking_details::payment_status)
        .load(conn)?;

    statuses.iter().map(|s| parse_payment_status(s)).collect()
}

/// Counts the details of a booking still awaiting a decision.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_waiting_details(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<i64, PersistenceError> {
    use diesel::dsl::count_star;

    Ok(booking_details::table
        .filter(booking_details::booking_id.eq(booking_id))
        .filter(booking_details::booking_status.eq(BookingStatus::WaitingApproval.as_str()))
        .select(count_star())
        .first(conn)?)
}

/// Ownership and status facts about a detail, looked up by sub-booking code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailOwnership {
    pub booking_detail_id: i64,
    pub booking_id: i64,
    pub agent_id: i64,
    pub detail_status: BookingStatus,
    pub booking_status: BookingStatus,
}

/// Looks up a detail and its parent booking's owner by sub-booking code.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_detail_by_code(
    conn: &mut SqliteConnection,
    sub_booking_code: &str,
) -> Result<Option<DetailOwnership>, PersistenceError> {
    let row: Option<(i64, i64, i64, String, String)> = booking_details::table
        .inner_join(bookings::table)
        .filter(booking_details::sub_booking_code.eq(sub_booking_code))
        .select((
            booking_details::booking_detail_id,
            booking_details::booking_id,
            bookings::agent_id,
            booking_details::booking_status,
            bookings::booking_status,
        ))
        .first(conn)
        .optional()?;

    row.map(
        |(booking_detail_id, booking_id, agent_id, detail_status, booking_status)| {
            Ok(DetailOwnership {
                booking_detail_id,
                booking_id,
                agent_id,
                detail_status: parse_booking_status(&detail_status)?,
                booking_status: parse_booking_status(&booking_status)?,
            })
        },
    )
    .transpose()
}

/// Looks up a detail's parent booking and owner by detail ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_detail_by_id(
    conn: &mut SqliteConnection,
    booking_detail_id: i64,
) -> Result<Option<DetailOwnership>, PersistenceError> {
    let code: Option<String> = booking_details::table
        .filter(booking_details::booking_detail_id.eq(booking_detail_id))
        .select(booking_details::sub_booking_code)
        .first(conn)
        .optional()?;

    match code {
        Some(code) => find_detail_by_code(conn, &code),
        None => Ok(None),
    }
}

/// Re-reads details with the context their notifications need.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_notification_contexts(
    conn: &mut SqliteConnection,
    detail_ids: &[i64],
) -> Result<Vec<DetailNotificationContext>, PersistenceError> {
    let details = get_details_by_ids(conn, detail_ids)?;
    let mut contexts = Vec::with_capacity(details.len());

    for detail in details {
        let booking = get_booking(conn, detail.booking_id)?.ok_or_else(|| {
            PersistenceError::NotFound(format!("Booking {} not found", detail.booking_id))
        })?;
        let agent = get_agent_contact(conn, booking.agent_id)?;
        contexts.push(DetailNotificationContext {
            booking_code: booking.booking_code,
            agent,
            detail,
        });
    }

    Ok(contexts)
}

/// Retrieves the invoice of a booking detail.
///
/// # Errors
///
/// Returns an error if the database query fails or the breakdown cannot be decoded.
pub fn get_invoice_for_detail(
    conn: &mut SqliteConnection,
    booking_detail_id: i64,
) -> Result<Option<InvoiceData>, PersistenceError> {
    let row: Option<(InvoiceRow, i64)> = invoices::table
        .inner_join(booking_details::table.inner_join(bookings::table))
        .filter(invoices::booking_detail_id.eq(booking_detail_id))
        .select((InvoiceRow::as_select(), bookings::agent_id))
        .first(conn)
        .optional()?;

    row.map(|(row, agent_id)| {
        let breakdown: InvoiceBreakdown = serde_json::from_str(&row.breakdown)?;
        Ok(InvoiceData {
            invoice_id: row.invoice_id,
            invoice_code: row.invoice_code,
            booking_detail_id: row.booking_detail_id,
            agent_id,
            breakdown,
            total: row.total,
            currency: row.currency,
            created_at: row.created_at,
        })
    })
    .transpose()
}

/// Retrieves the status history of a booking detail, oldest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_status_history(
    conn: &mut SqliteConnection,
    booking_detail_id: i64,
) -> Result<Vec<StatusHistoryData>, PersistenceError> {
    let rows: Vec<StatusHistoryRow> = booking_detail_status_history::table
        .filter(booking_detail_status_history::booking_detail_id.eq(booking_detail_id))
        .select(StatusHistoryRow::as_select())
        .order(booking_detail_status_history::history_id.asc())
        .load(conn)?;

    rows.into_iter()
        .map(|row| {
            Ok(StatusHistoryData {
                history_id: row.history_id,
                booking_detail_id: row.booking_detail_id,
                previous_status: parse_booking_status(&row.previous_status)?,
                new_status: parse_booking_status(&row.new_status)?,
                actor_operator_id: row.actor_operator_id,
                reason: row.reason,
                changed_at: row.changed_at,
            })
        })
        .collect()
}
