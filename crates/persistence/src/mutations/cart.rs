// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Cart mutations.
//!
//! Every agent has at most one booking in status `cart`. The partial unique
//! index `idx_bookings_one_cart_per_agent` enforces this; an insert that
//! loses a race against a concurrent creator falls back to reading the
//! winner's cart.
//!
//! All operations are scoped to the calling agent's cart. A row that does
//! not exist and a row that belongs to someone else are both reported as
//! `PersistenceError::NotFound`.

use diesel::SqliteConnection;
use diesel::prelude::*;
use hotel_booking_domain::{
    BookingStatus, CodeScope, Guest, PaymentStatus, build_additional_snapshots, validate_guest_list,
    validate_notes, validate_quantity,
};
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::{AddToCartResult, CreatedDetail, NewCartItem, RemoveFromCartResult};
use crate::diesel_schema::{booking_detail_additionals, booking_details, booking_guests, bookings};
use crate::error::{PersistenceError, is_unique_violation};
use crate::mutations::codes::reserve_code;
use crate::queries::bookings::find_cart_id;
use crate::queries::catalog::{
    get_promo_by_id, get_required_additionals, get_room_price_by_id,
    get_room_type_additionals_by_ids,
};
use crate::queries::to_i32;

fn cart_not_found(agent_id: i64) -> PersistenceError {
    PersistenceError::NotFound(format!("No cart for agent {agent_id}"))
}

/// Returns the agent's cart booking ID, creating the cart if needed.
///
/// Runs inside the caller's transaction.
pub(crate) fn ensure_cart(
    conn: &mut SqliteConnection,
    agent_id: i64,
) -> Result<i64, PersistenceError> {
    if let Some(cart_id) = find_cart_id(conn, agent_id)? {
        return Ok(cart_id);
    }

    let booking_code: String = reserve_code(conn, CodeScope::BookingCodes)?;

    let inserted = diesel::insert_into(bookings::table)
        .values((
            bookings::booking_code.eq(&booking_code),
            bookings::agent_id.eq(agent_id),
            bookings::booking_status.eq(BookingStatus::Cart.as_str()),
            bookings::payment_status.eq(PaymentStatus::Unpaid.as_str()),
        ))
        .execute(conn);

    match inserted {
        Ok(_) => {
            let cart_id: i64 = conn.get_last_insert_rowid()?;
            info!(agent_id, cart_id, booking_code = %booking_code, "Cart created");
            Ok(cart_id)
        }
        Err(e) if is_unique_violation(&e) => {
            debug!(agent_id, "Cart already created concurrently, re-reading");
            find_cart_id(conn, agent_id)?.ok_or_else(|| PersistenceError::from(e))
        }
        Err(e) => Err(e.into()),
    }
}

/// Finds or creates the agent's cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be read or created.
pub fn get_or_create_cart_id(
    conn: &mut SqliteConnection,
    agent_id: i64,
) -> Result<i64, PersistenceError> {
    conn.immediate_transaction(|conn| ensure_cart(conn, agent_id))
}

/// Adds `quantity` units of a room price to the agent's cart.
///
/// Each unit becomes its own booking detail with quantity 1 and its own
/// sub-booking code. Catalog lookups and validation complete before the
/// first write.
///
/// # Errors
///
/// Returns an error if:
/// - The quantity is out of range
/// - The room price, promo or an add-on does not exist
/// - The stay is shorter than the promo's minimum nights
/// - The add-on selection is invalid for the room type
/// - A code cannot be generated
pub fn add_to_cart(
    conn: &mut SqliteConnection,
    agent_id: i64,
    item: &NewCartItem,
) -> Result<AddToCartResult, PersistenceError> {
    conn.immediate_transaction(|conn| {
        validate_quantity(item.quantity)?;

        let room_price = get_room_price_by_id(conn, item.room_price_id)?.ok_or_else(|| {
            PersistenceError::NotFound(format!("Room price {} not found", item.room_price_id))
        })?;

        let promo = match item.promo_id {
            Some(promo_id) => {
                let promo = get_promo_by_id(conn, promo_id)?.ok_or_else(|| {
                    PersistenceError::NotFound(format!("Promo {promo_id} not found"))
                })?;
                item.stay.validate_promo(promo.promo_id, promo.minimum_nights)?;
                Some(promo)
            }
            None => None,
        };

        let requested_ids: BTreeSet<i64> = item
            .additionals
            .iter()
            .map(|s| s.room_type_additional_id)
            .collect();
        let requested_ids: Vec<i64> = requested_ids.into_iter().collect();
        let offers = get_room_type_additionals_by_ids(conn, &requested_ids)?;
        if let Some(missing) = requested_ids
            .iter()
            .find(|id| !offers.iter().any(|offer| offer.id == **id))
        {
            return Err(PersistenceError::NotFound(format!(
                "Room type additional {missing} not found"
            )));
        }
        let required = get_required_additionals(conn, room_price.room_type_id)?;
        let additionals = build_additional_snapshots(
            room_price.room_type_id,
            &offers,
            &required,
            &item.additionals,
        )?;

        let room_snapshot: String = serde_json::to_string(&room_price.snapshot())?;
        let promo_snapshot: Option<String> = promo
            .as_ref()
            .map(|p| serde_json::to_string(&p.snapshot()))
            .transpose()?;
        let check_in: String = item.stay.check_in().to_string();
        let check_out: String = item.stay.check_out().to_string();

        // Validation complete; writes start here.
        let booking_id: i64 = ensure_cart(conn, agent_id)?;
        let booking_code: String = bookings::table
            .filter(bookings::booking_id.eq(booking_id))
            .select(bookings::booking_code)
            .first(conn)?;

        let mut created_details = Vec::with_capacity(item.quantity as usize);
        for _ in 0..item.quantity {
            let sub_booking_code: String = reserve_code(conn, CodeScope::SubBookingCodes)?;

            diesel::insert_into(booking_details::table)
                .values((
                    booking_details::booking_id.eq(booking_id),
                    booking_details::sub_booking_code.eq(&sub_booking_code),
                    booking_details::room_price_id.eq(room_price.room_price_id),
                    booking_details::promo_id.eq(item.promo_id),
                    booking_details::check_in.eq(&check_in),
                    booking_details::check_out.eq(&check_out),
                    booking_details::quantity.eq(1),
                    booking_details::room_snapshot.eq(&room_snapshot),
                    booking_details::promo_snapshot.eq(promo_snapshot.as_deref()),
                    booking_details::price.eq(room_price.price),
                    booking_details::currency.eq(&room_price.currency),
                    booking_details::booking_status.eq(BookingStatus::WaitingApproval.as_str()),
                    booking_details::payment_status.eq(PaymentStatus::Unpaid.as_str()),
                ))
                .execute(conn)?;
            let booking_detail_id: i64 = conn.get_last_insert_rowid()?;

            for additional in &additionals {
                let pax: Option<i32> = additional
                    .pax
                    .map(|pax| to_i32(pax, "booking_detail_additionals.pax"))
                    .transpose()?;
                diesel::insert_into(booking_detail_additionals::table)
                    .values((
                        booking_detail_additionals::booking_detail_id.eq(booking_detail_id),
                        booking_detail_additionals::room_type_additional_id
                            .eq(additional.room_type_additional_id),
                        booking_detail_additionals::name.eq(&additional.name),
                        booking_detail_additionals::charge_basis
                            .eq(additional.charge_basis.as_str()),
                        booking_detail_additionals::price.eq(additional.price),
                        booking_detail_additionals::pax.eq(pax),
                    ))
                    .execute(conn)?;
            }

            created_details.push(CreatedDetail {
                booking_detail_id,
                sub_booking_code,
            });
        }

        info!(
            agent_id,
            booking_id,
            room_price_id = item.room_price_id,
            quantity = item.quantity,
            "Added items to cart"
        );

        Ok(AddToCartResult {
            booking_id,
            booking_code,
            created_details,
        })
    })
}

/// Removes one detail from the agent's cart.
///
/// If it was the last detail the cart booking itself is deleted.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the agent has no cart or the
/// detail is not in it.
pub fn remove_from_cart(
    conn: &mut SqliteConnection,
    agent_id: i64,
    booking_detail_id: i64,
) -> Result<RemoveFromCartResult, PersistenceError> {
    use diesel::dsl::count_star;

    conn.immediate_transaction(|conn| {
        let booking_id: i64 = find_cart_id(conn, agent_id)?.ok_or_else(|| cart_not_found(agent_id))?;

        let rows_affected: usize = diesel::delete(booking_details::table)
            .filter(booking_details::booking_detail_id.eq(booking_detail_id))
            .filter(booking_details::booking_id.eq(booking_id))
            .execute(conn)?;

        if rows_affected == 0 {
            return Err(PersistenceError::NotFound(format!(
                "Booking detail {booking_detail_id} not found in cart"
            )));
        }

        let remaining: i64 = booking_details::table
            .filter(booking_details::booking_id.eq(booking_id))
            .select(count_star())
            .first(conn)?;

        let cart_deleted = remaining == 0;
        if cart_deleted {
            diesel::delete(bookings::table)
                .filter(bookings::booking_id.eq(booking_id))
                .execute(conn)?;
        }

        info!(
            agent_id,
            booking_id, booking_detail_id, cart_deleted, "Removed item from cart"
        );

        Ok(RemoveFromCartResult {
            booking_id,
            cart_deleted,
        })
    })
}

/// Replaces a booking's guest list. Runs inside the caller's transaction.
pub(crate) fn replace_guests(
    conn: &mut SqliteConnection,
    booking_id: i64,
    guests: &[Guest],
) -> Result<usize, PersistenceError> {
    diesel::delete(booking_guests::table)
        .filter(booking_guests::booking_id.eq(booking_id))
        .execute(conn)?;

    for guest in guests {
        diesel::insert_into(booking_guests::table)
            .values((
                booking_guests::booking_id.eq(booking_id),
                booking_guests::name.eq(guest.name.trim()),
                booking_guests::honorific.eq(guest.honorific.as_str()),
                booking_guests::category.eq(guest.category.as_str()),
                booking_guests::age.eq(guest.age.map(i32::from)),
            ))
            .execute(conn)?;
    }

    debug!(booking_id, guest_count = guests.len(), "Guest list replaced");
    Ok(guests.len())
}

/// Replaces the guest list of the agent's cart.
///
/// # Errors
///
/// Returns an error if a guest is invalid or the agent has no cart.
pub fn add_guests_to_cart(
    conn: &mut SqliteConnection,
    agent_id: i64,
    guests: &[Guest],
) -> Result<usize, PersistenceError> {
    validate_guest_list(guests)?;

    conn.immediate_transaction(|conn| {
        let booking_id: i64 = find_cart_id(conn, agent_id)?.ok_or_else(|| cart_not_found(agent_id))?;
        let count = replace_guests(conn, booking_id, guests)?;
        info!(agent_id, booking_id, count, "Cart guests replaced");
        Ok(count)
    })
}

/// Removes the listed guests from the agent's cart.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the agent has no cart or none of
/// the listed guests belong to it.
pub fn remove_guests_from_cart(
    conn: &mut SqliteConnection,
    agent_id: i64,
    guest_ids: &[i64],
) -> Result<usize, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let booking_id: i64 = find_cart_id(conn, agent_id)?.ok_or_else(|| cart_not_found(agent_id))?;

        let rows_affected: usize = diesel::delete(booking_guests::table)
            .filter(booking_guests::booking_id.eq(booking_id))
            .filter(booking_guests::booking_guest_id.eq_any(guest_ids))
            .execute(conn)?;

        if rows_affected == 0 {
            return Err(PersistenceError::NotFound(
                "No matching guests in cart".to_string(),
            ));
        }

        info!(agent_id, booking_id, rows_affected, "Cart guests removed");
        Ok(rows_affected)
    })
}

/// Sets the agent-to-admin notes of a detail in the agent's cart.
///
/// # Errors
///
/// Returns an error if the notes are too long, or `PersistenceError::NotFound`
/// if the detail is not in the agent's cart.
pub fn update_cart_additional_notes(
    conn: &mut SqliteConnection,
    agent_id: i64,
    booking_detail_id: i64,
    notes: Option<&str>,
) -> Result<(), PersistenceError> {
    if let Some(notes) = notes {
        validate_notes("additional_notes", notes)?;
    }

    conn.immediate_transaction(|conn| {
        let booking_id: i64 = find_cart_id(conn, agent_id)?.ok_or_else(|| cart_not_found(agent_id))?;

        let rows_affected: usize = diesel::update(booking_details::table)
            .filter(booking_details::booking_detail_id.eq(booking_detail_id))
            .filter(booking_details::booking_id.eq(booking_id))
            .set(booking_details::additional_notes.eq(notes))
            .execute(conn)?;

        if rows_affected == 0 {
            return Err(PersistenceError::NotFound(format!(
                "Booking detail {booking_detail_id} not found in cart"
            )));
        }

        debug!(agent_id, booking_detail_id, "Cart detail notes updated");
        Ok(())
    })
}
