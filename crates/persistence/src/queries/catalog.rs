// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Catalog lookups used when building cart snapshots.
//!
//! These are pure reads. A missing row is reported as `Ok(None)` (or a
//! shorter result vector) and the caller decides how to fail.

use diesel::SqliteConnection;
use diesel::prelude::*;
use hotel_booking_domain::{AdditionalOffer, ChargeBasis};
use tracing::debug;

use crate::data_models::{PromoData, RoomPriceData};
use crate::diesel_schema::{hotels, promos, room_prices, room_type_additionals, room_types};
use crate::error::PersistenceError;
use crate::queries::to_u32;

/// Room price joined with room type and hotel columns.
type RoomPriceRow = (i64, i64, String, i64, String, i64, String, i32, String, String);

#[derive(Queryable, Selectable)]
#[diesel(table_name = promos)]
struct PromoRow {
    promo_id: i64,
    hotel_id: i64,
    name: String,
    description: Option<String>,
    minimum_nights: i32,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = room_type_additionals)]
struct AdditionalRow {
    room_type_additional_id: i64,
    room_type_id: i64,
    name: String,
    charge_basis: String,
    price: i64,
    is_required: i32,
}

impl TryFrom<AdditionalRow> for AdditionalOffer {
    type Error = PersistenceError;

    fn try_from(row: AdditionalRow) -> Result<Self, Self::Error> {
        let charge_basis: ChargeBasis = row
            .charge_basis
            .parse()
            .map_err(|e: hotel_booking_domain::DomainError| {
                PersistenceError::CorruptRecord(e.to_string())
            })?;
        Ok(Self {
            id: row.room_type_additional_id,
            room_type_id: row.room_type_id,
            name: row.name,
            charge_basis,
            price: row.price,
            required: row.is_required != 0,
        })
    }
}

/// Retrieves a room price together with its room type and hotel.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_room_price_by_id(
    conn: &mut SqliteConnection,
    room_price_id: i64,
) -> Result<Option<RoomPriceData>, PersistenceError> {
    debug!(room_price_id, "Looking up room price");

    let row: Option<RoomPriceRow> =
        room_prices::table
            .inner_join(room_types::table.inner_join(hotels::table))
            .filter(room_prices::room_price_id.eq(room_price_id))
            .select((
                room_prices::room_price_id,
                room_prices::room_type_id,
                room_prices::label,
                room_prices::price,
                room_prices::currency,
                hotels::hotel_id,
                room_types::name,
                room_types::max_occupancy,
                hotels::name,
                hotels::email,
            ))
            .first(conn)
            .optional()?;

    row.map(
        |(
            room_price_id,
            room_type_id,
            label,
            price,
            currency,
            hotel_id,
            room_type_name,
            max_occupancy,
            hotel_name,
            hotel_email,
        )| {
            Ok(RoomPriceData {
                room_price_id,
                room_type_id,
                hotel_id,
                label,
                price,
                currency,
                room_type_name,
                max_occupancy: to_u32(max_occupancy, "room_types.max_occupancy")?,
                hotel_name,
                hotel_email,
            })
        },
    )
    .transpose()
}

/// Retrieves a promo by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_promo_by_id(
    conn: &mut SqliteConnection,
    promo_id: i64,
) -> Result<Option<PromoData>, PersistenceError> {
    debug!(promo_id, "Looking up promo");

    let row: Option<PromoRow> = promos::table
        .filter(promos::promo_id.eq(promo_id))
        .select(PromoRow::as_select())
        .first(conn)
        .optional()?;

    row.map(|row| {
        Ok(PromoData {
            promo_id: row.promo_id,
            hotel_id: row.hotel_id,
            name: row.name,
            description: row.description,
            minimum_nights: to_u32(row.minimum_nights, "promos.minimum_nights")?,
        })
    })
    .transpose()
}

/// Retrieves the room-type add-ons with the given IDs.
///
/// IDs with no matching row are silently absent from the result.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_room_type_additionals_by_ids(
    conn: &mut SqliteConnection,
    ids: &[i64],
) -> Result<Vec<AdditionalOffer>, PersistenceError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<AdditionalRow> = room_type_additionals::table
        .filter(room_type_additionals::room_type_additional_id.eq_any(ids))
        .select(AdditionalRow::as_select())
        .order(room_type_additionals::room_type_additional_id.asc())
        .load(conn)?;

    rows.into_iter().map(AdditionalOffer::try_from).collect()
}

/// Retrieves the add-ons every booking of a room type must include.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_required_additionals(
    conn: &mut SqliteConnection,
    room_type_id: i64,
) -> Result<Vec<AdditionalOffer>, PersistenceError> {
    let rows: Vec<AdditionalRow> = room_type_additionals::table
        .filter(room_type_additionals::room_type_id.eq(room_type_id))
        .filter(room_type_additionals::is_required.ne(0))
        .select(AdditionalRow::as_select())
        .order(room_type_additionals::room_type_additional_id.asc())
        .load(conn)?;

    rows.into_iter().map(AdditionalOffer::try_from).collect()
}
