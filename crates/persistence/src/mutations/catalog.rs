// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Insert-only catalog seeding.

use diesel::SqliteConnection;
use diesel::prelude::*;
use hotel_booking_domain::{ChargeBasis, validate_price};
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::{CatalogImportSummary, CatalogSeed};
use crate::diesel_schema::{hotels, promos, room_prices, room_type_additionals, room_types};
use crate::error::PersistenceError;
use crate::queries::to_i32;

/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_hotel(
    conn: &mut SqliteConnection,
    name: &str,
    email: &str,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(hotels::table)
        .values((hotels::name.eq(name), hotels::email.eq(email)))
        .execute(conn)?;
    let hotel_id = conn.get_last_insert_rowid()?;
    debug!(hotel_id, name, "Hotel created");
    Ok(hotel_id)
}

/// # Errors
///
/// Returns an error if the insert fails or the hotel does not exist.
pub fn create_room_type(
    conn: &mut SqliteConnection,
    hotel_id: i64,
    name: &str,
    max_occupancy: u32,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(room_types::table)
        .values((
            room_types::hotel_id.eq(hotel_id),
            room_types::name.eq(name),
            room_types::max_occupancy.eq(to_i32(max_occupancy, "room_types.max_occupancy")?),
        ))
        .execute(conn)?;
    let room_type_id = conn.get_last_insert_rowid()?;
    debug!(room_type_id, hotel_id, name, "Room type created");
    Ok(room_type_id)
}

/// # Errors
///
/// Returns an error if the price is negative or the insert fails.
pub fn create_room_price(
    conn: &mut SqliteConnection,
    room_type_id: i64,
    label: &str,
    price: i64,
    currency: &str,
) -> Result<i64, PersistenceError> {
    validate_price(price)?;
    diesel::insert_into(room_prices::table)
        .values((
            room_prices::room_type_id.eq(room_type_id),
            room_prices::label.eq(label),
            room_prices::price.eq(price),
            room_prices::currency.eq(currency),
        ))
        .execute(conn)?;
    let room_price_id = conn.get_last_insert_rowid()?;
    debug!(room_price_id, room_type_id, "Room price created");
    Ok(room_price_id)
}

/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_promo(
    conn: &mut SqliteConnection,
    hotel_id: i64,
    name: &str,
    description: Option<&str>,
    minimum_nights: u32,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(promos::table)
        .values((
            promos::hotel_id.eq(hotel_id),
            promos::name.eq(name),
            promos::description.eq(description),
            promos::minimum_nights.eq(to_i32(minimum_nights, "promos.minimum_nights")?),
        ))
        .execute(conn)?;
    let promo_id = conn.get_last_insert_rowid()?;
    debug!(promo_id, hotel_id, minimum_nights, "Promo created");
    Ok(promo_id)
}

/// # Errors
///
/// Returns an error if the price is negative or the insert fails.
pub fn create_room_type_additional(
    conn: &mut SqliteConnection,
    room_type_id: i64,
    name: &str,
    charge_basis: ChargeBasis,
    price: i64,
    required: bool,
) -> Result<i64, PersistenceError> {
    validate_price(price)?;
    diesel::insert_into(room_type_additionals::table)
        .values((
            room_type_additionals::room_type_id.eq(room_type_id),
            room_type_additionals::name.eq(name),
            room_type_additionals::charge_basis.eq(charge_basis.as_str()),
            room_type_additionals::price.eq(price),
            room_type_additionals::is_required.eq(i32::from(required)),
        ))
        .execute(conn)?;
    let additional_id = conn.get_last_insert_rowid()?;
    debug!(additional_id, room_type_id, "Room type add-on created");
    Ok(additional_id)
}

/// Imports a catalog seed in one transaction.
///
/// # Errors
///
/// Returns an error if any insert fails; nothing is imported in that case.
pub fn import_catalog(
    conn: &mut SqliteConnection,
    seed: &CatalogSeed,
) -> Result<CatalogImportSummary, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let mut summary = CatalogImportSummary::default();

        for hotel in &seed.hotels {
            let hotel_id = create_hotel(conn, &hotel.name, &hotel.email)?;
            summary.hotels += 1;

            for room_type in &hotel.room_types {
                let room_type_id =
                    create_room_type(conn, hotel_id, &room_type.name, room_type.max_occupancy)?;
                summary.room_types += 1;

                for price in &room_type.prices {
                    create_room_price(conn, room_type_id, &price.label, price.price, &price.currency)?;
                    summary.room_prices += 1;
                }

                for additional in &room_type.additionals {
                    create_room_type_additional(
                        conn,
                        room_type_id,
                        &additional.name,
                        additional.charge_basis,
                        additional.price,
                        additional.required,
                    )?;
                    summary.additionals += 1;
                }
            }

            for promo in &hotel.promos {
                create_promo(
                    conn,
                    hotel_id,
                    &promo.name,
                    promo.description.as_deref(),
                    promo.minimum_nights,
                )?;
                summary.promos += 1;
            }
        }

        info!(
            hotels = summary.hotels,
            room_types = summary.room_types,
            room_prices = summary.room_prices,
            promos = summary.promos,
            additionals = summary.additionals,
            "Catalog imported"
        );
        Ok(summary)
    })
}
