// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! - `bookings` — bookings, details, guests, invoices and status history
//! - `catalog` — room price, promo and add-on lookups
//! - `operators` — operator and session lookups

pub mod bookings;
pub mod catalog;
pub mod operators;

use num_traits::ToPrimitive;

use crate::error::PersistenceError;

/// Converts a stored integer column to `u32`.
pub(crate) fn to_u32(value: i32, column: &str) -> Result<u32, PersistenceError> {
    value.to_u32().ok_or_else(|| {
        PersistenceError::CorruptRecord(format!("{column} holds out-of-range value {value}"))
    })
}

/// Converts a `u32` to a storable integer column value.
pub(crate) fn to_i32(value: u32, column: &str) -> Result<i32, PersistenceError> {
    value.to_i32().ok_or_else(|| {
        PersistenceError::Other(format!("{column} value {value} does not fit the column"))
    })
}
