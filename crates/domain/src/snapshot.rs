// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Immutable copies of catalog data taken when a booking detail is created.
//!
//! Snapshots are stored alongside the detail so later catalog edits never
//! change what the agent booked. Prices are integer minor currency units.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Room descriptive data as it was when the detail was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub hotel_id: i64,
    pub hotel_name: String,
    pub hotel_email: String,
    pub room_type_id: i64,
    pub room_type_name: String,
    pub room_price_id: i64,
    pub price_label: String,
    pub max_occupancy: u32,
}

/// Promo descriptive data as it was when the detail was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoSnapshot {
    pub promo_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub minimum_nights: u32,
}

/// How an add-on is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeBasis {
    /// Flat price for the whole detail.
    PerBooking,
    /// Price multiplied by a headcount.
    PerPax,
}

impl ChargeBasis {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PerBooking => "per_booking",
            Self::PerPax => "per_pax",
        }
    }
}

impl FromStr for ChargeBasis {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per_booking" => Ok(Self::PerBooking),
            "per_pax" => Ok(Self::PerPax),
            _ => Err(DomainError::InvalidChargeBasis(s.to_string())),
        }
    }
}

/// A selected add-on as attached to a booking detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalSnapshot {
    pub room_type_additional_id: i64,
    pub name: String,
    pub charge_basis: ChargeBasis,
    pub price: i64,
    pub pax: Option<u32>,
}

impl AdditionalSnapshot {
    /// Amount charged for this add-on.
    #[must_use]
    pub fn amount(&self) -> i64 {
        match self.charge_basis {
            ChargeBasis::PerBooking => self.price,
            ChargeBasis::PerPax => self
                .price
                .saturating_mul(i64::from(self.pax.unwrap_or(0))),
        }
    }
}

/// One line of an invoice breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub description: String,
    pub quantity: u32,
    pub unit_price: i64,
    pub amount: i64,
}

/// Rendered charge breakdown stored on an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceBreakdown {
    pub lines: Vec<InvoiceLine>,
    pub total: i64,
    pub currency: String,
}

/// Builds the charge breakdown for one booking detail.
///
/// The first line is the room: nights times the nightly price. Each add-on
/// follows with its own amount.
#[must_use]
pub fn build_invoice_breakdown(
    room: &RoomSnapshot,
    nights: u32,
    nightly_price: i64,
    currency: &str,
    additionals: &[AdditionalSnapshot],
) -> InvoiceBreakdown {
    let mut lines = Vec::with_capacity(additionals.len() + 1);
    lines.push(InvoiceLine {
        description: format!(
            "{} - {} ({})",
            room.hotel_name, room.room_type_name, room.price_label
        ),
        quantity: nights,
        unit_price: nightly_price,
        amount: nightly_price.saturating_mul(i64::from(nights)),
    });

    for additional in additionals {
        let quantity = match additional.charge_basis {
            ChargeBasis::PerBooking => 1,
            ChargeBasis::PerPax => additional.pax.unwrap_or(0),
        };
        lines.push(InvoiceLine {
            description: additional.name.clone(),
            quantity,
            unit_price: additional.price,
            amount: additional.amount(),
        });
    }

    let total = lines
        .iter()
        .fold(0_i64, |acc, line| acc.saturating_add(line.amount));

    InvoiceBreakdown {
        lines,
        total,
        currency: currency.to_string(),
    }
}
