// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::snapshot::{AdditionalSnapshot, ChargeBasis};
use std::collections::HashSet;

/// Maximum length of agent and admin notes on a booking detail.
pub const MAX_NOTES_LENGTH: usize = 500;

/// Maximum number of units a single add-to-cart call may create.
pub const MAX_QUANTITY: u32 = 20;

/// Catalog add-on offered for a room type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdditionalOffer {
    pub id: i64,
    pub room_type_id: i64,
    pub name: String,
    pub charge_basis: ChargeBasis,
    pub price: i64,
    pub required: bool,
}

/// An agent's add-on choice on add-to-cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdditionalSelection {
    pub room_type_additional_id: i64,
    pub pax: Option<u32>,
}

/// Validates a free-text notes field against the length cap.
///
/// # Arguments
///
/// * `field` - Field name reported in the error
/// * `notes` - The supplied text
///
/// # Errors
///
/// Returns `DomainError::TextTooLong` if the text exceeds [`MAX_NOTES_LENGTH`]
/// characters.
pub fn validate_notes(field: &'static str, notes: &str) -> Result<(), DomainError> {
    let length = notes.chars().count();
    if length > MAX_NOTES_LENGTH {
        return Err(DomainError::TextTooLong {
            field,
            length,
            max: MAX_NOTES_LENGTH,
        });
    }
    Ok(())
}

/// Validates a required free-text field: not blank and within the length cap.
///
/// # Errors
///
/// Returns `DomainError::BlankText` or `DomainError::TextTooLong`.
pub fn validate_required_text(field: &'static str, text: &str) -> Result<(), DomainError> {
    if text.trim().is_empty() {
        return Err(DomainError::BlankText { field });
    }
    validate_notes(field, text)
}

/// Validates the requested number of units.
///
/// # Errors
///
/// Returns `DomainError::InvalidQuantity` unless `1 <= quantity <= MAX_QUANTITY`.
pub fn validate_quantity(quantity: u32) -> Result<(), DomainError> {
    if quantity == 0 || quantity > MAX_QUANTITY {
        return Err(DomainError::InvalidQuantity {
            quantity,
            max: MAX_QUANTITY,
        });
    }
    Ok(())
}

/// # Errors
///
/// Returns `DomainError::InvalidPrice` for negative amounts.
pub const fn validate_price(amount: i64) -> Result<(), DomainError> {
    if amount < 0 {
        return Err(DomainError::InvalidPrice { amount });
    }
    Ok(())
}

/// Checks add-on selections against the catalog and builds their snapshots.
///
/// # Arguments
///
/// * `room_type_id` - Room type of the selected room price
/// * `offers` - Catalog rows for the selected add-on ids
/// * `required` - Catalog rows flagged as required for the room type
/// * `selections` - The agent's choices
///
/// # Errors
///
/// Returns an error if:
/// - A selected add-on belongs to a different room type
/// - A per-pax add-on has no pax count, or a zero count
/// - A required add-on was not selected
///
/// Unknown add-on ids are the caller's concern; selections without a
/// matching offer are skipped here.
pub fn build_additional_snapshots(
    room_type_id: i64,
    offers: &[AdditionalOffer],
    required: &[AdditionalOffer],
    selections: &[AdditionalSelection],
) -> Result<Vec<AdditionalSnapshot>, DomainError> {
    let mut snapshots = Vec::with_capacity(selections.len());

    for selection in selections {
        let Some(offer) = offers
            .iter()
            .find(|o| o.id == selection.room_type_additional_id)
        else {
            continue;
        };

        if offer.room_type_id != room_type_id {
            return Err(DomainError::AdditionalNotForRoomType {
                additional_id: offer.id,
                room_type_id,
            });
        }

        let pax = match offer.charge_basis {
            ChargeBasis::PerBooking => None,
            ChargeBasis::PerPax => match selection.pax {
                Some(pax) if pax >= 1 => Some(pax),
                _ => {
                    return Err(DomainError::MissingPax {
                        additional_id: offer.id,
                    });
                }
            },
        };

        snapshots.push(AdditionalSnapshot {
            room_type_additional_id: offer.id,
            name: offer.name.clone(),
            charge_basis: offer.charge_basis,
            price: offer.price,
            pax,
        });
    }

    let selected: HashSet<i64> = selections
        .iter()
        .map(|s| s.room_type_additional_id)
        .collect();
    if let Some(missing) = required
        .iter()
        .find(|offer| offer.room_type_id == room_type_id && !selected.contains(&offer.id))
    {
        return Err(DomainError::RequiredAdditionalMissing {
            additional_id: missing.id,
            name: missing.name.clone(),
        });
    }

    Ok(snapshots)
}
