// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::DomainError;

#[test]
fn test_invalid_quantity_display() {
    let err = DomainError::InvalidQuantity {
        quantity: 25,
        max: 20,
    };
    assert_eq!(err.to_string(), "Invalid quantity: 25. Must be between 1 and 20");
}

#[test]
fn test_promo_duration_display_carries_contract_message() {
    let err = DomainError::PromoNotValidForDuration {
        promo_id: 4,
        minimum_nights: 3,
        nights: 2,
    };
    let message = err.to_string();
    assert!(message.starts_with("promo not valid for the selected stay duration"));
    assert!(message.contains("at least 3 nights"));
}

#[test]
fn test_text_too_long_display() {
    let err = DomainError::TextTooLong {
        field: "additional_notes",
        length: 501,
        max: 500,
    };
    assert!(err.to_string().contains("additional_notes"));
}

#[test]
fn test_domain_error_is_std_error() {
    let err: Box<dyn std::error::Error> = Box::new(DomainError::EmptyDetailSelection);
    assert_eq!(err.to_string(), "At least one booking detail must be selected");
}
