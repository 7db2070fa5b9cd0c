// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for the cart handlers.

use std::collections::HashSet;

use crate::tests::helpers::{
    create_add_request, create_fixture, create_guest, create_transfer_selection, fill_cart,
};
use crate::{
    AdditionalSelectionRequest, ApiError, GuestRequest, RemoveGuestsRequest, SetGuestsRequest,
    UpdateNotesRequest, add_guests_to_cart, add_to_cart, get_cart, remove_from_cart,
    remove_guests_from_cart, update_cart_additional_notes,
};

#[test]
fn test_add_to_cart_requires_agent() {
    let mut fixture = create_fixture();
    let request = create_add_request(fixture.room_price_id, 1);

    match add_to_cart(&mut fixture.persistence, &fixture.admin, &request).unwrap_err() {
        ApiError::Unauthorized { action, .. } => assert_eq!(action, "add_to_cart"),
        other => panic!("Expected Unauthorized error, got: {other:?}"),
    }
}

#[test]
fn test_add_to_cart_expands_quantity_into_sub_bookings() {
    let mut fixture = create_fixture();

    let response = fill_cart(&mut fixture, 3);
    assert_eq!(response.created_details.len(), 3);
    let codes: HashSet<&str> = response
        .created_details
        .iter()
        .map(|d| d.sub_booking_code.as_str())
        .collect();
    assert_eq!(codes.len(), 3);
    assert!(response.booking_code.starts_with("BK-"));

    let cart = get_cart(&mut fixture.persistence, &fixture.agent).unwrap();
    assert_eq!(cart.booking_status, "cart");
    assert_eq!(cart.details.len(), 3);
    assert!(cart.details.iter().all(|d| d.quantity == 1));
    assert!(cart.details.iter().all(|d| d.booking_status == "waiting_approval"));
}

#[test]
fn test_second_add_reuses_the_cart() {
    let mut fixture = create_fixture();

    let first = fill_cart(&mut fixture, 1);
    let second = fill_cart(&mut fixture, 1);
    assert_eq!(first.booking_id, second.booking_id);
    assert_eq!(
        fixture
            .persistence
            .count_carts_for_agent(fixture.agent.operator_id)
            .unwrap(),
        1
    );
}

#[test]
fn test_add_to_cart_rejects_negative_quantity() {
    let mut fixture = create_fixture();
    let request = create_add_request(fixture.room_price_id, -1);

    match add_to_cart(&mut fixture.persistence, &fixture.agent, &request).unwrap_err() {
        ApiError::InvalidInput { field, .. } => assert_eq!(field, "quantity"),
        other => panic!("Expected InvalidInput error, got: {other:?}"),
    }
}

#[test]
fn test_promo_too_long_for_stay_creates_nothing() {
    let mut fixture = create_fixture();
    let mut request = create_add_request(fixture.room_price_id, 2);
    request.promo_id = Some(fixture.long_stay_promo_id);

    match add_to_cart(&mut fixture.persistence, &fixture.agent, &request).unwrap_err() {
        ApiError::DomainRuleViolation { rule, message } => {
            assert_eq!(rule, "promo_minimum_nights");
            assert!(message.contains("promo not valid for the selected stay duration"));
        }
        other => panic!("Expected DomainRuleViolation error, got: {other:?}"),
    }

    assert!(matches!(
        get_cart(&mut fixture.persistence, &fixture.agent),
        Err(ApiError::ResourceNotFound { .. })
    ));
}

#[test]
fn test_checkout_before_checkin_is_rejected() {
    let mut fixture = create_fixture();
    let mut request = create_add_request(fixture.room_price_id, 1);
    request.check_out = String::from("2026-03-01");

    match add_to_cart(&mut fixture.persistence, &fixture.agent, &request).unwrap_err() {
        ApiError::DomainRuleViolation { rule, .. } => assert_eq!(rule, "stay_duration"),
        other => panic!("Expected DomainRuleViolation error, got: {other:?}"),
    }
}

#[test]
fn test_malformed_date_is_invalid_input() {
    let mut fixture = create_fixture();
    let mut request = create_add_request(fixture.room_price_id, 1);
    request.check_in = String::from("03/01/2026");

    match add_to_cart(&mut fixture.persistence, &fixture.agent, &request).unwrap_err() {
        ApiError::InvalidInput { field, .. } => assert_eq!(field, "date"),
        other => panic!("Expected InvalidInput error, got: {other:?}"),
    }
}

#[test]
fn test_unknown_room_price_is_not_found() {
    let mut fixture = create_fixture();
    let request = create_add_request(9999, 1);

    assert!(matches!(
        add_to_cart(&mut fixture.persistence, &fixture.agent, &request),
        Err(ApiError::ResourceNotFound { .. })
    ));
}

#[test]
fn test_per_pax_additional_requires_pax() {
    let mut fixture = create_fixture();
    let mut request = create_add_request(fixture.room_price_id, 1);
    request.additionals = vec![AdditionalSelectionRequest {
        room_type_additional_id: fixture.dinner_id,
        pax: None,
    }];

    match add_to_cart(&mut fixture.persistence, &fixture.agent, &request).unwrap_err() {
        ApiError::InvalidInput { field, .. } => assert_eq!(field, "pax"),
        other => panic!("Expected InvalidInput error, got: {other:?}"),
    }

    request.additionals[0].pax = Some(2);
    request.additionals.push(create_transfer_selection(fixture.transfer_id));
    add_to_cart(&mut fixture.persistence, &fixture.agent, &request).unwrap();

    let cart = get_cart(&mut fixture.persistence, &fixture.agent).unwrap();
    let amounts: Vec<i64> = cart.details[0].additionals.iter().map(|a| a.amount).collect();
    assert_eq!(amounts.len(), 2);
    assert!(amounts.contains(&3000));
    assert!(amounts.contains(&2500));
}

#[test]
fn test_remove_last_item_deletes_cart() {
    let mut fixture = create_fixture();
    let cart = fill_cart(&mut fixture, 1);

    let response = remove_from_cart(
        &mut fixture.persistence,
        &fixture.agent,
        cart.created_details[0].booking_detail_id,
    )
    .unwrap();
    assert!(response.cart_deleted);
    assert!(get_cart(&mut fixture.persistence, &fixture.agent).is_err());
}

#[test]
fn test_remove_from_another_agents_cart_is_not_found() {
    let mut fixture = create_fixture();
    let cart = fill_cart(&mut fixture, 1);

    let result = remove_from_cart(
        &mut fixture.persistence,
        &fixture.other_agent,
        cart.created_details[0].booking_detail_id,
    );
    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_guest_list_replacement_and_removal() {
    let mut fixture = create_fixture();
    fill_cart(&mut fixture, 1);

    let child = GuestRequest {
        name: String::from("Sam Doe"),
        honorific: String::from("Mr"),
        category: String::from("child"),
        age: Some(9),
    };
    let response = add_guests_to_cart(
        &mut fixture.persistence,
        &fixture.agent,
        &SetGuestsRequest {
            guests: vec![create_guest("Jane Doe"), child],
        },
    )
    .unwrap();
    assert_eq!(response.guest_count, 2);

    let cart = get_cart(&mut fixture.persistence, &fixture.agent).unwrap();
    let sam = cart.guests.iter().find(|g| g.name == "Sam Doe").unwrap();
    assert_eq!(sam.age, Some(9));

    let removed = remove_guests_from_cart(
        &mut fixture.persistence,
        &fixture.agent,
        &RemoveGuestsRequest {
            booking_guest_ids: vec![sam.booking_guest_id],
        },
    )
    .unwrap();
    assert_eq!(removed.removed, 1);
    assert_eq!(
        get_cart(&mut fixture.persistence, &fixture.agent)
            .unwrap()
            .guests
            .len(),
        1
    );
}

#[test]
fn test_invalid_honorific_is_rejected_before_write() {
    let mut fixture = create_fixture();
    fill_cart(&mut fixture, 1);

    let mut guest = create_guest("Jane Doe");
    guest.honorific = String::from("Dr");
    let result = add_guests_to_cart(
        &mut fixture.persistence,
        &fixture.agent,
        &SetGuestsRequest {
            guests: vec![guest],
        },
    );
    match result.unwrap_err() {
        ApiError::InvalidInput { field, .. } => assert_eq!(field, "honorific"),
        other => panic!("Expected InvalidInput error, got: {other:?}"),
    }
}

#[test]
fn test_cart_notes_are_length_capped() {
    let mut fixture = create_fixture();
    let cart = fill_cart(&mut fixture, 1);
    let detail_id = cart.created_details[0].booking_detail_id;

    update_cart_additional_notes(
        &mut fixture.persistence,
        &fixture.agent,
        detail_id,
        &UpdateNotesRequest {
            notes: Some(String::from("Late arrival")),
        },
    )
    .unwrap();
    let view = get_cart(&mut fixture.persistence, &fixture.agent).unwrap();
    assert_eq!(
        view.details[0].additional_notes.as_deref(),
        Some("Late arrival")
    );

    let result = update_cart_additional_notes(
        &mut fixture.persistence,
        &fixture.agent,
        detail_id,
        &UpdateNotesRequest {
            notes: Some("x".repeat(501)),
        },
    );
    assert!(matches!(result, Err(ApiError::InvalidInput { .. })));
}
