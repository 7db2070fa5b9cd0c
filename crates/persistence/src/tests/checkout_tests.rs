// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Checkout tests.

use hotel_booking_domain::BookingStatus;

use super::{create_assignment, create_cart_item, create_fixture, create_guest, create_selection};
use crate::PersistenceError;

#[test]
fn test_checkout_with_single_guest() {
    let mut fixture = create_fixture();
    let added = fixture
        .persistence
        .add_to_cart(
            fixture.agent_id,
            &create_cart_item(fixture.room_price_id, 1),
        )
        .unwrap();
    let detail_id = added.created_details[0].booking_detail_id;

    let result = fixture
        .persistence
        .check_out_cart(
            fixture.agent_id,
            &[create_guest("Jane Doe")],
            &[create_assignment(detail_id, "Jane Doe")],
        )
        .unwrap();

    assert_eq!(
        result.booking.booking.booking_status,
        BookingStatus::WaitingApproval
    );
    assert!(result.booking.booking.submitted_at.is_some());
    assert_eq!(
        result.booking.details[0].guest_name.as_deref(),
        Some("Jane Doe")
    );
    assert_eq!(result.booking.guests.len(), 1);
    assert_eq!(result.agent.email, "agent1@agency.test");

    // The submitted booking is no longer a cart.
    assert_eq!(
        fixture
            .persistence
            .count_carts_for_agent(fixture.agent_id)
            .unwrap(),
        0
    );
}

#[test]
fn test_checkout_issues_one_invoice_per_detail() {
    let mut fixture = create_fixture();
    let mut item = create_cart_item(fixture.room_price_id, 2);
    item.additionals = vec![
        create_selection(fixture.transfer_id, None),
        create_selection(fixture.dinner_id, Some(2)),
    ];
    let added = fixture
        .persistence
        .add_to_cart(fixture.agent_id, &item)
        .unwrap();

    let result = fixture
        .persistence
        .check_out_cart(fixture.agent_id, &[create_guest("Jane Doe")], &[])
        .unwrap();
    assert_eq!(result.invoice_codes.len(), 2);
    assert!(result.invoice_codes.iter().all(|c| c.starts_with("INV-")));

    let invoice = fixture
        .persistence
        .get_invoice_for_detail(added.created_details[0].booking_detail_id)
        .unwrap()
        .unwrap();
    // Two nights at 12000, transfer 2500, dinner 2 x 1500.
    assert_eq!(invoice.total, 29500);
    assert_eq!(invoice.breakdown.lines.len(), 3);
    assert_eq!(invoice.currency, "USD");
    assert_eq!(invoice.agent_id, fixture.agent_id);
}

#[test]
fn test_failed_assignment_leaves_cart_untouched() {
    let mut fixture = create_fixture();
    let added = fixture
        .persistence
        .add_to_cart(
            fixture.agent_id,
            &create_cart_item(fixture.room_price_id, 1),
        )
        .unwrap();
    fixture
        .persistence
        .add_guests_to_cart(fixture.agent_id, &[create_guest("Original Guest")])
        .unwrap();

    let detail_id = added.created_details[0].booking_detail_id;
    let result = fixture.persistence.check_out_cart(
        fixture.agent_id,
        &[create_guest("Jane Doe")],
        &[
            create_assignment(detail_id, "Jane Doe"),
            create_assignment(987_654, "Nobody"),
        ],
    );
    assert!(matches!(result, Err(PersistenceError::NotFound(_))));

    let cart = fixture.persistence.get_cart(fixture.agent_id).unwrap();
    assert_eq!(cart.booking.booking_status, BookingStatus::Cart);
    assert!(cart.booking.submitted_at.is_none());
    assert!(cart.details[0].guest_name.is_none());
    assert_eq!(cart.guests.len(), 1);
    assert_eq!(cart.guests[0].guest.name, "Original Guest");
    assert!(
        fixture
            .persistence
            .get_invoice_for_detail(detail_id)
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_assignment_to_other_agents_detail_fails() {
    let mut fixture = create_fixture();
    let theirs = fixture
        .persistence
        .add_to_cart(
            fixture.other_agent_id,
            &create_cart_item(fixture.room_price_id, 1),
        )
        .unwrap();
    fixture
        .persistence
        .add_to_cart(
            fixture.agent_id,
            &create_cart_item(fixture.room_price_id, 1),
        )
        .unwrap();

    let result = fixture.persistence.check_out_cart(
        fixture.agent_id,
        &[],
        &[create_assignment(
            theirs.created_details[0].booking_detail_id,
            "Jane Doe",
        )],
    );

    assert!(matches!(result, Err(PersistenceError::NotFound(_))));
}

#[test]
fn test_checkout_without_cart_is_not_found() {
    let mut fixture = create_fixture();

    let result = fixture
        .persistence
        .check_out_cart(fixture.agent_id, &[create_guest("Jane Doe")], &[]);

    assert!(matches!(result, Err(PersistenceError::NotFound(_))));
}

#[test]
fn test_checkout_of_empty_cart_is_not_found() {
    let mut fixture = create_fixture();
    fixture
        .persistence
        .get_or_create_cart_id(fixture.agent_id)
        .unwrap();

    let result = fixture
        .persistence
        .check_out_cart(fixture.agent_id, &[create_guest("Jane Doe")], &[]);

    assert!(matches!(result, Err(PersistenceError::NotFound(_))));
    assert_eq!(
        fixture
            .persistence
            .count_carts_for_agent(fixture.agent_id)
            .unwrap(),
        1
    );
}

#[test]
fn test_blank_assignment_name_rejected_before_writes() {
    let mut fixture = create_fixture();
    let added = fixture
        .persistence
        .add_to_cart(
            fixture.agent_id,
            &create_cart_item(fixture.room_price_id, 1),
        )
        .unwrap();

    let result = fixture.persistence.check_out_cart(
        fixture.agent_id,
        &[],
        &[create_assignment(
            added.created_details[0].booking_detail_id,
            "  ",
        )],
    );

    assert!(matches!(result, Err(PersistenceError::DomainViolation(_))));
    let cart = fixture.persistence.get_cart(fixture.agent_id).unwrap();
    assert_eq!(cart.booking.booking_status, BookingStatus::Cart);
}

#[test]
fn test_new_cart_after_checkout() {
    let mut fixture = create_fixture();
    let first = fixture
        .persistence
        .add_to_cart(
            fixture.agent_id,
            &create_cart_item(fixture.room_price_id, 1),
        )
        .unwrap();
    fixture
        .persistence
        .check_out_cart(fixture.agent_id, &[], &[])
        .unwrap();

    let second = fixture
        .persistence
        .add_to_cart(
            fixture.agent_id,
            &create_cart_item(fixture.room_price_id, 1),
        )
        .unwrap();

    assert_ne!(first.booking_id, second.booking_id);
    assert_ne!(first.booking_code, second.booking_code);
}
