// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Admin notes, add-on correction and receipt tests.

use super::{create_cart_item, create_fixture, create_guest, create_selection};
use crate::PersistenceError;

#[test]
fn test_admin_notes_update() {
    let mut fixture = create_fixture();
    let (booking_id, detail_ids) = super::create_submitted_booking(&mut fixture, 1);

    fixture
        .persistence
        .update_booking_detail_admin_notes(detail_ids[0], Some("Called the hotel"))
        .unwrap();

    let view = fixture.persistence.get_booking(booking_id).unwrap().unwrap();
    assert_eq!(view.details[0].admin_notes.as_deref(), Some("Called the hotel"));

    assert!(matches!(
        fixture
            .persistence
            .update_booking_detail_admin_notes(777, Some("Nope")),
        Err(PersistenceError::NotFound(_))
    ));
}

#[test]
fn test_additional_correction_leaves_invoice_unchanged() {
    let mut fixture = create_fixture();
    let mut item = create_cart_item(fixture.room_price_id, 1);
    item.additionals = vec![create_selection(fixture.transfer_id, None)];
    let added = fixture
        .persistence
        .add_to_cart(fixture.agent_id, &item)
        .unwrap();
    fixture
        .persistence
        .check_out_cart(fixture.agent_id, &[create_guest("Jane Doe")], &[])
        .unwrap();

    let detail_id = added.created_details[0].booking_detail_id;
    let view = fixture
        .persistence
        .get_booking(added.booking_id)
        .unwrap()
        .unwrap();
    let additional_id = view.details[0].additionals[0].booking_detail_additional_id;
    let invoice_before = fixture
        .persistence
        .get_invoice_for_detail(detail_id)
        .unwrap()
        .unwrap();

    let corrected = fixture
        .persistence
        .correct_booking_detail_additional(additional_id, Some("Private transfer"), Some(4000))
        .unwrap();
    assert_eq!(corrected.additional.name, "Private transfer");
    assert_eq!(corrected.additional.price, 4000);

    let invoice_after = fixture
        .persistence
        .get_invoice_for_detail(detail_id)
        .unwrap()
        .unwrap();
    assert_eq!(invoice_before, invoice_after);
}

#[test]
fn test_additional_correction_validation() {
    let mut fixture = create_fixture();

    assert!(matches!(
        fixture
            .persistence
            .correct_booking_detail_additional(1, None, Some(-1)),
        Err(PersistenceError::DomainViolation(_))
    ));
    assert!(matches!(
        fixture
            .persistence
            .correct_booking_detail_additional(1, Some(" "), None),
        Err(PersistenceError::DomainViolation(_))
    ));
    assert!(matches!(
        fixture
            .persistence
            .correct_booking_detail_additional(999, None, Some(10)),
        Err(PersistenceError::NotFound(_))
    ));
}

#[test]
fn test_receipt_recorded_for_owned_submitted_detail() {
    let mut fixture = create_fixture();
    let (booking_id, detail_ids) = super::create_submitted_booking(&mut fixture, 1);
    let code = fixture.persistence.get_booking(booking_id).unwrap().unwrap().details[0]
        .sub_booking_code
        .clone();

    let detail_id = fixture
        .persistence
        .set_receipt_url(fixture.agent_id, &code, "http://localhost/uploads/r.pdf")
        .unwrap();
    assert_eq!(detail_id, detail_ids[0]);

    let view = fixture.persistence.get_booking(booking_id).unwrap().unwrap();
    assert_eq!(
        view.details[0].receipt_url.as_deref(),
        Some("http://localhost/uploads/r.pdf")
    );

    assert!(matches!(
        fixture
            .persistence
            .set_receipt_url(fixture.other_agent_id, &code, "http://x/y"),
        Err(PersistenceError::NotFound(_))
    ));
}

#[test]
fn test_receipt_for_cart_detail_is_a_conflict() {
    let mut fixture = create_fixture();
    let added = fixture
        .persistence
        .add_to_cart(
            fixture.agent_id,
            &create_cart_item(fixture.room_price_id, 1),
        )
        .unwrap();

    let result = fixture.persistence.set_receipt_url(
        fixture.agent_id,
        &added.created_details[0].sub_booking_code,
        "http://x/y",
    );

    assert_eq!(result.unwrap_err(), PersistenceError::NoBookingDetailUpdated);
}
