// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for agent cancellation and receipt handling.

use crate::tests::helpers::{HOTEL_EMAIL, create_fixture, fill_cart, submit_booking};
use crate::{
    ApiError, UploadReceiptRequest, cancel_booking, get_booking, prepare_receipt_upload,
    record_receipt,
};

fn receipt_request(content_type: &str) -> UploadReceiptRequest {
    UploadReceiptRequest {
        file_name: String::from("transfer.pdf"),
        content_type: content_type.to_string(),
        content_base64: String::from("JVBERi0xLjQK"),
    }
}

#[test]
fn test_cancel_notifies_hotel_and_rolls_up() {
    let mut fixture = create_fixture();
    let checkout = submit_booking(&mut fixture, 1);
    let code = checkout.booking.details[0].sub_booking_code.clone();

    let outcome = cancel_booking(&mut fixture.persistence, &fixture.agent, &code).unwrap();
    assert_eq!(outcome.response.booking_status, "canceled");
    assert!(outcome.response.aggregate_updated);
    assert_eq!(outcome.notifications.len(), 1);
    assert_eq!(outcome.notifications[0].recipient, HOTEL_EMAIL);
    assert!(outcome.notifications[0].subject.contains(&code));
}

#[test]
fn test_cancel_twice_conflicts() {
    let mut fixture = create_fixture();
    let checkout = submit_booking(&mut fixture, 2);
    let code = checkout.booking.details[0].sub_booking_code.clone();

    let first = cancel_booking(&mut fixture.persistence, &fixture.agent, &code).unwrap();
    assert!(!first.response.aggregate_updated);

    assert!(matches!(
        cancel_booking(&mut fixture.persistence, &fixture.agent, &code),
        Err(ApiError::Conflict { .. })
    ));
}

#[test]
fn test_cancel_hides_foreign_and_unknown_codes() {
    let mut fixture = create_fixture();
    let checkout = submit_booking(&mut fixture, 1);
    let code = checkout.booking.details[0].sub_booking_code.clone();

    let foreign = cancel_booking(&mut fixture.persistence, &fixture.other_agent, &code);
    let unknown = cancel_booking(&mut fixture.persistence, &fixture.agent, "SB-00000000");
    assert!(matches!(foreign, Err(ApiError::ResourceNotFound { .. })));
    assert!(matches!(unknown, Err(ApiError::ResourceNotFound { .. })));

    let booking = get_booking(
        &mut fixture.persistence,
        &fixture.admin,
        checkout.booking.booking_id,
    )
    .unwrap();
    assert_eq!(booking.details[0].booking_status, "waiting_approval");
}

#[test]
fn test_cancel_of_cart_item_conflicts() {
    let mut fixture = create_fixture();
    let cart = fill_cart(&mut fixture, 1);
    let code = cart.created_details[0].sub_booking_code.clone();

    assert!(matches!(
        cancel_booking(&mut fixture.persistence, &fixture.agent, &code),
        Err(ApiError::Conflict { .. })
    ));
}

#[test]
fn test_receipt_upload_is_recorded_on_the_sub_booking() {
    let mut fixture = create_fixture();
    let checkout = submit_booking(&mut fixture, 1);
    let code = checkout.booking.details[0].sub_booking_code.clone();

    let upload = prepare_receipt_upload(
        &mut fixture.persistence,
        &fixture.agent,
        &code,
        &receipt_request("application/pdf"),
    )
    .unwrap();
    assert!(upload.object_key.starts_with(&format!("receipts/{code}/")));
    assert!(upload.object_key.ends_with(".pdf"));

    let url = format!("http://localhost:3000/uploads/{}", upload.object_key);
    let response =
        record_receipt(&mut fixture.persistence, &fixture.agent, &code, &url).unwrap();
    assert_eq!(response.receipt_url, url);

    let booking = get_booking(
        &mut fixture.persistence,
        &fixture.agent,
        checkout.booking.booking_id,
    )
    .unwrap();
    assert_eq!(booking.details[0].receipt_url.as_deref(), Some(url.as_str()));
}

#[test]
fn test_receipt_upload_rejects_unsupported_type() {
    let mut fixture = create_fixture();
    let checkout = submit_booking(&mut fixture, 1);
    let code = checkout.booking.details[0].sub_booking_code.clone();

    let result = prepare_receipt_upload(
        &mut fixture.persistence,
        &fixture.agent,
        &code,
        &receipt_request("text/html"),
    );
    match result.unwrap_err() {
        ApiError::InvalidInput { field, .. } => assert_eq!(field, "content_type"),
        other => panic!("Expected InvalidInput error, got: {other:?}"),
    }
}

#[test]
fn test_receipt_upload_requires_submitted_owned_sub_booking() {
    let mut fixture = create_fixture();
    let cart = fill_cart(&mut fixture, 1);
    let code = cart.created_details[0].sub_booking_code.clone();

    assert!(matches!(
        prepare_receipt_upload(
            &mut fixture.persistence,
            &fixture.agent,
            &code,
            &receipt_request("image/png"),
        ),
        Err(ApiError::Conflict { .. })
    ));
    assert!(matches!(
        prepare_receipt_upload(
            &mut fixture.persistence,
            &fixture.other_agent,
            &code,
            &receipt_request("image/png"),
        ),
        Err(ApiError::ResourceNotFound { .. })
    ));
}
