// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Guarded transition and aggregate rollup tests.

use hotel_booking_domain::{BookingStatus, DomainError, PaymentStatus};

use super::{create_cart_item, create_fixture, create_submitted_booking};
use crate::PersistenceError;

#[test]
fn test_confirming_only_detail_confirms_booking() {
    let mut fixture = create_fixture();
    let (booking_id, detail_ids) = create_submitted_booking(&mut fixture, 1);

    let result = fixture
        .persistence
        .update_booking_detail_status(
            fixture.admin_id,
            booking_id,
            &detail_ids,
            BookingStatus::Confirmed,
            None,
        )
        .unwrap();

    assert!(result.aggregate_updated);
    assert_eq!(result.booking_status, BookingStatus::Confirmed);
    assert_eq!(result.details.len(), 1);
    assert!(result.details[0].detail.approved_at.is_some());
    assert_eq!(result.details[0].agent.agent_id, fixture.agent_id);

    let view = fixture.persistence.get_booking(booking_id).unwrap().unwrap();
    assert_eq!(view.booking.booking_status, BookingStatus::Confirmed);
    assert!(view.booking.approved_at.is_some());
}

#[test]
fn test_second_transition_is_a_conflict() {
    let mut fixture = create_fixture();
    let (booking_id, detail_ids) = create_submitted_booking(&mut fixture, 1);

    fixture
        .persistence
        .update_booking_detail_status(
            fixture.admin_id,
            booking_id,
            &detail_ids,
            BookingStatus::Confirmed,
            None,
        )
        .unwrap();

    let result = fixture.persistence.update_booking_detail_status(
        fixture.admin_id,
        booking_id,
        &detail_ids,
        BookingStatus::Rejected,
        Some("Overbooked"),
    );
    assert_eq!(result.unwrap_err(), PersistenceError::NoBookingDetailUpdated);

    let view = fixture.persistence.get_booking(booking_id).unwrap().unwrap();
    assert_eq!(view.details[0].booking_status, BookingStatus::Confirmed);
    assert!(view.details[0].status_reason.is_none());
    assert_eq!(view.booking.booking_status, BookingStatus::Confirmed);
    assert_eq!(
        fixture
            .persistence
            .get_status_history(detail_ids[0])
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_partial_decision_defers_rollup() {
    let mut fixture = create_fixture();
    let (booking_id, detail_ids) = create_submitted_booking(&mut fixture, 2);

    let result = fixture
        .persistence
        .update_booking_detail_status(
            fixture.admin_id,
            booking_id,
            &detail_ids[..1],
            BookingStatus::Confirmed,
            None,
        )
        .unwrap();

    assert!(!result.aggregate_updated);
    assert_eq!(result.booking_status, BookingStatus::WaitingApproval);
    let view = fixture.persistence.get_booking(booking_id).unwrap().unwrap();
    assert_eq!(view.booking.booking_status, BookingStatus::WaitingApproval);
    assert!(view.booking.approved_at.is_none());
}

#[test]
fn test_rejection_outranks_confirmation_and_cancellation() {
    let mut fixture = create_fixture();
    let (booking_id, detail_ids) = create_submitted_booking(&mut fixture, 3);
    let view = fixture.persistence.get_booking(booking_id).unwrap().unwrap();
    let cancel_code = view.details[2].sub_booking_code.clone();

    fixture
        .persistence
        .update_booking_detail_status(
            fixture.admin_id,
            booking_id,
            &detail_ids[..1],
            BookingStatus::Confirmed,
            None,
        )
        .unwrap();
    fixture
        .persistence
        .cancel_booking(fixture.agent_id, &cancel_code)
        .unwrap();
    let result = fixture
        .persistence
        .update_booking_detail_status(
            fixture.admin_id,
            booking_id,
            &detail_ids[1..2],
            BookingStatus::Rejected,
            Some("No availability"),
        )
        .unwrap();

    assert!(result.aggregate_updated);
    assert_eq!(result.booking_status, BookingStatus::Rejected);
    assert_eq!(
        result.details[0].detail.status_reason.as_deref(),
        Some("No availability")
    );
}

#[test]
fn test_confirmation_outranks_cancellation() {
    let mut fixture = create_fixture();
    let (booking_id, detail_ids) = create_submitted_booking(&mut fixture, 2);
    let view = fixture.persistence.get_booking(booking_id).unwrap().unwrap();
    let cancel_code = view.details[1].sub_booking_code.clone();

    fixture
        .persistence
        .cancel_booking(fixture.agent_id, &cancel_code)
        .unwrap();
    let result = fixture
        .persistence
        .update_booking_detail_status(
            fixture.admin_id,
            booking_id,
            &detail_ids[..1],
            BookingStatus::Confirmed,
            None,
        )
        .unwrap();

    assert_eq!(result.booking_status, BookingStatus::Confirmed);
}

#[test]
fn test_recompute_is_idempotent() {
    let mut fixture = create_fixture();
    let (booking_id, detail_ids) = create_submitted_booking(&mut fixture, 1);
    fixture
        .persistence
        .update_booking_detail_status(
            fixture.admin_id,
            booking_id,
            &detail_ids,
            BookingStatus::Rejected,
            None,
        )
        .unwrap();

    assert_eq!(
        fixture.persistence.recompute_aggregate(booking_id).unwrap(),
        Some(BookingStatus::Rejected)
    );
    assert_eq!(
        fixture.persistence.recompute_aggregate(booking_id).unwrap(),
        Some(BookingStatus::Rejected)
    );
}

#[test]
fn test_partially_processed_request_rolls_back() {
    let mut fixture = create_fixture();
    let (booking_id, detail_ids) = create_submitted_booking(&mut fixture, 2);
    fixture
        .persistence
        .update_booking_detail_status(
            fixture.admin_id,
            booking_id,
            &detail_ids[..1],
            BookingStatus::Confirmed,
            None,
        )
        .unwrap();

    // First detail is already decided; the second must not be touched.
    let result = fixture.persistence.update_booking_detail_status(
        fixture.admin_id,
        booking_id,
        &detail_ids,
        BookingStatus::Rejected,
        None,
    );
    assert_eq!(result.unwrap_err(), PersistenceError::NoBookingDetailUpdated);

    let view = fixture.persistence.get_booking(booking_id).unwrap().unwrap();
    assert_eq!(view.details[1].booking_status, BookingStatus::WaitingApproval);
}

#[test]
fn test_detail_of_other_booking_is_a_conflict() {
    let mut fixture = create_fixture();
    let (first_booking, _) = create_submitted_booking(&mut fixture, 1);
    let (_, second_details) = create_submitted_booking(&mut fixture, 1);

    let result = fixture.persistence.update_booking_detail_status(
        fixture.admin_id,
        first_booking,
        &second_details,
        BookingStatus::Confirmed,
        None,
    );

    assert_eq!(result.unwrap_err(), PersistenceError::NoBookingDetailUpdated);
}

#[test]
fn test_cart_details_cannot_be_decided() {
    let mut fixture = create_fixture();
    let added = fixture
        .persistence
        .add_to_cart(
            fixture.agent_id,
            &create_cart_item(fixture.room_price_id, 1),
        )
        .unwrap();

    let result = fixture.persistence.update_booking_detail_status(
        fixture.admin_id,
        added.booking_id,
        &[added.created_details[0].booking_detail_id],
        BookingStatus::Confirmed,
        None,
    );

    assert_eq!(result.unwrap_err(), PersistenceError::NoBookingDetailUpdated);
}

#[test]
fn test_admin_cannot_cancel_or_requeue() {
    let mut fixture = create_fixture();
    let (booking_id, detail_ids) = create_submitted_booking(&mut fixture, 1);

    for status in [BookingStatus::Canceled, BookingStatus::WaitingApproval] {
        let result = fixture.persistence.update_booking_detail_status(
            fixture.admin_id,
            booking_id,
            &detail_ids,
            status,
            None,
        );
        assert!(matches!(
            result,
            Err(PersistenceError::DomainViolation(
                DomainError::InvalidDecisionStatus { .. }
            ))
        ));
    }
}

#[test]
fn test_empty_selection_rejected() {
    let mut fixture = create_fixture();
    let (booking_id, _) = create_submitted_booking(&mut fixture, 1);

    let result = fixture.persistence.update_booking_detail_status(
        fixture.admin_id,
        booking_id,
        &[],
        BookingStatus::Confirmed,
        None,
    );

    assert!(matches!(
        result,
        Err(PersistenceError::DomainViolation(
            DomainError::EmptyDetailSelection
        ))
    ));
}

#[test]
fn test_unknown_booking_is_not_found() {
    let mut fixture = create_fixture();

    let result = fixture.persistence.update_booking_detail_status(
        fixture.admin_id,
        4242,
        &[1],
        BookingStatus::Confirmed,
        None,
    );

    assert!(matches!(result, Err(PersistenceError::NotFound(_))));
}

#[test]
fn test_status_history_recorded() {
    let mut fixture = create_fixture();
    let (booking_id, detail_ids) = create_submitted_booking(&mut fixture, 1);
    fixture
        .persistence
        .update_booking_detail_status(
            fixture.admin_id,
            booking_id,
            &detail_ids,
            BookingStatus::Rejected,
            Some("Closed for renovation"),
        )
        .unwrap();

    let history = fixture.persistence.get_status_history(detail_ids[0]).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].previous_status, BookingStatus::WaitingApproval);
    assert_eq!(history[0].new_status, BookingStatus::Rejected);
    assert_eq!(history[0].actor_operator_id, fixture.admin_id);
    assert_eq!(history[0].reason.as_deref(), Some("Closed for renovation"));
}

#[test]
fn test_payment_rollup() {
    let mut fixture = create_fixture();
    let (booking_id, detail_ids) = create_submitted_booking(&mut fixture, 2);

    let partial = fixture
        .persistence
        .update_payment_status(booking_id, &detail_ids[..1], PaymentStatus::Paid)
        .unwrap();
    assert_eq!(partial.payment_status, PaymentStatus::Unpaid);
    assert_eq!(partial.updated_details, 1);

    let full = fixture
        .persistence
        .update_payment_status(booking_id, &detail_ids, PaymentStatus::Paid)
        .unwrap();
    assert_eq!(full.payment_status, PaymentStatus::Paid);
    assert_eq!(full.updated_details, 1);

    let view = fixture.persistence.get_booking(booking_id).unwrap().unwrap();
    assert_eq!(view.booking.payment_status, PaymentStatus::Paid);
}

#[test]
fn test_payment_update_without_change_is_a_conflict() {
    let mut fixture = create_fixture();
    let (booking_id, detail_ids) = create_submitted_booking(&mut fixture, 1);

    let result =
        fixture
            .persistence
            .update_payment_status(booking_id, &detail_ids, PaymentStatus::Unpaid);

    assert_eq!(result.unwrap_err(), PersistenceError::NoBookingDetailUpdated);
}

#[test]
fn test_payment_update_rejects_details_outside_the_booking() {
    let mut fixture = create_fixture();
    let (booking_id, detail_ids) = create_submitted_booking(&mut fixture, 1);

    let other_cart = fixture
        .persistence
        .add_to_cart(
            fixture.other_agent_id,
            &create_cart_item(fixture.room_price_id, 1),
        )
        .unwrap();
    let foreign_detail = other_cart.created_details[0].booking_detail_id;

    let result = fixture.persistence.update_payment_status(
        booking_id,
        &[detail_ids[0], foreign_detail, 999_999],
        PaymentStatus::Paid,
    );
    assert_eq!(result.unwrap_err(), PersistenceError::NoBookingDetailUpdated);

    let view = fixture.persistence.get_booking(booking_id).unwrap().unwrap();
    assert_eq!(view.booking.payment_status, PaymentStatus::Unpaid);
    assert!(
        view.details
            .iter()
            .all(|d| d.payment_status == PaymentStatus::Unpaid)
    );
}

#[test]
fn test_payment_update_accepts_repeated_ids() {
    let mut fixture = create_fixture();
    let (booking_id, detail_ids) = create_submitted_booking(&mut fixture, 1);

    let result = fixture
        .persistence
        .update_payment_status(
            booking_id,
            &[detail_ids[0], detail_ids[0]],
            PaymentStatus::Paid,
        )
        .unwrap();

    assert_eq!(result.updated_details, 1);
    assert_eq!(result.payment_status, PaymentStatus::Paid);
}
