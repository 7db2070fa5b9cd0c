// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for the booking lifecycle.
//!
//! Every handler enforces authorization first, converts the request into
//! domain values (rejecting malformed input before any write) and then calls
//! exactly one persistence operation. Errors are translated explicitly.

use num_traits::cast::ToPrimitive;
use std::str::FromStr;
use tracing::{debug, info};

use hotel_booking_domain::{
    AdditionalSelection, BookingStatus, Guest, GuestCategory, Honorific, PaymentStatus, StayPeriod,
    validate_required_text,
};
use hotel_booking_persistence::{
    BookingDetailAdditionalData, BookingDetailData, BookingGuestData, BookingView, CheckoutResult,
    DetailOwnership, GuestAssignment, InvoiceData, NewCartItem, OperatorData, PaymentChangeResult,
    SessionData, SqlitePersistence, StatusChangeResult, StatusHistoryData,
};

use crate::auth::{AuthenticatedActor, AuthenticationService, AuthorizationService, Role};
use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::notification::{self, HandlerOutcome, Notification};
use crate::request_response::{
    AddToCartRequest, AddToCartResponse, BookingDetailAdditionalInfo, BookingDetailInfo,
    BookingInfo, CancelBookingResponse, CheckoutRequest, CheckoutResponse, CorrectAdditionalRequest,
    CreateFirstAdminRequest, CreateFirstAdminResponse, CreateOperatorRequest,
    CreateOperatorResponse, CreatedDetailInfo, GuestInfo, GuestRequest, InvoiceInfo,
    InvoiceLineInfo, LoginRequest, LoginResponse, RemoveFromCartResponse, RemoveGuestsRequest,
    RemoveGuestsResponse, SetGuestsRequest, SetGuestsResponse, StatusChangeResponse,
    StatusHistoryInfo, UpdateDetailStatusRequest, UpdateNotesRequest, UpdatePaymentStatusRequest,
    UpdatePaymentStatusResponse, UploadReceiptRequest, UploadReceiptResponse, WhoAmIResponse,
};

/// Minimum accepted password length for new operators.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Receipt MIME types accepted for upload, with the stored file extension.
const RECEIPT_CONTENT_TYPES: [(&str, &str); 3] = [
    ("application/pdf", "pdf"),
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
];

// ============================================================================
// Conversions
// ============================================================================

fn parse_guest(request: &GuestRequest) -> Result<Guest, ApiError> {
    let honorific: Honorific =
        Honorific::from_str(&request.honorific).map_err(translate_domain_error)?;
    let category: GuestCategory =
        GuestCategory::from_str(&request.category).map_err(translate_domain_error)?;
    Ok(Guest::new(
        request.name.clone(),
        honorific,
        category,
        request.age,
    ))
}

fn parse_guests(requests: &[GuestRequest]) -> Result<Vec<Guest>, ApiError> {
    requests.iter().map(parse_guest).collect()
}

fn to_u32(field: &str, value: i64) -> Result<u32, ApiError> {
    value.to_u32().ok_or_else(|| ApiError::InvalidInput {
        field: field.to_string(),
        message: format!("{value} is not a valid {field}"),
    })
}

fn guest_info(guest: &BookingGuestData) -> GuestInfo {
    GuestInfo {
        booking_guest_id: guest.booking_guest_id,
        name: guest.guest.name.clone(),
        honorific: guest.guest.honorific.as_str().to_string(),
        category: guest.guest.category.as_str().to_string(),
        age: guest.guest.age,
    }
}

fn additional_info(additional: &BookingDetailAdditionalData) -> BookingDetailAdditionalInfo {
    BookingDetailAdditionalInfo {
        booking_detail_additional_id: additional.booking_detail_additional_id,
        booking_detail_id: additional.booking_detail_id,
        room_type_additional_id: additional.additional.room_type_additional_id,
        name: additional.additional.name.clone(),
        charge_basis: additional.additional.charge_basis.as_str().to_string(),
        price: additional.additional.price,
        pax: additional.additional.pax,
        amount: additional.additional.amount(),
    }
}

fn history_info(entry: &StatusHistoryData) -> StatusHistoryInfo {
    StatusHistoryInfo {
        previous_status: entry.previous_status.as_str().to_string(),
        new_status: entry.new_status.as_str().to_string(),
        actor_operator_id: entry.actor_operator_id,
        reason: entry.reason.clone(),
        changed_at: entry.changed_at.clone(),
    }
}

fn detail_info(detail: &BookingDetailData, history: &[StatusHistoryData]) -> BookingDetailInfo {
    BookingDetailInfo {
        booking_detail_id: detail.booking_detail_id,
        sub_booking_code: detail.sub_booking_code.clone(),
        check_in: detail.check_in.clone(),
        check_out: detail.check_out.clone(),
        quantity: detail.quantity,
        guest_name: detail.guest_name.clone(),
        additional_notes: detail.additional_notes.clone(),
        admin_notes: detail.admin_notes.clone(),
        hotel_id: detail.room.hotel_id,
        hotel_name: detail.room.hotel_name.clone(),
        room_type_name: detail.room.room_type_name.clone(),
        price_label: detail.room.price_label.clone(),
        promo_name: detail.promo.as_ref().map(|p| p.name.clone()),
        price: detail.price,
        currency: detail.currency.clone(),
        booking_status: detail.booking_status.as_str().to_string(),
        payment_status: detail.payment_status.as_str().to_string(),
        status_reason: detail.status_reason.clone(),
        receipt_url: detail.receipt_url.clone(),
        approved_at: detail.approved_at.clone(),
        additionals: detail.additionals.iter().map(additional_info).collect(),
        status_history: history.iter().map(history_info).collect(),
    }
}

fn booking_info(view: &BookingView) -> BookingInfo {
    booking_info_with_history(view, |_| Vec::new())
}

fn booking_info_with_history<F>(view: &BookingView, mut history_for: F) -> BookingInfo
where
    F: FnMut(i64) -> Vec<StatusHistoryData>,
{
    BookingInfo {
        booking_id: view.booking.booking_id,
        booking_code: view.booking.booking_code.clone(),
        agent_id: view.booking.agent_id,
        booking_status: view.booking.booking_status.as_str().to_string(),
        payment_status: view.booking.payment_status.as_str().to_string(),
        created_at: view.booking.created_at.clone(),
        submitted_at: view.booking.submitted_at.clone(),
        approved_at: view.booking.approved_at.clone(),
        details: view
            .details
            .iter()
            .map(|d| detail_info(d, &history_for(d.booking_detail_id)))
            .collect(),
        guests: view.guests.iter().map(guest_info).collect(),
    }
}

fn invoice_info(invoice: InvoiceData) -> InvoiceInfo {
    InvoiceInfo {
        invoice_code: invoice.invoice_code,
        booking_detail_id: invoice.booking_detail_id,
        lines: invoice
            .breakdown
            .lines
            .into_iter()
            .map(|line| InvoiceLineInfo {
                description: line.description,
                quantity: line.quantity,
                unit_price: line.unit_price,
                amount: line.amount,
            })
            .collect(),
        total: invoice.total,
        currency: invoice.currency,
        created_at: invoice.created_at,
    }
}

fn status_change_response(result: &StatusChangeResult) -> StatusChangeResponse {
    StatusChangeResponse {
        booking_id: result.booking_id,
        booking_status: result.booking_status.as_str().to_string(),
        aggregate_updated: result.aggregate_updated,
        sub_booking_codes: result
            .details
            .iter()
            .map(|c| c.detail.sub_booking_code.clone())
            .collect(),
    }
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::InvalidInput {
            field: String::from("password"),
            message: format!("Password must be at least {MIN_PASSWORD_LENGTH} characters long"),
        });
    }
    Ok(())
}

fn validate_operator_fields(
    login_name: &str,
    display_name: &str,
    email: &str,
) -> Result<(), ApiError> {
    validate_required_text("login_name", login_name).map_err(translate_domain_error)?;
    validate_required_text("display_name", display_name).map_err(translate_domain_error)?;
    validate_required_text("email", email).map_err(translate_domain_error)?;
    if !email.contains('@') {
        return Err(ApiError::InvalidInput {
            field: String::from("email"),
            message: format!("'{email}' is not an email address"),
        });
    }
    Ok(())
}

// ============================================================================
// Identity
// ============================================================================

/// Creates the first admin operator.
///
/// Only succeeds while no operators exist.
///
/// # Errors
///
/// Returns an error if:
/// - Operators already exist
/// - A field is blank or the password is too short
/// - Database operations fail
pub fn create_first_admin(
    persistence: &mut SqlitePersistence,
    request: CreateFirstAdminRequest,
) -> Result<CreateFirstAdminResponse, ApiError> {
    let operator_count: i64 = persistence
        .count_operators()
        .map_err(translate_persistence_error)?;

    if operator_count > 0 {
        return Err(ApiError::Unauthorized {
            action: String::from("create_first_admin"),
            required_role: String::from("Bootstrap mode (no operators exist)"),
        });
    }

    validate_operator_fields(&request.login_name, &request.display_name, &request.email)?;
    validate_password(&request.password)?;

    let operator_id: i64 = persistence
        .create_operator(
            &request.login_name,
            &request.display_name,
            &request.email,
            &request.password,
            Role::Admin.as_str(),
        )
        .map_err(translate_persistence_error)?;

    info!(operator_id, "First admin operator created");

    Ok(CreateFirstAdminResponse {
        operator_id,
        login_name: request.login_name.to_uppercase(),
        display_name: request.display_name,
        message: String::from("First admin operator created successfully"),
    })
}

/// Authenticates an operator and creates a session.
///
/// # Errors
///
/// Returns an error if the credentials are invalid or database
/// operations fail.
pub fn login(
    persistence: &mut SqlitePersistence,
    request: &LoginRequest,
) -> Result<LoginResponse, ApiError> {
    let (session_token, _actor, operator): (String, AuthenticatedActor, OperatorData) =
        AuthenticationService::login(persistence, &request.login_name, &request.password)?;

    let session: Option<SessionData> = persistence
        .get_session_by_token(&session_token)
        .map_err(translate_persistence_error)?;

    let expires_at: String = session
        .ok_or_else(|| ApiError::Internal {
            message: String::from("Session not found after creation"),
        })?
        .expires_at;

    Ok(LoginResponse {
        session_token,
        login_name: operator.login_name,
        display_name: operator.display_name,
        role: operator.role,
        expires_at,
    })
}

/// Logs out by deleting the session.
///
/// # Errors
///
/// Returns an error if the logout fails.
pub fn logout(persistence: &mut SqlitePersistence, session_token: &str) -> Result<(), ApiError> {
    AuthenticationService::logout(persistence, session_token)?;
    Ok(())
}

/// Returns the calling operator's information.
#[must_use]
pub fn whoami(operator: &OperatorData) -> WhoAmIResponse {
    WhoAmIResponse {
        operator_id: operator.operator_id,
        login_name: operator.login_name.clone(),
        display_name: operator.display_name.clone(),
        email: operator.email.clone(),
        role: operator.role.clone(),
        last_login_at: operator.last_login_at.clone(),
    }
}

/// Creates a new operator.
///
/// Only Admin actors may create operators.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The role is not `Admin` or `Agent`
/// - A field is blank or the password is too short
/// - The login name already exists
pub fn create_operator(
    persistence: &mut SqlitePersistence,
    request: CreateOperatorRequest,
    actor: &AuthenticatedActor,
) -> Result<CreateOperatorResponse, ApiError> {
    AuthorizationService::require_admin(actor, "create_operator")?;

    let role: Role = Role::parse_str(&request.role).map_err(|_| ApiError::InvalidInput {
        field: String::from("role"),
        message: format!("Invalid role: {}. Must be 'Admin' or 'Agent'", request.role),
    })?;
    validate_operator_fields(&request.login_name, &request.display_name, &request.email)?;
    validate_password(&request.password)?;

    let operator_id: i64 = persistence
        .create_operator(
            &request.login_name,
            &request.display_name,
            &request.email,
            &request.password,
            role.as_str(),
        )
        .map_err(translate_persistence_error)?;

    info!(
        operator_id,
        created_by = actor.operator_id,
        role = role.as_str(),
        "Operator created"
    );

    Ok(CreateOperatorResponse {
        operator_id,
        login_name: request.login_name.to_uppercase(),
        display_name: request.display_name,
        role: role.as_str().to_string(),
    })
}

// ============================================================================
// Cart
// ============================================================================

/// Returns the agent's cart.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the agent has no cart.
pub fn get_cart(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
) -> Result<BookingInfo, ApiError> {
    AuthorizationService::require_agent(actor, "get_cart")?;
    let cart: BookingView = persistence
        .get_cart(actor.operator_id)
        .map_err(translate_persistence_error)?;
    Ok(booking_info(&cart))
}

/// Adds a room selection to the agent's cart, creating the cart if needed.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Agent
/// - The dates, quantity or pax counts are malformed
/// - The stay is empty or too short for the promo
/// - The room price, promo or an add-on does not exist
/// - An add-on does not belong to the room type, or a required one is missing
pub fn add_to_cart(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: &AddToCartRequest,
) -> Result<AddToCartResponse, ApiError> {
    AuthorizationService::require_agent(actor, "add_to_cart")?;

    let stay: StayPeriod = StayPeriod::parse(&request.check_in, &request.check_out)
        .map_err(translate_domain_error)?;
    let quantity: u32 = to_u32("quantity", request.quantity)?;
    let additionals: Vec<AdditionalSelection> = request
        .additionals
        .iter()
        .map(|selection| -> Result<AdditionalSelection, ApiError> {
            Ok(AdditionalSelection {
                room_type_additional_id: selection.room_type_additional_id,
                pax: selection.pax.map(|pax| to_u32("pax", pax)).transpose()?,
            })
        })
        .collect::<Result<_, _>>()?;

    let item = NewCartItem {
        room_price_id: request.room_price_id,
        stay,
        quantity,
        promo_id: request.promo_id,
        additionals,
    };

    let result = persistence
        .add_to_cart(actor.operator_id, &item)
        .map_err(translate_persistence_error)?;

    Ok(AddToCartResponse {
        booking_id: result.booking_id,
        booking_code: result.booking_code,
        created_details: result
            .created_details
            .into_iter()
            .map(|d| CreatedDetailInfo {
                booking_detail_id: d.booking_detail_id,
                sub_booking_code: d.sub_booking_code,
            })
            .collect(),
    })
}

/// Removes one detail from the agent's cart.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the detail is not in the agent's cart.
pub fn remove_from_cart(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    booking_detail_id: i64,
) -> Result<RemoveFromCartResponse, ApiError> {
    AuthorizationService::require_agent(actor, "remove_from_cart")?;
    let result = persistence
        .remove_from_cart(actor.operator_id, booking_detail_id)
        .map_err(translate_persistence_error)?;
    Ok(RemoveFromCartResponse {
        booking_id: result.booking_id,
        cart_deleted: result.cart_deleted,
    })
}

/// Sets the agent to admin notes on a cart detail.
///
/// # Errors
///
/// Returns an error if the notes are too long or the detail is not in the
/// agent's cart.
pub fn update_cart_additional_notes(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    booking_detail_id: i64,
    request: &UpdateNotesRequest,
) -> Result<(), ApiError> {
    AuthorizationService::require_agent(actor, "update_cart_additional_notes")?;
    persistence
        .update_cart_additional_notes(
            actor.operator_id,
            booking_detail_id,
            request.notes.as_deref(),
        )
        .map_err(translate_persistence_error)
}

/// Replaces the cart guest list.
///
/// # Errors
///
/// Returns an error if a guest is malformed or the agent has no cart.
pub fn add_guests_to_cart(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: &SetGuestsRequest,
) -> Result<SetGuestsResponse, ApiError> {
    AuthorizationService::require_agent(actor, "add_guests_to_cart")?;
    let guests: Vec<Guest> = parse_guests(&request.guests)?;
    let guest_count: usize = persistence
        .add_guests_to_cart(actor.operator_id, &guests)
        .map_err(translate_persistence_error)?;
    Ok(SetGuestsResponse { guest_count })
}

/// Removes the listed guests from the cart.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the agent has no cart or no listed guest
/// belongs to it.
pub fn remove_guests_from_cart(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: &RemoveGuestsRequest,
) -> Result<RemoveGuestsResponse, ApiError> {
    AuthorizationService::require_agent(actor, "remove_guests_from_cart")?;
    let removed: usize = persistence
        .remove_guests_from_cart(actor.operator_id, &request.booking_guest_ids)
        .map_err(translate_persistence_error)?;
    Ok(RemoveGuestsResponse { removed })
}

/// Submits the agent's cart for approval.
///
/// Notifies the agent, and the admin address when one is configured.
///
/// # Errors
///
/// Returns an error if:
/// - A guest or assignment is malformed
/// - The cart is missing or empty
/// - An assignment names a detail outside the cart
pub fn check_out_cart(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: &CheckoutRequest,
    admin_email: Option<&str>,
) -> Result<HandlerOutcome<CheckoutResponse>, ApiError> {
    AuthorizationService::require_agent(actor, "check_out_cart")?;

    let guests: Vec<Guest> = parse_guests(&request.guests)?;
    let assignments: Vec<GuestAssignment> = request
        .assignments
        .iter()
        .map(|a| GuestAssignment {
            booking_detail_id: a.booking_detail_id,
            guest_name: a.guest_name.clone(),
        })
        .collect();

    let result: CheckoutResult = persistence
        .check_out_cart(actor.operator_id, &guests, &assignments)
        .map_err(translate_persistence_error)?;

    let mut notifications: Vec<Notification> =
        vec![notification::booking_submitted(&result.agent, &result.booking)];
    if let Some(admin_email) = admin_email {
        notifications.push(notification::booking_awaiting_review(
            admin_email,
            &result.agent,
            &result.booking,
        ));
    }

    Ok(HandlerOutcome::new(
        CheckoutResponse {
            booking: booking_info(&result.booking),
            invoice_codes: result.invoice_codes,
        },
        notifications,
    ))
}

// ============================================================================
// Bookings
// ============================================================================

/// Returns a booking with its details, guests and status history.
///
/// Agents only see their own bookings; anything else is reported as not
/// found.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the booking does not exist or is not
/// visible to the actor.
pub fn get_booking(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    booking_id: i64,
) -> Result<BookingInfo, ApiError> {
    let not_found = || ApiError::ResourceNotFound {
        resource_type: String::from("Booking"),
        message: format!("Booking {booking_id} not found"),
    };

    let view: BookingView = persistence
        .get_booking(booking_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(not_found)?;

    if actor.role == Role::Agent && view.booking.agent_id != actor.operator_id {
        debug!(
            booking_id,
            operator_id = actor.operator_id,
            "Booking hidden from non-owning agent"
        );
        return Err(not_found());
    }

    let mut histories: Vec<(i64, Vec<StatusHistoryData>)> = Vec::with_capacity(view.details.len());
    for detail in &view.details {
        let history = persistence
            .get_status_history(detail.booking_detail_id)
            .map_err(translate_persistence_error)?;
        histories.push((detail.booking_detail_id, history));
    }

    Ok(booking_info_with_history(&view, |detail_id| {
        histories
            .iter()
            .find(|(id, _)| *id == detail_id)
            .map(|(_, history)| history.clone())
            .unwrap_or_default()
    }))
}

/// Applies an admin decision to sub-bookings of one booking.
///
/// Notifies the owning agent once per decided sub-booking.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The status is not `confirmed` or `rejected`
/// - No detail ids are given, or the reason is too long
/// - The booking does not exist (`ResourceNotFound`)
/// - Any listed detail was already decided or belongs elsewhere (`Conflict`)
pub fn update_booking_detail_status(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    booking_id: i64,
    request: &UpdateDetailStatusRequest,
) -> Result<HandlerOutcome<StatusChangeResponse>, ApiError> {
    AuthorizationService::require_admin(actor, "update_booking_detail_status")?;

    let status: BookingStatus =
        BookingStatus::from_str(&request.status).map_err(translate_domain_error)?;

    let result: StatusChangeResult = persistence
        .update_booking_detail_status(
            actor.operator_id,
            booking_id,
            &request.booking_detail_ids,
            status,
            request.reason.as_deref(),
        )
        .map_err(translate_persistence_error)?;

    let notifications: Vec<Notification> = result
        .details
        .iter()
        .map(notification::detail_decided)
        .collect();

    Ok(HandlerOutcome::new(
        status_change_response(&result),
        notifications,
    ))
}

/// Records payment status on sub-bookings of one booking.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the status is unknown,
/// the booking does not exist, or no listed detail changed (`Conflict`).
pub fn update_payment_status(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    booking_id: i64,
    request: &UpdatePaymentStatusRequest,
) -> Result<UpdatePaymentStatusResponse, ApiError> {
    AuthorizationService::require_admin(actor, "update_payment_status")?;

    let status: PaymentStatus =
        PaymentStatus::from_str(&request.payment_status).map_err(translate_domain_error)?;

    let result: PaymentChangeResult = persistence
        .update_payment_status(booking_id, &request.booking_detail_ids, status)
        .map_err(translate_persistence_error)?;

    Ok(UpdatePaymentStatusResponse {
        booking_id: result.booking_id,
        payment_status: result.payment_status.as_str().to_string(),
        updated_details: result.updated_details,
    })
}

/// Sets the admin to agent notes on a sub-booking.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the notes are too long or
/// the detail does not exist.
pub fn update_booking_detail_admin_notes(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    booking_detail_id: i64,
    request: &UpdateNotesRequest,
) -> Result<(), ApiError> {
    AuthorizationService::require_admin(actor, "update_booking_detail_admin_notes")?;
    persistence
        .update_booking_detail_admin_notes(booking_detail_id, request.notes.as_deref())
        .map_err(translate_persistence_error)
}

/// Corrects the name and/or price of an attached add-on.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the price is negative,
/// the name is blank, or the add-on does not exist.
pub fn correct_booking_detail_additional(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    booking_detail_additional_id: i64,
    request: &CorrectAdditionalRequest,
) -> Result<BookingDetailAdditionalInfo, ApiError> {
    AuthorizationService::require_admin(actor, "correct_booking_detail_additional")?;
    let corrected: BookingDetailAdditionalData = persistence
        .correct_booking_detail_additional(
            booking_detail_additional_id,
            request.name.as_deref(),
            request.price,
        )
        .map_err(translate_persistence_error)?;
    Ok(additional_info(&corrected))
}

/// Returns the invoice of a sub-booking.
///
/// Agents only see invoices of their own sub-bookings.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the detail does not exist, is not visible
/// to the actor, or has not been invoiced.
pub fn get_invoice(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    booking_detail_id: i64,
) -> Result<InvoiceInfo, ApiError> {
    let not_found = || ApiError::ResourceNotFound {
        resource_type: String::from("Invoice"),
        message: format!("No invoice for booking detail {booking_detail_id}"),
    };

    let ownership: DetailOwnership = persistence
        .find_detail_by_id(booking_detail_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(not_found)?;
    if actor.role == Role::Agent && ownership.agent_id != actor.operator_id {
        return Err(not_found());
    }

    let invoice: InvoiceData = persistence
        .get_invoice_for_detail(booking_detail_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(not_found)?;
    Ok(invoice_info(invoice))
}

// ============================================================================
// Sub-bookings
// ============================================================================

/// Cancels one of the agent's sub-bookings awaiting approval.
///
/// Notifies the hotel.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the code does not exist or belongs to
/// another agent, and `Conflict` if the sub-booking is not awaiting
/// approval.
pub fn cancel_booking(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    sub_booking_code: &str,
) -> Result<HandlerOutcome<CancelBookingResponse>, ApiError> {
    AuthorizationService::require_agent(actor, "cancel_booking")?;

    let result: StatusChangeResult = persistence
        .cancel_booking(actor.operator_id, sub_booking_code)
        .map_err(translate_persistence_error)?;

    let notifications: Vec<Notification> = result
        .details
        .iter()
        .map(notification::detail_canceled)
        .collect();

    Ok(HandlerOutcome::new(
        CancelBookingResponse {
            sub_booking_code: sub_booking_code.to_string(),
            booking_id: result.booking_id,
            booking_status: result.booking_status.as_str().to_string(),
            aggregate_updated: result.aggregate_updated,
        },
        notifications,
    ))
}

/// Where and how an accepted receipt upload should be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptUpload {
    /// Storage key relative to the storage root.
    pub object_key: String,
    /// The validated MIME type.
    pub content_type: String,
}

/// Checks that the agent may attach a receipt to a sub-booking and
/// chooses its storage key.
///
/// Runs before the file is stored.
///
/// # Errors
///
/// Returns `InvalidInput` for an unsupported content type,
/// `ResourceNotFound` if the code does not exist or belongs to another
/// agent, and `Conflict` if the booking has not been submitted.
pub fn prepare_receipt_upload(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    sub_booking_code: &str,
    request: &UploadReceiptRequest,
) -> Result<ReceiptUpload, ApiError> {
    AuthorizationService::require_agent(actor, "upload_receipt")?;

    let content_type: String = request.content_type.trim().to_lowercase();
    let extension: &str = RECEIPT_CONTENT_TYPES
        .iter()
        .find(|(mime, _)| *mime == content_type)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| ApiError::InvalidInput {
            field: String::from("content_type"),
            message: format!(
                "Unsupported receipt type '{}': must be a PDF, JPEG or PNG",
                request.content_type
            ),
        })?;

    let ownership: DetailOwnership = persistence
        .find_detail_by_code(sub_booking_code)
        .map_err(translate_persistence_error)?
        .filter(|d| d.agent_id == actor.operator_id)
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Sub-booking"),
            message: format!("Sub-booking {sub_booking_code} not found"),
        })?;
    if ownership.booking_status == BookingStatus::Cart {
        return Err(ApiError::Conflict {
            message: format!("Sub-booking {sub_booking_code} has not been submitted"),
        });
    }

    let timestamp: i128 = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
    Ok(ReceiptUpload {
        object_key: format!("receipts/{sub_booking_code}/{timestamp}.{extension}"),
        content_type,
    })
}

/// Records the stored receipt location on the sub-booking.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the code does not exist or belongs to
/// another agent, and `Conflict` if the booking has not been submitted.
pub fn record_receipt(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    sub_booking_code: &str,
    receipt_url: &str,
) -> Result<UploadReceiptResponse, ApiError> {
    AuthorizationService::require_agent(actor, "upload_receipt")?;
    persistence
        .set_receipt_url(actor.operator_id, sub_booking_code, receipt_url)
        .map_err(translate_persistence_error)?;
    Ok(UploadReceiptResponse {
        sub_booking_code: sub_booking_code.to_string(),
        receipt_url: receipt_url.to_string(),
    })
}
