// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary layer for the hotel booking system.
//!
//! This crate sits between the HTTP server and persistence. It owns:
//! - operator authentication and role authorization
//! - request DTOs and their conversion into domain values
//! - explicit translation of domain and persistence errors
//! - notification intents emitted by committed mutations
//!
//! It performs no I/O of its own beyond the persistence calls.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod error;
mod handlers;
mod notification;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService, AuthorizationService, Role};
pub use error::{ApiError, AuthError, translate_domain_error, translate_persistence_error};
pub use handlers::{
    MIN_PASSWORD_LENGTH, ReceiptUpload, add_guests_to_cart, add_to_cart, cancel_booking,
    check_out_cart, correct_booking_detail_additional, create_first_admin, create_operator,
    get_booking, get_cart, get_invoice, login, logout, prepare_receipt_upload, record_receipt,
    remove_from_cart, remove_guests_from_cart, update_booking_detail_admin_notes,
    update_booking_detail_status, update_cart_additional_notes, update_payment_status, whoami,
};
pub use notification::{HandlerOutcome, Notification};
pub use request_response::{
    AddToCartRequest, AddToCartResponse, AdditionalSelectionRequest, BookingDetailAdditionalInfo,
    BookingDetailInfo, BookingInfo, CancelBookingResponse, CheckoutRequest, CheckoutResponse,
    CorrectAdditionalRequest, CreateFirstAdminRequest, CreateFirstAdminResponse,
    CreateOperatorRequest, CreateOperatorResponse, CreatedDetailInfo, GuestAssignmentRequest,
    GuestInfo, GuestRequest, InvoiceInfo, InvoiceLineInfo, LoginRequest, LoginResponse,
    RemoveFromCartResponse, RemoveGuestsRequest, RemoveGuestsResponse, SetGuestsRequest,
    SetGuestsResponse, StatusChangeResponse, StatusHistoryInfo, UpdateDetailStatusRequest,
    UpdateNotesRequest, UpdatePaymentStatusRequest, UpdatePaymentStatusResponse,
    UploadReceiptRequest, UploadReceiptResponse, WhoAmIResponse,
};
