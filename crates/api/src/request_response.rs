// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Statuses, honorifics and charge bases travel as their stored string
//! forms. Amounts are integer minor units.

use serde::{Deserialize, Serialize};

// ============================================================================
// Identity
// ============================================================================

/// API request to create the first admin operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFirstAdminRequest {
    /// The operator login name.
    pub login_name: String,
    /// The operator display name.
    pub display_name: String,
    /// Contact address for admin-facing notifications.
    pub email: String,
    /// The operator password.
    pub password: String,
}

/// API response for successful first admin creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFirstAdminResponse {
    /// The operator ID.
    pub operator_id: i64,
    /// The operator login name.
    pub login_name: String,
    /// The operator display name.
    pub display_name: String,
    /// A success message.
    pub message: String,
}

/// API request to log in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// The operator login name.
    pub login_name: String,
    /// The operator password.
    pub password: String,
}

/// API response for successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The session token (opaque).
    pub session_token: String,
    /// The operator's login name.
    pub login_name: String,
    /// The operator's display name.
    pub display_name: String,
    /// The operator's role.
    pub role: String,
    /// When the session expires (RFC 3339).
    pub expires_at: String,
}

/// API response describing the calling operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoAmIResponse {
    pub operator_id: i64,
    pub login_name: String,
    pub display_name: String,
    pub email: String,
    pub role: String,
    pub last_login_at: Option<String>,
}

/// API request to create a new operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOperatorRequest {
    /// The operator login name.
    pub login_name: String,
    /// The operator display name.
    pub display_name: String,
    /// The operator contact address.
    pub email: String,
    /// The operator role (Admin or Agent).
    pub role: String,
    /// The operator password.
    pub password: String,
}

/// API response for successful operator creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOperatorResponse {
    /// The operator ID.
    pub operator_id: i64,
    /// The operator login name.
    pub login_name: String,
    /// The operator display name.
    pub display_name: String,
    /// The operator role.
    pub role: String,
}

// ============================================================================
// Cart
// ============================================================================

/// One add-on chosen for a cart item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalSelectionRequest {
    /// The room-type add-on being selected.
    pub room_type_additional_id: i64,
    /// Headcount for per-pax add-ons.
    #[serde(default)]
    pub pax: Option<i64>,
}

/// API request to add a room selection to the agent's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddToCartRequest {
    /// The room price being booked.
    pub room_price_id: i64,
    /// Check-in date (`YYYY-MM-DD`).
    pub check_in: String,
    /// Check-out date (`YYYY-MM-DD`).
    pub check_out: String,
    /// Number of rooms. Each unit becomes its own sub-booking.
    pub quantity: i64,
    /// Optional promo applied to every created sub-booking.
    #[serde(default)]
    pub promo_id: Option<i64>,
    /// Add-ons attached to every created sub-booking.
    #[serde(default)]
    pub additionals: Vec<AdditionalSelectionRequest>,
}

/// A sub-booking created by an add-to-cart call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedDetailInfo {
    pub booking_detail_id: i64,
    pub sub_booking_code: String,
}

/// API response for a successful add-to-cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddToCartResponse {
    /// The cart booking.
    pub booking_id: i64,
    /// The cart booking code.
    pub booking_code: String,
    /// The created sub-bookings, one per unit of quantity.
    pub created_details: Vec<CreatedDetailInfo>,
}

/// API response for a successful remove-from-cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveFromCartResponse {
    /// The cart booking the detail was removed from.
    pub booking_id: i64,
    /// Whether the cart was deleted because no details remained.
    pub cart_deleted: bool,
}

/// API request to set or clear a free-text notes field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateNotesRequest {
    /// The new notes; `None` clears them.
    #[serde(default)]
    pub notes: Option<String>,
}

/// A guest as supplied by the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestRequest {
    pub name: String,
    /// One of `Mr`, `Mrs`, `Ms`.
    pub honorific: String,
    /// `adult` or `child`.
    pub category: String,
    /// Required for children, absent for adults.
    #[serde(default)]
    pub age: Option<u8>,
}

/// API request to replace the cart guest list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetGuestsRequest {
    pub guests: Vec<GuestRequest>,
}

/// API response for a guest-list replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetGuestsResponse {
    /// Number of guests now on the cart.
    pub guest_count: usize,
}

/// API request to remove guests from the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveGuestsRequest {
    pub booking_guest_ids: Vec<i64>,
}

/// API response for a guest removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveGuestsResponse {
    /// Number of guests removed.
    pub removed: usize,
}

/// Assigns a guest name to one cart detail at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestAssignmentRequest {
    pub booking_detail_id: i64,
    pub guest_name: String,
}

/// API request to check out the agent's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// The complete guest list for the booking.
    pub guests: Vec<GuestRequest>,
    /// Guest names for individual sub-bookings.
    #[serde(default)]
    pub assignments: Vec<GuestAssignmentRequest>,
}

/// API response for a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutResponse {
    /// The submitted booking.
    pub booking: BookingInfo,
    /// Invoice codes issued, one per sub-booking.
    pub invoice_codes: Vec<String>,
}

// ============================================================================
// Bookings
// ============================================================================

/// A guest on a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestInfo {
    pub booking_guest_id: i64,
    pub name: String,
    pub honorific: String,
    pub category: String,
    pub age: Option<u8>,
}

/// An add-on attached to a sub-booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDetailAdditionalInfo {
    pub booking_detail_additional_id: i64,
    pub booking_detail_id: i64,
    pub room_type_additional_id: i64,
    pub name: String,
    /// `per_booking` or `per_pax`.
    pub charge_basis: String,
    pub price: i64,
    pub pax: Option<u32>,
    /// Charged amount: the price, or price times pax.
    pub amount: i64,
}

/// One recorded status transition of a sub-booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryInfo {
    pub previous_status: String,
    pub new_status: String,
    pub actor_operator_id: i64,
    pub reason: Option<String>,
    pub changed_at: String,
}

/// A sub-booking with its snapshots and add-ons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDetailInfo {
    /// The detail ID.
    pub booking_detail_id: i64,
    /// The sub-booking code.
    pub sub_booking_code: String,
    /// Check-in date.
    pub check_in: String,
    /// Check-out date.
    pub check_out: String,
    /// Always 1; quantity is expanded into separate sub-bookings.
    pub quantity: u32,
    pub guest_name: Option<String>,
    /// Agent to admin notes.
    pub additional_notes: Option<String>,
    /// Admin to agent notes.
    pub admin_notes: Option<String>,
    pub hotel_id: i64,
    pub hotel_name: String,
    pub room_type_name: String,
    pub price_label: String,
    pub promo_name: Option<String>,
    /// Nightly price at the time of booking.
    pub price: i64,
    pub currency: String,
    pub booking_status: String,
    pub payment_status: String,
    /// Reason given with a rejection.
    pub status_reason: Option<String>,
    pub receipt_url: Option<String>,
    pub approved_at: Option<String>,
    pub additionals: Vec<BookingDetailAdditionalInfo>,
    /// Recorded transitions, oldest first. Empty for cart views.
    pub status_history: Vec<StatusHistoryInfo>,
}

/// A booking with its sub-bookings and guests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingInfo {
    /// The booking ID.
    pub booking_id: i64,
    /// The booking code.
    pub booking_code: String,
    /// The owning agent.
    pub agent_id: i64,
    /// The aggregate booking status.
    pub booking_status: String,
    /// The aggregate payment status.
    pub payment_status: String,
    pub created_at: String,
    pub submitted_at: Option<String>,
    pub approved_at: Option<String>,
    /// The sub-bookings.
    pub details: Vec<BookingDetailInfo>,
    /// The guest list.
    pub guests: Vec<GuestInfo>,
}

// ============================================================================
// Reconciliation
// ============================================================================

/// API request for an admin decision on sub-bookings of one booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDetailStatusRequest {
    /// The sub-bookings being decided.
    pub booking_detail_ids: Vec<i64>,
    /// `confirmed` or `rejected`.
    pub status: String,
    /// Optional reason, typically given with a rejection.
    #[serde(default)]
    pub reason: Option<String>,
}

/// API response for a status change on one or more sub-bookings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangeResponse {
    /// The booking owning the changed sub-bookings.
    pub booking_id: i64,
    /// The aggregate booking status after rollup.
    pub booking_status: String,
    /// Whether the aggregate changed; `false` while siblings still await approval.
    pub aggregate_updated: bool,
    /// Codes of the changed sub-bookings.
    pub sub_booking_codes: Vec<String>,
}

/// API request to record payment on sub-bookings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePaymentStatusRequest {
    pub booking_detail_ids: Vec<i64>,
    /// `unpaid` or `paid`.
    pub payment_status: String,
}

/// API response for a payment status update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePaymentStatusResponse {
    pub booking_id: i64,
    /// The aggregate payment status after rollup.
    pub payment_status: String,
    pub updated_details: usize,
}

/// API request to correct an attached add-on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectAdditionalRequest {
    /// Corrected name, if changing.
    #[serde(default)]
    pub name: Option<String>,
    /// Corrected price, if changing.
    #[serde(default)]
    pub price: Option<i64>,
}

/// One line of an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLineInfo {
    pub description: String,
    pub quantity: u32,
    pub unit_price: i64,
    pub amount: i64,
}

/// An issued invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceInfo {
    pub invoice_code: String,
    pub booking_detail_id: i64,
    pub lines: Vec<InvoiceLineInfo>,
    pub total: i64,
    pub currency: String,
    pub created_at: String,
}

// ============================================================================
// Sub-bookings
// ============================================================================

/// API response for a successful cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelBookingResponse {
    /// The canceled sub-booking.
    pub sub_booking_code: String,
    /// The booking owning the sub-booking.
    pub booking_id: i64,
    /// The aggregate booking status after rollup.
    pub booking_status: String,
    /// Whether the aggregate changed.
    pub aggregate_updated: bool,
}

/// API request to upload a payment receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceiptRequest {
    /// Original file name, used for the stored object's extension.
    pub file_name: String,
    /// MIME type of the receipt.
    pub content_type: String,
    /// Base64-encoded file body.
    pub content_base64: String,
}

/// API response for a stored receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceiptResponse {
    pub sub_booking_code: String,
    pub receipt_url: String,
}
