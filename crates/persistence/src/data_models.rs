// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use hotel_booking_domain::{
    AdditionalSelection, AdditionalSnapshot, BookingStatus, ChargeBasis, Guest, InvoiceBreakdown,
    PaymentStatus, PromoSnapshot, RoomSnapshot, StayPeriod,
};
use serde::{Deserialize, Serialize};

/// Operator data for authentication and authorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorData {
    pub operator_id: i64,
    pub login_name: String,
    pub display_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

/// Session data for authenticated operators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub operator_id: i64,
    pub created_at: String,
    pub last_activity_at: String,
    pub expires_at: String,
}

// ============================================================================
// Catalog
// ============================================================================

/// A room price joined with its room type and hotel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomPriceData {
    pub room_price_id: i64,
    pub room_type_id: i64,
    pub hotel_id: i64,
    pub label: String,
    pub price: i64,
    pub currency: String,
    pub room_type_name: String,
    pub max_occupancy: u32,
    pub hotel_name: String,
    pub hotel_email: String,
}

impl RoomPriceData {
    #[must_use]
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            hotel_id: self.hotel_id,
            hotel_name: self.hotel_name.clone(),
            hotel_email: self.hotel_email.clone(),
            room_type_id: self.room_type_id,
            room_type_name: self.room_type_name.clone(),
            room_price_id: self.room_price_id,
            price_label: self.label.clone(),
            max_occupancy: self.max_occupancy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoData {
    pub promo_id: i64,
    pub hotel_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub minimum_nights: u32,
}

impl PromoData {
    #[must_use]
    pub fn snapshot(&self) -> PromoSnapshot {
        PromoSnapshot {
            promo_id: self.promo_id,
            name: self.name.clone(),
            description: self.description.clone(),
            minimum_nights: self.minimum_nights,
        }
    }
}

/// Catalog seed file layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub hotels: Vec<HotelSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelSeed {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub room_types: Vec<RoomTypeSeed>,
    #[serde(default)]
    pub promos: Vec<PromoSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomTypeSeed {
    pub name: String,
    pub max_occupancy: u32,
    #[serde(default)]
    pub prices: Vec<RoomPriceSeed>,
    #[serde(default)]
    pub additionals: Vec<AdditionalSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomPriceSeed {
    pub label: String,
    pub price: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoSeed {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub minimum_nights: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdditionalSeed {
    pub name: String,
    pub charge_basis: ChargeBasis,
    pub price: i64,
    #[serde(default)]
    pub required: bool,
}

/// Counts of rows inserted by a catalog import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogImportSummary {
    pub hotels: usize,
    pub room_types: usize,
    pub room_prices: usize,
    pub promos: usize,
    pub additionals: usize,
}

// ============================================================================
// Bookings
// ============================================================================

/// Input for adding units of one room price to an agent's cart.
#[derive(Debug, Clone)]
pub struct NewCartItem {
    pub room_price_id: i64,
    pub stay: StayPeriod,
    pub quantity: u32,
    pub promo_id: Option<i64>,
    pub additionals: Vec<AdditionalSelection>,
}

/// Codes and ids of the details created by one add-to-cart call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddToCartResult {
    pub booking_id: i64,
    pub booking_code: String,
    pub created_details: Vec<CreatedDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedDetail {
    pub booking_detail_id: i64,
    pub sub_booking_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemoveFromCartResult {
    pub booking_id: i64,
    pub cart_deleted: bool,
}

/// A guest name to set on one cart detail during checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestAssignment {
    pub booking_detail_id: i64,
    pub guest_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingData {
    pub booking_id: i64,
    pub booking_code: String,
    pub agent_id: i64,
    pub booking_status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub created_at: String,
    pub submitted_at: Option<String>,
    pub approved_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingDetailAdditionalData {
    pub booking_detail_additional_id: i64,
    pub booking_detail_id: i64,
    pub additional: AdditionalSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingDetailData {
    pub booking_detail_id: i64,
    pub booking_id: i64,
    pub sub_booking_code: String,
    pub room_price_id: i64,
    pub promo_id: Option<i64>,
    pub check_in: String,
    pub check_out: String,
    pub quantity: u32,
    pub guest_name: Option<String>,
    pub additional_notes: Option<String>,
    pub admin_notes: Option<String>,
    pub room: RoomSnapshot,
    pub promo: Option<PromoSnapshot>,
    pub price: i64,
    pub currency: String,
    pub booking_status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub status_reason: Option<String>,
    pub receipt_url: Option<String>,
    pub created_at: String,
    pub approved_at: Option<String>,
    pub additionals: Vec<BookingDetailAdditionalData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingGuestData {
    pub booking_guest_id: i64,
    pub booking_id: i64,
    pub guest: Guest,
}

/// A booking with all of its details and guests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingView {
    pub booking: BookingData,
    pub details: Vec<BookingDetailData>,
    pub guests: Vec<BookingGuestData>,
}

/// The owning agent of a booking, for notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentContact {
    pub agent_id: i64,
    pub display_name: String,
    pub email: String,
}

/// A booking detail re-read after a status change, with what a
/// notification needs to describe it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailNotificationContext {
    pub booking_code: String,
    pub agent: AgentContact,
    pub detail: BookingDetailData,
}

/// Outcome of a guarded detail status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChangeResult {
    pub booking_id: i64,
    /// Aggregate status after the change.
    pub booking_status: BookingStatus,
    /// Whether the rollup wrote a new aggregate status.
    pub aggregate_updated: bool,
    pub details: Vec<DetailNotificationContext>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaymentChangeResult {
    pub booking_id: i64,
    pub payment_status: PaymentStatus,
    pub updated_details: usize,
}

/// Outcome of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutResult {
    pub booking: BookingView,
    pub agent: AgentContact,
    pub invoice_codes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceData {
    pub invoice_id: i64,
    pub invoice_code: String,
    pub booking_detail_id: i64,
    pub agent_id: i64,
    pub breakdown: InvoiceBreakdown,
    pub total: i64,
    pub currency: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusHistoryData {
    pub history_id: i64,
    pub booking_detail_id: i64,
    pub previous_status: BookingStatus,
    pub new_status: BookingStatus,
    pub actor_operator_id: i64,
    pub reason: Option<String>,
    pub changed_at: String,
}
