// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the hotel booking system.
//!
//! This crate stores operators, the hotel catalog, bookings and their
//! details on `SQLite` through Diesel. Every mutating call runs in a single
//! `BEGIN IMMEDIATE` transaction, so a failure at any step leaves no
//! partial state behind.
//!
//! ## Concurrency
//!
//! - One cart per agent is enforced by a partial unique index; a losing
//!   concurrent insert re-reads the winner's cart.
//! - Detail status writes are guarded by `booking_status = 'waiting_approval'`
//!   so a detail is decided at most once.
//! - Aggregate rollup runs in the same transaction as the transition that
//!   triggered it.
//!
//! ## Testing
//!
//! `Persistence::new_in_memory()` returns an isolated shared-cache database
//! per call, migrated and with foreign keys verified.

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

use diesel::SqliteConnection;
use hotel_booking_domain::{
    AdditionalOffer, BookingStatus, ChargeBasis, CodeScope, Guest, PaymentStatus,
};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{
    AddToCartResult, AdditionalSeed, AgentContact, BookingData, BookingDetailAdditionalData,
    BookingDetailData, BookingGuestData, BookingView, CatalogImportSummary, CatalogSeed,
    CheckoutResult, CreatedDetail, DetailNotificationContext, GuestAssignment, HotelSeed,
    InvoiceData, NewCartItem, OperatorData, PaymentChangeResult, PromoData, PromoSeed,
    RemoveFromCartResult, RoomPriceData, RoomPriceSeed, RoomTypeSeed, SessionData,
    StatusChangeResult, StatusHistoryData,
};
pub use error::PersistenceError;
pub use queries::bookings::DetailOwnership;

use backend::PersistenceBackend;

/// Type alias kept for callers that name the backend explicitly.
pub type SqlitePersistence = Persistence;

/// Persistence adapter over a single `SQLite` connection.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter,
    /// ensuring deterministic test isolation without time-based collisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("memdb_test_{db_id}");
        let shared_memory_url = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;

        // WAL lets readers proceed while a writer holds the lock.
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        self.conn.verify_foreign_key_enforcement()
    }

    // ========================================================================
    // Operators
    // ========================================================================

    /// Creates a new operator.
    ///
    /// # Arguments
    ///
    /// * `login_name` - The login name (will be normalized)
    /// * `display_name` - The display name
    /// * `email` - Address notifications are sent to
    /// * `password` - The plain-text password (will be hashed)
    /// * `role` - The role (`Admin` or `Agent`)
    ///
    /// # Errors
    ///
    /// Returns an error if the operator cannot be created.
    pub fn create_operator(
        &mut self,
        login_name: &str,
        display_name: &str,
        email: &str,
        password: &str,
        role: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::operators::create_operator(
            &mut self.conn,
            login_name,
            display_name,
            email,
            password,
            role,
        )
    }

    /// Retrieves an operator by login name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_operator_by_login(
        &mut self,
        login_name: &str,
    ) -> Result<Option<OperatorData>, PersistenceError> {
        queries::operators::get_operator_by_login(&mut self.conn, login_name)
    }

    /// Retrieves an operator by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_operator_by_id(
        &mut self,
        operator_id: i64,
    ) -> Result<Option<OperatorData>, PersistenceError> {
        queries::operators::get_operator_by_id(&mut self.conn, operator_id)
    }

    /// Retrieves the notification contact of an agent.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::OperatorNotFound` if the operator does not exist.
    pub fn get_agent_contact(&mut self, agent_id: i64) -> Result<AgentContact, PersistenceError> {
        queries::operators::get_agent_contact(&mut self.conn, agent_id)
    }

    /// Updates the last login timestamp for an operator.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn update_last_login(&mut self, operator_id: i64) -> Result<(), PersistenceError> {
        mutations::operators::update_last_login(&mut self.conn, operator_id)
    }

    /// Counts all operators.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_operators(&mut self) -> Result<i64, PersistenceError> {
        queries::operators::count_operators(&mut self.conn)
    }

    /// Verifies a password against a stored bcrypt hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the hash is malformed.
    pub fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, PersistenceError> {
        queries::operators::verify_password(password, password_hash)
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Creates a new session.
    ///
    /// # Arguments
    ///
    /// * `session_token` - The unique session token
    /// * `operator_id` - The operator ID
    /// * `expires_at` - The expiration timestamp (RFC 3339, UTC)
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be created.
    pub fn create_session(
        &mut self,
        session_token: &str,
        operator_id: i64,
        expires_at: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::operators::create_session(&mut self.conn, session_token, operator_id, expires_at)
    }

    /// Retrieves a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_session_by_token(
        &mut self,
        session_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::operators::get_session_by_token(&mut self.conn, session_token)
    }

    /// Updates the last activity timestamp for a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn update_session_activity(&mut self, session_id: i64) -> Result<(), PersistenceError> {
        mutations::operators::update_session_activity(&mut self.conn, session_id)
    }

    /// Deletes a session by token.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::SessionNotFound` if no such session exists.
    pub fn delete_session(&mut self, session_token: &str) -> Result<(), PersistenceError> {
        mutations::operators::delete_session(&mut self.conn, session_token)
    }

    /// Deletes all sessions that expired before now.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_expired_sessions(&mut self) -> Result<usize, PersistenceError> {
        let now: String = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(|e| PersistenceError::Other(format!("Failed to format timestamp: {e}")))?;
        mutations::operators::delete_expired_sessions(&mut self.conn, &now)
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Creates a hotel.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_hotel(&mut self, name: &str, email: &str) -> Result<i64, PersistenceError> {
        mutations::catalog::create_hotel(&mut self.conn, name, email)
    }

    /// Creates a room type of a hotel.
    ///
    /// # Errors
    ///
    /// Returns an error if the hotel does not exist or the insert fails.
    pub fn create_room_type(
        &mut self,
        hotel_id: i64,
        name: &str,
        max_occupancy: u32,
    ) -> Result<i64, PersistenceError> {
        mutations::catalog::create_room_type(&mut self.conn, hotel_id, name, max_occupancy)
    }

    /// Creates a price offer for a room type.
    ///
    /// # Errors
    ///
    /// Returns an error if the price is negative or the insert fails.
    pub fn create_room_price(
        &mut self,
        room_type_id: i64,
        label: &str,
        price: i64,
        currency: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::catalog::create_room_price(&mut self.conn, room_type_id, label, price, currency)
    }

    /// Creates a promo of a hotel.
    ///
    /// # Errors
    ///
    /// Returns an error if the hotel does not exist or the insert fails.
    pub fn create_promo(
        &mut self,
        hotel_id: i64,
        name: &str,
        description: Option<&str>,
        minimum_nights: u32,
    ) -> Result<i64, PersistenceError> {
        mutations::catalog::create_promo(
            &mut self.conn,
            hotel_id,
            name,
            description,
            minimum_nights,
        )
    }

    /// Creates an add-on for a room type.
    ///
    /// # Errors
    ///
    /// Returns an error if the price is negative or the insert fails.
    pub fn create_room_type_additional(
        &mut self,
        room_type_id: i64,
        name: &str,
        charge_basis: ChargeBasis,
        price: i64,
        required: bool,
    ) -> Result<i64, PersistenceError> {
        mutations::catalog::create_room_type_additional(
            &mut self.conn,
            room_type_id,
            name,
            charge_basis,
            price,
            required,
        )
    }

    /// Imports a catalog seed in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any row fails to insert; nothing is imported.
    pub fn import_catalog(
        &mut self,
        seed: &CatalogSeed,
    ) -> Result<CatalogImportSummary, PersistenceError> {
        mutations::catalog::import_catalog(&mut self.conn, seed)
    }

    /// Looks up a room price with its room type and hotel.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_room_price_by_id(
        &mut self,
        room_price_id: i64,
    ) -> Result<Option<RoomPriceData>, PersistenceError> {
        queries::catalog::get_room_price_by_id(&mut self.conn, room_price_id)
    }

    /// Looks up a promo.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_promo_by_id(&mut self, promo_id: i64) -> Result<Option<PromoData>, PersistenceError> {
        queries::catalog::get_promo_by_id(&mut self.conn, promo_id)
    }

    /// Looks up room type add-ons by ID. Unknown IDs are omitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_room_type_additionals_by_ids(
        &mut self,
        ids: &[i64],
    ) -> Result<Vec<AdditionalOffer>, PersistenceError> {
        queries::catalog::get_room_type_additionals_by_ids(&mut self.conn, ids)
    }

    // ========================================================================
    // Codes
    // ========================================================================

    /// Reserves a fresh code in `scope`.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::CodeGenerationExhausted` if every attempt
    /// collided.
    pub fn generate_code(&mut self, scope: CodeScope) -> Result<String, PersistenceError> {
        self.conn
            .immediate_transaction(|conn| mutations::codes::reserve_code(conn, scope))
    }

    // ========================================================================
    // Cart
    // ========================================================================

    /// Finds or creates the agent's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be read or created.
    pub fn get_or_create_cart_id(&mut self, agent_id: i64) -> Result<i64, PersistenceError> {
        mutations::cart::get_or_create_cart_id(&mut self.conn, agent_id)
    }

    /// Retrieves the agent's cart with details and guests.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the agent has no cart.
    pub fn get_cart(&mut self, agent_id: i64) -> Result<BookingView, PersistenceError> {
        queries::bookings::get_cart_view(&mut self.conn, agent_id)?
            .ok_or_else(|| PersistenceError::NotFound(format!("No cart for agent {agent_id}")))
    }

    /// Counts the agent's cart bookings.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_carts_for_agent(&mut self, agent_id: i64) -> Result<i64, PersistenceError> {
        queries::bookings::count_carts_for_agent(&mut self.conn, agent_id)
    }

    /// Adds units of a room price to the agent's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or a catalog row does not exist.
    /// Nothing is written in that case.
    pub fn add_to_cart(
        &mut self,
        agent_id: i64,
        item: &NewCartItem,
    ) -> Result<AddToCartResult, PersistenceError> {
        mutations::cart::add_to_cart(&mut self.conn, agent_id, item)
    }

    /// Removes a detail from the agent's cart.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the detail is not in the cart.
    pub fn remove_from_cart(
        &mut self,
        agent_id: i64,
        booking_detail_id: i64,
    ) -> Result<RemoveFromCartResult, PersistenceError> {
        mutations::cart::remove_from_cart(&mut self.conn, agent_id, booking_detail_id)
    }

    /// Replaces the guest list of the agent's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if a guest is invalid or the agent has no cart.
    pub fn add_guests_to_cart(
        &mut self,
        agent_id: i64,
        guests: &[Guest],
    ) -> Result<usize, PersistenceError> {
        mutations::cart::add_guests_to_cart(&mut self.conn, agent_id, guests)
    }

    /// Removes guests from the agent's cart.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if none of the guests matched.
    pub fn remove_guests_from_cart(
        &mut self,
        agent_id: i64,
        guest_ids: &[i64],
    ) -> Result<usize, PersistenceError> {
        mutations::cart::remove_guests_from_cart(&mut self.conn, agent_id, guest_ids)
    }

    /// Sets the agent-to-admin notes of a cart detail.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the detail is not in the cart.
    pub fn update_cart_additional_notes(
        &mut self,
        agent_id: i64,
        booking_detail_id: i64,
        notes: Option<&str>,
    ) -> Result<(), PersistenceError> {
        mutations::cart::update_cart_additional_notes(
            &mut self.conn,
            agent_id,
            booking_detail_id,
            notes,
        )
    }

    /// Submits the agent's cart for approval.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is missing or empty, a guest is invalid,
    /// or an assignment targets a detail outside the cart.
    pub fn check_out_cart(
        &mut self,
        agent_id: i64,
        guests: &[Guest],
        assignments: &[GuestAssignment],
    ) -> Result<CheckoutResult, PersistenceError> {
        mutations::checkout::check_out_cart(&mut self.conn, agent_id, guests, assignments)
    }

    // ========================================================================
    // Status Reconciliation
    // ========================================================================

    /// Applies an administrative decision to details of one booking.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NoBookingDetailUpdated` if any listed
    /// detail is not awaiting approval.
    pub fn update_booking_detail_status(
        &mut self,
        actor_operator_id: i64,
        booking_id: i64,
        detail_ids: &[i64],
        new_status: BookingStatus,
        reason: Option<&str>,
    ) -> Result<StatusChangeResult, PersistenceError> {
        mutations::reconciliation::update_booking_detail_status(
            &mut self.conn,
            actor_operator_id,
            booking_id,
            detail_ids,
            new_status,
            reason,
        )
    }

    /// Cancels one of the agent's sub-bookings.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the code is unknown or not
    /// owned, and `PersistenceError::NoBookingDetailUpdated` if it is not
    /// awaiting approval.
    pub fn cancel_booking(
        &mut self,
        agent_id: i64,
        sub_booking_code: &str,
    ) -> Result<StatusChangeResult, PersistenceError> {
        mutations::cancellation::cancel_booking(&mut self.conn, agent_id, sub_booking_code)
    }

    /// Sets the payment status of details of one booking.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NoBookingDetailUpdated` if no listed
    /// detail changed.
    pub fn update_payment_status(
        &mut self,
        booking_id: i64,
        detail_ids: &[i64],
        new_status: PaymentStatus,
    ) -> Result<PaymentChangeResult, PersistenceError> {
        mutations::reconciliation::update_payment_status(
            &mut self.conn,
            booking_id,
            detail_ids,
            new_status,
        )
    }

    /// Recomputes a booking's aggregate status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query or update fails.
    pub fn recompute_aggregate(
        &mut self,
        booking_id: i64,
    ) -> Result<Option<BookingStatus>, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::reconciliation::recompute_aggregate(conn, booking_id)
        })
    }

    // ========================================================================
    // Administration
    // ========================================================================

    /// Sets the administrator notes of a booking detail.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the detail does not exist.
    pub fn update_booking_detail_admin_notes(
        &mut self,
        booking_detail_id: i64,
        notes: Option<&str>,
    ) -> Result<(), PersistenceError> {
        mutations::admin::update_booking_detail_admin_notes(&mut self.conn, booking_detail_id, notes)
    }

    /// Corrects an add-on attached to a booking detail.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the add-on does not exist.
    pub fn correct_booking_detail_additional(
        &mut self,
        booking_detail_additional_id: i64,
        name: Option<&str>,
        price: Option<i64>,
    ) -> Result<BookingDetailAdditionalData, PersistenceError> {
        mutations::admin::correct_booking_detail_additional(
            &mut self.conn,
            booking_detail_additional_id,
            name,
            price,
        )
    }

    /// Records a stored receipt on one of the agent's sub-bookings.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the code is unknown or not owned.
    pub fn set_receipt_url(
        &mut self,
        agent_id: i64,
        sub_booking_code: &str,
        receipt_url: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::admin::set_receipt_url(&mut self.conn, agent_id, sub_booking_code, receipt_url)
    }

    // ========================================================================
    // Booking Queries
    // ========================================================================

    /// Retrieves a booking with its details and guests.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_booking(&mut self, booking_id: i64) -> Result<Option<BookingView>, PersistenceError> {
        queries::bookings::get_booking_view(&mut self.conn, booking_id)
    }

    /// Looks up a detail's owner and statuses by sub-booking code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn find_detail_by_code(
        &mut self,
        sub_booking_code: &str,
    ) -> Result<Option<DetailOwnership>, PersistenceError> {
        queries::bookings::find_detail_by_code(&mut self.conn, sub_booking_code)
    }

    /// Looks up a detail's owner and statuses by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn find_detail_by_id(
        &mut self,
        booking_detail_id: i64,
    ) -> Result<Option<DetailOwnership>, PersistenceError> {
        queries::bookings::find_detail_by_id(&mut self.conn, booking_detail_id)
    }

    /// Retrieves the invoice of a booking detail.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_invoice_for_detail(
        &mut self,
        booking_detail_id: i64,
    ) -> Result<Option<InvoiceData>, PersistenceError> {
        queries::bookings::get_invoice_for_detail(&mut self.conn, booking_detail_id)
    }

    /// Retrieves the status history of a booking detail.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_status_history(
        &mut self,
        booking_detail_id: i64,
    ) -> Result<Vec<StatusHistoryData>, PersistenceError> {
        queries::bookings::get_status_history(&mut self.conn, booking_detail_id)
    }
}
