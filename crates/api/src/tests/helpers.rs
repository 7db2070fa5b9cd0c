// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use hotel_booking_domain::ChargeBasis;
use hotel_booking_persistence::SqlitePersistence;

use crate::{
    AddToCartRequest, AddToCartResponse, AdditionalSelectionRequest, AuthenticatedActor,
    CheckoutRequest, CheckoutResponse, GuestAssignmentRequest, GuestRequest, Role, add_to_cart,
    check_out_cart,
};

pub const AGENT_EMAIL: &str = "agent1@agency.test";
pub const HOTEL_EMAIL: &str = "frontdesk@harbourview.test";
pub const ADMIN_EMAIL: &str = "reservations@agency.test";

/// One hotel with a nightly price of 12000, a three-night promo and two
/// add-ons, plus an admin and two agents.
pub struct ApiFixture {
    pub persistence: SqlitePersistence,
    pub admin: AuthenticatedActor,
    pub agent: AuthenticatedActor,
    pub other_agent: AuthenticatedActor,
    pub room_price_id: i64,
    pub long_stay_promo_id: i64,
    pub transfer_id: i64,
    pub dinner_id: i64,
}

pub fn create_fixture() -> ApiFixture {
    let mut persistence = SqlitePersistence::new_in_memory().expect("in-memory database");

    let admin_id = persistence
        .create_operator("admin", "Admin", "admin@agency.test", "password", "Admin")
        .unwrap();
    let agent_id = persistence
        .create_operator("agent1", "Agent One", AGENT_EMAIL, "password", "Agent")
        .unwrap();
    let other_agent_id = persistence
        .create_operator("agent2", "Agent Two", "agent2@agency.test", "password", "Agent")
        .unwrap();

    let hotel_id = persistence.create_hotel("Harbour View", HOTEL_EMAIL).unwrap();
    let room_type_id = persistence
        .create_room_type(hotel_id, "Deluxe Twin", 2)
        .unwrap();
    let room_price_id = persistence
        .create_room_price(room_type_id, "Breakfast included", 12000, "USD")
        .unwrap();
    let long_stay_promo_id = persistence
        .create_promo(hotel_id, "Stay longer", None, 3)
        .unwrap();
    let transfer_id = persistence
        .create_room_type_additional(
            room_type_id,
            "Airport transfer",
            ChargeBasis::PerBooking,
            2500,
            false,
        )
        .unwrap();
    let dinner_id = persistence
        .create_room_type_additional(room_type_id, "Dinner buffet", ChargeBasis::PerPax, 1500, false)
        .unwrap();

    ApiFixture {
        persistence,
        admin: AuthenticatedActor::new(admin_id, Role::Admin),
        agent: AuthenticatedActor::new(agent_id, Role::Agent),
        other_agent: AuthenticatedActor::new(other_agent_id, Role::Agent),
        room_price_id,
        long_stay_promo_id,
        transfer_id,
        dinner_id,
    }
}

/// Two nights from 2026-03-01.
pub fn create_add_request(room_price_id: i64, quantity: i64) -> AddToCartRequest {
    AddToCartRequest {
        room_price_id,
        check_in: String::from("2026-03-01"),
        check_out: String::from("2026-03-03"),
        quantity,
        promo_id: None,
        additionals: Vec::new(),
    }
}

pub fn create_transfer_selection(transfer_id: i64) -> AdditionalSelectionRequest {
    AdditionalSelectionRequest {
        room_type_additional_id: transfer_id,
        pax: None,
    }
}

pub fn create_guest(name: &str) -> GuestRequest {
    GuestRequest {
        name: name.to_string(),
        honorific: String::from("Ms"),
        category: String::from("adult"),
        age: None,
    }
}

/// Adds `quantity` rooms to the agent's cart.
pub fn fill_cart(fixture: &mut ApiFixture, quantity: i64) -> AddToCartResponse {
    let request = create_add_request(fixture.room_price_id, quantity);
    add_to_cart(&mut fixture.persistence, &fixture.agent, &request).unwrap()
}

/// Fills and checks out the agent's cart, assigning "Jane Doe" to the
/// first sub-booking.
pub fn submit_booking(fixture: &mut ApiFixture, quantity: i64) -> CheckoutResponse {
    let cart = fill_cart(fixture, quantity);
    let request = CheckoutRequest {
        guests: vec![create_guest("Jane Doe")],
        assignments: vec![GuestAssignmentRequest {
            booking_detail_id: cart.created_details[0].booking_detail_id,
            guest_name: String::from("Jane Doe"),
        }],
    };
    check_out_cart(&mut fixture.persistence, &fixture.agent, &request, None)
        .unwrap()
        .response
}
