// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod admin_tests;
mod checkout_tests;
mod initialization_tests;
mod reconciliation_tests;

use crate::{GuestAssignment, NewCartItem, SqlitePersistence};
use hotel_booking_domain::{
    AdditionalSelection, ChargeBasis, Guest, GuestCategory, Honorific, StayPeriod,
};

/// A migrated database with one hotel, two agents and an admin.
pub struct Fixture {
    pub persistence: SqlitePersistence,
    pub admin_id: i64,
    pub agent_id: i64,
    pub other_agent_id: i64,
    pub room_type_id: i64,
    pub room_price_id: i64,
    pub long_stay_promo_id: i64,
    pub transfer_id: i64,
    pub dinner_id: i64,
}

pub fn create_fixture() -> Fixture {
    let mut persistence = SqlitePersistence::new_in_memory().expect("in-memory database");

    let admin_id = persistence
        .create_operator("admin", "Admin", "admin@agency.test", "password", "Admin")
        .unwrap();
    let agent_id = persistence
        .create_operator("agent1", "Agent One", "agent1@agency.test", "password", "Agent")
        .unwrap();
    let other_agent_id = persistence
        .create_operator("agent2", "Agent Two", "agent2@agency.test", "password", "Agent")
        .unwrap();

    let hotel_id = persistence
        .create_hotel("Harbour View", "frontdesk@harbourview.test")
        .unwrap();
    let room_type_id = persistence
        .create_room_type(hotel_id, "Deluxe Twin", 2)
        .unwrap();
    let room_price_id = persistence
        .create_room_price(room_type_id, "Breakfast included", 12000, "USD")
        .unwrap();
    let long_stay_promo_id = persistence
        .create_promo(hotel_id, "Stay longer", Some("Three nights or more"), 3)
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

    Fixture {
        persistence,
        admin_id,
        agent_id,
        other_agent_id,
        room_type_id,
        room_price_id,
        long_stay_promo_id,
        transfer_id,
        dinner_id,
    }
}

pub fn create_cart_item(room_price_id: i64, quantity: u32) -> NewCartItem {
    NewCartItem {
        room_price_id,
        stay: StayPeriod::parse("2026-03-01", "2026-03-03").unwrap(),
        quantity,
        promo_id: None,
        additionals: Vec::new(),
    }
}

pub fn create_selection(room_type_additional_id: i64, pax: Option<u32>) -> AdditionalSelection {
    AdditionalSelection {
        room_type_additional_id,
        pax,
    }
}

pub fn create_guest(name: &str) -> Guest {
    Guest::new(name.to_string(), Honorific::Ms, GuestCategory::Adult, None)
}

pub fn create_assignment(booking_detail_id: i64, guest_name: &str) -> GuestAssignment {
    GuestAssignment {
        booking_detail_id,
        guest_name: guest_name.to_string(),
    }
}

/// Adds `quantity` units to the fixture agent's cart and checks out.
///
/// Returns the booking ID and the created detail IDs.
pub fn create_submitted_booking(fixture: &mut Fixture, quantity: u32) -> (i64, Vec<i64>) {
    let added = fixture
        .persistence
        .add_to_cart(
            fixture.agent_id,
            &create_cart_item(fixture.room_price_id, quantity),
        )
        .unwrap();
    let detail_ids: Vec<i64> = added
        .created_details
        .iter()
        .map(|d| d.booking_detail_id)
        .collect();

    fixture
        .persistence
        .check_out_cart(fixture.agent_id, &[create_guest("Jane Doe")], &[])
        .unwrap();

    (added.booking_id, detail_ids)
}
