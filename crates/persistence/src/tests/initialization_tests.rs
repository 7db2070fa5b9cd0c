// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend initialization tests.

use crate::SqlitePersistence;
use crate::diesel_schema::booking_details;
use diesel::prelude::*;

use super::{create_fixture, create_submitted_booking};

#[test]
fn test_persistence_initialization() {
    let result: Result<SqlitePersistence, crate::error::PersistenceError> =
        SqlitePersistence::new_in_memory();
    assert!(result.is_ok());
}

#[test]
fn test_multiple_in_memory_instances_are_isolated() {
    let mut db1 = SqlitePersistence::new_in_memory().unwrap();
    let mut db2 = SqlitePersistence::new_in_memory().unwrap();

    db1.create_operator("op1", "Operator One", "op1@agency.test", "password", "Admin")
        .unwrap();

    assert_eq!(db1.count_operators().unwrap(), 1, "db1 should have 1 operator");
    assert_eq!(db2.count_operators().unwrap(), 0, "db2 should be isolated");
}

#[test]
fn test_foreign_keys_enforced() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    assert!(persistence.verify_foreign_key_enforcement().is_ok());

    // Room type for a hotel that does not exist.
    let result = persistence.create_room_type(999, "Orphan", 2);
    assert!(result.is_err());
}

#[test]
fn test_detail_snapshot_columns_are_immutable() {
    let mut fixture = create_fixture();
    let (_, detail_ids) = create_submitted_booking(&mut fixture, 1);

    let result = diesel::update(booking_details::table)
        .filter(booking_details::booking_detail_id.eq(detail_ids[0]))
        .set(booking_details::price.eq(1_i64))
        .execute(&mut fixture.persistence.conn);
    assert!(result.is_err());

    // Non-snapshot columns stay writable.
    let result = diesel::update(booking_details::table)
        .filter(booking_details::booking_detail_id.eq(detail_ids[0]))
        .set(booking_details::admin_notes.eq("checked"))
        .execute(&mut fixture.persistence.conn);
    assert_eq!(result.unwrap(), 1);
}

#[derive(QueryableByName)]
struct ColumnName {
    #[diesel(sql_type = diesel::sql_types::Text)]
    name: String,
}

#[test]
fn test_operator_columns() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    let columns: Vec<String> = diesel::sql_query("PRAGMA table_info(operators)")
        .load::<ColumnName>(&mut persistence.conn)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();

    assert_eq!(
        columns,
        [
            "operator_id",
            "login_name",
            "display_name",
            "email",
            "password_hash",
            "role",
            "created_at",
            "last_login_at",
        ]
    );
}
