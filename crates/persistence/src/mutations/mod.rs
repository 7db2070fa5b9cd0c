// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! Public functions open their own `BEGIN IMMEDIATE` transaction.
//! `pub(crate)` helpers run inside the caller's transaction and never open
//! one of their own.
//!
//! ## Module Organization
//!
//! - `codes` — Unique code reservation
//! - `operators` — Operator and session mutations
//! - `catalog` — Hotel catalog creation and seed import
//! - `cart` — Cart creation, items, guests and notes
//! - `checkout` — Cart submission
//! - `reconciliation` — Guarded status transitions and aggregate rollup
//! - `cancellation` — Agent cancellation of a sub-booking
//! - `invoices` — Write-once invoice creation
//! - `admin` — Notes, add-on corrections and receipts

pub mod admin;
pub mod cancellation;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod codes;
pub mod invoices;
pub mod operators;
pub mod reconciliation;
