// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write-once invoice creation.
//!
//! An invoice freezes the charge breakdown of one booking detail at
//! submission time. The `invoices_write_once` trigger rejects any later
//! update, so corrections to add-ons never alter an issued invoice.

use diesel::SqliteConnection;
use diesel::prelude::*;
use hotel_booking_domain::{CodeScope, InvoiceBreakdown, StayPeriod, build_invoice_breakdown};
use tracing::debug;

use crate::data_models::BookingDetailData;
use crate::diesel_schema::invoices;
use crate::error::PersistenceError;
use crate::mutations::codes::reserve_code;

/// Creates the invoice for one detail. Runs inside the caller's transaction.
///
/// # Returns
///
/// The reserved invoice code.
pub(crate) fn create_invoice_for_detail(
    conn: &mut SqliteConnection,
    detail: &BookingDetailData,
) -> Result<String, PersistenceError> {
    let stay = StayPeriod::parse(&detail.check_in, &detail.check_out)?;
    let additionals: Vec<_> = detail
        .additionals
        .iter()
        .map(|a| a.additional.clone())
        .collect();
    let breakdown: InvoiceBreakdown = build_invoice_breakdown(
        &detail.room,
        stay.nights(),
        detail.price,
        &detail.currency,
        &additionals,
    );
    let breakdown_json: String = serde_json::to_string(&breakdown)?;
    let invoice_code: String = reserve_code(conn, CodeScope::InvoiceCodes)?;

    diesel::insert_into(invoices::table)
        .values((
            invoices::invoice_code.eq(&invoice_code),
            invoices::booking_detail_id.eq(detail.booking_detail_id),
            invoices::breakdown.eq(&breakdown_json),
            invoices::total.eq(breakdown.total),
            invoices::currency.eq(&breakdown.currency),
        ))
        .execute(conn)?;

    debug!(
        booking_detail_id = detail.booking_detail_id,
        invoice_code = %invoice_code,
        total = breakdown.total,
        "Invoice created"
    );
    Ok(invoice_code)
}

/// Creates invoices for every given detail, in order.
pub(crate) fn create_invoices_for_details(
    conn: &mut SqliteConnection,
    details: &[BookingDetailData],
) -> Result<Vec<String>, PersistenceError> {
    details
        .iter()
        .map(|detail| create_invoice_for_detail(conn, detail))
        .collect()
}
