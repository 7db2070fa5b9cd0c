// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Notification intents produced by committed booking mutations.
//!
//! Handlers return these alongside their response. Delivery happens in the
//! server after the persistence lock is released, so a failed send never
//! affects the committed change.

use hotel_booking_domain::BookingStatus;
use hotel_booking_persistence::{AgentContact, BookingView, DetailNotificationContext};

/// One message to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Destination address.
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
    /// Plain-text fallback of `html_body`.
    pub text_body: String,
}

/// A handler response together with the notifications it triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerOutcome<T> {
    pub response: T,
    pub notifications: Vec<Notification>,
}

impl<T> HandlerOutcome<T> {
    #[must_use]
    pub const fn new(response: T, notifications: Vec<Notification>) -> Self {
        Self {
            response,
            notifications,
        }
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn from_lines(recipient: &str, subject: String, lines: &[String]) -> Notification {
    let html_body: String = lines
        .iter()
        .map(|line| format!("<p>{}</p>", escape_html(line)))
        .collect();
    Notification {
        recipient: recipient.to_string(),
        subject,
        html_body,
        text_body: lines.join("\n"),
    }
}

fn detail_lines(booking: &BookingView) -> Vec<String> {
    booking
        .details
        .iter()
        .map(|d| {
            format!(
                "{}: {} {} ({}), {} to {}",
                d.sub_booking_code,
                d.room.hotel_name,
                d.room.room_type_name,
                d.room.price_label,
                d.check_in,
                d.check_out
            )
        })
        .collect()
}

/// Tells the agent their booking was submitted for approval.
#[must_use]
pub fn booking_submitted(agent: &AgentContact, booking: &BookingView) -> Notification {
    let code: &str = &booking.booking.booking_code;
    let mut lines: Vec<String> = vec![
        format!("Hello {},", agent.display_name),
        format!("Booking {code} has been submitted and is awaiting approval."),
    ];
    lines.extend(detail_lines(booking));
    from_lines(
        &agent.email,
        format!("Booking {code} submitted"),
        &lines,
    )
}

/// Tells the reviewing admins a booking is waiting for them.
#[must_use]
pub fn booking_awaiting_review(
    admin_email: &str,
    agent: &AgentContact,
    booking: &BookingView,
) -> Notification {
    let code: &str = &booking.booking.booking_code;
    let mut lines: Vec<String> = vec![format!(
        "{} submitted booking {code} with {} sub-booking(s).",
        agent.display_name,
        booking.details.len()
    )];
    lines.extend(detail_lines(booking));
    from_lines(admin_email, format!("Booking {code} awaiting review"), &lines)
}

/// Tells the agent an admin decided one of their sub-bookings.
#[must_use]
pub fn detail_decided(context: &DetailNotificationContext) -> Notification {
    let code: &str = &context.detail.sub_booking_code;
    let decision: &str = match context.detail.booking_status {
        BookingStatus::Confirmed => "confirmed",
        BookingStatus::Rejected => "rejected",
        other => other.as_str(),
    };
    let mut lines: Vec<String> = vec![
        format!("Hello {},", context.agent.display_name),
        format!(
            "Sub-booking {code} of booking {} at {} has been {decision}.",
            context.booking_code, context.detail.room.hotel_name
        ),
    ];
    if let Some(reason) = &context.detail.status_reason {
        lines.push(format!("Reason: {reason}"));
    }
    from_lines(
        &context.agent.email,
        format!("Sub-booking {code} {decision}"),
        &lines,
    )
}

/// Tells the hotel an agent withdrew a sub-booking.
#[must_use]
pub fn detail_canceled(context: &DetailNotificationContext) -> Notification {
    let detail = &context.detail;
    let lines: Vec<String> = vec![
        format!("Dear {},", detail.room.hotel_name),
        format!(
            "Sub-booking {} ({}, {} to {}) has been canceled by {}.",
            detail.sub_booking_code,
            detail.room.room_type_name,
            detail.check_in,
            detail.check_out,
            context.agent.display_name
        ),
    ];
    from_lines(
        &detail.room.hotel_email,
        format!("Sub-booking {} canceled", detail.sub_booking_code),
        &lines,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_body_is_escaped() {
        let notification = from_lines(
            "agent@agency.test",
            String::from("Subject"),
            &[String::from("Tom & <Jerry>")],
        );
        assert_eq!(notification.html_body, "<p>Tom &amp; &lt;Jerry&gt;</p>");
        assert_eq!(notification.text_body, "Tom & <Jerry>");
    }
}
