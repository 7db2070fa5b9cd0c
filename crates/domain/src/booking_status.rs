// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking and payment status vocabulary and the rollup reducers.
//!
//! A booking detail moves through a small state machine once its parent
//! booking has been submitted. The parent booking never transitions on its
//! own: its status is derived from the statuses of its details by
//! [`aggregate_booking_status`], and its payment status by
//! [`aggregate_payment_status`].

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle status shared by bookings and booking details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Draft basket, not yet submitted. Only valid on a booking.
    Cart,
    /// Submitted and awaiting an administrative decision.
    WaitingApproval,
    /// Approved by an administrator.
    Confirmed,
    /// Declined by an administrator.
    Rejected,
    /// Withdrawn by the owning agent.
    Canceled,
}

impl BookingStatus {
    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::WaitingApproval => "waiting_approval",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
            Self::Canceled => "canceled",
        }
    }

    /// Parses a status from its string representation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBookingStatus` if the string is not a valid status.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "cart" => Ok(Self::Cart),
            "waiting_approval" => Ok(Self::WaitingApproval),
            "confirmed" => Ok(Self::Confirmed),
            "rejected" => Ok(Self::Rejected),
            "canceled" => Ok(Self::Canceled),
            _ => Err(DomainError::InvalidBookingStatus {
                status: s.to_string(),
            }),
        }
    }

    /// Returns true if this status is terminal for a booking detail.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Rejected | Self::Canceled)
    }

    /// Returns true if an administrator may choose this status as a decision.
    #[must_use]
    pub const fn is_admin_decision(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Rejected)
    }

    /// Rank used by the rollup when no detail is still waiting.
    ///
    /// Lower sorts first: Rejected, then Confirmed, then Canceled.
    #[must_use]
    pub const fn rollup_priority(&self) -> u8 {
        match self {
            Self::Rejected => 0,
            Self::Confirmed => 1,
            Self::Canceled => 2,
            Self::Cart | Self::WaitingApproval => 3,
        }
    }

    /// Validates a booking detail transition from this status.
    ///
    /// Only `WaitingApproval` may move, and only to a terminal status.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is not allowed.
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "cannot transition from terminal state".to_string(),
            });
        }

        let valid = match self {
            Self::WaitingApproval => new_status.is_terminal(),
            Self::Cart | Self::Confirmed | Self::Rejected | Self::Canceled => false,
        };

        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "transition not permitted by booking lifecycle rules".to_string(),
            })
        }
    }

    /// Validates that this status is an acceptable administrative decision.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDecisionStatus` for anything other than
    /// `Confirmed` or `Rejected`.
    pub fn validate_admin_decision(&self) -> Result<(), DomainError> {
        if self.is_admin_decision() {
            Ok(())
        } else {
            Err(DomainError::InvalidDecisionStatus {
                status: self.as_str().to_string(),
            })
        }
    }
}

impl FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status shared by bookings and booking details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

impl PaymentStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
        }
    }

    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "unpaid" => Ok(Self::Unpaid),
            "paid" => Ok(Self::Paid),
            _ => Err(DomainError::InvalidPaymentStatus {
                status: s.to_string(),
            }),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derives a booking's aggregate status from the statuses of its details.
///
/// Returns `None` when the aggregate must be left untouched: either at least
/// one detail is still waiting for a decision, or there are no details.
/// Otherwise returns the detail status with the lowest
/// [`BookingStatus::rollup_priority`].
#[must_use]
pub fn aggregate_booking_status(detail_statuses: &[BookingStatus]) -> Option<BookingStatus> {
    if detail_statuses.contains(&BookingStatus::WaitingApproval) {
        return None;
    }

    detail_statuses
        .iter()
        .copied()
        .min_by_key(BookingStatus::rollup_priority)
}

/// Derives a booking's aggregate payment status from its details.
///
/// The booking is `Paid` only when every detail is paid. A booking without
/// details is `Unpaid`.
#[must_use]
pub fn aggregate_payment_status(detail_statuses: &[PaymentStatus]) -> PaymentStatus {
    if detail_statuses.is_empty() || detail_statuses.contains(&PaymentStatus::Unpaid) {
        PaymentStatus::Unpaid
    } else {
        PaymentStatus::Paid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_string_round_trip() {
        let statuses = [
            BookingStatus::Cart,
            BookingStatus::WaitingApproval,
            BookingStatus::Confirmed,
            BookingStatus::Rejected,
            BookingStatus::Canceled,
        ];

        for status in statuses {
            let s = status.as_str();
            match BookingStatus::parse_str(s) {
                Ok(parsed) => assert_eq!(status, parsed),
                Err(e) => panic!("Failed to parse status string: {s}: {e}"),
            }
        }
    }

    #[test]
    fn test_invalid_status_string() {
        assert!(matches!(
            "approved".parse::<BookingStatus>(),
            Err(DomainError::InvalidBookingStatus { .. })
        ));
        assert!(matches!(
            "refunded".parse::<PaymentStatus>(),
            Err(DomainError::InvalidPaymentStatus { .. })
        ));
    }

    #[test]
    fn test_waiting_approval_transitions() {
        let from = BookingStatus::WaitingApproval;
        assert!(from.validate_transition(BookingStatus::Confirmed).is_ok());
        assert!(from.validate_transition(BookingStatus::Rejected).is_ok());
        assert!(from.validate_transition(BookingStatus::Canceled).is_ok());
        assert!(from.validate_transition(BookingStatus::Cart).is_err());
        assert!(
            from.validate_transition(BookingStatus::WaitingApproval)
                .is_err()
        );
    }

    #[test]
    fn test_terminal_states_cannot_transition() {
        for from in [
            BookingStatus::Confirmed,
            BookingStatus::Rejected,
            BookingStatus::Canceled,
        ] {
            assert!(from.is_terminal());
            let result = from.validate_transition(BookingStatus::Rejected);
            assert!(matches!(
                result,
                Err(DomainError::InvalidStatusTransition { .. })
            ));
        }
    }

    #[test]
    fn test_cart_is_not_part_of_detail_machine() {
        assert!(!BookingStatus::Cart.is_terminal());
        assert!(
            BookingStatus::Cart
                .validate_transition(BookingStatus::Confirmed)
                .is_err()
        );
    }

    #[test]
    fn test_admin_decision_accepts_only_confirm_or_reject() {
        assert!(BookingStatus::Confirmed.validate_admin_decision().is_ok());
        assert!(BookingStatus::Rejected.validate_admin_decision().is_ok());
        assert!(matches!(
            BookingStatus::Canceled.validate_admin_decision(),
            Err(DomainError::InvalidDecisionStatus { .. })
        ));
        assert!(BookingStatus::WaitingApproval.validate_admin_decision().is_err());
    }

    #[test]
    fn test_rollup_rejected_wins() {
        let statuses = [
            BookingStatus::Confirmed,
            BookingStatus::Canceled,
            BookingStatus::Rejected,
        ];
        assert_eq!(
            aggregate_booking_status(&statuses),
            Some(BookingStatus::Rejected)
        );
    }

    #[test]
    fn test_rollup_confirmed_beats_canceled() {
        let statuses = [BookingStatus::Canceled, BookingStatus::Confirmed];
        assert_eq!(
            aggregate_booking_status(&statuses),
            Some(BookingStatus::Confirmed)
        );
    }

    #[test]
    fn test_rollup_all_canceled() {
        let statuses = [BookingStatus::Canceled, BookingStatus::Canceled];
        assert_eq!(
            aggregate_booking_status(&statuses),
            Some(BookingStatus::Canceled)
        );
    }

    #[test]
    fn test_rollup_deferred_while_waiting() {
        let statuses = [BookingStatus::WaitingApproval, BookingStatus::Confirmed];
        assert_eq!(aggregate_booking_status(&statuses), None);
    }

    #[test]
    fn test_rollup_is_order_independent() {
        let forward = [
            BookingStatus::Rejected,
            BookingStatus::Confirmed,
            BookingStatus::Canceled,
        ];
        let mut reversed = forward;
        reversed.reverse();
        assert_eq!(
            aggregate_booking_status(&forward),
            aggregate_booking_status(&reversed)
        );
    }

    #[test]
    fn test_rollup_empty_leaves_aggregate_untouched() {
        assert_eq!(aggregate_booking_status(&[]), None);
    }

    #[test]
    fn test_payment_rollup() {
        assert_eq!(
            aggregate_payment_status(&[PaymentStatus::Paid, PaymentStatus::Paid]),
            PaymentStatus::Paid
        );
        assert_eq!(
            aggregate_payment_status(&[PaymentStatus::Paid, PaymentStatus::Unpaid]),
            PaymentStatus::Unpaid
        );
        assert_eq!(aggregate_payment_status(&[]), PaymentStatus::Unpaid);
    }
}
