// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Outbound notification delivery.
//!
//! Notifications are dispatched after the mutation that produced them has
//! committed. Delivery runs on a detached task bounded by a timeout, and a
//! failure is only logged.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use hotel_booking_api::Notification;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Errors raised while delivering a notification.
#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    /// The recipient address is empty.
    #[error("notification has no recipient")]
    MissingRecipient,
}

/// A transport able to send one notification.
pub trait Mailer: Send + Sync {
    /// Sends a notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be delivered.
    fn send<'a>(
        &'a self,
        notification: &'a Notification,
    ) -> Pin<Box<dyn Future<Output = Result<(), MailerError>> + Send + 'a>>;
}

/// Mailer that writes every notification to the log.
///
/// Used when no outbound transport is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl LogMailer {
    #[must_use]
    pub fn shared() -> Arc<dyn Mailer> {
        Arc::new(Self)
    }
}

impl Mailer for LogMailer {
    fn send<'a>(
        &'a self,
        notification: &'a Notification,
    ) -> Pin<Box<dyn Future<Output = Result<(), MailerError>> + Send + 'a>> {
        Box::pin(async move {
            if notification.recipient.trim().is_empty() {
                return Err(MailerError::MissingRecipient);
            }
            info!(
                recipient = %notification.recipient,
                subject = %notification.subject,
                "Notification sent"
            );
            debug!(body = %notification.text_body, "Notification body");
            Ok(())
        })
    }
}

/// Sends `notifications` on a detached task.
///
/// Each send is bounded by `timeout`. Failures and timeouts are logged and
/// never reported to the caller.
pub fn dispatch_notifications(
    mailer: Arc<dyn Mailer>,
    notifications: Vec<Notification>,
    timeout: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        for notification in &notifications {
            match tokio::time::timeout(timeout, mailer.send(notification)).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!(
                        recipient = %notification.recipient,
                        subject = %notification.subject,
                        error = %err,
                        "Notification lost"
                    );
                }
                Err(_) => {
                    warn!(
                        recipient = %notification.recipient,
                        subject = %notification.subject,
                        timeout_secs = timeout.as_secs(),
                        "Notification timed out"
                    );
                }
            }
        }
    })
}
