//! Failure notifications.
//!
//! The gateway reports every failed call through a [`Notifier`]. Binaries
//! decide what a notification becomes (a log line, a Sentry breadcrumb, a
//! toast); tests record them with [`MemoryNotifier`].

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::GatewayError;

/// How loudly a notification should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A message produced by a failed backend call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
    /// Backend path of the failing call.
    pub path: String,
}

impl Notification {
    #[must_use]
    pub fn from_error(path: &str, error: &GatewayError) -> Self {
        let severity = if error.is_unauthorized() || error.is_client_error() {
            Severity::Warning
        } else {
            Severity::Error
        };

        Self {
            severity,
            message: error.user_message(),
            path: path.to_string(),
        }
    }
}

/// Sink for gateway failure notifications.
pub trait Notifier: Send + Sync + std::fmt::Debug {
    fn notify(&self, notification: Notification);
}

/// Logs notifications with `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Error => tracing::error!(
                path = %notification.path,
                message = %notification.message,
                "Backend call failed"
            ),
            Severity::Warning => tracing::warn!(
                path = %notification.path,
                message = %notification.message,
                "Backend call rejected"
            ),
            Severity::Info | Severity::Success => tracing::info!(
                path = %notification.path,
                message = %notification.message,
                "Backend notification"
            ),
        }
    }
}

/// Keeps notifications in memory.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    received: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far.
    #[must_use]
    pub fn received(&self) -> Vec<Notification> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain received notifications.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.received.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_from_error() {
        let rejected = GatewayError::from_response(422, r#"{"message":"bad"}"#);
        let down = GatewayError::from_response(502, "");
        let expired = GatewayError::from_response(401, "");

        assert_eq!(
            Notification::from_error("/products", &rejected).severity,
            Severity::Warning
        );
        assert_eq!(
            Notification::from_error("/products", &down).severity,
            Severity::Error
        );
        assert_eq!(
            Notification::from_error("/products", &expired).severity,
            Severity::Warning
        );
    }

    #[test]
    fn test_memory_notifier_take_drains() {
        let notifier = MemoryNotifier::new();
        notifier.notify(Notification {
            severity: Severity::Error,
            message: "down".to_string(),
            path: "/banners".to_string(),
        });

        assert_eq!(notifier.received().len(), 1);
        assert_eq!(notifier.take().len(), 1);
        assert!(notifier.received().is_empty());
    }
}
