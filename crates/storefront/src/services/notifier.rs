//! Gateway notifier for the storefront.

use circuit_bazaar_gateway::{Notification, Notifier, Severity, TracingNotifier};

/// Logs gateway failures and leaves a Sentry breadcrumb, so an error page
/// reported later carries the backend call that preceded it.
#[derive(Debug, Clone, Copy, Default)]
pub struct BreadcrumbNotifier;

impl Notifier for BreadcrumbNotifier {
    fn notify(&self, notification: Notification) {
        let level = match notification.severity {
            Severity::Error => sentry::Level::Error,
            Severity::Warning => sentry::Level::Warning,
            Severity::Info | Severity::Success => sentry::Level::Info,
        };

        let mut breadcrumb = sentry::Breadcrumb {
            category: Some("backend".to_string()),
            message: Some(notification.message.clone()),
            level,
            ..Default::default()
        };
        breadcrumb.data.insert(
            "path".to_string(),
            serde_json::Value::String(notification.path.clone()),
        );
        sentry::add_breadcrumb(breadcrumb);

        TracingNotifier.notify(notification);
    }
}
