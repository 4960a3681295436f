use crate::ports::{Notification, NotificationKind, Notifier};

/// Prints banners to stderr and mirrors them into the log.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn banner(notification: &Notification) -> String {
        let icon = match notification.kind {
            NotificationKind::Success => "✅",
            NotificationKind::Error => "❌",
        };
        format!("{icon} {}", notification.message)
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => tracing::info!("{}", notification.message),
            NotificationKind::Error => tracing::error!("{}", notification.message),
        }
        eprintln!("{}", Self::banner(&notification));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banners_carry_an_icon() {
        assert_eq!(
            ConsoleNotifier::banner(&Notification::success("Task added successfully!")),
            "✅ Task added successfully!"
        );
        assert_eq!(
            ConsoleNotifier::banner(&Notification::error("Failed to delete task.")),
            "❌ Failed to delete task."
        );
    }
}
