use std::sync::Mutex;
use std::time::Instant;

use crate::ports::{Notification, Notifier};

/// Single banner slot. A new banner replaces the old one, and a banner
/// disappears once its time is up.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    current: Mutex<Option<Notification>>,
    history: Mutex<Vec<Notification>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The banner still showing at `now`, if any.
    pub fn active(&self, now: Instant) -> Option<Notification> {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if current.as_ref().is_some_and(|n| n.is_expired(now)) {
            *current = None;
        }
        current.clone()
    }

    pub fn latest(&self) -> Option<Notification> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }

    pub fn history(&self) -> Vec<Notification> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Notifier for NotificationCenter {
    fn notify(&self, notification: Notification) {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification.clone());
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = Some(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::NOTIFICATION_TTL;
    use std::time::Duration;

    #[test]
    fn newer_banner_replaces_older() {
        let center = NotificationCenter::new();
        center.notify(Notification::success("first"));
        center.notify(Notification::error("second"));

        let active = center.active(Instant::now()).unwrap();
        assert_eq!(active.message, "second");
        assert!(active.is_error());
        assert_eq!(center.history().len(), 2);
    }

    #[test]
    fn banner_expires_after_ttl() {
        let center = NotificationCenter::new();
        let banner = Notification::success("saved");
        let raised = banner.raised_at;
        center.notify(banner);

        assert!(center.active(raised + Duration::from_millis(2_999)).is_some());
        assert!(center.active(raised + NOTIFICATION_TTL).is_none());
        // History keeps it even after it stops showing.
        assert_eq!(center.latest().unwrap().message, "saved");
    }
}
