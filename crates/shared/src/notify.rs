use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Info,
    Error,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Info => "info",
            NotificationKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Increases with every notification shown by the same center.
    pub id: u64,
    pub message: String,
    pub kind: NotificationKind,
    pub expires_at: DateTime<Utc>,
}

/// Transient, auto-dismissing notifications for one component.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    ttl: chrono::Duration,
    replace_existing: bool,
    items: Vec<Notification>,
    last_id: u64,
}

impl NotificationCenter {
    /// `replace_existing` drops whatever is on screen before showing a new one.
    pub fn new(ttl: Duration, replace_existing: bool) -> Self {
        Self {
            ttl: chrono::Duration::milliseconds(ttl.as_millis() as i64),
            replace_existing,
            items: Vec::new(),
            last_id: 0,
        }
    }

    pub fn show(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.show_at(kind, message, Utc::now());
    }

    pub fn show_at(&mut self, kind: NotificationKind, message: impl Into<String>, now: DateTime<Utc>) {
        let message = message.into();
        info!(kind = kind.as_str(), %message, "notification");

        if self.replace_existing {
            self.items.clear();
        }
        self.prune(now);
        self.last_id += 1;
        self.items.push(Notification {
            id: self.last_id,
            message,
            kind,
            expires_at: now + self.ttl,
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.show(NotificationKind::Success, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.show(NotificationKind::Info, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.show(NotificationKind::Error, message);
    }

    pub fn prune(&mut self, now: DateTime<Utc>) {
        self.items.retain(|n| n.expires_at > now);
    }

    pub fn active(&self, now: DateTime<Utc>) -> impl Iterator<Item = &Notification> {
        self.items.iter().filter(move |n| n.expires_at > now)
    }

    /// Id of the most recent notification, 0 before the first.
    pub fn last_id(&self) -> u64 {
        self.last_id
    }

    /// Notifications shown after the one with id `seen`, oldest first.
    pub fn newer_than(&self, seen: u64) -> impl Iterator<Item = &Notification> {
        self.items.iter().filter(move |n| n.id > seen)
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, secs).unwrap()
    }

    #[test]
    fn test_notification_expires_after_ttl() {
        let mut center = NotificationCenter::new(Duration::from_secs(5), true);
        center.show_at(NotificationKind::Info, "Collecting...", at(0));

        assert_eq!(center.active(at(4)).count(), 1);
        assert_eq!(center.active(at(5)).count(), 0);
    }

    #[test]
    fn test_replacing_center_keeps_only_latest() {
        let mut center = NotificationCenter::new(Duration::from_secs(5), true);
        center.show_at(NotificationKind::Info, "first", at(0));
        center.show_at(NotificationKind::Error, "second", at(1));

        assert_eq!(center.len(), 1);
        assert_eq!(center.latest().unwrap().message, "second");
        assert_eq!(center.latest().unwrap().kind, NotificationKind::Error);
    }

    #[test]
    fn test_stacking_center_keeps_live_notifications() {
        let mut center = NotificationCenter::new(Duration::from_secs(3), false);
        center.show_at(NotificationKind::Info, "first", at(0));
        center.show_at(NotificationKind::Success, "second", at(1));
        assert_eq!(center.active(at(2)).count(), 2);

        // The first has expired by the time the third arrives
        center.show_at(NotificationKind::Success, "third", at(4));
        assert_eq!(center.len(), 2);
    }

    #[test]
    fn test_newer_than_sees_notification_after_expiry() {
        let mut center = NotificationCenter::new(Duration::from_secs(3), false);
        center.show_at(NotificationKind::Info, "Template applied!", at(0));
        let seen = center.last_id();

        // Same length as before: the expired one was pruned
        center.show_at(NotificationKind::Error, "Failed to save draft", at(10));
        assert_eq!(center.len(), 1);

        let fresh: Vec<&str> = center
            .newer_than(seen)
            .map(|n| n.message.as_str())
            .collect();
        assert_eq!(fresh, vec!["Failed to save draft"]);
        assert_eq!(center.newer_than(center.last_id()).count(), 0);
    }
}
