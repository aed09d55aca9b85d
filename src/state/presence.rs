use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// What a connected teammate is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Enters questions as they are read.
    Typist,
    /// Phones answers in.
    Caller,
    #[default]
    Researcher,
}

/// Point-in-time view of one tracked user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPresence {
    pub name: String,
    pub role: Role,
    /// Time since the user last contacted the server.
    pub idle_for: Duration,
    /// Time since the user last changed role.
    pub in_role_for: Duration,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    role: Role,
    last_active: Instant,
    last_role_change: Instant,
}

/// Last-contact registry keyed by user name.
///
/// Entries are never evicted; the window queries only filter.
#[derive(Debug, Default)]
pub struct PresenceTracker {
    users: DashMap<String, Entry>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `user` contacted the server just now.
    pub fn touch(&self, user: &str) {
        self.touch_at(user, Instant::now());
    }

    fn touch_at(&self, user: &str, now: Instant) {
        if user.is_empty() {
            return;
        }
        self.users
            .entry(user.to_string())
            .and_modify(|entry| entry.last_active = now)
            .or_insert(Entry {
                role: Role::default(),
                last_active: now,
                last_role_change: now,
            });
    }

    pub fn set_role(&self, user: &str, role: Role) {
        let now = Instant::now();
        self.touch_at(user, now);
        if let Some(mut entry) = self.users.get_mut(user) {
            if entry.role != role {
                entry.role = role;
                entry.last_role_change = now;
            }
        }
    }

    pub fn role(&self, user: &str) -> Role {
        self.users
            .get(user)
            .map(|entry| entry.role)
            .unwrap_or_default()
    }

    /// Carry `old`'s presence over to `new`. Unknown names just register `new`.
    pub fn rename(&self, old: &str, new: &str) {
        match self.users.remove(old) {
            Some((_, entry)) if !new.is_empty() => {
                self.users.insert(new.to_string(), entry);
                self.touch(new);
            }
            _ => self.touch(new),
        }
    }

    /// Users seen within the trailing `window`, sorted by name.
    pub fn recent(&self, window: Duration) -> Vec<UserPresence> {
        self.snapshot(Instant::now(), |idle| idle < window)
    }

    /// Users known to the tracker but silent for at least `window`, sorted by name.
    pub fn idle(&self, window: Duration) -> Vec<UserPresence> {
        self.snapshot(Instant::now(), |idle| idle >= window)
    }

    fn snapshot(&self, now: Instant, keep: impl Fn(Duration) -> bool) -> Vec<UserPresence> {
        let mut users: Vec<UserPresence> = self
            .users
            .iter()
            .map(|item| UserPresence {
                name: item.key().clone(),
                role: item.role,
                idle_for: now.saturating_duration_since(item.last_active),
                in_role_for: now.saturating_duration_since(item.last_role_change),
            })
            .filter(|user| keep(user.idle_for))
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        users
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touched_users_are_recent_until_window_passes() {
        let tracker = PresenceTracker::new();
        let earlier = Instant::now()
            .checked_sub(Duration::from_secs(120))
            .unwrap();
        tracker.touch_at("old", earlier);
        tracker.touch("fresh");

        let recent: Vec<_> = tracker
            .recent(Duration::from_secs(60))
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(recent, vec!["fresh".to_string()]);

        let idle: Vec<_> = tracker
            .idle(Duration::from_secs(60))
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(idle, vec!["old".to_string()]);
    }

    #[test]
    fn unknown_users_default_to_researcher() {
        let tracker = PresenceTracker::new();
        assert_eq!(tracker.role("nobody"), Role::Researcher);
        tracker.set_role("alice", Role::Caller);
        assert_eq!(tracker.role("alice"), Role::Caller);
    }

    #[test]
    fn rename_keeps_role() {
        let tracker = PresenceTracker::new();
        tracker.set_role("al", Role::Typist);
        tracker.rename("al", "alice");
        assert_eq!(tracker.role("alice"), Role::Typist);
        assert_eq!(tracker.recent(Duration::from_secs(60)).len(), 1);
    }

    #[test]
    fn empty_names_are_ignored() {
        let tracker = PresenceTracker::new();
        tracker.touch("");
        assert!(tracker.recent(Duration::from_secs(60)).is_empty());
    }
}
