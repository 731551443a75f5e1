//! Short-lived user notifications.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CAPACITY: usize = 5;
pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub posted_at: Instant,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

pub trait Notifier {
    fn post(&mut self, message: &str, severity: Severity) -> u64;
}

/// Bounded queue; the oldest entry is dropped when full.
#[derive(Debug)]
pub struct NotificationQueue {
    entries: VecDeque<Notification>,
    capacity: usize,
    ttl: Duration,
    next_id: u64,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

impl NotificationQueue {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self { entries: VecDeque::new(), capacity: capacity.max(1), ttl, next_id: 1 }
    }

    pub fn post_at(&mut self, message: &str, severity: Severity, now: Instant) -> u64 {
        match severity {
            Severity::Error => error!("{message}"),
            Severity::Warning => warn!("{message}"),
            Severity::Success | Severity::Info => info!("{message}"),
        }

        let id = self.next_id;
        self.next_id += 1;
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(Notification { id, message: message.to_string(), severity, posted_at: now });
        id
    }

    /// Drops expired entries and returns what is left, oldest first.
    pub fn active(&mut self, now: Instant) -> Vec<&Notification> {
        let ttl = self.ttl;
        self.entries.retain(|entry| now.saturating_duration_since(entry.posted_at) < ttl);
        self.entries.iter().collect()
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.entries.back()
    }
}

impl Notifier for NotificationQueue {
    fn post(&mut self, message: &str, severity: Severity) -> u64 {
        self.post_at(message, severity, Instant::now())
    }
}
