//! Dashboard summary
//!
//! Mostly fixed showcase figures; the document count and database status
//! are read live from the shell, and the activity feed records what the
//! sessions reported upward.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::VecDeque;

use crate::models::{FileStatus, UploadedFile};

/// Advertised proficiency of one capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capability {
    /// Display name
    pub name: &'static str,
    /// Score out of 100
    pub level: u8,
}

/// Capability levels shown on the dashboard
pub const AI_CAPABILITIES: [Capability; 6] = [
    Capability { name: "Traitement PDF", level: 98 },
    Capability { name: "Analyse Word", level: 95 },
    Capability { name: "Français", level: 99 },
    Capability { name: "Wolof", level: 85 },
    Capability { name: "Anglais", level: 97 },
    Capability { name: "Espagnol", level: 92 },
];

/// One line of the recent-activity feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    pub time: DateTime<Local>,
    pub action: String,
    pub detail: Option<String>,
}

/// Bounded feed, most recent first
#[derive(Debug, Clone)]
pub struct ActivityFeed {
    entries: VecDeque<ActivityEntry>,
    limit: usize,
}

impl Default for ActivityFeed {
    fn default() -> Self {
        Self::new(5)
    }
}

impl ActivityFeed {
    /// Feed keeping at most `limit` entries
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// Push an entry at the front, dropping the oldest past the limit
    pub fn record(&mut self, action: impl Into<String>, detail: Option<String>) {
        self.entries.push_front(ActivityEntry {
            time: Local::now(),
            action: action.into(),
            detail,
        });
        self.entries.truncate(self.limit);
    }

    /// Entries, most recent first
    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    /// Number of entries kept
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything the dashboard tab shows
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub total_queries: u32,
    pub documents_processed: usize,
    pub documents_ready: usize,
    pub average_response_time: &'static str,
    pub accuracy_rate: u8,
    pub database_connected: bool,
    pub capabilities: Vec<Capability>,
    pub recent_activity: Vec<ActivityEntry>,
}

impl DashboardSnapshot {
    /// Snapshot of the live file collection, connection flag and feed
    pub fn build(files: &[UploadedFile], database_connected: bool, feed: &ActivityFeed) -> Self {
        Self {
            total_queries: 47,
            documents_processed: files.len(),
            documents_ready: files
                .iter()
                .filter(|f| f.status == FileStatus::Ready)
                .count(),
            average_response_time: "1.2s",
            accuracy_rate: 96,
            database_connected,
            capabilities: AI_CAPABILITIES.to_vec(),
            recent_activity: feed.entries().cloned().collect(),
        }
    }
}
