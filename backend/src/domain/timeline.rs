//! Append-only status history shared by orders and customizations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// One recorded status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry<S> {
    pub status: S,
    pub timestamp: DateTime<Utc>,
    pub note: Option<String>,
    pub updated_by: Option<UserId>,
}

/// Ordered status history.
///
/// Entries can only be appended. Reading hands out a slice so callers can
/// inspect history without being able to rewrite it.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use karigari::domain::Timeline;
///
/// let mut timeline = Timeline::default();
/// timeline.push("pending", Utc::now(), None, None);
/// timeline.push("confirmed", Utc::now(), Some("ok".into()), None);
/// assert_eq!(timeline.len(), 2);
/// assert_eq!(timeline.entries()[0].status, "pending");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline<S>(Vec<TimelineEntry<S>>);

impl<S> Default for Timeline<S> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<S> Timeline<S> {
    /// Timeline with a single opening entry.
    pub fn starting_with(
        status: S,
        timestamp: DateTime<Utc>,
        note: Option<String>,
        updated_by: Option<UserId>,
    ) -> Self {
        let mut timeline = Self::default();
        timeline.push(status, timestamp, note, updated_by);
        timeline
    }

    /// Append an entry.
    pub fn push(
        &mut self,
        status: S,
        timestamp: DateTime<Utc>,
        note: Option<String>,
        updated_by: Option<UserId>,
    ) {
        self.push_entry(TimelineEntry {
            status,
            timestamp,
            note,
            updated_by,
        });
    }

    /// Append an already built entry.
    pub fn push_entry(&mut self, entry: TimelineEntry<S>) {
        self.0.push(entry);
    }

    /// Recorded entries, oldest first.
    pub fn entries(&self) -> &[TimelineEntry<S>] {
        &self.0
    }

    /// Most recent entry.
    pub fn last(&self) -> Option<&TimelineEntry<S>> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
