//! Election open/closed state, consumed by the casting path.

use std::collections::HashMap;

use ballotchain_types::{ElectionId, Timestamp};
use serde::{Deserialize, Serialize};

/// Answers whether an election accepts votes at a given instant.
pub trait ElectionSchedule: Send + Sync {
    fn is_open(&self, election: &ElectionId, at: Timestamp) -> bool;
}

/// The voting window of one election.
///
/// Open while `is_active` holds, `start` (if any) has been reached and `end`
/// lies strictly in the future.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionWindow {
    #[serde(rename = "id")]
    pub election_id: ElectionId,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Timestamp>,
    pub end: Timestamp,
}

fn default_active() -> bool {
    true
}

impl ElectionWindow {
    pub fn new(election_id: ElectionId, end: Timestamp) -> Self {
        Self {
            election_id,
            is_active: true,
            start: None,
            end,
        }
    }

    pub fn starting(mut self, start: Timestamp) -> Self {
        self.start = Some(start);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn is_open_at(&self, at: Timestamp) -> bool {
        self.is_active && self.start.map_or(true, |s| s <= at) && self.end > at
    }
}

/// A set of configured windows. Elections without one are closed.
#[derive(Clone, Debug, Default)]
pub struct ElectionCalendar {
    windows: HashMap<ElectionId, ElectionWindow>,
}

impl ElectionCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the window of `window.election_id`.
    pub fn insert(&mut self, window: ElectionWindow) {
        self.windows.insert(window.election_id.clone(), window);
    }

    pub fn with(mut self, window: ElectionWindow) -> Self {
        self.insert(window);
        self
    }

    pub fn window(&self, election: &ElectionId) -> Option<&ElectionWindow> {
        self.windows.get(election)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl FromIterator<ElectionWindow> for ElectionCalendar {
    fn from_iter<I: IntoIterator<Item = ElectionWindow>>(iter: I) -> Self {
        let mut calendar = Self::new();
        for window in iter {
            calendar.insert(window);
        }
        calendar
    }
}

impl ElectionSchedule for ElectionCalendar {
    fn is_open(&self, election: &ElectionId, at: Timestamp) -> bool {
        self.window(election).is_some_and(|w| w.is_open_at(at))
    }
}
