//! Linear undo/redo log of visited states
//!
//! The history records how the animation arrived at each state: the state
//! id plus the operation that was stepped, or no operation for a jump. The
//! cursor can sit before the first entry (the implicit root position), so
//! backing out of the first recorded step returns the animation to the
//! root. This is a non-branching log: adding an entry from a mid-history
//! position discards the previously-recorded future.

use kripke_animator::ROOT_STATE_ID;
use serde::{Deserialize, Serialize};

/// One visited state and the transition used to reach it (`None` = jump)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub state_id: String,
    pub op_id: Option<String>,
}

/// Append-ordered sequence of history entries with a movable cursor
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
    /// `None` = the implicit position before the first entry
    cursor: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, discarding everything after the cursor, and move
    /// the cursor onto it
    pub fn add(&mut self, state_id: impl Into<String>, op_id: Option<String>) {
        let keep = match self.cursor {
            Some(index) => index + 1,
            None => 0,
        };
        self.entries.truncate(keep);
        self.entries.push(HistoryEntry {
            state_id: state_id.into(),
            op_id,
        });
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Move the cursor one entry earlier; no-op at the implicit position
    pub fn back(&mut self) {
        self.cursor = match self.cursor {
            Some(0) | None => None,
            Some(index) => Some(index - 1),
        };
    }

    /// Move the cursor one entry later; no-op at the last entry
    pub fn forward(&mut self) {
        self.cursor = match self.cursor {
            None if self.entries.is_empty() => None,
            None => Some(0),
            Some(index) if index + 1 < self.entries.len() => Some(index + 1),
            Some(index) => Some(index),
        };
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn can_go_forward(&self) -> bool {
        match self.cursor {
            None => !self.entries.is_empty(),
            Some(index) => index + 1 < self.entries.len(),
        }
    }

    /// The state id at the cursor, or the root id at the implicit position
    pub fn current_state(&self) -> &str {
        match self.cursor {
            Some(index) => &self.entries[index].state_id,
            None => ROOT_STATE_ID,
        }
    }

    /// The operation recorded for the entry at the cursor, if the cursor
    /// is on an entry that was reached by a step
    pub fn current_transition(&self) -> Option<&str> {
        self.cursor
            .and_then(|index| self.entries[index].op_id.as_deref())
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
