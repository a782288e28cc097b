//! Prediction, outcome and history model
//!
//! An identification attempt ends in exactly one [`OutcomeRecord`], which
//! carries either a [`Prediction`] from the endpoint or a failure message.
//! Records are kept in a [`History`] bounded to [`HISTORY_LIMIT`] entries,
//! newest first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Maximum number of outcome records kept per session
pub const HISTORY_LIMIT: usize = 3;

/// Classification result produced by the endpoint
///
/// `confidence` is expected in `[0, 1]`. It is not validated on receipt;
/// [`percent`] clamps it for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub confidence: f64,
}

impl Prediction {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }

    /// Confidence as a whole percentage in `0..=100`
    pub fn percent(&self) -> u8 {
        percent(self.confidence)
    }
}

/// Convert a confidence in `[0, 1]` to a display percentage.
///
/// Rounds to the nearest integer and clamps to `0..=100`. Non-finite input
/// yields 0.
///
/// # Examples
///
/// ```
/// use qiraat_common::percent;
///
/// assert_eq!(percent(0.87), 87);
/// assert_eq!(percent(0.005), 1);
/// assert_eq!(percent(1.7), 100);
/// assert_eq!(percent(-0.2), 0);
/// ```
pub fn percent(confidence: f64) -> u8 {
    if !confidence.is_finite() {
        return 0;
    }
    (confidence * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Result of one identification attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Success(Prediction),
    Failure { message: String },
}

/// One history entry: the outcome plus display name and time of the attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub id: Uuid,
    pub name: String,
    pub at: DateTime<Utc>,
    pub outcome: Outcome,
}

impl OutcomeRecord {
    pub fn success(name: impl Into<String>, prediction: Prediction) -> Self {
        Self::new(name, Outcome::Success(prediction))
    }

    pub fn failure(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            name,
            Outcome::Failure {
                message: message.into(),
            },
        )
    }

    fn new(name: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            at: crate::time::now(),
            outcome,
        }
    }

    pub fn prediction(&self) -> Option<&Prediction> {
        match &self.outcome {
            Outcome::Success(prediction) => Some(prediction),
            Outcome::Failure { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success(_) => None,
            Outcome::Failure { message } => Some(message),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failure { .. })
    }
}

/// Bounded most-recent-first list of outcome records
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<OutcomeRecord>,
    limit: usize,
}

impl History {
    pub fn new() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }

    /// History holding at most `limit` entries (minimum 1)
    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            entries: VecDeque::with_capacity(limit + 1),
            limit,
        }
    }

    /// Prepend a record, returning the entry evicted to stay within the bound
    pub fn record(&mut self, entry: OutcomeRecord) -> Option<OutcomeRecord> {
        self.entries.push_front(entry);
        if self.entries.len() > self.limit {
            self.entries.pop_back()
        } else {
            None
        }
    }

    /// Newest entry
    pub fn latest(&self) -> Option<&OutcomeRecord> {
        self.entries.front()
    }

    /// Entries, newest first
    pub fn iter(&self) -> impl Iterator<Item = &OutcomeRecord> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
