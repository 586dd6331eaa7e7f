//! Core data model.
//!
//! A work item is one unit of idempotent provisioning: a name for
//! reporting, a target that identifies what it provisions, and an action
//! that knows how to check for and apply its effect.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// A provisioning capability bound to one target.
#[async_trait]
pub trait Action: Send + Sync {
    /// Short label for the transport behind this action ("http", "sql").
    fn kind(&self) -> &'static str;

    /// Checked for every item before any item is attempted. An error here
    /// aborts the whole run.
    async fn preflight(&self) -> Result<()> {
        Ok(())
    }

    /// Has the effect already been applied?
    async fn is_provisioned(&self) -> Result<bool>;

    /// Perform exactly one external side effect. Returns `false` when the
    /// write turned out to be a no-op because the target appeared after
    /// the check.
    async fn provision(&self) -> Result<bool>;
}

// ---------------------------------------------------------------------------
// Work Item
// ---------------------------------------------------------------------------

/// A unit of work handed to the provisioner.
pub struct WorkItem {
    /// Reporting key (e.g., "hero-bg.jpg", "quote:john@example.com").
    pub name: String,

    /// Human-readable idempotency key: a file path or a table row key.
    pub target: String,

    pub action: Box<dyn Action>,
}

impl WorkItem {
    pub fn new(
        name: impl Into<String>,
        target: impl Into<String>,
        action: impl Action + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            action: Box::new(action),
        }
    }
}

impl std::fmt::Debug for WorkItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkItem")
            .field("name", &self.name)
            .field("target", &self.target)
            .field("kind", &self.action.kind())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Terminal state of a single item within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "error", rename_all = "snake_case")]
pub enum Outcome {
    Skipped,
    Succeeded,
    Failed(String),
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Skipped => "skipped",
            Outcome::Succeeded => "succeeded",
            Outcome::Failed(_) => "failed",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Run Report
// ---------------------------------------------------------------------------

/// An item that failed, with the error message it failed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub name: String,
    pub error: String,
}

/// Aggregate outcome of one provisioning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: Vec<Failure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            attempted: 0,
            succeeded: 0,
            skipped: 0,
            failed: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Fold one item's outcome into the tallies.
    pub fn record(&mut self, name: &str, outcome: Outcome) {
        self.attempted += 1;
        match outcome {
            Outcome::Skipped => self.skipped += 1,
            Outcome::Succeeded => self.succeeded += 1,
            Outcome::Failed(error) => self.failed.push(Failure {
                name: name.to_string(),
                error,
            }),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// `"<succeeded>/<attempted> succeeded"`
    pub fn summary(&self) -> String {
        format!("{}/{} succeeded", self.succeeded, self.attempted)
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}
