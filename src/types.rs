//! Core types for the activity engine (JSON contracts + internal models).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Inbound types (JSON contract — what connectors send)
// ---------------------------------------------------------------------------

/// One inbound activity line. Unknown fields are silently ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundActivity {
  pub user_id: String,
  pub event_type: String,
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub metadata: HashMap<String, serde_json::Value>,
  pub source_system: String,
  #[serde(default)]
  pub source_id: String,
  pub created_at: String,
}

// ---------------------------------------------------------------------------
// Internal canonical types
// ---------------------------------------------------------------------------

/// Canonical activity after validation, not yet stored (no id).
#[derive(Debug, Clone)]
pub struct NewActivity {
  pub user_id: String,
  pub event_type: String,
  pub title: String,
  pub description: String,
  pub metadata: HashMap<String, serde_json::Value>,
  pub source_system: String,
  pub source_id: String,
  pub created_at: DateTime<Utc>,
}

/// Stored, immutable activity record. The store assigns `id` at insert;
/// ids follow arrival order and break ties between equal timestamps.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEvent {
  pub id: u64,
  pub user_id: String,
  pub event_type: String,
  pub title: String,
  pub description: String,
  pub metadata: HashMap<String, serde_json::Value>,
  pub source_system: String,
  pub source_id: String,
  pub created_at: DateTime<Utc>,
}

impl ActivityEvent {
  /// True for `pr_create`, `pr_review`, `pr_merge`, ...
  pub fn is_pr(&self) -> bool {
    self.event_type.starts_with("pr_")
  }

  /// True for `issue_create`, `issue_comment`, `issue_close`, `issue_update`, ...
  pub fn is_issue(&self) -> bool {
    self.event_type.starts_with("issue_")
  }

  /// Stable identity for duplicate webhook deliveries of the same logical
  /// event. The engine itself never dedupes; integrators that need
  /// idempotent counts can key on this upstream of the store.
  pub fn dedupe_key(&self) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(self.source_system.as_bytes());
    hasher.update(b"|");
    hasher.update(self.source_id.as_bytes());
    hasher.update(b"|");
    hasher.update(self.event_type.as_bytes());
    let hex = hasher.finalize().to_hex();
    hex[..32].to_string()
  }

  /// Lightweight reference for report payloads.
  pub fn to_ref(&self) -> EventRef {
    EventRef {
      id: self.id,
      event_type: self.event_type.clone(),
      title: self.title.clone(),
      created_at: self.created_at,
    }
  }
}

// ---------------------------------------------------------------------------
// Correlation output (JSON contract — what renderers consume)
// ---------------------------------------------------------------------------

/// How a correlation or blocker points at an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRef {
  pub id: u64,
  pub event_type: String,
  pub title: String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationKind {
  CommitToIssue,
  PrToIssue,
  SlackToPr,
  SlackToIssue,
}

/// A derived link between a source event and the events it references.
/// `matched_key` is the issue key (`PROJ-123`) or PR token (`#42`) that
/// produced the match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correlation {
  pub kind: CorrelationKind,
  pub source: EventRef,
  pub related: Vec<EventRef>,
  pub matched_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationSummary {
  pub user_id: String,
  pub period_days: u32,
  pub total_activities: usize,
  pub github_activities: usize,
  pub jira_activities: usize,
  pub slack_activities: usize,
  pub correlation_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationReport {
  pub summary: CorrelationSummary,
  pub correlations: Vec<Correlation>,
}

// ---------------------------------------------------------------------------
// Blocker output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockerKind {
  Reported,
  StalePr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Blocker {
  pub kind: BlockerKind,
  pub title: String,
  pub description: String,
  pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Workflow output
// ---------------------------------------------------------------------------

/// One aggregated transition group: consecutive event pairs sharing the same
/// (from_type, from_system, to_type, to_system), with a streaming mean gap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionPattern {
  pub from_type: String,
  pub to_type: String,
  pub from_system: String,
  pub to_system: String,
  pub count: u64,
  pub avg_gap_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourCount {
  /// Hour of day, 0-23, in the event's stored timezone (UTC).
  pub hour: u32,
  pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequencePattern {
  /// Three event types joined in order, e.g. `"commit -> pr_create -> pr_merge"`.
  pub sequence: String,
  pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowPatterns {
  /// Top 5 transition groups by count, ties by first encounter.
  pub transitions: Vec<TransitionPattern>,
  /// Top 3 hours by event count, ties to the lower hour.
  pub peak_hours: Vec<HourCount>,
  /// Top 3 recurring 3-event sequences; empty when fewer than 3 events.
  pub common_sequences: Vec<SequencePattern>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowAnalysis {
  pub user_id: String,
  pub activities_count: usize,
  /// Distinct event types in first-occurrence order.
  pub activity_types: Vec<String>,
  pub transitions_count: usize,
  pub patterns: WorkflowPatterns,
}

/// Workflow result. "No activity in the window" is a distinct outcome, not a
/// zero-filled analysis and not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WorkflowReport {
  NoActivity { user_id: String, message: String },
  Analyzed(WorkflowAnalysis),
}

// ---------------------------------------------------------------------------
// CLI stream wrappers
// ---------------------------------------------------------------------------

/// Structured error output for invalid input lines.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }
}
