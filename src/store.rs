//! Event Store contract + in-memory implementation.
//!
//! The engine is a pure computation over whatever the store returns; the
//! trait is the seam where a real persistence layer plugs in. Query results
//! are always ascending by creation time, ties broken by insertion order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::{ActivityEvent, NewActivity};

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("event store unavailable: {0}")]
  Unavailable(String),
}

/// Query parameters. Time bounds are inclusive on both ends.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
  pub user_id: String,
  pub created_after: Option<DateTime<Utc>>,
  pub created_before: Option<DateTime<Utc>>,
  pub source_system: Option<String>,
  pub event_type_prefix: Option<String>,
}

impl EventQuery {
  pub fn for_user(user_id: impl Into<String>) -> Self {
    Self {
      user_id: user_id.into(),
      ..Self::default()
    }
  }

  pub fn created_after(mut self, ts: DateTime<Utc>) -> Self {
    self.created_after = Some(ts);
    self
  }

  pub fn created_before(mut self, ts: DateTime<Utc>) -> Self {
    self.created_before = Some(ts);
    self
  }

  pub fn source_system(mut self, system: impl Into<String>) -> Self {
    self.source_system = Some(system.into());
    self
  }

  pub fn event_type_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.event_type_prefix = Some(prefix.into());
    self
  }
}

/// Append-only, queryable collection of activity events.
pub trait EventStore: Send + Sync {
  /// Matching events ascending by `(created_at, id)`.
  fn query(&self, query: &EventQuery) -> Result<Vec<ActivityEvent>, StoreError>;
}

/// In-memory store backing the CLI and tests. Ids are assigned in arrival
/// order, which doubles as the tie-break for equal timestamps.
#[derive(Default)]
pub struct InMemoryStore {
  events: RwLock<Vec<ActivityEvent>>,
  next_id: AtomicU64,
}

impl InMemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append an event, returning its assigned id.
  pub fn insert(&self, activity: NewActivity) -> u64 {
    let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    let event = ActivityEvent {
      id,
      user_id: activity.user_id,
      event_type: activity.event_type,
      title: activity.title,
      description: activity.description,
      metadata: activity.metadata,
      source_system: activity.source_system,
      source_id: activity.source_id,
      created_at: activity.created_at,
    };
    self.events.write().expect("store lock poisoned").push(event);
    id
  }

  pub fn len(&self) -> usize {
    self.events.read().expect("store lock poisoned").len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl EventStore for InMemoryStore {
  fn query(&self, query: &EventQuery) -> Result<Vec<ActivityEvent>, StoreError> {
    let events = self.events.read().expect("store lock poisoned");
    let mut matched: Vec<ActivityEvent> = events
      .iter()
      .filter(|e| e.user_id == query.user_id)
      .filter(|e| query.created_after.is_none_or(|t| e.created_at >= t))
      .filter(|e| query.created_before.is_none_or(|t| e.created_at <= t))
      .filter(|e| {
        query
          .source_system
          .as_deref()
          .is_none_or(|s| e.source_system == s)
      })
      .filter(|e| {
        query
          .event_type_prefix
          .as_deref()
          .is_none_or(|p| e.event_type.starts_with(p))
      })
      .cloned()
      .collect();
    // Events arrive in id order, so a stable sort on created_at keeps the
    // insertion-order tie-break.
    matched.sort_by_key(|e| e.created_at);
    Ok(matched)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;
  use std::collections::HashMap;

  fn activity(user: &str, event_type: &str, system: &str, minute: u32) -> NewActivity {
    NewActivity {
      user_id: user.into(),
      event_type: event_type.into(),
      title: format!("{} at {}", event_type, minute),
      description: String::new(),
      metadata: HashMap::new(),
      source_system: system.into(),
      source_id: String::new(),
      created_at: Utc.with_ymd_and_hms(2025, 3, 10, 9, minute, 0).unwrap(),
    }
  }

  #[test]
  fn query_filters_by_user() {
    let store = InMemoryStore::new();
    store.insert(activity("u1", "commit", "github", 0));
    store.insert(activity("u2", "commit", "github", 1));

    let events = store.query(&EventQuery::for_user("u1")).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].user_id, "u1");
  }

  #[test]
  fn query_time_bounds_are_inclusive() {
    let store = InMemoryStore::new();
    store.insert(activity("u1", "commit", "github", 5));

    let exact = Utc.with_ymd_and_hms(2025, 3, 10, 9, 5, 0).unwrap();
    let q = EventQuery::for_user("u1").created_after(exact).created_before(exact);
    assert_eq!(store.query(&q).unwrap().len(), 1);

    let after = EventQuery::for_user("u1").created_after(exact + chrono::Duration::seconds(1));
    assert!(store.query(&after).unwrap().is_empty());
  }

  #[test]
  fn query_filters_by_system_and_prefix() {
    let store = InMemoryStore::new();
    store.insert(activity("u1", "commit", "github", 0));
    store.insert(activity("u1", "pr_create", "github", 1));
    store.insert(activity("u1", "issue_create", "jira", 2));

    let github = store
      .query(&EventQuery::for_user("u1").source_system("github"))
      .unwrap();
    assert_eq!(github.len(), 2);

    let prs = store
      .query(&EventQuery::for_user("u1").event_type_prefix("pr_"))
      .unwrap();
    assert_eq!(prs.len(), 1);
    assert_eq!(prs[0].event_type, "pr_create");
  }

  #[test]
  fn results_ascend_by_time_then_arrival() {
    let store = InMemoryStore::new();
    // Inserted out of time order.
    store.insert(activity("u1", "commit", "github", 9));
    store.insert(activity("u1", "pr_create", "github", 3));
    // Same timestamp as the first event; must sort after it (arrival order).
    store.insert(activity("u1", "issue_create", "jira", 9));

    let events = store.query(&EventQuery::for_user("u1")).unwrap();
    let order: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(order, vec!["pr_create", "commit", "issue_create"]);
    assert!(events[1].id < events[2].id);
  }
}
