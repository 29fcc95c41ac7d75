//! Per-user workflow pattern mining: transitions, peak hours, sequences.
//!
//! Pure frequency counting over the fetched snapshot. Every aggregation
//! table is insertion-ordered and sorted stably on output, so ranked top-N
//! lists break ties by first encounter and never depend on hash ordering.

use chrono::{DateTime, Duration, Utc};

use crate::config::Config;
use crate::error::EngineError;
use crate::store::{EventQuery, EventStore};
use crate::types::{
  ActivityEvent, HourCount, SequencePattern, TransitionPattern, WorkflowAnalysis,
  WorkflowPatterns, WorkflowReport,
};

/// Sequence mining uses a fixed 3-event window; this is an n-gram count,
/// not a general subsequence miner.
const SEQUENCE_LEN: usize = 3;

pub struct WorkflowPatternMiner<'a> {
  store: &'a dyn EventStore,
  config: &'a Config,
}

impl<'a> WorkflowPatternMiner<'a> {
  pub fn new(store: &'a dyn EventStore, config: &'a Config) -> Self {
    Self { store, config }
  }

  /// Mine workflow patterns over the trailing `days` window as of `now`.
  /// An empty window is a distinct `NoActivity` outcome, not an error and
  /// not a zero-filled analysis.
  pub fn analyze(
    &self,
    user_id: &str,
    days: u32,
    now: DateTime<Utc>,
  ) -> Result<WorkflowReport, EngineError> {
    let window_start = now - Duration::days(i64::from(days));
    let events = self
      .store
      .query(&EventQuery::for_user(user_id).created_after(window_start))?;

    if events.is_empty() {
      return Ok(WorkflowReport::NoActivity {
        user_id: user_id.to_string(),
        message: "No activities found for this user in the specified time period".into(),
      });
    }

    let transitions = collect_transitions(&events, self.config.transition_max_gap_hours);
    let patterns = WorkflowPatterns {
      transitions: top_transitions(&transitions, self.config.top_transitions),
      peak_hours: peak_hours(&events, self.config.top_peak_hours),
      common_sequences: common_sequences(&events, self.config.top_sequences),
    };

    Ok(WorkflowReport::Analyzed(WorkflowAnalysis {
      user_id: user_id.to_string(),
      activities_count: events.len(),
      activity_types: distinct_types(&events),
      transitions_count: transitions.len(),
      patterns,
    }))
  }
}

/// One observed transition between consecutive events.
struct Transition<'e> {
  from: &'e ActivityEvent,
  to: &'e ActivityEvent,
  gap_hours: f64,
}

/// Consecutive pairs no more than `max_gap_hours` apart (inclusive).
/// Wider pairs are dropped entirely — neither counted nor bridged.
fn collect_transitions(events: &[ActivityEvent], max_gap_hours: f64) -> Vec<Transition<'_>> {
  events
    .windows(2)
    .filter_map(|pair| {
      let gap_hours =
        (pair[1].created_at - pair[0].created_at).num_milliseconds() as f64 / 3_600_000.0;
      (gap_hours <= max_gap_hours).then(|| Transition {
        from: &pair[0],
        to: &pair[1],
        gap_hours,
      })
    })
    .collect()
}

/// Group transitions by (from_type, from_system, to_type, to_system) and
/// keep a streaming mean of the gap: arrival-order independent, no second
/// pass over the samples. Output is the top `limit` groups by count.
fn top_transitions(transitions: &[Transition<'_>], limit: usize) -> Vec<TransitionPattern> {
  // Insertion-ordered table; group count is tiny (bounded by the event
  // type vocabulary squared), so a linear scan beats a hash map here and
  // keeps first-encounter order for free.
  let mut groups: Vec<TransitionPattern> = Vec::new();

  for t in transitions {
    let position = groups.iter().position(|g| {
      g.from_type == t.from.event_type
        && g.from_system == t.from.source_system
        && g.to_type == t.to.event_type
        && g.to_system == t.to.source_system
    });
    match position {
      Some(i) => {
        let group = &mut groups[i];
        group.count += 1;
        let n = group.count as f64;
        group.avg_gap_hours = ((n - 1.0) * group.avg_gap_hours + t.gap_hours) / n;
      }
      None => groups.push(TransitionPattern {
        from_type: t.from.event_type.clone(),
        to_type: t.to.event_type.clone(),
        from_system: t.from.source_system.clone(),
        to_system: t.to.source_system.clone(),
        count: 1,
        avg_gap_hours: t.gap_hours,
      }),
    }
  }

  // Stable sort: ties keep first-encounter order.
  groups.sort_by(|a, b| b.count.cmp(&a.count));
  groups.truncate(limit);
  groups
}

/// Hour-of-day histogram over ALL events in range (not just those with
/// transitions), top `limit` by count, ties to the lower hour.
fn peak_hours(events: &[ActivityEvent], limit: usize) -> Vec<HourCount> {
  use chrono::Timelike;

  let mut histogram = [0u64; 24];
  for event in events {
    histogram[event.created_at.hour() as usize] += 1;
  }

  let mut hours: Vec<HourCount> = histogram
    .iter()
    .enumerate()
    .filter(|(_, &count)| count > 0)
    .map(|(hour, &count)| HourCount {
      hour: hour as u32,
      count,
    })
    .collect();
  // Built in ascending hour order, so a stable sort resolves ties toward
  // the lower hour.
  hours.sort_by(|a, b| b.count.cmp(&a.count));
  hours.truncate(limit);
  hours
}

/// Fixed-length 3-gram frequency count over the event-type sequence,
/// top `limit` by count, ties by first encounter. Adjacent events only;
/// requires at least 3 events in range.
fn common_sequences(events: &[ActivityEvent], limit: usize) -> Vec<SequencePattern> {
  if events.len() < SEQUENCE_LEN {
    return Vec::new();
  }

  let mut sequences: Vec<SequencePattern> = Vec::new();
  for window in events.windows(SEQUENCE_LEN) {
    let key = format!(
      "{} -> {} -> {}",
      window[0].event_type, window[1].event_type, window[2].event_type
    );
    match sequences.iter_mut().find(|s| s.sequence == key) {
      Some(s) => s.count += 1,
      None => sequences.push(SequencePattern {
        sequence: key,
        count: 1,
      }),
    }
  }

  sequences.sort_by(|a, b| b.count.cmp(&a.count));
  sequences.truncate(limit);
  sequences
}

/// Distinct event types, first-occurrence order.
fn distinct_types(events: &[ActivityEvent]) -> Vec<String> {
  let mut types: Vec<String> = Vec::new();
  for event in events {
    if !types.iter().any(|t| t == &event.event_type) {
      types.push(event.event_type.clone());
    }
  }
  types
}
