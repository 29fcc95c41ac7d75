//! Cross-system correlation: commits/PRs/chat linked to issue-tracker items.
//!
//! Matching is literal — extracted issue keys and `#<number>` PR tokens —
//! and fully deterministic: source events are walked in fetched (time)
//! order, matches in scan order. Same snapshot in, same report out.

use chrono::{DateTime, Duration, Utc};

use crate::error::EngineError;
use crate::keys::KeyExtractor;
use crate::store::{EventQuery, EventStore};
use crate::types::{
  ActivityEvent, Correlation, CorrelationKind, CorrelationReport, CorrelationSummary, EventRef,
};

pub struct CorrelationEngine<'a> {
  store: &'a dyn EventStore,
  keys: KeyExtractor,
}

impl<'a> CorrelationEngine<'a> {
  pub fn new(store: &'a dyn EventStore) -> Self {
    Self {
      store,
      keys: KeyExtractor::new(),
    }
  }

  /// Correlate a user's activity over the trailing `days` window, as of
  /// `now`. One store fetch; the snapshot is shared by every step so the
  /// summary counts always agree with the correlation list.
  pub fn correlate(
    &self,
    user_id: &str,
    days: u32,
    now: DateTime<Utc>,
  ) -> Result<CorrelationReport, EngineError> {
    let window_start = now - Duration::days(i64::from(days));
    let events = self
      .store
      .query(&EventQuery::for_user(user_id).created_after(window_start))?;

    // Partition the snapshot. Code events are GitHub commits and pr_*;
    // issue events are anything from Jira plus issue_* from any system
    // (GitHub issues correlate the same way Jira tickets do).
    let commits: Vec<&ActivityEvent> = events
      .iter()
      .filter(|e| e.source_system == "github" && e.event_type == "commit")
      .collect();
    let prs: Vec<&ActivityEvent> = events
      .iter()
      .filter(|e| e.source_system == "github" && e.is_pr())
      .collect();
    let issues: Vec<&ActivityEvent> = events
      .iter()
      .filter(|e| e.source_system == "jira" || e.is_issue())
      .collect();
    let chats: Vec<&ActivityEvent> = events
      .iter()
      .filter(|e| e.source_system == "slack")
      .collect();

    let mut correlations = Vec::new();

    for commit in &commits {
      self.link_to_issues(commit, &issues, CorrelationKind::CommitToIssue, &mut correlations);
    }
    for pr in &prs {
      self.link_to_issues(pr, &issues, CorrelationKind::PrToIssue, &mut correlations);
    }
    for chat in &chats {
      let text = chat.description.as_str();
      if mentions_pull_request(text) {
        for pr in &prs {
          if let Some(number) = pr_number(pr) {
            let token = format!("#{}", number);
            if text.contains(&token) {
              correlations.push(Correlation {
                kind: CorrelationKind::SlackToPr,
                source: chat.to_ref(),
                related: vec![pr.to_ref()],
                matched_key: token,
              });
            }
          }
        }
      }
      // Issue references are checked regardless of the PR gate above.
      for key in self.keys.extract(text) {
        let related = matching_issues(&key, &issues);
        if !related.is_empty() {
          correlations.push(Correlation {
            kind: CorrelationKind::SlackToIssue,
            source: chat.to_ref(),
            related,
            matched_key: key,
          });
        }
      }
    }

    let summary = CorrelationSummary {
      user_id: user_id.to_string(),
      period_days: days,
      total_activities: events.len(),
      github_activities: events.iter().filter(|e| e.source_system == "github").count(),
      jira_activities: events.iter().filter(|e| e.source_system == "jira").count(),
      slack_activities: events.iter().filter(|e| e.source_system == "slack").count(),
      correlation_count: correlations.len(),
    };

    Ok(CorrelationReport {
      summary,
      correlations,
    })
  }

  /// Extract issue keys from the event's title, falling back to its
  /// description only when the title yields none, then emit one correlation
  /// per key that matches at least one issue event.
  fn link_to_issues(
    &self,
    source: &ActivityEvent,
    issues: &[&ActivityEvent],
    kind: CorrelationKind,
    out: &mut Vec<Correlation>,
  ) {
    let mut keys = self.keys.extract(&source.title);
    if keys.is_empty() {
      keys = self.keys.extract(&source.description);
    }

    for key in keys {
      let related = matching_issues(&key, issues);
      if !related.is_empty() {
        out.push(Correlation {
          kind,
          source: source.to_ref(),
          related,
          matched_key: key,
        });
      }
    }
  }
}

/// Issues whose title or description contains the key (case-insensitive),
/// or whose source id equals it exactly. Scan order preserved.
fn matching_issues(key: &str, issues: &[&ActivityEvent]) -> Vec<EventRef> {
  let key_lower = key.to_ascii_lowercase();
  issues
    .iter()
    .filter(|issue| {
      issue.title.to_ascii_lowercase().contains(&key_lower)
        || issue.description.to_ascii_lowercase().contains(&key_lower)
        || issue.source_id == key
    })
    .map(|issue| issue.to_ref())
    .collect()
}

/// Chat text talks about a PR: the phrase "pull request" anywhere, or "pr"
/// as a standalone token ("the PR is up" yes, "deprecated" no).
fn mentions_pull_request(text: &str) -> bool {
  if text.to_ascii_lowercase().contains("pull request") {
    return true;
  }
  text
    .split(|c: char| !c.is_ascii_alphanumeric())
    .any(|token| token.eq_ignore_ascii_case("pr"))
}

/// PR number from event metadata, tolerating both numeric and string JSON.
fn pr_number(event: &ActivityEvent) -> Option<String> {
  match event.metadata.get("pr_number")? {
    serde_json::Value::Number(n) => Some(n.to_string()),
    serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
    _ => None,
  }
}
