//! Blocker detection: explicit reports + stale-PR heuristic.

use chrono::{DateTime, Duration, Utc};

use crate::config::Config;
use crate::error::EngineError;
use crate::store::{EventQuery, EventStore};
use crate::types::{Blocker, BlockerKind};

/// Flags stalled work for one user.
///
/// The stale-PR check is deliberately naive: a `pr_create` older than the
/// threshold is reported every run, even if the PR was since reviewed or
/// merged. Resolution state lives in the source system, not in the event
/// stream, so checking it would require a connector round-trip this engine
/// does not make. Known limitation, kept on purpose.
pub struct BlockerDetector<'a> {
  store: &'a dyn EventStore,
  config: &'a Config,
}

impl<'a> BlockerDetector<'a> {
  pub fn new(store: &'a dyn EventStore, config: &'a Config) -> Self {
    Self { store, config }
  }

  /// Blockers for `user_id` as of `now`: reported blockers first, then
  /// stale PRs, each group in store (creation-time) order. No result cap;
  /// callers truncate for display.
  pub fn detect(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<Blocker>, EngineError> {
    let mut blockers = Vec::new();

    let reported_since = now - Duration::days(self.config.reported_blocker_days);
    let reported = self.store.query(
      &EventQuery::for_user(user_id)
        .event_type_prefix("blocker")
        .created_after(reported_since),
    )?;
    for event in &reported {
      blockers.push(Blocker {
        kind: BlockerKind::Reported,
        title: event.title.clone(),
        description: event.description.clone(),
        created_at: event.created_at,
      });
    }

    let stale_cutoff = now - Duration::days(self.config.stale_pr_days);
    let stale_prs = self.store.query(
      &EventQuery::for_user(user_id)
        .event_type_prefix("pr_create")
        .created_before(stale_cutoff),
    )?;
    for pr in &stale_prs {
      blockers.push(Blocker {
        kind: BlockerKind::StalePr,
        title: format!("PR waiting: {}", pr.title),
        description: format!(
          "This PR has been waiting for review for more than {} days",
          self.config.stale_pr_days
        ),
        created_at: pr.created_at,
      });
    }

    Ok(blockers)
  }
}
