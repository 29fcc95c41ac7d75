//! Orchestrates correlation, workflow mining, and blocker detection.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::blockers::BlockerDetector;
use crate::config::Config;
use crate::correlate::CorrelationEngine;
use crate::error::EngineError;
use crate::store::EventStore;
use crate::types::{Blocker, CorrelationReport, WorkflowReport};
use crate::workflow::WorkflowPatternMiner;

/// Request-scoped facade over the analysis engines. Holds only the injected
/// store and config; every call builds its collaborators and aggregation
/// state fresh, so concurrent calls (same user or not) share nothing
/// mutable.
pub struct CorrelationService {
  store: Arc<dyn EventStore>,
  config: Config,
}

impl CorrelationService {
  pub fn new(store: Arc<dyn EventStore>, config: Config) -> Self {
    Self { store, config }
  }

  pub fn with_defaults(store: Arc<dyn EventStore>) -> Self {
    Self::new(store, Config::default())
  }

  /// Cross-system correlations for `user_id` over the trailing `days`.
  pub fn correlations(&self, user_id: &str, days: u32) -> Result<CorrelationReport, EngineError> {
    self.check_user(user_id)?;
    self.check_window(days)?;
    debug!(user_id, days, "correlating activities");

    let engine = CorrelationEngine::new(self.store.as_ref());
    engine.correlate(user_id, days, Utc::now())
  }

  /// Workflow patterns for `user_id` over the trailing `days`.
  pub fn workflow(&self, user_id: &str, days: u32) -> Result<WorkflowReport, EngineError> {
    self.check_user(user_id)?;
    self.check_window(days)?;
    debug!(user_id, days, "mining workflow patterns");

    let miner = WorkflowPatternMiner::new(self.store.as_ref(), &self.config);
    miner.analyze(user_id, days, Utc::now())
  }

  /// Current blockers for `user_id`.
  pub fn blockers(&self, user_id: &str) -> Result<Vec<Blocker>, EngineError> {
    self.check_user(user_id)?;
    debug!(user_id, "detecting blockers");

    let detector = BlockerDetector::new(self.store.as_ref(), &self.config);
    detector.detect(user_id, Utc::now())
  }

  fn check_user(&self, user_id: &str) -> Result<(), EngineError> {
    if user_id.trim().is_empty() {
      return Err(EngineError::MissingUserId);
    }
    Ok(())
  }

  fn check_window(&self, days: u32) -> Result<(), EngineError> {
    if days == 0 || days > self.config.max_window_days {
      return Err(EngineError::WindowOutOfRange {
        days,
        max: self.config.max_window_days,
      });
    }
    Ok(())
  }
}
