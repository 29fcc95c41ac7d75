//! Structured error types for the activity engine.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum EngineError {
  /// Correlation and workflow analysis are per-user; a blank user id has no
  /// meaningful answer.
  #[error("user id required")]
  MissingUserId,

  /// Caller-supplied lookback window is zero or exceeds the configured cap.
  #[error("window of {days} days out of range (1..={max})")]
  WindowOutOfRange { days: u32, max: u32 },

  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },

  /// Event Store failure, propagated verbatim. Never substituted with an
  /// empty result: empty-on-error would be indistinguishable from a
  /// genuinely quiet window.
  #[error("event store: {0}")]
  Store(#[from] StoreError),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),
}

impl EngineError {
  pub fn validation(field: &str, reason: &str) -> Self {
    Self::Validation {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }
}
