//! Normalize inbound activities into canonical internal models.

use chrono::{DateTime, Utc};

use crate::error::EngineError;
use crate::types::{InboundActivity, NewActivity};

/// Parse and validate an InboundActivity into a canonical NewActivity.
///
/// `description`, `source_id`, and `metadata` may be empty; everything else
/// is required. Unknown event types and source systems pass through — the
/// vocabulary is open-ended and aggregation tolerates extensions.
pub fn normalize(raw: &InboundActivity) -> Result<NewActivity, EngineError> {
  let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&raw.created_at)
    .map_err(|e| EngineError::validation("created_at", &format!("invalid RFC3339: {}", e)))?
    .with_timezone(&Utc);

  if raw.user_id.is_empty() {
    return Err(EngineError::validation("user_id", "must not be empty"));
  }
  if raw.event_type.is_empty() {
    return Err(EngineError::validation("event_type", "must not be empty"));
  }
  if raw.title.is_empty() {
    return Err(EngineError::validation("title", "must not be empty"));
  }
  if raw.source_system.is_empty() {
    return Err(EngineError::validation("source_system", "must not be empty"));
  }

  Ok(NewActivity {
    user_id: raw.user_id.clone(),
    event_type: raw.event_type.clone(),
    title: raw.title.clone(),
    description: raw.description.clone(),
    metadata: raw.metadata.clone(),
    source_system: raw.source_system.to_ascii_lowercase(),
    source_id: raw.source_id.clone(),
    created_at,
  })
}
