//! Issue-key extraction from free text.

use regex::Regex;

/// Pulls issue-tracker keys (`PROJ-123` shape) out of free text.
pub struct KeyExtractor {
  key_regex: Regex,
}

impl KeyExtractor {
  pub fn new() -> Self {
    Self {
      // Uppercase letters, hyphen, digits. Case-sensitive on purpose:
      // "proj-123" is prose, not a key.
      key_regex: Regex::new(r"[A-Z]+-[0-9]+").unwrap(),
    }
  }

  /// All key-shaped substrings in first-occurrence order. Duplicates are
  /// preserved; callers dedupe if they need to. Empty input yields an
  /// empty vec, never an error.
  pub fn extract(&self, text: &str) -> Vec<String> {
    self
      .key_regex
      .find_iter(text)
      .map(|m| m.as_str().to_string())
      .collect()
  }
}

impl Default for KeyExtractor {
  fn default() -> Self {
    Self::new()
  }
}
