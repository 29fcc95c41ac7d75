//! Engine configuration with sane defaults.

/// Tunable thresholds for correlation, blocker detection, and pattern mining.
#[derive(Debug, Clone)]
pub struct Config {
  /// Lookback for explicit `blocker` events, in days.
  pub reported_blocker_days: i64,
  /// A `pr_create` this many days old (or older) counts as a stale PR.
  pub stale_pr_days: i64,
  /// Max gap between consecutive events to count as a transition (inclusive).
  pub transition_max_gap_hours: f64,
  /// How many transition groups to report.
  pub top_transitions: usize,
  /// How many peak hours to report.
  pub top_peak_hours: usize,
  /// How many recurring sequences to report.
  pub top_sequences: usize,
  /// Upper bound on the caller-supplied lookback window, in days. Guards
  /// against unbounded fetches blowing up the in-memory computation.
  pub max_window_days: u32,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      reported_blocker_days: 3,
      stale_pr_days: 2,
      transition_max_gap_hours: 24.0,
      top_transitions: 5,
      top_peak_hours: 3,
      top_sequences: 3,
      max_window_days: 365,
    }
  }
}
