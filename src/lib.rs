//! Activity Correlation Engine — deterministic, rule-based.
//!
//! Ingests normalized activity events from collaboration tools (GitHub, Jira,
//! Slack), cross-references them through extracted issue keys, detects
//! blockers (explicit reports + stale PRs), and mines per-user workflow
//! patterns (transition frequencies, peak hours, recurring sequences).
//!
//! No AI, no DB, no network; pure computation over an event snapshot.

pub mod blockers;
pub mod config;
pub mod correlate;
pub mod error;
pub mod keys;
pub mod normalize;
pub mod service;
pub mod store;
pub mod types;
pub mod workflow;

pub use config::Config;
pub use error::EngineError;
pub use service::CorrelationService;
pub use store::{EventQuery, EventStore, InMemoryStore, StoreError};
pub use types::{ActivityEvent, CorrelationReport, InboundActivity, WorkflowReport};
