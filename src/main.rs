//! Binary entrypoint: read activity JSON lines from stdin, print one report.
//!
//! Usage:
//!   activity-engine correlate <user_id> [days]   # cross-system correlations (default 7 days)
//!   activity-engine workflow <user_id> [days]    # workflow patterns (default 30 days)
//!   activity-engine blockers <user_id>           # reported + stale-PR blockers
//!
//! Each input line is an InboundActivity. Invalid lines produce an
//! ErrorOutput JSON line on stdout and are skipped; the report follows on
//! the final line.

use std::io::{self, BufRead, Write};
use std::process;
use std::sync::Arc;

use activity_engine::types::ErrorOutput;
use activity_engine::{
  normalize, CorrelationService, EngineError, InMemoryStore, InboundActivity,
};

fn usage() -> ! {
  eprintln!("usage: activity-engine <correlate|workflow|blockers> <user_id> [days]");
  process::exit(2);
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
    )
    .with_writer(io::stderr)
    .init();

  let args: Vec<String> = std::env::args().skip(1).collect();
  let (command, user_id) = match (args.first(), args.get(1)) {
    (Some(c), Some(u)) => (c.as_str(), u.as_str()),
    _ => usage(),
  };
  if !matches!(command, "correlate" | "workflow" | "blockers") {
    usage();
  }
  let days: u32 = match args.get(2) {
    Some(d) => d.parse().unwrap_or_else(|_| usage()),
    None => match command {
      "workflow" => 30,
      _ => 7,
    },
  };

  let store = Arc::new(InMemoryStore::new());
  let stdin = io::stdin();
  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());

  for line in stdin.lock().lines() {
    let line = match line {
      Ok(l) => l,
      Err(e) => {
        let _ = writeln!(io::stderr(), "activity-engine: read error: {}", e);
        process::exit(1);
      }
    };

    let trimmed = line.trim();
    if trimmed.is_empty() {
      continue;
    }

    let raw: InboundActivity = match serde_json::from_str(trimmed) {
      Ok(v) => v,
      Err(e) => {
        emit(&mut out, &ErrorOutput::new(format!("json parse: {}", e)));
        continue;
      }
    };

    match normalize::normalize(&raw) {
      Ok(activity) => {
        store.insert(activity);
      }
      Err(EngineError::Validation { field, reason }) => {
        emit(&mut out, &ErrorOutput::new(reason).with_field(field));
      }
      Err(e) => {
        emit(&mut out, &ErrorOutput::new(e.to_string()));
      }
    }
  }

  let service = CorrelationService::with_defaults(store);
  let result = match command {
    "correlate" => service
      .correlations(user_id, days)
      .and_then(|r| Ok(serde_json::to_string(&r)?)),
    "workflow" => service
      .workflow(user_id, days)
      .and_then(|r| Ok(serde_json::to_string(&r)?)),
    "blockers" => service
      .blockers(user_id)
      .and_then(|r| Ok(serde_json::to_string(&r)?)),
    _ => usage(),
  };

  match result {
    Ok(json) => {
      let _ = writeln!(out, "{}", json);
    }
    Err(e) => {
      emit(&mut out, &ErrorOutput::new(e.to_string()));
      let _ = out.flush();
      process::exit(1);
    }
  }

  let _ = out.flush();
}

fn emit<W: Write>(out: &mut W, error: &ErrorOutput) {
  let _ = serde_json::to_writer(&mut *out, error);
  let _ = writeln!(out);
}
