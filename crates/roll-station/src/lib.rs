//! Check-in station: configuration and the scan loop.
//!
//! A station either serves the HTTP API or reads scans from a local source
//! (a keyboard-wedge scanner on stdin) and checks each one in directly.

use std::{
  io::Write,
  path::{Path, PathBuf},
};

use roll_core::{
  CheckIn, CheckinPolicy,
  scan::ScanSource,
  store::{AttendanceStore, ContextDirectory, SubjectDirectory},
};
use serde::Deserialize;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime station configuration, deserialised from `roll.toml` and `ROLL_*`
/// environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct StationConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  #[serde(default = "default_store_path")]
  pub store_path:         PathBuf,
  /// Course or event that badge scans are recorded against.
  #[serde(default)]
  pub station_context:    Option<String>,
  #[serde(default = "default_expiry_window_secs")]
  pub expiry_window_secs: i64,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8470 }

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/roll/roll.db") }

fn default_expiry_window_secs() -> i64 { 10 * 60 }

impl StationConfig {
  pub fn policy(&self) -> CheckinPolicy {
    CheckinPolicy {
      expiry_window_millis: self.expiry_window_secs.saturating_mul(1000),
      station_context:      self.station_context.clone(),
    }
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Scan loop ────────────────────────────────────────────────────────────────

/// Counts for one scan session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanTally {
  pub accepted: usize,
  pub rejected: usize,
  pub failed:   usize,
}

/// Check in every payload `source` yields until it is exhausted, writing one
/// operator line per scan to `out`.
///
/// A store failure ends only the scan it happened on; the operator is told
/// to scan again. `clock` supplies the scan time in Unix milliseconds.
///
/// `source.scan()` blocks the calling task between scans.
pub async fn run_scanner<S, R, W>(
  checkin: &CheckIn<'_, S>,
  source: &mut R,
  clock: impl Fn() -> i64,
  out: &mut W,
) -> std::io::Result<ScanTally>
where
  S: SubjectDirectory + ContextDirectory + AttendanceStore,
  R: ScanSource,
  W: Write,
{
  let mut tally = ScanTally::default();

  while let Some(raw) = source.scan() {
    match checkin.check_in(&raw, clock()).await {
      Ok(result) if result.is_accepted() => {
        tally.accepted += 1;
        writeln!(out, "OK    {}", result.message())?;
      }
      Ok(result) => {
        tally.rejected += 1;
        writeln!(out, "NO    {}", result.message())?;
      }
      Err(e) => {
        tally.failed += 1;
        tracing::error!(error = %e, "check-in failed");
        writeln!(out, "ERROR could not record attendance, scan again")?;
      }
    }
  }

  tracing::info!(
    accepted = tally.accepted,
    rejected = tally.rejected,
    failed = tally.failed,
    "scan source exhausted"
  );
  Ok(tally)
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use roll_core::{
    context::{ContextId, NewContext},
    scan::LineScanner,
    subject::{NewSubject, SubjectId},
  };
  use roll_store_sqlite::SqliteStore;

  use super::*;

  const NOW: i64 = 1_763_933_574_081;

  #[test]
  fn config_defaults_fill_missing_keys() {
    let cfg: StationConfig = config::Config::builder()
      .set_override("station_context", "IG234")
      .unwrap()
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(cfg.port, 8470);
    assert_eq!(cfg.expiry_window_secs, 600);

    let policy = cfg.policy();
    assert_eq!(policy.expiry_window_millis, 600_000);
    assert_eq!(policy.station_context.as_deref(), Some("IG234"));
  }

  #[test]
  fn tilde_is_expanded_only_at_start() {
    let plain = Path::new("/var/lib/roll.db");
    assert_eq!(expand_tilde(plain), plain);
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(expand_tilde(Path::new("~/roll.db")), PathBuf::from(home).join("roll.db"));
    }
  }

  #[tokio::test]
  async fn scanner_reports_each_scan() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store
      .add_subject_with_id(SubjectId(42), NewSubject::student("202434565", "Ana Quispe"))
      .await
      .unwrap();
    store
      .add_context_with_id(ContextId(1), NewContext::course("IG234", "Ingeniería de Software"))
      .await
      .unwrap();

    let code = format!("UPeU-ASIST-202434565-IG234-{}", NOW - 5_000);
    let input = format!("{code}\n{code}\ngarbage\n");
    let mut source = LineScanner::new(Cursor::new(input));
    let mut out = Vec::new();

    let checkin = CheckIn::new(&store);
    let tally = run_scanner(&checkin, &mut source, || NOW, &mut out).await.unwrap();

    assert_eq!(tally, ScanTally { accepted: 1, rejected: 2, failed: 0 });
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("OK"), "{text}");
    assert!(lines[1].contains("already recorded"), "{text}");
    assert!(lines[2].contains("not a valid"), "{text}");
  }
}
