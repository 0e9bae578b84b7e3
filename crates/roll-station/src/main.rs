//! roll-station binary.
//!
//! Reads `roll.toml` (or the path specified with `--config`), opens the
//! SQLite store, and then either serves the JSON API over HTTP or, with
//! `--scan`, checks in one payload per line read from stdin.
//!
//! # Printing a payload
//!
//! ```
//! cargo run -p roll-station -- --issue 202434565 IG234
//! ```

use std::{io, path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use roll_core::{CheckIn, payload, scan::LineScanner};
use roll_station::{StationConfig, expand_tilde, run_scanner};
use roll_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Roll attendance check-in station")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "roll.toml")]
  config: PathBuf,

  /// Read scanned payloads from stdin instead of serving HTTP.
  #[arg(long)]
  scan: bool,

  /// Print a fresh attendance payload for SUBJECT in CONTEXT and exit.
  #[arg(long, num_args = 2, value_names = ["SUBJECT", "CONTEXT"], conflicts_with = "scan")]
  issue: Option<Vec<String>>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr so `--scan` and `--issue` output stays clean.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();

  // Helper mode: print a payload and exit.
  if let Some(codes) = cli.issue.as_deref() {
    let [subject, context] = codes else {
      anyhow::bail!("--issue takes a subject code and a context code");
    };
    let text = payload::issue_attendance(subject, context, chrono::Utc::now().timestamp_millis())
      .context("cannot encode payload")?;
    println!("{text}");
    return Ok(());
  }

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("ROLL"))
    .build()
    .context("failed to read config file")?;

  let station_cfg: StationConfig = settings
    .try_deserialize()
    .context("failed to deserialise StationConfig")?;

  let store_path = expand_tilde(&station_cfg.store_path);
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if cli.scan {
    let checkin = CheckIn::with_policy(&store, station_cfg.policy());
    let mut source = LineScanner::new(io::stdin().lock());
    tracing::info!("waiting for scans on stdin");
    run_scanner(
      &checkin,
      &mut source,
      || chrono::Utc::now().timestamp_millis(),
      &mut io::stdout(),
    )
    .await
    .context("failed to write scan result")?;
    return Ok(());
  }

  let app = roll_api::api_router(Arc::new(store), station_cfg.policy());
  let address = format!("{}:{}", station_cfg.host, station_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
