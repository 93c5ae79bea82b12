//! `tally` — command-line client for the Tally point tracker.
//!
//! # Usage
//!
//! ```text
//! tally leaderboard
//! tally --password admin123 adjust 4 +2 --reason 回答问题 --category 课堂表现
//! tally --config ~/.config/tally/config.toml import roster.csv
//! ```

mod client;
mod output;
mod roster;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use serde::Deserialize;
use tally_core::{
  record::{RecordId, ScoreAdjustment},
  student::StudentId,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "tally", about = "Command-line client for the Tally point tracker")]
struct Args {
  /// Path to a TOML config file (url, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the tally server (default: http://localhost:8080).
  #[arg(long, env = "TALLY_URL")]
  url: Option<String>,

  /// Admin password, required for commands that change data.
  #[arg(long, env = "TALLY_ADMIN_PASSWORD", hide_env_values = true)]
  password: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Show the leaderboard.
  Leaderboard {
    /// Only show the top N students.
    #[arg(short = 'n', long)]
    top: Option<usize>,
  },
  /// Show one student with their recent records.
  Show { id: StudentId },
  /// Find students by name or student number.
  Search { keyword: String },
  /// Add (or subtract) points for one student.
  Adjust {
    student_id: StudentId,
    #[arg(allow_negative_numbers = true)]
    value:      i64,
    #[arg(long, default_value = "")]
    reason:     String,
    #[arg(long, default_value = "")]
    category:   String,
  },
  /// Apply the same adjustment to several students.
  BatchAdjust {
    #[arg(allow_negative_numbers = true)]
    value:    i64,
    #[arg(required = true)]
    ids:      Vec<StudentId>,
    #[arg(long, default_value = "")]
    reason:   String,
    #[arg(long, default_value = "")]
    category: String,
  },
  /// Undo a score record, reversing its points.
  Undo { record_id: RecordId },
  /// Create students from a `student_no,name` file.
  Import { file: PathBuf },
  /// Show record statistics by category.
  Stats,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  password: String,
}

fn api_config(args: &Args) -> Result<ApiConfig> {
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  Ok(ApiConfig {
    base_url: args
      .url
      .clone()
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
    password: args
      .password
      .clone()
      .or_else(|| (!file_cfg.password.is_empty()).then(|| file_cfg.password.clone()))
      .unwrap_or_default(),
  })
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();
  let client = ApiClient::new(api_config(&args)?)?;

  match args.command {
    Command::Leaderboard { top } => {
      let mut entries = client.leaderboard().await?;
      if let Some(n) = top {
        entries.truncate(n);
      }
      print!("{}", output::leaderboard(&entries));
    }
    Command::Show { id } => {
      let detail = client.student(id).await?;
      print!("{}", output::detail(&detail));
    }
    Command::Search { keyword } => {
      let students = client.search(&keyword).await?;
      print!("{}", output::students(&students));
    }
    Command::Adjust { student_id, value, reason, category } => {
      let adjustment = ScoreAdjustment::new(value)
        .with_reason(reason)
        .with_category(category);
      let adjusted = client.adjust(student_id, &adjustment).await?;
      println!(
        "record #{} applied; student {student_id} now has {} points",
        adjusted.data.id, adjusted.new_score
      );
    }
    Command::BatchAdjust { value, ids, reason, category } => {
      let adjustment = ScoreAdjustment::new(value)
        .with_reason(reason)
        .with_category(category);
      let outcome = client.batch_adjust(&ids, &adjustment).await?;
      print!("{}", output::batch(&outcome.data));
      println!("{} applied, {} skipped", outcome.applied, outcome.skipped);
    }
    Command::Undo { record_id } => {
      let undone = client.undo(record_id).await?;
      println!("record #{record_id} undone; new score {}", undone.new_score);
    }
    Command::Import { file } => {
      let text = std::fs::read_to_string(&file)
        .with_context(|| format!("reading roster {}", file.display()))?;
      let students = roster::parse(&text)
        .with_context(|| format!("parsing roster {}", file.display()))?;
      let created = client.import(&students).await?;
      println!("imported {} students", created.len());
    }
    Command::Stats => {
      let stats = client.statistics().await?;
      print!("{}", output::statistics(&stats));
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory as _;

  use super::*;

  #[test]
  fn args_are_well_formed() { Args::command().debug_assert(); }

  #[test]
  fn negative_values_parse() {
    let args = Args::try_parse_from(["tally", "adjust", "4", "-2", "--reason", "迟到"]).unwrap();
    match args.command {
      Command::Adjust { student_id, value, reason, .. } => {
        assert_eq!((student_id, value), (4, -2));
        assert_eq!(reason, "迟到");
      }
      other => panic!("unexpected command {other:?}"),
    }

    let args = Args::try_parse_from(["tally", "batch-adjust", "-1", "1", "2", "3"]).unwrap();
    assert!(matches!(args.command, Command::BatchAdjust { value: -1, ref ids, .. } if ids == &[1, 2, 3]));
  }

  #[test]
  fn flags_override_config_file() {
    let path = std::env::temp_dir().join(format!("tally-cli-{}.toml", std::process::id()));
    std::fs::write(&path, "url = \"http://school:9000\"\npassword = \"from-file\"\n").unwrap();

    let args = Args::try_parse_from([
      "tally",
      "--config",
      path.to_str().unwrap(),
      "--password",
      "from-flag",
      "stats",
    ])
    .unwrap();
    let cfg = api_config(&args).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(cfg.base_url, "http://school:9000");
    assert_eq!(cfg.password, "from-flag");
  }
}
