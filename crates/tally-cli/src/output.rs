//! Plain-text rendering of API responses.

use std::fmt::Write as _;

use chrono::Local;
use tally_core::{
  leaderboard::{LeaderboardEntry, StudentDetail},
  record::{BatchItem, ScoreRecord},
  stats::Statistics,
  student::Student,
};

fn signed(value: i64) -> String { format!("{value:+}") }

fn tier(name: Option<&str>, icon: Option<&str>) -> String {
  match (name, icon) {
    (Some(name), Some(icon)) if !icon.is_empty() => format!("{icon} {name}"),
    (Some(name), _) => name.to_owned(),
    (None, _) => "-".to_owned(),
  }
}

pub fn leaderboard(entries: &[LeaderboardEntry]) -> String {
  let mut out = String::new();
  for e in entries {
    let _ = writeln!(
      out,
      "{:>3}  {:<10} {:<12} {:>6}  {}",
      e.ranking,
      e.student.student_no,
      e.student.name,
      e.student.score,
      tier(e.badge.rank_name.as_deref(), e.badge.rank_icon.as_deref()),
    );
  }
  out
}

pub fn students(students: &[Student]) -> String {
  let mut out = String::new();
  for s in students {
    let _ = writeln!(out, "{:>5}  {:<10} {:<12} {:>6}", s.id, s.student_no, s.name, s.score);
  }
  out
}

fn record_line(r: &ScoreRecord) -> String {
  format!(
    "#{:<6} {}  {:>5}  {}  {}",
    r.id,
    r.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
    signed(r.value),
    if r.category.is_empty() { "-" } else { r.category.as_str() },
    r.reason,
  )
}

pub fn detail(d: &StudentDetail) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "{} ({})  id {}", d.student.name, d.student.student_no, d.student.id);
  let _ = writeln!(out, "score    {}", d.student.score);
  let _ = writeln!(out, "ranking  {}", d.ranking);
  let _ = writeln!(
    out,
    "tier     {}",
    tier(d.badge.rank_name.as_deref(), d.badge.rank_icon.as_deref())
  );
  match (&d.badge.next_rank, d.badge.next_rank_score) {
    (Some(next), Some(points)) => {
      let _ = writeln!(out, "next     {next} in {points} points");
    }
    _ => {
      let _ = writeln!(out, "next     top tier reached");
    }
  }
  if !d.records.is_empty() {
    let _ = writeln!(out, "\nrecent records:");
    for r in &d.records {
      let _ = writeln!(out, "  {}", record_line(r));
    }
  }
  out
}

pub fn batch(items: &[BatchItem]) -> String {
  let mut out = String::new();
  for item in items {
    let _ = match item {
      BatchItem::Applied { student_id, record, new_score } => writeln!(
        out,
        "student {student_id}: {} → {new_score} (record #{})",
        signed(record.value),
        record.id
      ),
      BatchItem::Skipped { student_id, .. } => {
        writeln!(out, "student {student_id}: skipped, no such student")
      }
    };
  }
  out
}

pub fn statistics(stats: &Statistics) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "students  {}", stats.total_students);
  let _ = writeln!(out, "records   {}", stats.total_records);
  for c in &stats.category_stats {
    let category = if c.category.is_empty() { "(none)" } else { c.category.as_str() };
    let _ = writeln!(out, "  {category:<12} {:>5} records  {:>6} points", c.count, signed(c.total));
  }
  out
}
