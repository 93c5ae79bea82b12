//! Read models combining students with their rank badges.
//!
//! Never stored, always derived.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{
  rank::{RankBadge, RankLadder},
  record::ScoreRecord,
  student::Student,
};

/// One row of the leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
  #[serde(flatten)]
  pub student: Student,
  /// 1-based position in leaderboard order.
  pub ranking: i64,
  #[serde(flatten)]
  pub badge:   RankBadge,
}

/// Leaderboard order: score descending, then student number ascending.
pub fn standing_order(a: &Student, b: &Student) -> Ordering {
  b.score
    .cmp(&a.score)
    .then_with(|| a.student_no.cmp(&b.student_no))
}

/// Sort `students` into leaderboard order and attach positions and badges.
pub fn leaderboard(mut students: Vec<Student>, ladder: &RankLadder) -> Vec<LeaderboardEntry> {
  students.sort_by(standing_order);
  students
    .into_iter()
    .zip(1i64..)
    .map(|(student, ranking)| {
      let badge = ladder.resolve(student.score).badge();
      LeaderboardEntry { student, ranking, badge }
    })
    .collect()
}

/// The detail view of a single student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentDetail {
  pub student: Student,
  /// Most recent records first.
  pub records: Vec<ScoreRecord>,
  /// Number of students with a strictly higher score, plus one. Tied
  /// students therefore share a ranking here, unlike the leaderboard.
  pub ranking: i64,
  #[serde(flatten)]
  pub badge:   RankBadge,
}

impl StudentDetail {
  pub fn assemble(
    student: Student,
    records: Vec<ScoreRecord>,
    students_above: i64,
    ladder: &RankLadder,
  ) -> Self {
    let badge = ladder.resolve(student.score).badge();
    Self { student, records, ranking: students_above + 1, badge }
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::rank::RankTier;

  fn student(id: i64, no: &str, score: i64) -> Student {
    let now = Utc::now();
    Student {
      id,
      student_no: no.into(),
      name: format!("student {no}"),
      score,
      created_at: now,
      updated_at: now,
    }
  }

  fn ladder() -> RankLadder {
    let tier = |id, min_score, name: &str| RankTier {
      id,
      name: name.into(),
      min_score,
      color: String::new(),
      icon: String::new(),
      sort_order: id,
    };
    RankLadder::new(vec![tier(1, 0, "学徒"), tier(2, 20, "青铜"), tier(3, 50, "白银")])
  }

  #[test]
  fn sorted_by_score_then_student_no() {
    let board = leaderboard(
      vec![
        student(1, "03", 10),
        student(2, "01", 10),
        student(3, "02", 40),
        student(4, "04", 0),
      ],
      &ladder(),
    );
    let order: Vec<_> = board.iter().map(|e| e.student.student_no.as_str()).collect();
    assert_eq!(order, ["02", "01", "03", "04"]);
    let rankings: Vec<_> = board.iter().map(|e| e.ranking).collect();
    assert_eq!(rankings, [1, 2, 3, 4]);
  }

  #[test]
  fn entries_carry_badges() {
    let board = leaderboard(vec![student(1, "01", 35)], &ladder());
    assert_eq!(board[0].badge.rank_name.as_deref(), Some("青铜"));
    assert_eq!(board[0].badge.next_rank_score, Some(15));
  }

  #[test]
  fn entry_serialises_flat() {
    let board = leaderboard(vec![student(7, "07", 55)], &ladder());
    let json = serde_json::to_value(&board[0]).unwrap();
    assert_eq!(json["id"], 7);
    assert_eq!(json["ranking"], 1);
    assert_eq!(json["rank_name"], "白银");
    assert!(json["next_rank"].is_null());
  }

  #[test]
  fn detail_ranking_counts_strictly_higher() {
    let detail = StudentDetail::assemble(student(1, "01", 20), vec![], 3, &ladder());
    assert_eq!(detail.ranking, 4);
    assert_eq!(detail.badge.rank_name.as_deref(), Some("青铜"));
  }
}
