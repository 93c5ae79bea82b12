//! Rank tiers and rank resolution.
//!
//! A [`RankLadder`] holds the configured tiers sorted by threshold. Resolving
//! a score against it yields the tier the score has reached and the next tier
//! above it. Resolution is pure and cheap, so it is recomputed on every read
//! rather than stored.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  error::{optional_text, require_text},
};

pub type RankId = i64;

// ─── Tiers ───────────────────────────────────────────────────────────────────

/// A named band of scores starting at `min_score`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankTier {
  pub id:         RankId,
  pub name:       String,
  /// Inclusive lower bound. Distinct across tiers.
  pub min_score:  i64,
  /// CSS colour, e.g. `#CD7F32`.
  pub color:      String,
  pub icon:       String,
  pub sort_order: i64,
}

/// Input for creating a tier. When `sort_order` is omitted the store appends
/// the tier after the current highest sort order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRankTier {
  pub name:       String,
  pub min_score:  i64,
  #[serde(default)]
  pub color:      String,
  #[serde(default)]
  pub icon:       String,
  #[serde(default)]
  pub sort_order: Option<i64>,
}

impl NewRankTier {
  pub fn validated(self) -> Result<Self> {
    check_threshold(self.min_score)?;
    Ok(Self {
      name:       require_text("name", self.name)?,
      min_score:  self.min_score,
      color:      self.color.trim().to_owned(),
      icon:       self.icon.trim().to_owned(),
      sort_order: self.sort_order,
    })
  }
}

/// Partial update; missing fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankPatch {
  pub name:       Option<String>,
  pub min_score:  Option<i64>,
  pub color:      Option<String>,
  pub icon:       Option<String>,
  pub sort_order: Option<i64>,
}

impl RankPatch {
  pub fn apply_to(self, tier: &mut RankTier) -> Result<()> {
    if let Some(min_score) = self.min_score {
      check_threshold(min_score)?;
      tier.min_score = min_score;
    }
    if let Some(name) = optional_text(self.name) {
      tier.name = name;
    }
    if let Some(color) = self.color {
      tier.color = color.trim().to_owned();
    }
    if let Some(icon) = self.icon {
      tier.icon = icon.trim().to_owned();
    }
    if let Some(sort_order) = self.sort_order {
      tier.sort_order = sort_order;
    }
    Ok(())
  }
}

fn check_threshold(min_score: i64) -> Result<()> {
  if min_score < 0 {
    return Err(Error::Invalid(format!(
      "min_score must be non-negative, got {min_score}"
    )));
  }
  Ok(())
}

// ─── Ladder ──────────────────────────────────────────────────────────────────

/// The tier set, sorted ascending by `(min_score, sort_order, id)`.
#[derive(Debug, Clone, Default)]
pub struct RankLadder {
  tiers: Vec<RankTier>,
}

impl RankLadder {
  pub fn new(mut tiers: Vec<RankTier>) -> Self {
    tiers.sort_by_key(|t| (t.min_score, t.sort_order, t.id));
    Self { tiers }
  }

  /// Tiers in ascending threshold order.
  pub fn tiers(&self) -> &[RankTier] { &self.tiers }

  pub fn into_tiers(self) -> Vec<RankTier> { self.tiers }

  /// Resolve `score` against the ladder.
  ///
  /// - `current` is the tier with the largest threshold `<= score`. When two
  ///   tiers share a threshold, the later one in ladder order wins.
  /// - `next` is the tier with the smallest threshold `> score`, or `None`
  ///   once the top tier is reached. `points_needed` saturates at
  ///   `i64::MAX`, so every score resolves.
  pub fn resolve(&self, score: i64) -> RankStatus<'_> {
    let current = self.tiers.iter().rev().find(|t| t.min_score <= score);
    let next = self
      .tiers
      .iter()
      .find(|t| t.min_score > score)
      .map(|tier| NextTier { tier, points_needed: tier.min_score.saturating_sub(score) });
    RankStatus { current, next }
  }
}

/// Where a score sits on a [`RankLadder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankStatus<'a> {
  pub current: Option<&'a RankTier>,
  pub next:    Option<NextTier<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextTier<'a> {
  pub tier:          &'a RankTier,
  /// Always positive.
  pub points_needed: i64,
}

impl RankStatus<'_> {
  pub fn badge(&self) -> RankBadge {
    RankBadge {
      rank_name:       self.current.map(|t| t.name.clone()),
      rank_color:      self.current.map(|t| t.color.clone()),
      rank_icon:       self.current.map(|t| t.icon.clone()),
      next_rank:       self.next.map(|n| n.tier.name.clone()),
      next_rank_score: self.next.map(|n| n.points_needed),
    }
  }
}

/// Flattened rank fields attached to leaderboard and detail responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankBadge {
  pub rank_name:       Option<String>,
  pub rank_color:      Option<String>,
  pub rank_icon:       Option<String>,
  /// Name of the next tier; `None` at the top tier.
  pub next_rank:       Option<String>,
  /// Points still needed to reach `next_rank`.
  pub next_rank_score: Option<i64>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tier(id: RankId, min_score: i64, name: &str) -> RankTier {
    RankTier {
      id,
      name: name.into(),
      min_score,
      color: "#000000".into(),
      icon: String::new(),
      sort_order: id,
    }
  }

  fn ladder() -> RankLadder {
    // Deliberately out of order; the ladder sorts on construction.
    RankLadder::new(vec![
      tier(3, 50, "白银"),
      tier(1, 0, "学徒"),
      tier(2, 20, "青铜"),
    ])
  }

  #[test]
  fn mid_ladder_score() {
    let l = ladder();
    let status = l.resolve(35);
    assert_eq!(status.current.unwrap().name, "青铜");
    let next = status.next.unwrap();
    assert_eq!(next.tier.name, "白银");
    assert_eq!(next.points_needed, 15);
  }

  #[test]
  fn zero_score_sits_on_floor_tier() {
    let l = ladder();
    let status = l.resolve(0);
    assert_eq!(status.current.unwrap().name, "学徒");
    assert_eq!(status.next.unwrap().tier.name, "青铜");
    assert_eq!(status.next.unwrap().points_needed, 20);
  }

  #[test]
  fn exact_threshold_reaches_tier() {
    let l = ladder();
    let status = l.resolve(20);
    assert_eq!(status.current.unwrap().name, "青铜");
    assert_eq!(status.next.unwrap().points_needed, 30);
  }

  #[test]
  fn top_tier_has_no_next() {
    let l = ladder();
    let status = l.resolve(1000);
    assert_eq!(status.current.unwrap().name, "白银");
    assert!(status.next.is_none());
  }

  #[test]
  fn extreme_scores_resolve() {
    let l = ladder();

    let low = l.resolve(i64::MIN);
    assert!(low.current.is_none());
    let next = low.next.unwrap();
    assert_eq!(next.tier.name, "学徒");
    assert_eq!(next.points_needed, i64::MAX);

    let high = l.resolve(i64::MAX);
    assert_eq!(high.current.unwrap().name, "白银");
    assert!(high.next.is_none());

    let badge = l.resolve(i64::MIN + 1).badge();
    assert_eq!(badge.rank_name, None);
    assert!(badge.next_rank_score.unwrap() > 0);
  }

  #[test]
  fn negative_score_has_no_current_tier() {
    let l = ladder();
    let status = l.resolve(-3);
    assert!(status.current.is_none());
    assert_eq!(status.next.unwrap().tier.name, "学徒");
    assert_eq!(status.next.unwrap().points_needed, 3);
  }

  #[test]
  fn empty_ladder_resolves_to_nothing() {
    let l = RankLadder::default();
    let status = l.resolve(42);
    assert!(status.current.is_none());
    assert!(status.next.is_none());
    assert_eq!(status.badge(), RankBadge::default());
  }

  #[test]
  fn resolution_matches_brute_force_over_range() {
    let l = ladder();
    for score in 0..=120 {
      let status = l.resolve(score);
      let expected_current = l
        .tiers()
        .iter()
        .filter(|t| t.min_score <= score)
        .map(|t| t.min_score)
        .max();
      let expected_next = l
        .tiers()
        .iter()
        .filter(|t| t.min_score > score)
        .map(|t| t.min_score)
        .min();
      assert_eq!(status.current.map(|t| t.min_score), expected_current);
      assert_eq!(status.next.map(|n| n.tier.min_score), expected_next);
      if let Some(n) = status.next {
        assert!(n.points_needed > 0);
      }
    }
  }

  #[test]
  fn badge_flattens_status() {
    let l = ladder();
    let badge = l.resolve(35).badge();
    assert_eq!(badge.rank_name.as_deref(), Some("青铜"));
    assert_eq!(badge.rank_color.as_deref(), Some("#000000"));
    assert_eq!(badge.next_rank.as_deref(), Some("白银"));
    assert_eq!(badge.next_rank_score, Some(15));
  }

  #[test]
  fn negative_threshold_is_rejected() {
    let input = NewRankTier {
      name:       "Below".into(),
      min_score:  -1,
      color:      String::new(),
      icon:       String::new(),
      sort_order: None,
    };
    assert!(input.validated().is_err());

    let mut t = tier(1, 0, "学徒");
    let patch = RankPatch { min_score: Some(-5), ..Default::default() };
    assert!(patch.apply_to(&mut t).is_err());
    assert_eq!(t.min_score, 0);
  }
}
