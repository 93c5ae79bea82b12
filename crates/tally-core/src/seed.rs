//! Built-in tiers and templates installed into a fresh store.

use serde::{Deserialize, Serialize};

use crate::{rank::NewRankTier, template::NewTemplate};

/// How rank tiers are seeded when a store is opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankSeed {
  /// Install the defaults only when the tier table is empty.
  #[default]
  SeedOnce,
  /// Replace every tier with the defaults, discarding customisations.
  Reset,
}

/// `(name, min_score, color, icon)` in ascending order.
const DEFAULT_TIERS: [(&str, i64, &str, &str); 10] = [
  ("学徒", 0, "#9CA3AF", "🌱"),
  ("青铜", 20, "#CD7F32", "🥉"),
  ("白银", 50, "#A8A9AD", "🥈"),
  ("黄金", 100, "#FFD700", "🏅"),
  ("铂金", 180, "#00CED1", "💠"),
  ("钻石", 280, "#B9F2FF", "💎"),
  ("大师", 400, "#9400D3", "🔮"),
  ("宗师", 550, "#FF6B6B", "⭐"),
  ("王者", 750, "#FF4500", "👑"),
  ("传奇", 1000, "#FFD700", "🏆"),
];

const DEFAULT_TEMPLATES: [(&str, i64, &str); 7] = [
  ("回答问题", 2, "课堂表现"),
  ("作业优秀", 3, "作业"),
  ("考试进步", 5, "考试"),
  ("帮助同学", 2, "品德"),
  ("迟到", -1, "纪律"),
  ("未交作业", -2, "作业"),
  ("课堂违纪", -2, "纪律"),
];

pub fn default_rank_tiers() -> Vec<NewRankTier> {
  DEFAULT_TIERS
    .iter()
    .zip(1i64..)
    .map(|(&(name, min_score, color, icon), sort_order)| NewRankTier {
      name: name.to_owned(),
      min_score,
      color: color.to_owned(),
      icon: icon.to_owned(),
      sort_order: Some(sort_order),
    })
    .collect()
}

pub fn default_templates() -> Vec<NewTemplate> {
  DEFAULT_TEMPLATES
    .iter()
    .map(|&(name, value, category)| NewTemplate::new(name, value, category))
    .collect()
}
