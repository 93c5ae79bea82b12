//! Aggregate statistics for the admin dashboard.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStat {
  pub category: String,
  /// Number of records in the category.
  pub count:    i64,
  /// Sum of record values in the category.
  pub total:    i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
  pub total_students: i64,
  pub total_records:  i64,
  pub category_stats: Vec<CategoryStat>,
}
