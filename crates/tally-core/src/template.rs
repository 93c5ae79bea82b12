//! Score templates — reusable presets for common adjustments.

use serde::{Deserialize, Serialize};

use crate::{
  Result,
  error::{optional_text, require_text},
};

pub type TemplateId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTemplate {
  pub id:       TemplateId,
  pub name:     String,
  /// Suggested signed delta.
  pub value:    i64,
  pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTemplate {
  pub name:     String,
  pub value:    i64,
  #[serde(default)]
  pub category: String,
}

impl NewTemplate {
  pub fn new(name: impl Into<String>, value: i64, category: impl Into<String>) -> Self {
    Self { name: name.into(), value, category: category.into() }
  }

  pub fn validated(self) -> Result<Self> {
    Ok(Self {
      name:     require_text("name", self.name)?,
      value:    self.value,
      category: self.category.trim().to_owned(),
    })
  }
}

/// Partial update; missing fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplatePatch {
  pub name:     Option<String>,
  pub value:    Option<i64>,
  pub category: Option<String>,
}

impl TemplatePatch {
  pub fn apply_to(self, template: &mut ScoreTemplate) {
    if let Some(name) = optional_text(self.name) {
      template.name = name;
    }
    if let Some(value) = self.value {
      template.value = value;
    }
    if let Some(category) = self.category {
      template.category = category.trim().to_owned();
    }
  }
}
