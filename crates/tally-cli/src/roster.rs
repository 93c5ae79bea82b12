//! Parsing of roster files for `tally import`.
//!
//! One student per line as `student_no,name`. Blank lines and lines starting
//! with `#` are ignored; surrounding whitespace is trimmed.

use anyhow::{Result, bail};
use tally_core::student::NewStudent;

pub fn parse(text: &str) -> Result<Vec<NewStudent>> {
  let mut students = Vec::new();
  for (index, line) in text.lines().enumerate() {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
      continue;
    }
    let Some((no, name)) = line.split_once(',') else {
      bail!("line {}: expected `student_no,name`, got {line:?}", index + 1);
    };
    let (no, name) = (no.trim(), name.trim());
    if no.is_empty() || name.is_empty() {
      bail!("line {}: student number and name must both be present", index + 1);
    }
    students.push(NewStudent::new(no, name));
  }
  if students.is_empty() {
    bail!("roster contains no students");
  }
  Ok(students)
}
