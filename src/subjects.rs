//! Canonical display order for exam subjects.
//!
//! Subjects arrive from the backend as an unordered list of plain names.
//! Known names are emitted in taxonomy order; names the taxonomy does not
//! know yet are appended in lexicographic order so new subjects still show up.

use std::collections::BTreeSet;

/// Display order of the 18 subjects, core subjects first, electives after.
pub const CANONICAL_SUBJECTS: [&str; 18] = [
  "憲法",
  "行政法",
  "民法",
  "商法",
  "民事訴訟法",
  "刑法",
  "刑事訴訟法",
  "実務基礎（民事）",
  "実務基礎（刑事）",
  "倒産法",
  "租税法",
  "経済法",
  "知的財産法",
  "労働法",
  "環境法",
  "国際関係法（公法系）",
  "国際関係法（私法系）",
  "一般教養科目",
];

/// Order `subjects` canonically. Duplicates in the input collapse to one entry.
pub fn order_subjects<I, S>(subjects: I) -> Vec<String>
where
  I: IntoIterator<Item = S>,
  S: Into<String>,
{
  let mut remaining: BTreeSet<String> = subjects.into_iter().map(Into::into).collect();
  let mut out = Vec::with_capacity(remaining.len());

  for name in CANONICAL_SUBJECTS {
    if remaining.remove(name) {
      out.push(name.to_string());
    }
  }

  // BTreeSet iteration is already lexicographic.
  out.extend(remaining);
  out
}
