//! Review envelope checks.
//!
//! The backend authors both `review_markdown` and `review_json`; this module
//! only decides whether a payload can be trusted as a review and never derives
//! one representation from the other. Missing critique sections are normal.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::{ImportantPoint, ReviewJson, ReviewRequest, ReviewResponse, Strength, Weakness};

#[derive(Debug, Error)]
pub enum EnvelopeError {
  #[error("講評データがJSONオブジェクトではありません")]
  NotAnObject,
  #[error("講評データに `{0}` がありません")]
  MissingField(&'static str),
  #[error("講評データの形式が不正です: {0}")]
  Malformed(#[from] serde_json::Error),
}

/// Accept `body` as a review iff `submission_id` and `review_markdown` are present.
pub fn validate_envelope(body: &Value) -> Result<ReviewResponse, EnvelopeError> {
  let obj = body.as_object().ok_or(EnvelopeError::NotAnObject)?;
  for field in ["submission_id", "review_markdown"] {
    if obj.get(field).map_or(true, Value::is_null) {
      return Err(EnvelopeError::MissingField(field));
    }
  }
  Ok(serde_json::from_value(body.clone())?)
}

/// Local check of an inbound review submission before it is forwarded.
/// Returns the user-facing reason on rejection.
pub fn check_request(body: &Value) -> Result<ReviewRequest, String> {
  let req: ReviewRequest = serde_json::from_value(body.clone()).map_err(|e| format!("リクエストの形式が不正です: {}", e))?;
  if req.subject.trim().is_empty() {
    return Err("科目を指定してください".into());
  }
  if req.answer_text.trim().is_empty() {
    return Err("答案を入力してください".into());
  }
  Ok(req)
}

/// Critique entries that point at one answer paragraph, in review order.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct ParagraphAnnotations<'a> {
  pub paragraph: i64,
  pub strengths: Vec<&'a Strength>,
  pub weaknesses: Vec<&'a Weakness>,
  pub important_points: Vec<&'a ImportantPoint>,
}

/// Section sizes, for logging.
#[derive(Debug, Default, PartialEq)]
pub struct ReviewShape {
  pub score: Option<f64>,
  pub strengths: usize,
  pub weaknesses: usize,
  pub important_points: usize,
  pub future_considerations: usize,
}

impl ReviewJson {
  pub fn annotations_for(&self, paragraph: i64) -> ParagraphAnnotations<'_> {
    let cites = |nums: &Option<Vec<i64>>| nums.as_ref().is_some_and(|n| n.contains(&paragraph));
    ParagraphAnnotations {
      paragraph,
      strengths: self.strengths.iter().flatten().filter(|s| cites(&s.paragraph_numbers)).collect(),
      weaknesses: self.weaknesses.iter().flatten().filter(|w| cites(&w.paragraph_numbers)).collect(),
      important_points: self
        .important_points
        .iter()
        .flatten()
        .filter(|p| p.paragraph_number == Some(paragraph))
        .collect(),
    }
  }

  pub fn shape(&self) -> ReviewShape {
    let len = |v: Option<usize>| v.unwrap_or(0);
    ReviewShape {
      score: self.overall_review.as_ref().and_then(|o| o.score),
      strengths: len(self.strengths.as_ref().map(Vec::len)),
      weaknesses: len(self.weaknesses.as_ref().map(Vec::len)),
      important_points: len(self.important_points.as_ref().map(Vec::len)),
      future_considerations: len(self.future_considerations.as_ref().map(Vec::len)),
    }
  }
}

impl ReviewResponse {
  /// Structured critique, with an absent `review_json` read as all sections absent.
  pub fn review(&self) -> ReviewJson {
    self.review_json.clone().unwrap_or_default()
  }
}
