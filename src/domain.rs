//! Domain models exchanged with the review backend: review request/response,
//! the structured critique, the problem catalog and dashboard items.
//!
//! Every optional backend field is an `Option` so that "absent" stays
//! distinguishable from "present but empty".

use serde::{Deserialize, Serialize};

/// Answer submitted for review. `subject` and `answer_text` are mandatory;
/// the three catalog ids are passed through untouched for the backend to resolve.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewRequest {
  #[serde(default)] pub problem_id: Option<i64>,
  #[serde(default)] pub problem_metadata_id: Option<i64>,
  #[serde(default)] pub problem_details_id: Option<i64>,
  pub subject: String,
  #[serde(default)] pub question_text: Option<String>,
  pub answer_text: String,
}

/// Review envelope returned by the backend for one submission.
/// `review_markdown` and `review_json` are both authored by the backend.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewResponse {
  pub submission_id: i64,
  pub review_markdown: String,
  #[serde(default)] pub review_json: Option<ReviewJson>,
  #[serde(default)] pub answer_text: Option<String>,
  #[serde(default)] pub question_text: Option<String>,
  #[serde(default)] pub subject: Option<String>,
  #[serde(default)] pub purpose: Option<String>,
}

/// Structured critique. Every nested field may be missing or `null`; both
/// read as absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewJson {
  #[serde(default)] pub overall_review: Option<OverallReview>,
  #[serde(default)] pub strengths: Option<Vec<Strength>>,
  #[serde(default)] pub weaknesses: Option<Vec<Weakness>>,
  #[serde(default)] pub important_points: Option<Vec<ImportantPoint>>,
  #[serde(default)] pub future_considerations: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallReview {
  #[serde(default)] pub score: Option<f64>,
  #[serde(default)] pub comment: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Strength {
  #[serde(default)] pub category: Option<String>,
  #[serde(default)] pub description: Option<String>,
  #[serde(default)] pub paragraph_numbers: Option<Vec<i64>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Weakness {
  #[serde(default)] pub category: Option<String>,
  #[serde(default)] pub description: Option<String>,
  #[serde(default)] pub paragraph_numbers: Option<Vec<i64>>,
  #[serde(default)] pub suggestion: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportantPoint {
  #[serde(default)] pub paragraph_number: Option<i64>,
  #[serde(default)] pub what_is_good: Option<String>,
  #[serde(default)] pub what_is_lacking: Option<String>,
  #[serde(default)] pub why_important: Option<String>,
}

/// Catalog entry for one exam problem (owned by the backend, read-only here).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProblemMetadata {
  pub id: i64,
  pub exam_type: String,
  pub year: i32,
  pub subject: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProblemDetails {
  pub id: i64,
  pub question_number: i32,
  pub question_text: String,
  #[serde(default)] pub purpose: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProblemMetadataWithDetails {
  pub metadata: ProblemMetadata,
  #[serde(default)] pub details: Vec<ProblemDetails>,
}

/// Dashboard row as stored by the backend. `status` only has a meaning
/// together with `entry_type`; see `crate::dashboard`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DashboardItem {
  pub id: i64,
  pub user_id: i64,
  pub dashboard_date: String,
  pub entry_type: i32,
  #[serde(default)] pub subject: Option<i64>,
  pub item: String,
  #[serde(default)] pub due_date: Option<String>,
  pub status: i32,
  #[serde(default)] pub memo: Option<String>,
  pub position: i32,
  #[serde(default)] pub favorite: i32,
  pub created_at: String,
  pub updated_at: String,
  #[serde(default)] pub deleted_at: Option<String>,
}
