//! HTTP endpoint handlers. These are thin wrappers over `crate::logic`:
//! authorize, read the body, forward once, then post-process where the
//! endpoint needs it. Each handler is instrumented; credentials and bodies
//! are never recorded, only ids and sizes.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
  body::Bytes,
  extract::{
    rejection::{BytesRejection, PathRejection},
    Path, Query, State,
  },
  http::{header, HeaderMap, StatusCode},
  response::IntoResponse,
  Json,
};
use serde_json::Value;
use tracing::{field, info, instrument, Span};

use crate::dashboard::EntryType;
use crate::domain::ProblemMetadataWithDetails;
use crate::endpoints::*;
use crate::error::GatewayError;
use crate::logic::*;
use crate::protocol::*;
use crate::review::{check_request, validate_envelope};
use crate::state::AppState;

type Handled = Result<ProxyResponse, GatewayError>;

// Extraction results are taken as `Result` so the credential is always
// checked before the request shape.
type RawBody = Result<Bytes, BytesRejection>;
type RawPath<T> = Result<Path<T>, PathRejection>;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

/// Clears the session cookie. Local only; the backend is not involved.
#[instrument(level = "info", skip(state))]
pub async fn http_logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "auth", "Session cookie cleared");
  (
    [
      (header::SET_COOKIE, expired_session_cookie(&state.config.session_cookie_name)),
      (header::CACHE_CONTROL, "no-store".to_string()),
    ],
    Json(LogoutOut { ok: true }),
  )
}

#[instrument(level = "info", skip_all)]
pub async fn http_admin_db_tables(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Handled {
  let ep = &ADMIN_DB_TABLES;
  let credential = authorize(&state, ep, &headers)?;
  let reply = forward(&state, ep, credential, Call::new()).await?;
  Ok(ProxyResponse::echo(reply, ep))
}

#[instrument(level = "info", skip_all, fields(body_len = body.as_ref().map_or(0, |b| b.len())))]
pub async fn http_post_chat(State(state): State<Arc<AppState>>, headers: HeaderMap, body: RawBody) -> Handled {
  let ep = &CHAT;
  let credential = authorize(&state, ep, &headers)?;
  let body = required_json(&body?)?;
  let reply = forward(&state, ep, credential, Call::new().body(Some(body))).await?;
  Ok(ProxyResponse::echo(reply, ep))
}

#[instrument(level = "info", skip_all, fields(body_len = body.as_ref().map_or(0, |b| b.len())))]
pub async fn http_post_note_page(State(state): State<Arc<AppState>>, headers: HeaderMap, body: RawBody) -> Handled {
  let ep = &NOTE_PAGE_CREATE;
  let credential = authorize(&state, ep, &headers)?;
  let body = required_json(&body?)?;
  let reply = forward(&state, ep, credential, Call::new().body(Some(body))).await?;
  Ok(ProxyResponse::echo(reply, ep))
}

#[instrument(level = "info", skip_all, fields(body_len = body.as_ref().map_or(0, |b| b.len())))]
pub async fn http_post_note_section(State(state): State<Arc<AppState>>, headers: HeaderMap, body: RawBody) -> Handled {
  let ep = &NOTE_SECTION_CREATE;
  let credential = authorize(&state, ep, &headers)?;
  let body = required_json(&body?)?;
  let reply = forward(&state, ep, credential, Call::new().body(Some(body))).await?;
  Ok(ProxyResponse::echo(reply, ep))
}

#[instrument(level = "info", skip(state, headers))]
pub async fn http_official_subjects(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  Query(q): Query<HashMap<String, String>>,
) -> Handled {
  subject_listing(&state, &OFFICIAL_SUBJECTS, &headers, q).await
}

#[instrument(level = "info", skip(state, headers))]
pub async fn http_official_years(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  Query(q): Query<HashMap<String, String>>,
) -> Handled {
  let ep = &OFFICIAL_YEARS;
  let credential = authorize(&state, ep, &headers)?;
  let reply = forward(&state, ep, credential, Call::new().query(q)).await?;
  Ok(ProxyResponse::echo(reply, ep))
}

#[instrument(level = "info", skip(state, headers))]
pub async fn http_problem_subjects(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  Query(q): Query<HashMap<String, String>>,
) -> Handled {
  subject_listing(&state, &PROBLEM_SUBJECTS, &headers, q).await
}

#[instrument(level = "info", skip(state, headers))]
pub async fn http_problem_years(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  Query(q): Query<HashMap<String, String>>,
) -> Handled {
  let ep = &PROBLEM_YEARS;
  let credential = authorize(&state, ep, &headers)?;
  let reply = forward(&state, ep, credential, Call::new().query(q)).await?;
  Ok(ProxyResponse::echo(reply, ep))
}

#[instrument(level = "info", skip_all, fields(metadata_id = field::Empty))]
pub async fn http_problem_detail(
  State(state): State<Arc<AppState>>,
  metadata_id: RawPath<String>,
  headers: HeaderMap,
) -> Handled {
  let ep = &PROBLEM_DETAIL;
  let credential = authorize(&state, ep, &headers)?;
  let Path(metadata_id) = metadata_id?;
  Span::current().record("metadata_id", metadata_id.as_str());
  let reply = forward(&state, ep, credential, Call::new().param(metadata_id)).await?;
  let problem: ProblemMetadataWithDetails =
    serde_json::from_value(reply.body.clone()).map_err(|e| malformed(&state, e))?;
  info!(target: "review_gateway", id = problem.metadata.id, details = problem.details.len(), "Problem served");
  Ok(ProxyResponse::echo(reply, ep))
}

#[instrument(level = "info", skip_all, fields(body_len = body.as_ref().map_or(0, |b| b.len())))]
pub async fn http_post_review(State(state): State<Arc<AppState>>, headers: HeaderMap, body: RawBody) -> Handled {
  let ep = &REVIEW_CREATE;
  let credential = authorize(&state, ep, &headers)?;
  let body = required_json(&body?)?;
  let request = check_request(&body).map_err(GatewayError::BadRequest)?;
  info!(
    target: "review_gateway",
    subject = %request.subject,
    answer_len = request.answer_text.len(),
    problem_metadata_id = ?request.problem_metadata_id,
    "Submitting answer for review"
  );

  let reply = forward(&state, ep, credential, Call::new().body(Some(body))).await?;
  let review = validate_envelope(&reply.body).map_err(|e| malformed(&state, e))?;
  info!(target: "review_gateway", submission_id = review.submission_id, shape = ?review.review().shape(), "Review created");
  Ok(ProxyResponse::echo(reply, ep))
}

#[instrument(level = "info", skip_all, fields(submission_id = field::Empty))]
pub async fn http_get_review(
  State(state): State<Arc<AppState>>,
  submission_id: RawPath<String>,
  headers: HeaderMap,
) -> Handled {
  let ep = &REVIEW_FETCH;
  let credential = authorize(&state, ep, &headers)?;
  let Path(submission_id) = submission_id?;
  Span::current().record("submission_id", submission_id.as_str());
  let reply = forward(&state, ep, credential, Call::new().param(submission_id)).await?;
  let review = validate_envelope(&reply.body).map_err(|e| malformed(&state, e))?;
  info!(target: "review_gateway", submission_id = review.submission_id, shape = ?review.review().shape(), "Review served");
  Ok(ProxyResponse::echo(reply, ep))
}

/// Critique entries citing one answer paragraph of a review.
#[instrument(level = "info", skip_all, fields(submission_id = field::Empty, paragraph = field::Empty))]
pub async fn http_get_review_paragraph(
  State(state): State<Arc<AppState>>,
  params: RawPath<(String, String)>,
  headers: HeaderMap,
) -> Handled {
  let ep = &REVIEW_FETCH;
  let credential = authorize(&state, ep, &headers)?;
  let Path((submission_id, paragraph)) = params?;
  Span::current()
    .record("submission_id", submission_id.as_str())
    .record("paragraph", paragraph.as_str());
  let paragraph: i64 = paragraph
    .parse()
    .map_err(|_| GatewayError::BadRequest("段落番号が不正です".into()))?;

  let reply = forward(&state, ep, credential, Call::new().param(submission_id)).await?;
  let review = validate_envelope(&reply.body).map_err(|e| malformed(&state, e))?;
  let critique = review.review();
  let annotations = critique.annotations_for(paragraph);
  let body = serde_json::to_value(&annotations).map_err(|e| malformed(&state, e))?;
  Ok(ProxyResponse::replaced(reply.status, body, ep))
}

#[instrument(level = "info", skip_all, fields(body_len = body.as_ref().map_or(0, |b| b.len())))]
pub async fn http_post_short_answer_session(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  body: RawBody,
) -> Handled {
  let ep = &SHORT_ANSWER_SESSION;
  let credential = authorize(&state, ep, &headers)?;
  let body = optional_json(&body?)?;
  let reply = forward(&state, ep, credential, Call::new().body(body)).await?;
  Ok(ProxyResponse::echo(reply, ep))
}

#[instrument(level = "info", skip_all, fields(tag_id = field::Empty))]
pub async fn http_delete_study_tag(
  State(state): State<Arc<AppState>>,
  tag_id: RawPath<String>,
  headers: HeaderMap,
) -> Handled {
  let ep = &STUDY_TAG_DELETE;
  let credential = authorize(&state, ep, &headers)?;
  let Path(tag_id) = tag_id?;
  Span::current().record("tag_id", tag_id.as_str());
  let reply = forward(&state, ep, credential, Call::new().param(tag_id)).await?;
  Ok(ProxyResponse::echo(reply, ep))
}

#[instrument(level = "info", skip_all, fields(body_len = body.as_ref().map_or(0, |b| b.len())))]
pub async fn http_cancel_subscription(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  body: RawBody,
) -> Handled {
  let ep = &SUBSCRIPTION_CANCEL;
  let credential = authorize(&state, ep, &headers)?;
  let body = optional_json(&body?)?;
  let reply = forward(&state, ep, credential, Call::new().body(body)).await?;
  info!(target: "review_gateway", status = reply.status, "Subscription cancel forwarded");
  Ok(ProxyResponse::echo(reply, ep))
}

#[instrument(level = "info", skip(state, headers))]
pub async fn http_dashboard_items(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  Query(q): Query<HashMap<String, String>>,
) -> Handled {
  let ep = &DASHBOARD_ITEMS;
  let credential = authorize(&state, ep, &headers)?;
  let reply = forward(&state, ep, credential, Call::new().query(q)).await?;
  let items = dashboard_listing(&reply.body).map_err(|e| malformed(&state, e))?;

  let tasks = items.iter().filter(|v| v.item.kind() == Some(EntryType::Task)).count();
  let favorites = items.iter().filter(|v| v.item.is_favorite()).count();
  info!(target: "review_gateway", active = items.len(), tasks, favorites, "Dashboard items served");

  let body = serde_json::to_value(&items).map_err(|e| malformed(&state, e))?;
  Ok(ProxyResponse::replaced(reply.status, body, ep))
}

/// Unknown route under the router.
pub async fn http_not_found() -> GatewayError {
  GatewayError::rejected(StatusCode::NOT_FOUND, String::new())
}

/// Known route, unsupported method.
pub async fn http_method_not_allowed() -> GatewayError {
  GatewayError::rejected(StatusCode::METHOD_NOT_ALLOWED, String::new())
}

async fn subject_listing(
  state: &AppState,
  ep: &Endpoint,
  headers: &HeaderMap,
  q: HashMap<String, String>,
) -> Handled {
  let credential = authorize(state, ep, headers)?;
  let reply = forward(state, ep, credential, Call::new().query(q)).await?;
  let ordered = ordered_subject_listing(&reply.body).map_err(|e| malformed(state, e))?;
  Ok(ProxyResponse::replaced(reply.status, Value::from(ordered), ep))
}
