//! Declared browser endpoints and the backend resources they proxy.
//!
//! Each entry fixes the backend path template (`{}` = percent-encoded path
//! parameter), the credential policy, which inbound query parameters are
//! copied, the cache policy and the fallback message key.

use crate::auth::CredentialPolicy;
use crate::backend::Method;
use crate::config::MessageKey;

#[derive(Debug, Clone, Copy)]
pub struct Endpoint {
  pub name: &'static str,
  pub method: Method,
  pub backend_path: &'static str,
  pub policy: CredentialPolicy,
  pub query: &'static [&'static str],
  pub no_store: bool,
  pub message: MessageKey,
}

pub const ADMIN_DB_TABLES: Endpoint = Endpoint {
  name: "admin_db_tables",
  method: Method::Get,
  backend_path: "/v1/admin/db/tables",
  policy: CredentialPolicy::CookieOrBearer,
  query: &[],
  no_store: true,
  message: MessageKey::AdminDb,
};

pub const CHAT: Endpoint = Endpoint {
  name: "chat",
  method: Method::Post,
  backend_path: "/v1/chat",
  policy: CredentialPolicy::Cookie,
  query: &[],
  no_store: true,
  message: MessageKey::Chat,
};

pub const NOTE_PAGE_CREATE: Endpoint = Endpoint {
  name: "note_page_create",
  method: Method::Post,
  backend_path: "/v1/notes/pages",
  policy: CredentialPolicy::Header,
  query: &[],
  no_store: true,
  message: MessageKey::NotePage,
};

pub const NOTE_SECTION_CREATE: Endpoint = Endpoint {
  name: "note_section_create",
  method: Method::Post,
  backend_path: "/v1/notes/sections",
  policy: CredentialPolicy::Header,
  query: &[],
  no_store: true,
  message: MessageKey::NoteSection,
};

pub const OFFICIAL_SUBJECTS: Endpoint = Endpoint {
  name: "official_subjects",
  method: Method::Get,
  backend_path: "/v1/official-questions/subjects",
  policy: CredentialPolicy::Public,
  query: &["exam_type"],
  no_store: false,
  message: MessageKey::OfficialSubjects,
};

pub const OFFICIAL_YEARS: Endpoint = Endpoint {
  name: "official_years",
  method: Method::Get,
  backend_path: "/v1/official-questions/years",
  policy: CredentialPolicy::Public,
  query: &["exam_type"],
  no_store: false,
  message: MessageKey::OfficialYears,
};

pub const PROBLEM_SUBJECTS: Endpoint = Endpoint {
  name: "problem_subjects",
  method: Method::Get,
  backend_path: "/v1/problems/subjects",
  policy: CredentialPolicy::Public,
  query: &["exam_type"],
  no_store: false,
  message: MessageKey::ProblemSubjects,
};

pub const PROBLEM_YEARS: Endpoint = Endpoint {
  name: "problem_years",
  method: Method::Get,
  backend_path: "/v1/problems/years",
  policy: CredentialPolicy::Public,
  query: &["exam_type", "subject"],
  no_store: false,
  message: MessageKey::ProblemYears,
};

pub const PROBLEM_DETAIL: Endpoint = Endpoint {
  name: "problem_detail",
  method: Method::Get,
  backend_path: "/v1/problems/{}",
  policy: CredentialPolicy::Public,
  query: &[],
  no_store: false,
  message: MessageKey::ProblemDetail,
};

pub const REVIEW_CREATE: Endpoint = Endpoint {
  name: "review_create",
  method: Method::Post,
  backend_path: "/v1/review",
  policy: CredentialPolicy::CookieOrBearer,
  query: &[],
  no_store: true,
  message: MessageKey::ReviewCreate,
};

pub const REVIEW_FETCH: Endpoint = Endpoint {
  name: "review_fetch",
  method: Method::Get,
  backend_path: "/v1/review/{}",
  policy: CredentialPolicy::CookieOrBearer,
  query: &[],
  no_store: true,
  message: MessageKey::ReviewFetch,
};

pub const SHORT_ANSWER_SESSION: Endpoint = Endpoint {
  name: "short_answer_session",
  method: Method::Post,
  backend_path: "/v1/short-answer/sessions",
  policy: CredentialPolicy::Cookie,
  query: &[],
  no_store: true,
  message: MessageKey::ShortAnswerSession,
};

pub const STUDY_TAG_DELETE: Endpoint = Endpoint {
  name: "study_tag_delete",
  method: Method::Delete,
  backend_path: "/v1/study/tags/{}",
  policy: CredentialPolicy::Header,
  query: &[],
  no_store: true,
  message: MessageKey::StudyTagDelete,
};

pub const SUBSCRIPTION_CANCEL: Endpoint = Endpoint {
  name: "subscription_cancel",
  method: Method::Post,
  backend_path: "/v1/subscriptions/cancel",
  policy: CredentialPolicy::CookieOrBearer,
  query: &[],
  no_store: true,
  message: MessageKey::SubscriptionCancel,
};

pub const DASHBOARD_ITEMS: Endpoint = Endpoint {
  name: "dashboard_items",
  method: Method::Get,
  backend_path: "/v1/dashboard/items",
  policy: CredentialPolicy::Cookie,
  query: &["dashboard_date"],
  no_store: true,
  message: MessageKey::DashboardItems,
};
