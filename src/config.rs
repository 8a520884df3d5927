//! Gateway configuration: backend location and cookie name from the environment,
//! plus optional TOML overrides for the per-endpoint fallback messages.
//!
//! TOML schema (all keys optional):
//!
//! ```toml
//! session_cookie_name = "access_token"
//!
//! [messages]
//! review_fetch = "レビューの取得に失敗しました"
//! subscription_cancel = "解約処理に失敗しました"
//! ```

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_SESSION_COOKIE: &str = "access_token";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct FileConfig {
  #[serde(default)]
  pub session_cookie_name: Option<String>,
  #[serde(default)]
  pub messages: Messages,
}

/// Fallback messages shown to the browser when the backend fails without a
/// readable error body. One per endpoint, plus the transport fallback.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Messages {
  pub unexpected: String,
  pub admin_db: String,
  pub chat: String,
  pub note_page: String,
  pub note_section: String,
  pub official_subjects: String,
  pub official_years: String,
  pub problem_subjects: String,
  pub problem_years: String,
  pub problem_detail: String,
  pub review_create: String,
  pub review_fetch: String,
  pub short_answer_session: String,
  pub study_tag_delete: String,
  pub subscription_cancel: String,
  pub dashboard_items: String,
}

impl Default for Messages {
  fn default() -> Self {
    Self {
      unexpected: "予期しないエラーが発生しました".into(),
      admin_db: "データベース情報の取得に失敗しました".into(),
      chat: "チャットの送信に失敗しました".into(),
      note_page: "ノートページの作成に失敗しました".into(),
      note_section: "ノートセクションの作成に失敗しました".into(),
      official_subjects: "科目一覧の取得に失敗しました".into(),
      official_years: "年度一覧の取得に失敗しました".into(),
      problem_subjects: "科目一覧の取得に失敗しました".into(),
      problem_years: "年度一覧の取得に失敗しました".into(),
      problem_detail: "問題の取得に失敗しました".into(),
      review_create: "講評の生成に失敗しました".into(),
      review_fetch: "講評の取得に失敗しました".into(),
      short_answer_session: "短答式セッションの作成に失敗しました".into(),
      study_tag_delete: "タグの削除に失敗しました".into(),
      subscription_cancel: "サブスクリプションの解約に失敗しました".into(),
      dashboard_items: "ダッシュボード項目の取得に失敗しました".into(),
    }
  }
}

/// Selects one of the endpoint fallback messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKey {
  AdminDb,
  Chat,
  NotePage,
  NoteSection,
  OfficialSubjects,
  OfficialYears,
  ProblemSubjects,
  ProblemYears,
  ProblemDetail,
  ReviewCreate,
  ReviewFetch,
  ShortAnswerSession,
  StudyTagDelete,
  SubscriptionCancel,
  DashboardItems,
}

impl Messages {
  pub fn get(&self, key: MessageKey) -> &str {
    match key {
      MessageKey::AdminDb => &self.admin_db,
      MessageKey::Chat => &self.chat,
      MessageKey::NotePage => &self.note_page,
      MessageKey::NoteSection => &self.note_section,
      MessageKey::OfficialSubjects => &self.official_subjects,
      MessageKey::OfficialYears => &self.official_years,
      MessageKey::ProblemSubjects => &self.problem_subjects,
      MessageKey::ProblemYears => &self.problem_years,
      MessageKey::ProblemDetail => &self.problem_detail,
      MessageKey::ReviewCreate => &self.review_create,
      MessageKey::ReviewFetch => &self.review_fetch,
      MessageKey::ShortAnswerSession => &self.short_answer_session,
      MessageKey::StudyTagDelete => &self.study_tag_delete,
      MessageKey::SubscriptionCancel => &self.subscription_cancel,
      MessageKey::DashboardItems => &self.dashboard_items,
    }
  }
}

/// Runtime configuration shared by every handler (read-only after startup).
#[derive(Clone, Debug)]
pub struct GatewayConfig {
  pub backend_base_url: String,
  pub connect_timeout: Option<Duration>,
  pub session_cookie_name: String,
  pub messages: Messages,
}

impl Default for GatewayConfig {
  fn default() -> Self {
    Self {
      backend_base_url: DEFAULT_BACKEND_URL.into(),
      connect_timeout: None,
      session_cookie_name: DEFAULT_SESSION_COOKIE.into(),
      messages: Messages::default(),
    }
  }
}

impl GatewayConfig {
  /// Build from env:
  ///   BACKEND_INTERNAL_URL / BACKEND_URL, BACKEND_CONNECT_TIMEOUT_SECS,
  ///   SESSION_COOKIE_NAME, GATEWAY_CONFIG_PATH.
  /// Env values win over the TOML file.
  pub fn from_env() -> Self {
    let file = load_file_config_from_env().unwrap_or_default();

    let backend_base_url = resolve_backend_base(
      std::env::var("BACKEND_INTERNAL_URL").ok(),
      std::env::var("BACKEND_URL").ok(),
    );

    let connect_timeout = std::env::var("BACKEND_CONNECT_TIMEOUT_SECS")
      .ok()
      .and_then(|s| s.parse::<u64>().ok())
      .filter(|secs| *secs > 0)
      .map(Duration::from_secs);

    let session_cookie_name = std::env::var("SESSION_COOKIE_NAME")
      .ok()
      .or(file.session_cookie_name)
      .filter(|s| !s.trim().is_empty())
      .unwrap_or_else(|| DEFAULT_SESSION_COOKIE.into());

    Self { backend_base_url, connect_timeout, session_cookie_name, messages: file.messages }
  }
}

/// The private (in-cluster) URL is preferred over the public one.
/// Blank values are ignored and a trailing slash is dropped.
pub fn resolve_backend_base(internal: Option<String>, public: Option<String>) -> String {
  let pick = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
  let base = pick(internal)
    .or_else(|| pick(public))
    .unwrap_or_else(|| DEFAULT_BACKEND_URL.into());
  base.trim_end_matches('/').to_string()
}

/// Attempt to load `FileConfig` from GATEWAY_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_file_config_from_env() -> Option<FileConfig> {
  let path = std::env::var("GATEWAY_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<FileConfig>(&s) {
      Ok(cfg) => {
        info!(target: "review_gateway", %path, "Loaded gateway config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "review_gateway", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "review_gateway", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
