//! Logging setup.
//!
//! `LOG_LEVEL` takes an EnvFilter directive string and replaces the default
//! filter entirely. `LOG_FORMAT=json` switches to one JSON object per event;
//! anything else prints human-readable lines. Credentials and bodies are
//! never recorded by the gateway, only lengths and ids.

use tracing_subscriber::EnvFilter;

/// Event targets emitted by the gateway, with their default level.
const GATEWAY_TARGETS: [(&str, &str); 3] = [("review_gateway", "debug"), ("backend", "info"), ("auth", "info")];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn from_env_value(v: Option<&str>) -> Self {
        match v.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// `info` globally, gateway targets at their own level, TraceLayer spans at `info`.
fn default_directives() -> String {
    let mut directives = vec!["info".to_string()];
    directives.extend(GATEWAY_TARGETS.iter().map(|(target, level)| format!("{target}={level}")));
    directives.push("tower_http=info".to_string());
    directives.join(",")
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(default_directives()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true);

    match LogFormat::from_env_value(std::env::var("LOG_FORMAT").ok().as_deref()) {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
