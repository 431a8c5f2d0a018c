// =============================================================================
// Status Endpoints — Axum 0.7
// =============================================================================
//
//   GET /                HTML status page (what the bot is scanning)
//   GET /api/v1/health   JSON liveness probe
//
// The handlers read only an immutable snapshot taken at startup, so they answer
// the same way whether the scanner is mid-cycle, sleeping, or failing.
// =============================================================================

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Json, State},
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use crate::runtime_config::RuntimeConfig;
use crate::types::SignalPolicy;

/// Read-only facts shown by the status endpoints.
#[derive(Debug, Clone)]
pub struct StatusInfo {
    pub symbols: Vec<String>,
    pub interval: String,
    pub poll_interval_secs: u64,
    pub policy: SignalPolicy,
    pub buy_threshold: f64,
    pub sell_threshold: f64,
    pub notifier: &'static str,
    pub started: Instant,
}

impl StatusInfo {
    pub fn from_config(config: &RuntimeConfig, notifier: &'static str) -> Self {
        Self {
            symbols: config.symbols.clone(),
            interval: config.interval.clone(),
            poll_interval_secs: config.poll_interval_secs,
            policy: config.policy,
            buy_threshold: config.buy_threshold,
            sell_threshold: config.sell_threshold,
            notifier,
            started: Instant::now(),
        }
    }
}

// =============================================================================
// Router construction
// =============================================================================

/// Build the status router with CORS middleware and shared state.
pub fn router(info: Arc<StatusInfo>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(status_page))
        .route("/api/v1/health", get(health))
        .layer(cors)
        .with_state(info)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    server_time: i64,
}

async fn health(State(info): State<Arc<StatusInfo>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: info.started.elapsed().as_secs(),
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Status page
// =============================================================================

async fn status_page(State(info): State<Arc<StatusInfo>>) -> Html<String> {
    let symbols = escape_html(&info.symbols.join(", "));
    let interval = escape_html(&info.interval);
    let minutes = info.poll_interval_secs as f64 / 60.0;

    Html(format!(
        r#"<!DOCTYPE html>
<html>
    <head>
        <title>RSI Signal Bot Status</title>
        <style>
            body {{ font-family: Arial, sans-serif; background: #f4f4f4; padding: 40px; }}
            .status-box {{ background: white; padding: 20px; max-width: 500px; margin: auto; border-radius: 10px; box-shadow: 0 0 10px rgba(0,0,0,0.1); }}
            .status {{ font-size: 24px; color: green; }}
        </style>
    </head>
    <body>
        <div class="status-box">
            <h2>RSI Signal Bot Status</h2>
            <p class="status">✅ Online and scanning</p>
            <p>Tracking symbols: {symbols}</p>
            <p>Check interval: every {minutes} minutes ({interval} candles)</p>
            <p>Rule: {policy}, buy at RSI ≤ {buy}, sell at RSI ≥ {sell}</p>
            <p>Notifications: {notifier}</p>
            <p>Uptime: {uptime}s</p>
        </div>
    </body>
</html>
"#,
        policy = info.policy,
        buy = info.buy_threshold,
        sell = info.sell_threshold,
        notifier = info.notifier,
        uptime = info.started.elapsed().as_secs(),
    ))
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
