//! Health check
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/health | GET | none |
//!
//! ```json
//! {
//!   "status": "healthy",
//!   "version": "0.1.0",
//!   "uptimeSeconds": 42,
//!   "database": { "status": "ok", "latencyMs": 0 },
//!   "orderCount": 17,
//!   "redemptionCount": 3,
//!   "liveChannels": 2
//! }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use std::sync::OnceLock;
use std::time::{Instant, SystemTime};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// healthy | degraded
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
    database: CheckResult,
    order_count: u64,
    redemption_count: u64,
    live_channels: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

static START_TIME: OnceLock<SystemTime> = OnceLock::new();

fn uptime_seconds() -> u64 {
    let start = START_TIME.get_or_init(SystemTime::now);
    SystemTime::now()
        .duration_since(*start)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// GET /api/health - liveness plus store counters
pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let started = Instant::now();
    let (database, stats) = match state.store.stats() {
        Ok(stats) => (
            CheckResult {
                status: "ok",
                latency_ms: Some(started.elapsed().as_millis() as u64),
                message: None,
            },
            stats,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check: database unavailable");
            (
                CheckResult {
                    status: "error",
                    latency_ms: None,
                    message: Some("database unavailable".into()),
                },
                Default::default(),
            )
        }
    };

    Json(HealthResponse {
        status: if database.status == "ok" {
            "healthy"
        } else {
            "degraded"
        },
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: uptime_seconds(),
        database,
        order_count: stats.order_count,
        redemption_count: stats.redemption_count,
        live_channels: state.hub.channel_count(),
    })
}
