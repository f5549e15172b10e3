use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::analytics::PageViewEvent;
use crate::extractors::{ClientIp, GeoLocation};
use crate::AppState;

use super::{Ack, AppError};

// ─── Request / response types ────────────────────────────────────

/// What the tracking script posts. Anything else it sends, including
/// its own `timestamp`, is ignored: the server stamps arrival time.
#[derive(Debug, Default, Deserialize)]
pub struct TrackPayload {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub referrer: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EndpointInfo {
    pub message: &'static str,
}

// ─── POST /api/track ─────────────────────────────────────────────

pub async fn record_view(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    GeoLocation(location): GeoLocation,
    payload: Result<Json<TrackPayload>, JsonRejection>,
) -> Result<Json<Ack>, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let event = PageViewEvent::new(
        payload.path.unwrap_or_default(),
        payload.referrer.unwrap_or_default(),
        state.analytics.clock().now(),
        ip,
        location,
    );

    tracing::info!(
        path = %event.path,
        ip = %event.ip,
        location = %event.location,
        "page view"
    );
    state.analytics.record(event);

    Ok(Json(Ack::ok()))
}

// ─── GET /api/track ──────────────────────────────────────────────

pub async fn endpoint_info() -> Json<EndpointInfo> {
    Json(EndpointInfo {
        message: "Analytics Endpoint Active. Send POST requests here.",
    })
}

// ─── GET /api/track/snippet ──────────────────────────────────────
/// Embeddable script for the sites being measured. Reports the first
/// page load and every `history.pushState` navigation.

pub async fn tracking_snippet(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        render_snippet(&state.config.track_url()),
    )
}

pub fn render_snippet(endpoint: &str) -> String {
    // Endpoint goes through serde_json so quotes in PUBLIC_URL cannot break out.
    let endpoint = serde_json::Value::String(endpoint.to_owned()).to_string();
    format!(
        r#"(function () {{
  var ENDPOINT = {endpoint};

  function track() {{
    try {{
      fetch(ENDPOINT, {{
        method: 'POST',
        headers: {{ 'Content-Type': 'application/json' }},
        body: JSON.stringify({{
          path: window.location.pathname,
          referrer: document.referrer,
          timestamp: new Date().toISOString()
        }})
      }});
    }} catch (e) {{}}
  }}

  track();

  var pushState = history.pushState;
  history.pushState = function () {{
    pushState.apply(history, arguments);
    track();
  }};
}})();
"#
    )
}
