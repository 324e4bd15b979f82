//! HTTP endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/update` | Store a reminder (`name`, `slot`, `hour`, `minute`) |
//! | `GET` | `/api/reminders` | List stored reminders |
//! | `GET` | `/api/status` | Full device snapshot |
//! | `GET` | `/health` | Liveness probe |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use pillbox_core::runner::Submission;
use pillbox_types::{DeviceSnapshot, Reminder, SubmitReminder};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Raw query for `GET /update`.
///
/// Every field is optional here so that a missing parameter produces the
/// device's own `Missing parameters` response instead of a generic
/// extractor rejection.
#[derive(Debug, Default, serde::Deserialize)]
pub struct UpdateQuery {
    /// Medicine name.
    pub name: Option<String>,
    /// Compartment label.
    pub slot: Option<String>,
    /// Target hour, as text.
    pub hour: Option<String>,
    /// Target minute, as text.
    pub minute: Option<String>,
}

impl UpdateQuery {
    /// Check presence of all four fields and parse the numeric ones.
    ///
    /// Presence is checked first: a request missing `name` with a bad
    /// `hour` is reported as missing. Empty values count as present, and
    /// no range checks are made.
    ///
    /// A non-integer `hour` or `minute` is rejected. It is not read as `0`
    /// and never stored as a 00:00 reminder.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingParameters`] or
    /// [`ApiError::InvalidParameters`].
    pub fn into_request(self) -> Result<SubmitReminder, ApiError> {
        let (Some(name), Some(slot), Some(hour), Some(minute)) =
            (self.name, self.slot, self.hour, self.minute)
        else {
            return Err(ApiError::MissingParameters);
        };
        let hour = parse_field(&hour, "hour")?;
        let minute = parse_field(&minute, "minute")?;
        Ok(SubmitReminder {
            name,
            slot,
            hour,
            minute,
        })
    }
}

fn parse_field(raw: &str, field: &'static str) -> Result<i32, ApiError> {
    raw.parse::<i32>().map_err(|e| {
        debug!(field, value = raw, error = %e, "Non-integer time field");
        ApiError::InvalidParameters { field }
    })
}

// ---------------------------------------------------------------------------
// GET /update -- store a reminder
// ---------------------------------------------------------------------------

/// Forward a reminder to the device loop and wait until it is stored.
///
/// Responds `200 OK` with body `OK` once the loop confirms. A full queue
/// applies backpressure; if the loop does not confirm within the
/// configured timeout the request fails with `503`.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UpdateQuery>,
) -> Result<&'static str, ApiError> {
    let request = query.into_request().inspect_err(|e| {
        info!(error = %e, "Rejected submission");
    })?;

    let (submission, reply) = Submission::new(request);
    let stored = tokio::time::timeout(state.submit_timeout, async {
        state.submissions.send(submission).await.ok()?;
        reply.await.ok()
    })
    .await;

    match stored {
        Ok(Some(reminder)) => {
            info!(reminder = %reminder.id, "Submission confirmed");
            Ok("OK")
        }
        Ok(None) => {
            warn!("Device loop is not accepting submissions");
            Err(ApiError::DeviceUnavailable)
        }
        Err(_) => {
            warn!(
                timeout_ms = state.submit_timeout.as_millis(),
                "Device loop did not confirm submission in time"
            );
            Err(ApiError::DeviceUnavailable)
        }
    }
}

// ---------------------------------------------------------------------------
// GET /api/reminders, /api/status
// ---------------------------------------------------------------------------

/// Every stored reminder in submission order.
pub async fn list_reminders(State(state): State<Arc<AppState>>) -> Json<Vec<Reminder>> {
    let snapshot = state.snapshot.read().await;
    Json(snapshot.reminders.clone())
}

/// The full device snapshot: reminders, alert outputs, last clock reading.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<DeviceSnapshot> {
    let snapshot = state.snapshot.read().await;
    Json(snapshot.clone())
}

/// Liveness probe.
pub async fn health() -> &'static str {
    "ok"
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page with the alert state and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    let reminder_count = snapshot.reminders.len();
    let alert = if snapshot.alert.active {
        "ALERT"
    } else {
        "IDLE"
    };
    let clock = snapshot
        .last_reading
        .map_or_else(|| String::from("--:--"), |t| t.to_string());
    let polls = snapshot.polls;

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Pillbox</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 640px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        ul {{ list-style: none; padding: 0; }}
        li::before {{ content: "GET "; color: #7ee787; font-weight: bold; }}
    </style>
</head>
<body>
    <h1>Pillbox</h1>
    <div>
        <div class="metric"><div class="label">State</div><div class="value">{alert}</div></div>
        <div class="metric"><div class="label">Clock</div><div class="value">{clock}</div></div>
        <div class="metric"><div class="label">Reminders</div><div class="value">{reminder_count}</div></div>
        <div class="metric"><div class="label">Polls</div><div class="value">{polls}</div></div>
    </div>
    <h2>API Endpoints</h2>
    <ul>
        <li><code>/update?name=&amp;slot=&amp;hour=&amp;minute=</code> -- Store a reminder</li>
        <li><a href="/api/reminders">/api/reminders</a> -- Stored reminders</li>
        <li><a href="/api/status">/api/status</a> -- Device snapshot</li>
        <li><a href="/health">/health</a> -- Liveness</li>
    </ul>
</body>
</html>"#
    ))
}
