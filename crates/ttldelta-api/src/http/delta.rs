//! Delta notification intake.

use std::sync::Arc;

use axum::{body::Bytes, extract::State};
use tracing::{info, warn};
use ttldelta_core::Notification;
use ttldelta_telemetry::current_request_id;

use crate::http::errors::ApiError;
use crate::state::ApiState;

/// Parse a notification batch, dispatch its eligible tasks and acknowledge once.
///
/// The body is decoded regardless of its declared content type. Task failures never change
/// the response status; only an undecodable body is rejected.
pub(crate) async fn receive_delta(
    State(state): State<Arc<ApiState>>,
    body: Bytes,
) -> Result<String, ApiError> {
    let notification: Notification = serde_json::from_slice(&body).map_err(|err| {
        warn!(error = %err, "rejected undecodable delta notification");
        ApiError::bad_request("notification body is not a change-set list")
            .with_detail(err.to_string())
    })?;

    let report = state.dispatcher.dispatch(notification).await;
    let acknowledgement = report.acknowledgement();
    info!(
        request_id = %current_request_id().unwrap_or_default(),
        tasks = report.outcomes.len(),
        successful = report.successful(),
        failed = report.failed(),
        skipped = report.skipped(),
        "delta notification handled"
    );
    Ok(acknowledgement)
}
