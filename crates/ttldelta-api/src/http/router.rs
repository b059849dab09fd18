//! Router construction and server lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::Request,
    response::Response,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{Span, info};
use ttldelta_core::TaskDispatcher;
use ttldelta_telemetry::{Metrics, build_sha};

use crate::error::{ApiServerError, ApiServerResult};
use crate::http::constants::{ROUTE_DELTA, ROUTE_HEALTH, ROUTE_LIVENESS, ROUTE_METRICS};
use crate::http::delta::receive_delta;
use crate::http::health::{health, liveness, metrics};
use crate::http::telemetry::{Endpoint, HttpMetricsLayer, request_id_of};
use crate::state::ApiState;

/// Axum router wrapper that hosts the ttldelta HTTP endpoints.
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    /// Build the router around `dispatcher`, reporting request metrics into `telemetry`.
    pub fn new(dispatcher: Arc<dyn TaskDispatcher>, telemetry: Metrics) -> Self {
        let state = Arc::new(ApiState::new(dispatcher, telemetry.clone()));

        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "http.request",
                    method = %request.method(),
                    endpoint = Endpoint::of(request).label(),
                    request_id = %request_id_of(request),
                    build_sha = %build_sha(),
                    status_code = tracing::field::Empty,
                    latency_ms = tracing::field::Empty
                )
            })
            .on_response(|response: &Response, latency: Duration, span: &Span| {
                span.record("status_code", response.status().as_u16());
                let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                span.record("latency_ms", latency_ms);
            });

        let layered = ServiceBuilder::new()
            .layer(ttldelta_telemetry::set_request_id_layer())
            .layer(ttldelta_telemetry::propagate_request_id_layer())
            .layer(trace_layer)
            .layer(HttpMetricsLayer::new(telemetry));

        let router = Router::new()
            .route(ROUTE_DELTA, post(receive_delta))
            .route(ROUTE_LIVENESS, get(liveness))
            .route(ROUTE_HEALTH, get(health))
            .route(ROUTE_METRICS, get(metrics))
            .route_layer(layered)
            .with_state(state);

        Self { router }
    }

    /// Hand out the router, for embedding or for driving it in tests.
    #[must_use]
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Bind `addr` and serve until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError::Bind`] when the address cannot be bound and
    /// [`ApiServerError::Serve`] when the server stops with an IO error.
    pub async fn serve(self, addr: SocketAddr) -> ApiServerResult<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ApiServerError::Bind { addr, source })?;
        info!(%addr, "starting api");
        axum::serve(listener, self.router.into_make_service())
            .await
            .map_err(|source| ApiServerError::Serve { source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, StatusCode, header::CONTENT_TYPE};
    use serde_json::Value;
    use tower::ServiceExt;
    use ttldelta_core::{
        DispatchReport, NO_TASK_FOUND, Notification, StatusTokens, TaskOutcome, TaskResolution,
    };
    use ttldelta_telemetry::current_request_id;
    use ttldelta_test_support::notification_json;

    use crate::http::constants::HEADER_REQUEST_ID;

    const BODY_LIMIT: usize = 64 * 1024;

    /// Dispatcher that records notifications and reports every eligible task as successful.
    #[derive(Default)]
    struct RecordingDispatcher {
        received: Mutex<Vec<Notification>>,
        request_ids: Mutex<Vec<Option<String>>>,
    }

    #[async_trait]
    impl TaskDispatcher for RecordingDispatcher {
        async fn dispatch(&self, notification: Notification) -> DispatchReport {
            let outcomes = notification
                .eligible_tasks(&StatusTokens::default())
                .into_iter()
                .map(|task| TaskOutcome {
                    task,
                    resolution: TaskResolution::Successful {
                        generated: Vec::new(),
                    },
                })
                .collect();
            if let Ok(mut received) = self.received.lock() {
                received.push(notification);
            }
            if let Ok(mut request_ids) = self.request_ids.lock() {
                request_ids.push(current_request_id());
            }
            DispatchReport { outcomes }
        }
    }

    impl RecordingDispatcher {
        fn received(&self) -> usize {
            self.received.lock().map_or(0, |received| received.len())
        }

        fn request_ids(&self) -> Vec<Option<String>> {
            self.request_ids
                .lock()
                .map(|request_ids| request_ids.clone())
                .unwrap_or_default()
        }
    }

    fn server() -> anyhow::Result<(Router, Arc<RecordingDispatcher>, Metrics)> {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let metrics = Metrics::new()?;
        let router = ApiServer::new(dispatcher.clone(), metrics.clone()).into_router();
        Ok((router, dispatcher, metrics))
    }

    fn post_delta(body: impl Into<Body>) -> anyhow::Result<Request<Body>> {
        Ok(Request::builder()
            .method(Method::POST)
            .uri("/delta")
            .header(CONTENT_TYPE, "application/json")
            .body(body.into())?)
    }

    fn get(uri: &str) -> anyhow::Result<Request<Body>> {
        Ok(Request::builder().uri(uri).body(Body::empty())?)
    }

    async fn body_text(response: Response) -> anyhow::Result<String> {
        let bytes = to_bytes(response.into_body(), BODY_LIMIT).await?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    #[tokio::test]
    async fn delta_without_eligible_task_is_acknowledged() -> anyhow::Result<()> {
        let (router, dispatcher, _) = server()?;

        let response = router.oneshot(post_delta("[]")?).await?;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await?, NO_TASK_FOUND);
        assert_eq!(dispatcher.received(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn delta_acknowledges_dispatched_tasks_once() -> anyhow::Result<()> {
        let (router, dispatcher, _) = server()?;
        let body = notification_json(&["http://ex/task/1", "http://ex/task/2"]).to_string();

        let response = router.oneshot(post_delta(body)?).await?;

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("text/plain"));
        assert_eq!(
            body_text(response).await?,
            "Processed 2 task(s): 2 successful, 0 failed"
        );
        assert_eq!(dispatcher.received(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn dispatch_runs_inside_the_request_id_scope() -> anyhow::Result<()> {
        let (router, dispatcher, metrics) = server()?;
        let mut request = post_delta("[]")?;
        request
            .headers_mut()
            .insert(HEADER_REQUEST_ID, "req-delta-1".parse()?);

        let response = router.oneshot(request).await?;

        assert_eq!(
            response
                .headers()
                .get(HEADER_REQUEST_ID)
                .and_then(|value| value.to_str().ok()),
            Some("req-delta-1")
        );
        assert_eq!(dispatcher.request_ids(), vec![Some("req-delta-1".to_string())]);
        assert!(metrics.render()?.lines().any(|line| {
            line.starts_with("http_requests_total")
                && line.contains("endpoint=\"delta\"")
                && line.ends_with(" 1")
        }));
        Ok(())
    }

    #[tokio::test]
    async fn delta_body_is_read_without_json_content_type() -> anyhow::Result<()> {
        let (router, _, _) = server()?;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/delta")
            .body(Body::from(notification_json(&["http://ex/task/1"]).to_string()))?;

        let response = router.oneshot(request).await?;

        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn undecodable_delta_is_rejected_without_dispatch() -> anyhow::Result<()> {
        let (router, dispatcher, _) = server()?;

        let response = router.oneshot(post_delta("{not json")?).await?;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let problem: Value = serde_json::from_str(&body_text(response).await?)?;
        assert_eq!(problem["status"], 400);
        assert_eq!(dispatcher.received(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn liveness_greets() -> anyhow::Result<()> {
        let (router, _, _) = server()?;
        let response = router.oneshot(get("/test")?).await?;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await?, "Hello World");
        Ok(())
    }

    #[tokio::test]
    async fn health_reports_ok_and_build() -> anyhow::Result<()> {
        let (router, _, _) = server()?;
        let response = router.oneshot(get("/health")?).await?;
        assert_eq!(response.status(), StatusCode::OK);
        let health: Value = serde_json::from_str(&body_text(response).await?)?;
        assert_eq!(health["status"], "ok");
        assert_eq!(health["build"], build_sha());
        assert_eq!(health["tasks_in_flight"], 0);
        Ok(())
    }

    #[tokio::test]
    async fn requests_are_counted_and_tagged_with_request_id() -> anyhow::Result<()> {
        let (router, _, metrics) = server()?;

        let response = router.clone().oneshot(get("/test")?).await?;
        assert!(response.headers().contains_key(HEADER_REQUEST_ID));

        let response = router.oneshot(get("/metrics")?).await?;
        assert_eq!(response.status(), StatusCode::OK);
        let rendered = body_text(response).await?;
        assert!(rendered.lines().any(|line| {
            line.starts_with("http_requests_total")
                && line.contains("endpoint=\"test\"")
                && line.contains("code=\"200\"")
        }));
        assert!(metrics.render()?.contains("http_requests_total"));
        Ok(())
    }
}
