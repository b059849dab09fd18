//! Per-endpoint request counting and request-id scoping.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};

use axum::extract::MatchedPath;
use axum::http::Request;
use tower::{Layer, Service};
use ttldelta_telemetry::{Metrics, with_request_id};

use crate::http::constants::{
    HEADER_REQUEST_ID, ROUTE_DELTA, ROUTE_HEALTH, ROUTE_LIVENESS, ROUTE_METRICS,
};

/// Endpoint a request was routed to, as labelled in `http_requests_total`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Endpoint {
    Delta,
    Liveness,
    Health,
    Metrics,
    Other,
}

impl Endpoint {
    /// Endpoint of `request`, taken from the route axum matched.
    pub(crate) fn of<B>(request: &Request<B>) -> Self {
        request
            .extensions()
            .get::<MatchedPath>()
            .map_or(Self::Other, |matched| Self::from_route(matched.as_str()))
    }

    fn from_route(route: &str) -> Self {
        match route {
            ROUTE_DELTA => Self::Delta,
            ROUTE_LIVENESS => Self::Liveness,
            ROUTE_HEALTH => Self::Health,
            ROUTE_METRICS => Self::Metrics,
            _ => Self::Other,
        }
    }

    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::Delta => "delta",
            Self::Liveness => "test",
            Self::Health => "health",
            Self::Metrics => "metrics",
            Self::Other => "other",
        }
    }
}

/// The `x-request-id` header value, empty when absent or not ASCII.
pub(crate) fn request_id_of<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(HEADER_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Counts requests per endpoint and status, and scopes the request id for handlers.
#[derive(Clone)]
pub(crate) struct HttpMetricsLayer {
    telemetry: Metrics,
}

impl HttpMetricsLayer {
    pub(crate) const fn new(telemetry: Metrics) -> Self {
        Self { telemetry }
    }
}

impl<S> Layer<S> for HttpMetricsLayer {
    type Service = HttpMetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HttpMetricsService {
            inner,
            telemetry: self.telemetry.clone(),
        }
    }
}

#[derive(Clone)]
pub(crate) struct HttpMetricsService<S> {
    inner: S,
    telemetry: Metrics,
}

impl<S, B> Service<Request<B>> for HttpMetricsService<S>
where
    S: Service<Request<B>, Response = axum::response::Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let endpoint = Endpoint::of(&req);
        let request_id = request_id_of(&req);
        let telemetry = self.telemetry.clone();
        let fut = self.inner.call(req);

        Box::pin(with_request_id(request_id, async move {
            let response = fut.await?;
            telemetry.inc_http_request(endpoint.label(), response.status().as_u16());
            Ok(response)
        }))
    }
}
