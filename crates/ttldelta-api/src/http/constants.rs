//! Shared HTTP constants (headers, routes, problem URIs, fixed bodies).

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

pub(crate) const ROUTE_DELTA: &str = "/delta";
pub(crate) const ROUTE_LIVENESS: &str = "/test";
pub(crate) const ROUTE_HEALTH: &str = "/health";
pub(crate) const ROUTE_METRICS: &str = "/metrics";

pub(crate) const PROBLEM_INTERNAL: &str = "https://ttldelta.dev/problems/internal";
pub(crate) const PROBLEM_BAD_REQUEST: &str = "https://ttldelta.dev/problems/bad-request";

pub(crate) const LIVENESS_GREETING: &str = "Hello World";
pub(crate) const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";
