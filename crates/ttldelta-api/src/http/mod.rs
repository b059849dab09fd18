//! HTTP router, handlers, and middleware.

pub(crate) mod constants;
pub(crate) mod delta;
pub(crate) mod errors;
pub(crate) mod health;
pub(crate) mod router;
pub(crate) mod telemetry;
