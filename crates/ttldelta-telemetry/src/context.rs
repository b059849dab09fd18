//! Span guards and the request identifier scope.
//!
//! The process-wide `app` span carries the service name and build identifier on every log
//! line. Inside a request, the `x-request-id` value is kept in task-local storage so code
//! far from the HTTP layer (the delta handler, the dispatcher) can log it.

use std::future::Future;
use std::sync::Arc;

use tracing::{Span, span::Entered};

use crate::init::build_sha;

/// Guard that keeps the application-level span entered for the lifetime of the process.
pub struct GlobalContextGuard {
    _guard: Entered<'static>,
}

impl GlobalContextGuard {
    /// Enter the `app` span tagged with `service` and the build identifier.
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        let service = service.into();
        let span: &'static Span = Box::leak(Box::new(
            tracing::info_span!("app", service = %service, build_sha = %build_sha()),
        ));
        Self {
            _guard: span.enter(),
        }
    }
}

tokio::task_local! {
    static REQUEST_ID: Arc<str>;
}

/// Request identifier of the enclosing request, if one is in scope.
#[must_use]
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(ToString::to_string).ok()
}

/// Run `fut` with `request_id` visible to [`current_request_id`].
pub async fn with_request_id<Fut, T>(request_id: impl Into<String>, fut: Fut) -> T
where
    Fut: Future<Output = T>,
{
    REQUEST_ID.scope(Arc::from(request_id.into()), fut).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_context_guard_can_be_dropped() {
        let guard = GlobalContextGuard::new("ttldelta-test");
        drop(guard);
    }

    #[tokio::test]
    async fn request_id_is_scoped_to_the_request() {
        let seen = with_request_id("req-42", async { current_request_id() }).await;
        assert_eq!(seen.as_deref(), Some("req-42"));
        assert!(current_request_id().is_none());
    }

    #[tokio::test]
    async fn nested_requests_see_their_own_id() {
        let (outer, inner) = with_request_id("outer", async {
            let inner = with_request_id("inner", async { current_request_id() }).await;
            (current_request_id(), inner)
        })
        .await;
        assert_eq!(outer.as_deref(), Some("outer"));
        assert_eq!(inner.as_deref(), Some("inner"));
    }
}
