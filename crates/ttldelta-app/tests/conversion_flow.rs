//! Drives `POST /delta` through the router against an in-memory store and a scratch share.

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use chrono::{TimeZone, Utc};
use serde_json::json;
use tower::ServiceExt;
use ttldelta_api::ApiServer;
use ttldelta_app::TaskLifecycle;
use ttldelta_core::{NO_TASK_FOUND, TaskStatus, TaskUri, vocab};
use ttldelta_events::EventBus;
use ttldelta_fsops::{DeltaConverter, ShareMapping};
use ttldelta_store::MemoryStore;
use ttldelta_telemetry::Metrics;
use ttldelta_test_support::{ShareFixture, notification_json, samples};

const TASK: &str = "http://data.lblod.info/id/tasks/ttl-to-delta-1";

fn service(share: &ShareFixture, store: &MemoryStore) -> Result<Router> {
    let metrics = Metrics::new()?;
    let lifecycle = TaskLifecycle::new(
        Arc::new(store.clone()),
        DeltaConverter::new(metrics.clone()),
        ShareMapping::new(share.prefix(), share.mount()),
        EventBus::new(),
        metrics.clone(),
    );
    Ok(ApiServer::new(Arc::new(lifecycle), metrics).into_router())
}

async fn post(router: Router, body: String) -> Result<(StatusCode, String)> {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/delta")
        .header("content-type", "application/json")
        .body(Body::from(body))?;
    let response = router.oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 64 * 1024).await?;
    Ok((status, String::from_utf8(bytes.to_vec())?))
}

#[tokio::test]
async fn notified_task_is_converted_and_registered() -> Result<()> {
    let share = ShareFixture::new()?;
    let store = MemoryStore::new();
    share.write("exports/first.ttl", samples::SINGLE_LITERAL)?;
    store.seed_task(TASK, TaskStatus::NotStarted);
    store.seed_input_file(
        TASK,
        share.uri("exports/first.ttl"),
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .single()
            .unwrap_or_default(),
    );

    let router = service(&share, &store)?;
    let (status, body) = post(router, notification_json(&[TASK]).to_string()).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Processed 1 task(s): 1 successful, 0 failed");
    assert_eq!(share.read("exports/first.delta")?, samples::SINGLE_LITERAL_DELTA);
    let task = TaskUri::from(TASK);
    assert_eq!(store.status(&task), Some(TaskStatus::Successful));
    let registered = store.registrations(&task);
    assert_eq!(registered.len(), 1);
    assert_eq!(registered[0].physical_uri, "share://exports/first.delta");
    Ok(())
}

#[tokio::test]
async fn failed_task_still_gets_a_success_response() -> Result<()> {
    let share = ShareFixture::new()?;
    let store = MemoryStore::new();
    share.write("broken.ttl", samples::MALFORMED)?;
    store.seed_task(TASK, TaskStatus::NotStarted);
    store.seed_input_file(TASK, share.uri("broken.ttl"), Utc::now());

    let router = service(&share, &store)?;
    let (status, body) = post(router, notification_json(&[TASK]).to_string()).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Processed 1 task(s): 0 successful, 1 failed");
    assert_eq!(store.status(&TaskUri::from(TASK)), Some(TaskStatus::Failed));
    Ok(())
}

#[tokio::test]
async fn unrelated_change_sets_are_a_no_op() -> Result<()> {
    let share = ShareFixture::new()?;
    let store = MemoryStore::new();
    let body = json!([{
        "inserts": [{
            "subject": { "type": "uri", "value": TASK },
            "predicate": { "type": "uri", "value": vocab::ADMS_STATUS },
            "object": { "type": "uri", "value": vocab::STATUS_SUCCESSFUL }
        }],
        "deletes": []
    }]);

    let (status, text) = post(service(&share, &store)?, body.to_string()).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, NO_TASK_FOUND);
    assert!(store.mutations().is_empty());
    Ok(())
}
