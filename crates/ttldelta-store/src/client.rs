//! `MetadataStore` over the SPARQL 1.1 protocol.
//!
//! # Design
//! - Queries and updates are form-encoded POSTs to one endpoint.
//! - Every request carries `mu-auth-sudo: true`; the service writes across graphs on its own
//!   authority, not on behalf of a user session.
//! - No retries: a failed request surfaces as a `StoreError` to the task that issued it.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use tracing::debug;
use ttldelta_core::{
    GeneratedFile, InputFile, MetadataStore, RegisteredFile, StatusTokens, StoreError,
    StoreResult, TaskStatus, TaskUri, vocab,
};
use uuid::Uuid;

use crate::results::{self, SelectResults};
use crate::sparql::{self, FileIdentities};

const SUDO_HEADER: &str = "mu-auth-sudo";
const RESULTS_MEDIA_TYPE: &str = "application/sparql-results+json";

/// Connection and vocabulary settings of a [`SparqlStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparqlSettings {
    /// SPARQL query and update endpoint.
    pub endpoint: String,
    /// Graph holding task metadata.
    pub task_graph: String,
    /// Graph holding file metadata.
    pub file_graph: String,
    /// Base URI for minted logical files.
    pub file_resource_base: String,
    /// External URIs of the task status values.
    pub status_tokens: StatusTokens,
}

impl SparqlSettings {
    /// Settings for `endpoint` with the default graphs, file base and status tokens.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            task_graph: vocab::DEFAULT_GRAPH.to_string(),
            file_graph: vocab::DEFAULT_GRAPH.to_string(),
            file_resource_base: vocab::DEFAULT_FILE_RESOURCE_BASE.to_string(),
            status_tokens: StatusTokens::default(),
        }
    }
}

/// Metadata store gateway talking to a SPARQL endpoint.
#[derive(Clone)]
pub struct SparqlStore {
    client: Client,
    settings: SparqlSettings,
}

impl SparqlStore {
    /// Build a gateway with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Request`] when the HTTP client cannot be constructed.
    pub fn new(settings: SparqlSettings) -> StoreResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(SUDO_HEADER, HeaderValue::from_static("true"));
        headers.insert(ACCEPT, HeaderValue::from_static(RESULTS_MEDIA_TYPE));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|source| StoreError::Request {
                operation: "client.build",
                source: Box::new(source),
            })?;
        Ok(Self { client, settings })
    }

    /// Settings the gateway was built with.
    #[must_use]
    pub const fn settings(&self) -> &SparqlSettings {
        &self.settings
    }

    async fn post(
        &self,
        operation: &'static str,
        field: &'static str,
        body: String,
    ) -> StoreResult<Response> {
        debug!(operation, sparql = %body, "sending sparql request");
        let response = self
            .client
            .post(&self.settings.endpoint)
            .form(&[(field, body)])
            .send()
            .await
            .map_err(|source| StoreError::Request {
                operation,
                source: Box::new(source),
            })?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(StoreError::Status {
                operation,
                status: status.as_u16(),
                body: response.text().await.ok(),
            })
        }
    }

    async fn select(&self, operation: &'static str, query: String) -> StoreResult<SelectResults> {
        self.post(operation, "query", query)
            .await?
            .json::<SelectResults>()
            .await
            .map_err(|source| StoreError::Decode {
                operation,
                source: Box::new(source),
            })
    }

    async fn update(&self, operation: &'static str, update: String) -> StoreResult<()> {
        self.post(operation, "update", update).await.map(drop)
    }
}

#[async_trait]
impl MetadataStore for SparqlStore {
    async fn find_input_files(&self, task: &TaskUri) -> StoreResult<Vec<InputFile>> {
        const OPERATION: &str = "find_input_files";
        let query = sparql::find_input_files(
            &self.settings.task_graph,
            &self.settings.file_graph,
            task.as_str(),
        );
        let results = self.select(OPERATION, query).await?;
        let mut files = results
            .results
            .bindings
            .iter()
            .map(|solution| {
                Ok(InputFile {
                    physical_uri: results::uri(OPERATION, solution, "physicalFile")?,
                    created: results::datetime(OPERATION, solution, "created")?,
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;
        // Order on parsed timestamps; some stores sort typed literals lexically.
        files.sort_by_key(|file| file.created);
        Ok(files)
    }

    async fn set_status(&self, task: &TaskUri, status: TaskStatus) -> StoreResult<()> {
        let update = sparql::set_status(
            &self.settings.task_graph,
            task.as_str(),
            self.settings.status_tokens.token(status),
        );
        self.update("set_status", update).await
    }

    async fn register_generated_file(
        &self,
        task: &TaskUri,
        file: &GeneratedFile,
    ) -> StoreResult<RegisteredFile> {
        let logical_uuid = Uuid::new_v4().to_string();
        let physical_uuid = Uuid::new_v4().to_string();
        let logical_uri = format!("{}{logical_uuid}", self.settings.file_resource_base);
        let update = sparql::register_generated_file(
            &self.settings.task_graph,
            &self.settings.file_graph,
            task.as_str(),
            file,
            FileIdentities {
                logical_uri: &logical_uri,
                logical_uuid: &logical_uuid,
                physical_uuid: &physical_uuid,
            },
        );
        self.update("register_generated_file", update).await?;
        Ok(RegisteredFile {
            logical_uri,
            physical_uri: file.physical_uri.clone(),
        })
    }

    async fn tasks_in_status(&self, status: TaskStatus) -> StoreResult<Vec<TaskUri>> {
        const OPERATION: &str = "tasks_in_status";
        let query = sparql::tasks_in_status(
            &self.settings.task_graph,
            self.settings.status_tokens.token(status),
        );
        let results = self.select(OPERATION, query).await?;
        results
            .results
            .bindings
            .iter()
            .map(|solution| results::uri(OPERATION, solution, "task").map(TaskUri::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex, PoisonError};

    use axum::extract::{Form, State};
    use axum::http::{HeaderMap as AxumHeaders, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};
    use chrono::Utc;
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    #[derive(Clone, Default)]
    struct Recorded {
        requests: Arc<Mutex<Vec<(HashMap<String, String>, Option<String>)>>>,
    }

    impl Recorded {
        fn take(&self) -> Vec<(HashMap<String, String>, Option<String>)> {
            std::mem::take(&mut *self.requests.lock().unwrap_or_else(PoisonError::into_inner))
        }
    }

    async fn endpoint(
        State((recorded, reply)): State<(Recorded, Option<Value>)>,
        headers: AxumHeaders,
        Form(form): Form<HashMap<String, String>>,
    ) -> axum::response::Response {
        let sudo = headers
            .get(SUDO_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        recorded
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((form, sudo));
        match reply {
            Some(body) => Json(body).into_response(),
            None => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        }
    }

    async fn serve(reply: Option<Value>) -> anyhow::Result<(SparqlStore, Recorded)> {
        let recorded = Recorded::default();
        let app = Router::new()
            .route("/sparql", post(endpoint))
            .with_state((recorded.clone(), reply));
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        let store = SparqlStore::new(SparqlSettings::new(format!("http://{addr}/sparql")))?;
        Ok((store, recorded))
    }

    #[tokio::test]
    async fn input_files_are_decoded_and_ordered() -> anyhow::Result<()> {
        let reply = json!({
            "head": { "vars": ["physicalFile", "created"] },
            "results": { "bindings": [
                {
                    "physicalFile": { "type": "uri", "value": "share://late.ttl" },
                    "created": { "type": "literal", "value": "2024-05-01T12:00:03Z" }
                },
                {
                    "physicalFile": { "type": "uri", "value": "share://early.ttl" },
                    "created": { "type": "literal", "value": "2024-05-01T12:00:01Z" }
                }
            ] }
        });
        let (store, recorded) = serve(Some(reply)).await?;

        let files = store
            .find_input_files(&TaskUri::from("http://ex/task/1"))
            .await?;

        let uris: Vec<&str> = files.iter().map(|file| file.physical_uri.as_str()).collect();
        assert_eq!(uris, ["share://early.ttl", "share://late.ttl"]);
        let requests = recorded.take();
        assert_eq!(requests.len(), 1);
        let (form, sudo) = &requests[0];
        assert!(form.get("query").is_some_and(|query| query.contains("<http://ex/task/1>")));
        assert_eq!(sudo.as_deref(), Some("true"));
        Ok(())
    }

    #[tokio::test]
    async fn status_change_is_a_single_update() -> anyhow::Result<()> {
        let (store, recorded) = serve(Some(json!({}))).await?;

        store
            .set_status(&TaskUri::from("http://ex/task/1"), TaskStatus::Ongoing)
            .await?;

        let requests = recorded.take();
        assert_eq!(requests.len(), 1);
        let update = requests[0].0.get("update").cloned().unwrap_or_default();
        assert!(update.contains(vocab::STATUS_ONGOING));
        assert!(update.contains("DELETE"));
        Ok(())
    }

    #[tokio::test]
    async fn registration_mints_logical_uri_under_the_base() -> anyhow::Result<()> {
        let (store, recorded) = serve(Some(json!({}))).await?;
        let file = GeneratedFile {
            physical_uri: "share://a.delta".into(),
            name: "a".into(),
            extension: "delta".into(),
            format: vocab::DELTA_MEDIA_TYPE.into(),
            size: 10,
            created: Utc::now(),
            creator: None,
        };

        let registered = store
            .register_generated_file(&TaskUri::from("http://ex/task/1"), &file)
            .await?;

        assert!(registered.logical_uri.starts_with(vocab::DEFAULT_FILE_RESOURCE_BASE));
        assert_eq!(registered.physical_uri, "share://a.delta");
        let update = recorded.take()[0].0.get("update").cloned().unwrap_or_default();
        assert!(update.contains(&registered.logical_uri));
        Ok(())
    }

    #[tokio::test]
    async fn error_statuses_carry_the_body() -> anyhow::Result<()> {
        let (store, _) = serve(None).await?;

        let err = store
            .set_status(&TaskUri::from("http://ex/task/1"), TaskStatus::Failed)
            .await;

        assert!(matches!(
            err,
            Err(StoreError::Status {
                operation: "set_status",
                status: 500,
                body: Some(ref body),
            }) if body == "boom"
        ));
        Ok(())
    }

    #[tokio::test]
    async fn tasks_in_status_reads_task_uris() -> anyhow::Result<()> {
        let reply = json!({
            "results": { "bindings": [
                { "task": { "type": "uri", "value": "http://ex/task/9" } }
            ] }
        });
        let (store, _) = serve(Some(reply)).await?;

        let tasks = store.tasks_in_status(TaskStatus::Ongoing).await?;

        assert_eq!(tasks, vec![TaskUri::from("http://ex/task/9")]);
        Ok(())
    }
}
