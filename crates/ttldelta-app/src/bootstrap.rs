use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};
use ttldelta_api::ApiServer;
use ttldelta_config::{AppConfig, LogFormatSetting};
use ttldelta_core::MetadataStore;
use ttldelta_events::{Event, EventBus};
use ttldelta_fsops::{DeltaConverter, ShareMapping};
use ttldelta_store::{SparqlSettings, SparqlStore};
use ttldelta_telemetry::{GlobalContextGuard, LogFormat, LoggingConfig, Metrics};

use crate::error::{AppError, AppResult};
use crate::lifecycle::TaskLifecycle;

const SERVICE_NAME: &str = "ttldelta";
const BUILD_ID: &str = env!("CARGO_PKG_VERSION");

/// Dependencies required to bootstrap the service.
pub(crate) struct BootstrapDependencies {
    config: AppConfig,
    events: EventBus,
    telemetry: Metrics,
    store: Arc<dyn MetadataStore>,
}

impl BootstrapDependencies {
    /// Construct production dependencies from the environment for the binary entrypoint.
    pub(crate) fn from_env() -> AppResult<Self> {
        let config =
            AppConfig::from_env().map_err(|err| AppError::config("app_config.from_env", err))?;
        let telemetry =
            Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
        let store = SparqlStore::new(sparql_settings(&config))
            .map_err(|err| AppError::store("sparql_store.new", err))?;

        Ok(Self {
            config,
            events: EventBus::new(),
            telemetry,
            store: Arc::new(store),
        })
    }
}

fn sparql_settings(config: &AppConfig) -> SparqlSettings {
    SparqlSettings {
        endpoint: config.sparql_endpoint.clone(),
        task_graph: config.task_graph.clone(),
        file_graph: config.file_graph.clone(),
        file_resource_base: config.file_resource_base.clone(),
        status_tokens: config.status_tokens.clone(),
    }
}

const fn log_format(setting: LogFormatSetting) -> LogFormat {
    match setting {
        LogFormatSetting::Inferred => LogFormat::infer(),
        LogFormatSetting::Json => LogFormat::Json,
        LogFormatSetting::Pretty => LogFormat::Pretty,
    }
}

/// Entry point for the service boot sequence.
///
/// # Errors
///
/// Returns an error if configuration is invalid, logging cannot be installed, or the HTTP
/// listener fails.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env()?;
    run_app_with(dependencies).await
}

/// Boot sequence that relies entirely on injected dependencies.
pub(crate) async fn run_app_with(dependencies: BootstrapDependencies) -> AppResult<()> {
    let BootstrapDependencies {
        config,
        events,
        telemetry,
        store,
    } = dependencies;

    ttldelta_telemetry::init_logging(&LoggingConfig {
        level: &config.log_level,
        format: log_format(config.log_format),
        build_sha: BUILD_ID,
    })
    .map_err(|err| AppError::telemetry("telemetry.init", err))?;
    let _context = GlobalContextGuard::new(SERVICE_NAME);

    info!(
        task_graph = %config.task_graph,
        file_graph = %config.file_graph,
        endpoint = %config.sparql_endpoint,
        share_mount = %config.share_mount.display(),
        "ttldelta bootstrap starting"
    );

    let event_log = spawn_event_log(&events);
    let lifecycle = TaskLifecycle::new(
        store,
        DeltaConverter::new(telemetry.clone()),
        ShareMapping::new(config.share_uri_prefix.clone(), config.share_mount.clone()),
        events,
        telemetry.clone(),
    )
    .with_status_tokens(config.status_tokens.clone())
    .with_creator(config.service_uri.clone());

    report_stale_tasks(&lifecycle).await;

    let api = ApiServer::new(Arc::new(lifecycle), telemetry);
    let addr = config.listen_addr();
    info!(addr = %addr, "launching api listener");
    let served = api
        .serve(addr)
        .await
        .map_err(|err| AppError::api_server("api_server.serve", err));
    event_log.abort();
    served
}

/// Mirror lifecycle events into the debug log.
fn spawn_event_log(events: &EventBus) -> JoinHandle<()> {
    let mut stream = events.subscribe();
    tokio::spawn(async move {
        while let Some(envelope) = stream.next().await {
            match &envelope.event {
                Event::FileConverted { input, output, .. } => debug!(
                    event_id = envelope.id,
                    task = envelope.event.task(),
                    input = %input,
                    output = %output,
                    "file_converted"
                ),
                event => debug!(event_id = envelope.id, task = event.task(), "{}", event.kind()),
            }
        }
    })
}

async fn report_stale_tasks(lifecycle: &TaskLifecycle) {
    match lifecycle.stale_ongoing_tasks().await {
        Ok(tasks) if tasks.is_empty() => {}
        Ok(tasks) => {
            for task in &tasks {
                warn!(task = %task, "task left ongoing by a previous run");
            }
            warn!(count = tasks.len(), "ongoing tasks need manual resubmission");
        }
        Err(err) => warn!(error = %err, "could not list ongoing tasks at startup"),
    }
}
