pub mod api;
pub mod config;
pub mod models;
pub mod nearby;
pub mod remote;
pub mod triage;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::{start_server, ApiContext, ServerError};
use crate::config::ServerArgs;
use crate::remote::RemoteAdvisor;
use crate::triage::TriageOrchestrator;

/// Install the global tracing subscriber (`RUST_LOG` overrides the default filter).
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Build the orchestrator from configuration.
///
/// No API key means rule-based triage only. A key with an invalid URL or
/// model name is a startup error rather than a silent fallback.
pub fn build_orchestrator(args: &ServerArgs) -> Result<TriageOrchestrator, ServerError> {
    let Some(settings) = args.advisor_settings() else {
        tracing::warn!("No advisor API key configured; using rule-based triage only");
        return Ok(TriageOrchestrator::rule_based_only());
    };

    let advisor = RemoteAdvisor::new(settings)?;
    tracing::info!(
        base_url = advisor.base_url(),
        model = advisor.model(),
        "Remote advisor configured"
    );
    Ok(TriageOrchestrator::new(Some(Arc::new(advisor))).with_deadline(args.advisor_timeout()))
}

/// Run the service until Ctrl-C.
pub async fn run(args: ServerArgs) -> Result<(), ServerError> {
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let orchestrator = build_orchestrator(&args)?;
    let mut server = start_server(ApiContext::new(orchestrator), args.bind).await?;
    tracing::info!(addr = %server.session.server_addr, "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }

    server.shutdown();
    server.stopped().await
}
