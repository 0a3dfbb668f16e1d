//! HTTP server lifecycle: bind → spawn background task → return handle
//! with shutdown channel.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::api::router::triage_api_router;
use crate::api::types::ApiContext;
use crate::remote::RemoteError;

// ═══════════════════════════════════════════════════════════
// Public types
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid advisor configuration: {0}")]
    Advisor(#[from] RemoteError),

    #[error("Server task failed: {0}")]
    Task(String),
}

/// Session metadata for a running server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSession {
    pub session_id: String,
    pub server_addr: String,
    pub port: u16,
    pub started_at: String,
}

/// Handle to a running triage server.
pub struct TriageServer {
    pub session: ServerSession,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<std::io::Result<()>>,
}

impl TriageServer {
    /// Shut down the server gracefully. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("Triage server shutdown signal sent");
        }
    }

    /// Wait for the server task to finish.
    pub async fn stopped(self) -> Result<(), ServerError> {
        match self.task.await {
            Ok(result) => result.map_err(ServerError::from),
            Err(e) => Err(ServerError::Task(e.to_string())),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Server lifecycle
// ═══════════════════════════════════════════════════════════

/// Bind `addr`, mount `triage_api_router`, and serve in a background task.
///
/// Port 0 binds an ephemeral port; the chosen port is in the session.
pub async fn start_server(ctx: ApiContext, addr: SocketAddr) -> Result<TriageServer, ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    let addr = listener.local_addr()?;
    tracing::info!(%addr, "Triage server binding");

    let app = triage_api_router(ctx);

    let session = ServerSession {
        session_id: Uuid::new_v4().to_string(),
        server_addr: addr.to_string(),
        port: addr.port(),
        started_at: chrono::Utc::now().to_rfc3339(),
    };

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("Triage server received shutdown signal");
        };

        tracing::info!(%addr, "Triage server started");

        let result = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await;

        if let Err(e) = &result {
            tracing::error!("Triage server error: {e}");
        }
        tracing::info!("Triage server stopped");
        result
    });

    Ok(TriageServer {
        session,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    use super::*;
    use crate::triage::TriageOrchestrator;

    fn loopback() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
    }

    fn test_ctx() -> ApiContext {
        ApiContext::new(TriageOrchestrator::rule_based_only())
    }

    #[tokio::test]
    async fn start_and_stop_server() {
        let mut server = start_server(test_ctx(), loopback())
            .await
            .expect("server should start");

        assert!(!server.session.session_id.is_empty());
        assert!(server.session.port > 0);

        let url = format!("http://127.0.0.1:{}/api/health", server.session.port);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        server.shutdown();
        tokio::time::timeout(Duration::from_secs(5), server.stopped())
            .await
            .expect("server should stop")
            .expect("clean shutdown");
    }

    #[tokio::test]
    async fn server_session_has_valid_metadata() {
        let mut server = start_server(test_ctx(), loopback())
            .await
            .expect("server should start");

        assert!(!server.session.started_at.is_empty());
        assert!(server.session.server_addr.contains(':'));

        server.shutdown();
    }

    #[tokio::test]
    async fn server_handles_triage_over_http() {
        let mut server = start_server(test_ctx(), loopback())
            .await
            .expect("server should start");
        let port = server.session.port;

        let client = reqwest::Client::new();
        let resp = client
            .post(format!("http://127.0.0.1:{port}/api/triage"))
            .json(&serde_json::json!({
                "questionnaire": {"symptoms": ["runny nose"], "severity": 1}
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert!(body["result"]["summary"].is_string());

        let resp = reqwest::get(format!("http://127.0.0.1:{port}/nonexistent"))
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

        server.shutdown();
    }

    #[tokio::test]
    async fn oversized_body_over_http_gets_json_413() {
        let mut server = start_server(test_ctx(), loopback())
            .await
            .expect("server should start");
        let port = server.session.port;

        let notes = "a".repeat(crate::api::router::MAX_BODY_BYTES + 6 * 1024);
        let resp = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{port}/api/triage"))
            .json(&serde_json::json!({
                "questionnaire": {"symptoms": ["cough"], "notes": notes}
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::PAYLOAD_TOO_LARGE);
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");

        server.shutdown();
    }

    #[tokio::test]
    async fn bind_conflict_is_reported() {
        let mut first = start_server(test_ctx(), loopback()).await.unwrap();
        let taken: SocketAddr = first.session.server_addr.parse().unwrap();
        let err = match start_server(test_ctx(), taken).await {
            Ok(_) => panic!("second bind on the same port should fail"),
            Err(e) => e,
        };
        assert!(matches!(err, ServerError::Bind { .. }));
        first.shutdown();
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let mut server = start_server(test_ctx(), loopback())
            .await
            .expect("server should start");

        server.shutdown();
        server.shutdown();
    }
}
