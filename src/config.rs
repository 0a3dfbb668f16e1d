use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use crate::remote::AdvisorSettings;

/// Application-level constants
pub const APP_NAME: &str = "symptom-triage";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND: &str = "127.0.0.1:8787";
pub const DEFAULT_ADVISOR_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-2024-08-06";
pub const DEFAULT_ADVISOR_TIMEOUT_SECS: u64 = 25;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "symptom_triage_lib=info,symptom_triage=info,tower_http=info"
}

/// Command-line and environment configuration for the triage service.
#[derive(Parser, Clone)]
#[command(name = APP_NAME, version, about = "Symptom questionnaire triage service")]
pub struct ServerArgs {
    /// Address the HTTP server listens on.
    #[arg(long, env = "TRIAGE_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Base URL of the OpenAI-compatible advisor endpoint.
    #[arg(long, env = "TRIAGE_ADVISOR_URL", default_value = DEFAULT_ADVISOR_URL)]
    pub advisor_url: String,

    /// Model used for remote triage.
    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// API key for the advisor. Without it every request uses the rule engine.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Seconds to wait for the advisor before falling back.
    #[arg(
        long,
        env = "TRIAGE_ADVISOR_TIMEOUT_SECS",
        default_value_t = DEFAULT_ADVISOR_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..=300)
    )]
    pub advisor_timeout_secs: u64,
}

impl ServerArgs {
    pub fn advisor_timeout(&self) -> Duration {
        Duration::from_secs(self.advisor_timeout_secs)
    }

    /// Remote advisor settings, or `None` when no API key is configured.
    pub fn advisor_settings(&self) -> Option<AdvisorSettings> {
        let api_key = self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())?;
        Some(AdvisorSettings {
            base_url: self.advisor_url.clone(),
            model: self.model.clone(),
            api_key: api_key.to_string(),
            timeout: self.advisor_timeout(),
        })
    }
}

impl std::fmt::Debug for ServerArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerArgs")
            .field("bind", &self.bind)
            .field("advisor_url", &self.advisor_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("advisor_timeout_secs", &self.advisor_timeout_secs)
            .finish()
    }
}
