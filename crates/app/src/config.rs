//! Command-line and environment configuration, plus logging setup.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueEnum};
use tracing_subscriber::EnvFilter;
use uzhavar_gateway::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use uzhavar_gateway::ModelConfig;

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info,tower_http=info";

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Generative model options shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub(crate) struct ModelArgs {
    /// API key for the generative model; without one, fallback data is served
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub(crate) api_key: Option<String>,

    /// Model name
    #[arg(long, global = true, env = "UZHAVAR_MODEL", default_value = DEFAULT_MODEL)]
    pub(crate) model: String,

    /// Base URL of the model API
    #[arg(
        long,
        global = true,
        env = "UZHAVAR_MODEL_BASE_URL",
        default_value = DEFAULT_BASE_URL
    )]
    pub(crate) model_base_url: String,

    /// Seconds to wait for a model reply before falling back
    #[arg(
        long,
        global = true,
        env = "UZHAVAR_MODEL_TIMEOUT_SECS",
        default_value_t = 20,
        value_parser = clap::value_parser!(u64).range(1..=600)
    )]
    pub(crate) model_timeout_secs: u64,
}

impl ModelArgs {
    pub(crate) fn to_config(&self) -> ModelConfig {
        ModelConfig::new(self.api_key.clone())
            .with_model(self.model.clone())
            .with_base_url(self.model_base_url.clone())
            .with_timeout(Duration::from_secs(self.model_timeout_secs))
    }
}

/// Listener settings for `uzhavar serve`.
#[derive(Debug, Clone)]
pub(crate) struct ServeConfig {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) tls_cert: Option<PathBuf>,
    pub(crate) tls_key: Option<PathBuf>,
}

/// Install the global tracing subscriber. Logs go to stderr so stdout stays
/// clean for command output.
pub(crate) fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.with_target(false).init(),
        LogFormat::Json => builder.json().init(),
    }
}
