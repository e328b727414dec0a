mod commands;
mod config;
mod orchestrator;
mod serve;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use uzhavar_gateway::ModelGateway;

use crate::config::{LogFormat, ModelArgs, ServeConfig};
use crate::orchestrator::DataOrchestrator;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Market prices, farm news and crop-disease scans for Tamil Nadu farmers.
#[derive(Parser)]
#[command(
    name = "uzhavar",
    version,
    about = "Market prices, farm news and crop-disease scans for Tamil Nadu farmers"
)]
struct Cli {
    /// Output format for one-shot commands (text or json)
    #[arg(long, global = true, default_value = "json", value_enum)]
    output: OutputFormat,

    /// Log line format (text or json)
    #[arg(
        long,
        global = true,
        env = "UZHAVAR_LOG_FORMAT",
        default_value = "text",
        value_enum
    )]
    log_format: LogFormat,

    #[command(flatten)]
    model: ModelArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP JSON API server
    Serve {
        /// Port to listen on
        #[arg(long, default_value_t = 5000)]
        port: u16,
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        /// TLS certificate (PEM); requires the `tls` feature
        #[arg(long, requires = "tls_key")]
        tls_cert: Option<PathBuf>,
        /// TLS private key (PEM); requires the `tls` feature
        #[arg(long, requires = "tls_cert")]
        tls_key: Option<PathBuf>,
    },

    /// Fetch current market prices once and print them
    Prices,

    /// Fetch today's agricultural news once and print it
    News,

    /// Analyse a crop photo for disease
    Scan {
        /// Path to the image file
        file: PathBuf,
    },
}

fn main() {
    // A missing .env file is normal.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    config::init_tracing(cli.log_format);

    let orchestrator = DataOrchestrator::new(ModelGateway::from_config(&cli.model.to_config()));

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {}", e);
            process::exit(1);
        }
    };

    let result = rt.block_on(async {
        match cli.command {
            Commands::Serve {
                port,
                host,
                tls_cert,
                tls_key,
            } => {
                let config = ServeConfig {
                    host,
                    port,
                    tls_cert,
                    tls_key,
                };
                serve::start_server(config, orchestrator).await
            }
            Commands::Prices => commands::cmd_prices(&orchestrator, cli.output).await,
            Commands::News => commands::cmd_news(&orchestrator, cli.output).await,
            Commands::Scan { file } => commands::cmd_scan(&orchestrator, &file, cli.output).await,
        }
    });

    if let Err(e) = result {
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
}
