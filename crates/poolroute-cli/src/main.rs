//! PoolRoute CLI
//!
//! Sends requests through an endpoint pool and inspects pool configuration

use anyhow::{Context, bail};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use http::{HeaderName, HeaderValue, Method, Request};
use poolroute_config_file::PoolConfig;
use poolroute_egress::ReqwestSender;
use poolroute_routing::LoadBalancer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "poolroute")]
#[command(about = "PoolRoute - round-robin failover across API endpoints", long_about = None)]
struct Cli {
    /// Path to the pool configuration (YAML or TOML)
    #[arg(short, long, env = "POOLROUTE_CONFIG", default_value = "~/.poolroute/config.yaml")]
    config: PathBuf,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and list the endpoint pool
    Check,
    /// Send one request through the pool and print the response
    Send {
        /// Request path and query, e.g. /openai/deployments/gpt/chat/completions?api-version=2024-02-01
        #[arg(long)]
        path: String,

        /// HTTP method
        #[arg(short = 'X', long, default_value = "POST")]
        method: String,

        /// Request body
        #[arg(short, long)]
        data: Option<String>,

        /// Read the request body from a file
        #[arg(long, conflicts_with = "data")]
        data_file: Option<PathBuf>,

        /// Extra header, `name: value` (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// URL scheme used to reach the endpoints
        #[arg(long, default_value = "https")]
        scheme: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = PoolConfig::from_file(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    // Merge environment variables (they override the config file)
    config.merge_env();

    // CLI flag has the highest precedence
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    init_tracing(&config.logging.level)?;

    config.validate()?;
    let registry = config.build_registry()?;

    match cli.command {
        Commands::Check => {
            println!(
                "Configuration OK: {} endpoint(s), credential header '{}', default cooldown {}s",
                registry.len(),
                config.credential_header,
                config.default_cooldown_secs
            );
            for (index, endpoint) in registry.iter().enumerate() {
                println!("  {}. {}", index + 1, endpoint.host());
            }
        }
        Commands::Send {
            path,
            method,
            data,
            data_file,
            headers,
            scheme,
        } => {
            let body = match (data, data_file) {
                (Some(data), _) => Bytes::from(data),
                (None, Some(file)) => Bytes::from(
                    std::fs::read(&file)
                        .with_context(|| format!("Failed to read {}", file.display()))?,
                ),
                (None, None) => Bytes::new(),
            };

            let url = seed_url(&scheme, &path);

            let method = Method::from_bytes(method.to_uppercase().as_bytes())
                .with_context(|| format!("Invalid HTTP method '{}'", method))?;

            let mut builder = Request::builder().method(method).uri(&url);
            if !body.is_empty() && !has_header(&headers, "content-type") {
                builder = builder.header(http::header::CONTENT_TYPE, "application/json");
            }
            for raw in &headers {
                let (name, value) = parse_header(raw)?;
                builder = builder.header(name, value);
            }
            let request = builder
                .body(body)
                .with_context(|| format!("Invalid request for {}", url))?;

            let sender = ReqwestSender::new(&config.http_client_config())?;
            let balancer = LoadBalancer::with_config(
                registry,
                Arc::new(sender),
                config.dispatch_config()?,
            );

            info!(url = %url, "Dispatching request through pool");
            let response = balancer.dispatch(request).await?;

            println!("HTTP {}", response.status());
            println!("{}", String::from_utf8_lossy(response.body()));

            let cooling = balancer.cooling_down();
            if !cooling.is_empty() {
                for (host, remaining) in cooling {
                    eprintln!("cooling down: {} ({}s left)", host, remaining.as_secs());
                }
            }
        }
    }

    Ok(())
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let log_level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::new(format!("{}", log_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Authority of the URL handed to the pool; replaced on every attempt
const SEED_AUTHORITY: &str = "pool.invalid";

/// Build the inbound URL for `send`
///
/// The seed authority carries no port, so port-less endpoints keep their
/// scheme's default port after rewriting.
fn seed_url(scheme: &str, path: &str) -> String {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    format!("{}://{}{}", scheme, SEED_AUTHORITY, path)
}

fn has_header(headers: &[String], name: &str) -> bool {
    headers.iter().any(|raw| {
        raw.split_once(':')
            .map(|(n, _)| n.trim().eq_ignore_ascii_case(name))
            .unwrap_or(false)
    })
}

fn parse_header(raw: &str) -> anyhow::Result<(HeaderName, HeaderValue)> {
    let Some((name, value)) = raw.split_once(':') else {
        bail!("Header '{}' must look like 'name: value'", raw);
    };
    let name = HeaderName::from_bytes(name.trim().as_bytes())
        .with_context(|| format!("Invalid header name in '{}'", raw))?;
    let value = HeaderValue::from_str(value.trim())
        .with_context(|| format!("Invalid header value in '{}'", raw))?;
    Ok((name, value))
}
