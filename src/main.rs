use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use prices_api::config::{self, AggregateScope};
use prices_api::{server, AsyncPricesService};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Bulk import and export of price records as zipped CSV.
#[derive(Debug, Parser)]
#[command(name = "prices-api", version, about)]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "PRICES_BIND", default_value = config::DEFAULT_BIND)]
    bind: String,

    /// DuckDB database file. Defaults to the platform data directory.
    #[arg(long, env = "PRICES_DATABASE", conflicts_with = "in_memory")]
    database: Option<PathBuf>,

    /// Keep everything in memory; data is lost on exit.
    #[arg(long, env = "PRICES_IN_MEMORY")]
    in_memory: bool,

    /// Reject uploaded archives larger than this many bytes.
    #[arg(long, env = "PRICES_MAX_ARCHIVE_SIZE")]
    max_archive_size: Option<usize>,

    /// What import summaries describe: `batch` or `store`.
    #[arg(long, env = "PRICES_AGGREGATE_SCOPE", default_value = "batch", value_parser = parse_scope)]
    aggregate_scope: AggregateScope,

    /// Attempts at opening the database before giving up.
    #[arg(long, env = "PRICES_CONNECT_ATTEMPTS", default_value_t = config::DEFAULT_CONNECT_ATTEMPTS)]
    connect_attempts: u32,

    /// Seconds to wait between open attempts.
    #[arg(long, env = "PRICES_CONNECT_BACKOFF_SECS", default_value_t = config::DEFAULT_CONNECT_BACKOFF.as_secs())]
    connect_backoff_secs: u64,
}

fn parse_scope(s: &str) -> Result<AggregateScope, String> {
    s.parse().map_err(|e: prices_api::PricesError| e.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_line_number(true)
        .compact()
        .init();

    let args = Args::parse();

    let mut builder = AsyncPricesService::builder()
        .max_archive_size(args.max_archive_size)
        .aggregate_scope(args.aggregate_scope)
        .connect_attempts(args.connect_attempts)
        .connect_backoff(Duration::from_secs(args.connect_backoff_secs));
    if args.in_memory {
        builder = builder.in_memory();
    } else if let Some(path) = &args.database {
        builder = builder.database_path(path);
    }

    let service = builder.build().await?;
    info!("{}", service.service());

    let app = server::router(service);
    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
