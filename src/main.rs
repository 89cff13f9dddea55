use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chemviz::{
    config::Config,
    database::Database,
    ingestor::CsvParser,
    report::PdfReportGenerator,
    repositories::DatasetRepository,
    services::DatasetService,
    web::WebServer,
};

#[derive(Parser)]
#[command(name = "chemviz")]
#[command(version)]
#[command(about = "Chemical equipment CSV analytics service with PDF reports")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Database URL (overrides config file)
    #[arg(short = 'd', long, value_name = "URL")]
    database_url: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = if cli.log_level == "trace" {
        format!("chemviz={},tower_http=trace", cli.log_level)
    } else {
        format!("chemviz={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting chemviz v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    // Override config with CLI arguments
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(database_url) = cli.database_url {
        config.database.url = database_url;
    }

    info!("Using database: {}", config.database.url);

    let database = Database::new(&config.database).await?;
    database.migrate().await?;
    info!("Database connection established and migrations applied");

    let repository = DatasetRepository::new(database, config.storage.retention());
    match config.storage.retention() {
        Some(limit) => info!("Keeping the {} most recent datasets", limit),
        None => info!("Keeping all datasets"),
    }

    let service = DatasetService::new(
        CsvParser::new(config.ingestion.max_rows),
        Arc::new(repository),
        Arc::new(PdfReportGenerator::new()),
    );

    let web_server = WebServer::new(config, service)?;

    info!(
        "Starting web server on {}:{}",
        web_server.host(),
        web_server.port()
    );
    web_server.serve().await?;

    Ok(())
}
