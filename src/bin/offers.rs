//! Command-line entry point: one-off searches and the REST server.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use insurance_offers::api::rest::{AppState, create_router};
use insurance_offers::domain::value_objects::SearchRequest;
use insurance_offers::domain::value_objects::search_request::{parse_ages, parse_date};
use insurance_offers::infrastructure::config::AppConfig;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "offers", version, about = "Travel insurance offer aggregator")]
struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one search against the configured provider and print the offers.
    Search(SearchArgs),
    /// Serve the REST API and the provider proxy.
    Serve {
        /// Override the configured port.
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Args, Debug)]
struct SearchArgs {
    #[arg(short, long)]
    origin: String,
    #[arg(short, long)]
    destination: String,
    /// Departure date, YYYY-MM-DD.
    #[arg(long)]
    departure: String,
    /// Return date, YYYY-MM-DD.
    #[arg(long = "return")]
    return_date: String,
    /// Comma-separated passenger ages.
    #[arg(short, long, default_value = "30")]
    ages: String,
}

impl SearchArgs {
    fn to_request(&self) -> Result<SearchRequest> {
        Ok(SearchRequest::new(
            self.origin.as_str(),
            self.destination.as_str(),
            parse_date(&self.departure)?,
            parse_date(&self.return_date)?,
            parse_ages(&self.ages)?,
        )?)
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "insurance_offers=info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.json_logs);

    let mut config = AppConfig::load().context("failed to load configuration")?;

    match args.command {
        Command::Search(search) => {
            let request = search.to_request()?;
            let state = AppState::from_config(&config)?;
            let offers = state
                .aggregator
                .fetch_offers(&request, &state.credentials)
                .await?;
            println!("{}", serde_json::to_string_pretty(&offers)?);
        }
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            let state = Arc::new(AppState::from_config(&config)?);
            let app = create_router(state);

            let addr = config.server.bind_address();
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("failed to bind {}", addr))?;
            tracing::info!(%addr, "listening");
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
