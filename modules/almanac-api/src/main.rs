use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use almanac_common::{AlmanacError, Config, CurationResult};
use almanac_pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "almanac-api", about = "On-this-day curation service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Curate one date and print the JSON result.
    Curate {
        /// Date to curate, YYYY-MM-DD. Defaults to today (UTC).
        #[arg(long)]
        date: Option<String>,
        /// Number of items to return (10-30).
        #[arg(long)]
        limit: Option<u32>,
    },
}

struct AppState {
    pipeline: Pipeline,
}

#[derive(Deserialize)]
struct HistoryRequest {
    date: Option<String>,
    limit: Option<u32>,
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true, "service": "almanac-api" }))
}

async fn api_history(
    State(state): State<Arc<AppState>>,
    Json(body): Json<HistoryRequest>,
) -> impl IntoResponse {
    let Some(date) = body.date else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "success": false,
                "error": "Body must include { date: \"YYYY-MM-DD\" }"
            })),
        )
            .into_response();
    };

    match state.pipeline.curate(Some(&date), body.limit).await {
        Ok(result) => Json(result).into_response(),
        Err(e @ AlmanacError::InvalidDate(_)) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "success": false, "error": e.to_string() })),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Curation failed past the pipeline boundary");
            Json(CurationResult::failure(date, e.to_string())).into_response()
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    let state = Arc::new(AppState {
        pipeline: Pipeline::from_config(&config),
    });

    let app = Router::new()
        .route("/", get(health))
        .route("/api/history", post(api_history))
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
        .with_state(state);

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("Almanac API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn curate_once(config: Config, date: Option<String>, limit: Option<u32>) -> Result<()> {
    let pipeline = Pipeline::from_config(&config);
    let result = pipeline.curate(date.as_deref(), limit).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("almanac=info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Curate { date, limit } => curate_once(config, date, limit).await,
    }
}
