//! Graphex — database-backed incremental graph exploration server.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod routes;
mod state;

use graphex_core::GraphexConfig;
use graphex_ingest::IngestOptions;
use graphex_rank::RankMethod;
use state::AppState;

fn resolve_data_dir() -> PathBuf {
    std::env::var("GRAPHEX_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Handle CLI subcommands
    if args.len() > 1 {
        match args[1].as_str() {
            "--ingest" | "ingest" => {
                if args.len() < 3 {
                    eprintln!("Usage: graphex ingest <dot-file> [method]");
                    std::process::exit(1);
                }
                let dot_path = PathBuf::from(&args[2]);
                let method: RankMethod = if args.len() > 3 {
                    args[3].parse().map_err(|e| anyhow::anyhow!("{}", e))?
                } else {
                    RankMethod::Degree
                };
                return run_ingest(&dot_path, method).await;
            }
            "--help" | "-h" | "help" => {
                println!("Graphex — incremental graph exploration server");
                println!();
                println!("Usage: graphex [command]");
                println!();
                println!("Commands:");
                println!("  (none)                        Start the server");
                println!("  ingest <dot-file> [method]    Preprocess a DOT file into the store");
                println!("                                (method: degree, betweenness, pagerank)");
                println!("  help                          Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Unknown command: {}. Use 'graphex help' for usage.", other);
                std::process::exit(1);
            }
        }
    }

    // Normal server startup
    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = GraphexConfig::from_env(&data_dir)?;
    let port = config.port;

    let state = Arc::new(AppState::new(config)?);

    let app = routes::build_router(state.clone());

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Graphex server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Preprocess a DOT file into a fresh store generation without serving.
async fn run_ingest(dot_path: &Path, method: RankMethod) -> anyhow::Result<()> {
    let data_dir = resolve_data_dir();
    let config = GraphexConfig::from_env(&data_dir)?;

    let text = std::fs::read_to_string(dot_path)?;
    let (nodes, edges) = graphex_ingest::parse_dot(&text);

    let options = IngestOptions {
        method,
        top_n: config.important_top_n,
        batch_size: config.batch_size,
    };
    let state = Arc::new(AppState::new(config)?);
    let outcome = state::rebuild(state, nodes, edges, options).await?;

    println!(
        "Graph saved as generation {}: {} nodes, {} edges ({} excluded, {} malformed records)",
        outcome.generation,
        outcome.report.inserted_nodes,
        outcome.report.inserted_edges,
        outcome.report.excluded_missing_endpoint + outcome.report.excluded_duplicate,
        outcome.report.malformed_records,
    );
    if outcome.report.ranking_fallback {
        println!(
            "Warning: {} ranking was unavailable, fell back to degree",
            outcome.report.method
        );
    }
    Ok(())
}
