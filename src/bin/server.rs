use std::{
    env::{self},
    fs::OpenOptions,
    net::SocketAddr,
    path::PathBuf,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::{Parser, ValueEnum};
use tower_http::trace::TraceLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use piggybank_rs::{AppState, build_router, graceful_shutdown};

/// The REST API server for piggybank_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The storage backend to keep records in.
    #[arg(long, value_enum, default_value = "sqlite")]
    backend: Backend,

    /// File path to the application SQLite database (sqlite backend).
    #[arg(long, default_value = "piggybank.db")]
    db_path: PathBuf,

    /// Directory holding the JSON collection files (json backend).
    #[arg(long, default_value = "piggybank-data")]
    data_dir: PathBuf,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Backend {
    /// Process-local maps, nothing persisted.
    Memory,
    /// One JSON array file per collection under --data-dir.
    Json,
    /// A SQLite database at --db-path.
    Sqlite,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let secret = env::var("SECRET").expect("The environment variable 'SECRET' must be set");

    let state = match args.backend {
        Backend::Memory => AppState::in_memory(&secret),
        Backend::Json => AppState::with_json_dir(&args.data_dir, &secret)
            .expect("Could not open the data directory."),
        Backend::Sqlite => {
            AppState::with_sqlite(&args.db_path, &secret).expect("Could not open the database.")
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state));

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .unwrap();
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
