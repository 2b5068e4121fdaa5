use api_router::{api_state::ApiState, board_routes};
use axum::Router;
use common::utils::config::get_config;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    // Missing SURREALDB_ADDRESS or SURREALDB_ACCESS_KEY ends the process here
    let config = get_config().inspect_err(|err| {
        error!(error = %err, "Missing or invalid configuration; set SURREALDB_ADDRESS and SURREALDB_ACCESS_KEY");
    })?;

    let api_state = ApiState::new(&config).await.inspect_err(|err| {
        error!(error = %err, "Failed to connect to the database");
    })?;

    let app = build_app(api_state);

    let serve_address = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&serve_address).await?;
    info!("Server running on http://{serve_address}");
    info!("API endpoints available at http://{serve_address}/api/hello");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Board routes with permissive CORS and per-request tracing.
fn build_app(state: ApiState) -> Router {
    board_routes()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(err) => {
                error!(error = %err, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                error!(error = %err, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
