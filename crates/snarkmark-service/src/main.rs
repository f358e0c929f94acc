use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use snarkmark_service::{DefaultAppState, MemoryAppState, create_app};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("snarkmark_service=debug".parse().unwrap()),
        )
        .init();

    let backend = std::env::var("SNARKMARK_BACKEND").unwrap_or_default();
    let app = if backend == "memory" {
        info!("Using in-memory fixture backend");
        create_app(MemoryAppState::with_fixture_catalog())
    } else {
        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL environment variable must be set");

        let mut connection = SqliteConnection::establish(&database_url).unwrap_or_else(|err| {
            error!(database_url = %database_url, error = %err, "Failed to connect to database");
            std::process::exit(1);
        });

        diesel::sql_query("PRAGMA foreign_keys = ON")
            .execute(&mut connection)
            .unwrap_or_else(|err| {
                error!(error = %err, "Failed to enable foreign keys");
                std::process::exit(1);
            });

        connection
            .run_pending_migrations(MIGRATIONS)
            .unwrap_or_else(|err| {
                error!(error = %err, "Failed to run migrations");
                std::process::exit(1);
            });

        info!(database_url = %database_url, "Connected to database");

        create_app(DefaultAppState::new(Arc::new(Mutex::new(connection))))
    };

    let app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(15))),
    );

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|err| {
            error!(bind_address = %bind_addr, error = %err, "Failed to bind to address");
            std::process::exit(1);
        });

    info!(bind_address = %bind_addr, "Server running");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    if let Err(err) = server.await {
        error!(error = %err, "Server error");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
