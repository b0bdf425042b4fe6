use sea_orm::{ConnectOptions, Database};
use tracing::info;

use lavka_server::config::AppConfig;
use lavka_server::router::build_router;
use lavka_server::state::AppState;
use lavka_server::telemetry::init_tracing;
use lavka_server::usecase::token::TokenService;

/// Connection pool ceiling: 10 steady connections plus 20 of burst headroom.
const POOL_MAX_CONNECTIONS: u32 = 30;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = AppConfig::from_env();

    let mut opts = ConnectOptions::new(config.database_url());
    opts.max_connections(POOL_MAX_CONNECTIONS);
    let db = Database::connect(opts)
        .await
        .expect("failed to connect to database");

    let state = AppState {
        db: db.clone(),
        tokens: TokenService {
            secret: config.jwt_secret.clone(),
            algorithm: config.jwt_algorithm,
            access_ttl_secs: config.access_token_ttl_secs,
            refresh_ttl_secs: config.refresh_token_ttl_secs,
        },
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("server listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    // Drain the pool before exit.
    db.close().await.expect("failed to close database pool");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl-c");
    info!("shutdown signal received");
}
