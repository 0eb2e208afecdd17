use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use billet_api::auth::{self, AppState, AppStateInner};
use billet_api::messages;
use billet_api::middleware::require_auth;
use billet_api::responses;
use billet_mail::Mailer;

mod sweep;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "billet=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("BILLET_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("BILLET_DB_PATH").unwrap_or_else(|_| "billet.redb".into());
    let base_url =
        std::env::var("BILLET_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".into());
    let host = std::env::var("BILLET_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("BILLET_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let sweep_secs: u64 = std::env::var("BILLET_SWEEP_SECS")
        .unwrap_or_else(|_| "900".into())
        .parse()?;

    // Open the store; a store we cannot initialize is fatal at startup.
    let store = billet_db::Store::open(&PathBuf::from(&db_path))?;

    // Outbound mail
    let mailer = match std::env::var("BILLET_MAIL_KEY") {
        Ok(key) => {
            let endpoint = std::env::var("BILLET_MAIL_ENDPOINT")
                .unwrap_or_else(|_| "https://mandrillapp.com/api/1.0/messages/send".into());
            let from = std::env::var("BILLET_MAIL_FROM")
                .unwrap_or_else(|_| "billet@example.com".into());
            Mailer::http(endpoint, key, from)
        }
        Err(_) => {
            warn!("BILLET_MAIL_KEY not set, login links are logged instead of emailed");
            Mailer::Log
        }
    };

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        store,
        mailer,
        jwt_secret,
        base_url,
    });

    // Prune stale login tokens in the background
    tokio::spawn(sweep::run_sweep_loop(state.clone(), sweep_secs));

    // Routes
    let public_routes = Router::new()
        .route("/auth/login", post(auth::request_login))
        .route("/auth/verify/{token}", get(auth::verify_login))
        .route("/respond/{key}", get(responses::select))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/messages", post(messages::compose))
        .route("/messages", get(messages::list_messages))
        .route("/messages/{id}", get(messages::get_message))
        .layer(middleware::from_fn(require_auth))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Billet server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
