// ABOUTME: Main entry point for the SecureVault CCTV API gateway
// ABOUTME: Wires configuration, upstream clients, routes, and the CORS layer

use axum::{
    Router,
    response::Json,
    routing::get,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

mod auth;
mod auth_helpers;
mod cameras;
mod config;
mod error;
mod object_store;
mod recordings;
mod relay;
mod store;
mod types;

mod integration_tests;

use auth::AuthClient;
use config::Config;
use object_store::ObjectStore;
use relay::RelayConfig;
use store::MetadataStore;

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthClient,
    pub store: MetadataStore,
    pub objects: ObjectStore,
    pub relay: RelayConfig,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route(
            "/cameras",
            get(cameras::list_cameras).post(cameras::create_camera),
        )
        .route(
            "/cameras/{id}",
            get(cameras::get_camera)
                .put(cameras::update_camera)
                .delete(cameras::delete_camera),
        )
        .route("/recordings", get(recordings::list_recordings))
        .route(
            "/recordings/{id}",
            get(recordings::get_recording).delete(recordings::delete_recording),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "securevault_api=info,tower_http=warn".into()),
        )
        .init();

    let config = Config::from_env()?;

    let state = AppState {
        auth: AuthClient::new(&config.supabase)?,
        store: MetadataStore::new(&config.supabase)?,
        objects: ObjectStore::new(&config.wasabi, config.upload_url_expiry_secs),
        relay: config.relay.clone(),
    };

    let listener = TcpListener::bind(&config.bind_addr).await?;
    println!("🚀 SecureVault API running at http://{}", config.bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "SecureVault CCTV API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "health": "/health",
            "cameras": "/cameras",
            "recordings": "/recordings",
        }
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "service": "SecureVault API",
    }))
}
