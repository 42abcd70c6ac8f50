use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use obratrack_backend::rest::{router, AppState};
use obratrack_backend::Backend;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let backend = Arc::new(Backend::new());
    let state = AppState::new(backend);

    // CORS setup to allow the frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin("http://localhost:8080".parse::<HeaderValue>().unwrap())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any);

    let app = router(state).layer(cors);

    let addr = SocketAddr::from(([127, 0, 0, 1], 8000));
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
