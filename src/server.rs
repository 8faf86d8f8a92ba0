use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

use crate::api::handlers::{
    get_admin_config, get_credits, get_status, health_check, list_transactions, submit_swap,
    update_credits, AppState,
};

pub fn create_app(state: AppState) -> Router {
    info!("⚙️ Setting up HTTP routes...");

    // A swap blocks on the settlement and bridge legs; the request timeout
    // must outlast both
    let request_timeout =
        state.config.settlement_timeout + state.config.bridge_timeout + Duration::from_secs(10);

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/credits", get(get_credits).post(update_credits))
        .route("/swap", post(submit_swap))
        .route("/status", get(get_status))
        .route("/transactions", get(list_transactions))
        .route("/admin/config", get(get_admin_config))
        .layer(CorsLayer::very_permissive())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("✓ HTTP routes configured");
    app
}

pub async fn run_server(app: Router, bind_address: &str) -> Result<(), Box<dyn std::error::Error>> {
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    info!("🌐 Server listening on: {}", bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}
