#[tokio::main]
async fn main() {
    atrium_observability::init();

    let config = atrium_api::config::ApiConfig::from_env();
    let app = atrium_api::app::build_app(&config).await;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {e}", config.bind_addr));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
