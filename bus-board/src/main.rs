use bus_board::proxy::{AppState, UpstreamClient, create_router};
use bus_board::settings::ServerSettings;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = ServerSettings::from_env();

    let upstream =
        UpstreamClient::new(settings.upstream.clone()).expect("Failed to create upstream client");
    let app = create_router(AppState::new(upstream));

    let listener = tokio::net::TcpListener::bind(settings.addr)
        .await
        .expect("Failed to bind listen address");

    info!(addr = %settings.addr, upstream = %settings.upstream.base_url, "bus arrival proxy listening");
    println!("Bus arrival proxy listening on http://{}", settings.addr);
    println!();
    println!("API Endpoints:");
    println!("  GET     /health                 - Health check");
    println!("  GET     /bus-arrival?code=CODE  - Arrivals for a stop");
    println!("  OPTIONS /bus-arrival            - CORS preflight");

    axum::serve(listener, app).await.expect("Server error");
}
