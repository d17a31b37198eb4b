use role_gateway::{router, AppState, EndpointResolver, GatewayConfig};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = GatewayConfig::from_env();
    let resolver = EndpointResolver::from_config(&config);
    info!(backend = %resolver.base_url(), "resolving role endpoints");

    let app = router(AppState::new(resolver));
    let addr = config.listen_addr();

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
