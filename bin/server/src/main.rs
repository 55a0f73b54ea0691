use std::process::ExitCode;

use keyhole_access::AuthenticationService;
use keyhole_server::{
    auth::{AppState, OidcClient},
    config::ServerConfig,
    router,
};
use keyhole_token::SigningKey;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Loaded configuration");

    let cookie_key = config.cookie_key();

    // Initialize OIDC client
    tracing::info!("Discovering OIDC provider...");
    let oidc_client = match OidcClient::discover(config.oidc).await {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "failed to discover OIDC provider");
            return ExitCode::FAILURE;
        }
    };

    let service = AuthenticationService::new(
        oidc_client,
        SigningKey::from_secret(config.jwt_signing_key.as_bytes()),
    );
    let app_state = AppState::new(service, cookie_key, config.session);
    let app = router(app_state);

    let listener = match tokio::net::TcpListener::bind(config.listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, addr = %config.listen_addr, "failed to bind to address");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("listening on http://{}", config.listen_addr);

    if let Err(e) = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server error");
        return ExitCode::FAILURE;
    }

    tracing::info!("server stopped");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
