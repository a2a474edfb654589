//! HTTP server: state, extractors, handlers and router.

pub mod extract;
pub mod handlers;
pub mod router;
pub mod state;

pub use extract::{CurrentUser, Tenant};
pub use router::build_router;
pub use state::AppState;

use anyhow::Result;

use crate::config::AppConfig;

/// Build the router from configuration and serve it until shutdown.
pub async fn serve(config: &AppConfig) -> Result<()> {
    let state = AppState::new(config.auth_provider(), config.allowed_tenants());
    let app = build_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
