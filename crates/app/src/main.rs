mod domains;
mod problem;
mod router;
mod service;
mod telemetry;

use std::{net::SocketAddr, sync::Arc};

use chrono::Utc;
use tracing::info;

use ssl_dashboard_storage::{DomainRepository, InMemoryDomainRepository};
use ssl_dashboard_util::{load_env_file, AppConfig};

use crate::service::DomainService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_env_file();
    let config = AppConfig::from_env()?;

    telemetry::init_tracing(&config)?;
    let metrics = telemetry::init_metrics()?;

    let repository: Arc<dyn DomainRepository> = if config.seed_sample_domains {
        Arc::new(InMemoryDomainRepository::seeded())
    } else {
        Arc::new(InMemoryDomainRepository::new())
    };
    let domains = DomainService::new(
        repository,
        Arc::new(Utc::now),
        config.status_mode,
        config.expiring_soon_days,
    );

    let state = router::AppState::new(metrics, domains);

    let addr: SocketAddr = config.bind_addr;
    info!(
        stage = "app",
        %addr,
        env = %config.environment.as_str(),
        status_mode = config.status_mode.as_str(),
        seeded = config.seed_sample_domains,
        "starting HTTP server"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router::app_router(state))
        .await
        .map_err(|err| err.into())
}
