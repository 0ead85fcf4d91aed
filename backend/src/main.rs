//! Backend entry-point: loads settings, prepares storage and runs the server.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use labflow::inbound::http::health::HealthState;
use labflow::outbound::persistence::{DbPool, PoolConfig, run_migrations};
#[cfg(feature = "metrics")]
use server::build_prometheus;
use server::{ServerConfig, ServerSettings, create_server};

fn io_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {err}"))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().map_err(|err| io_error("failed to load settings", err))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|err| io_error("invalid settings", err))?;
    let provisioning = settings
        .provisioning_plan()
        .map_err(|err| io_error("invalid settings", err))?;
    let roster_size = settings
        .roster_size()
        .map_err(|err| io_error("invalid settings", err))?;

    let mut config = ServerConfig::new(bind_addr)
        .with_session_ttl(settings.session_ttl())
        .with_roster_size(roster_size)
        .with_password_rounds(settings.password_rounds())
        .with_provisioning(provisioning);

    match settings.database_url.as_deref() {
        Some(url) => {
            let applied = run_migrations(url)
                .await
                .map_err(|err| io_error("database migration failed", err))?;
            info!(applied, "database schema up to date");
            let pool = DbPool::new(PoolConfig::new(url))
                .await
                .map_err(|err| io_error("failed to build connection pool", err))?;
            config = config.with_db_pool(pool);
        }
        None => warn!("no database_url configured; using in-memory storage"),
    }

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(build_prometheus());

    info!(%bind_addr, "starting labflow");
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config).await?;

    let handle = server.handle();
    actix_web::rt::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            health_state.mark_unhealthy();
            info!("shutdown requested; draining connections");
            handle.stop(true).await;
        }
    });

    server.await
}
