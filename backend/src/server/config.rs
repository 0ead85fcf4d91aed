//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use labflow::domain::{DEFAULT_ROSTER_SIZE, DEFAULT_SESSION_TTL, ProvisioningPlan};
use labflow::outbound::credentials::DEFAULT_PASSWORD_ROUNDS;
use labflow::outbound::persistence::DbPool;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) session_ttl: Duration,
    pub(crate) roster_size: usize,
    pub(crate) password_rounds: u32,
    pub(crate) provisioning: ProvisioningPlan,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Configuration with in-memory storage and default tuning.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            session_ttl: DEFAULT_SESSION_TTL,
            roster_size: DEFAULT_ROSTER_SIZE,
            password_rounds: DEFAULT_PASSWORD_ROUNDS,
            provisioning: ProvisioningPlan::default(),
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Use Postgres-backed repositories instead of the in-memory store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_roster_size(mut self, size: usize) -> Self {
        self.roster_size = size;
        self
    }

    #[must_use]
    pub fn with_password_rounds(mut self, rounds: u32) -> Self {
        self.password_rounds = rounds;
        self
    }

    /// Accounts to ensure before the server reports ready.
    #[must_use]
    pub fn with_provisioning(mut self, plan: ProvisioningPlan) -> Self {
        self.provisioning = plan;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
