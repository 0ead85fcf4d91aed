//! Wiring of repositories, services and the HTTP state.
//!
//! Postgres and the in-memory store implement the same ports, so one generic
//! builder serves both; only the repository handles differ.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::info;

use labflow::domain::ports::{EntryRepository, PatientRepository, UserRepository};
use labflow::domain::{
    AccountLoginService, AccountProvisioner, EntryWorkflowService, Error, RosterService,
    SessionRegistry, UserAdminService,
};
use labflow::inbound::http::state::HttpState;
use labflow::outbound::credentials::Pbkdf2PasswordHasher;
use labflow::outbound::memory::InMemoryLabStore;
use labflow::outbound::persistence::{
    DieselEntryRepository, DieselPatientRepository, DieselUserRepository,
};

use super::ServerConfig;

/// Repository handles backing the services.
struct Repositories<U, P, E> {
    users: Arc<U>,
    patients: Arc<P>,
    entries: Arc<E>,
}

async fn wire<U, P, E>(
    config: &ServerConfig,
    repos: Repositories<U, P, E>,
    clock: Arc<dyn Clock>,
) -> Result<HttpState, Error>
where
    U: UserRepository + 'static,
    P: PatientRepository + 'static,
    E: EntryRepository + 'static,
{
    let Repositories {
        users,
        patients,
        entries,
    } = repos;
    let hasher = Arc::new(Pbkdf2PasswordHasher::new(config.password_rounds));

    let created = AccountProvisioner::new(users.clone(), hasher.clone())
        .provision(&config.provisioning)
        .await?;
    info!(created = created.len(), "account provisioning complete");

    let sessions = Arc::new(SessionRegistry::new(clock, config.session_ttl));
    let roster = Arc::new(RosterService::new(
        patients,
        users.clone(),
        config.roster_size,
    ));
    let workflow = Arc::new(EntryWorkflowService::new(entries, users.clone()));

    Ok(HttpState {
        login: Arc::new(AccountLoginService::new(
            users.clone(),
            hasher.clone(),
            sessions,
        )),
        users: Arc::new(UserAdminService::new(users, hasher)),
        roster: roster.clone(),
        patients: roster,
        entries: workflow.clone(),
        entries_query: workflow,
    })
}

/// Build the HTTP state, provisioning accounts on the way.
///
/// Uses Diesel repositories when a pool is configured, otherwise a fresh
/// in-memory store.
pub(crate) async fn build_http_state(config: &ServerConfig) -> Result<HttpState, Error> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    match &config.db_pool {
        Some(pool) => {
            info!("using postgres storage");
            let repos = Repositories {
                users: Arc::new(DieselUserRepository::new(pool.clone())),
                patients: Arc::new(DieselPatientRepository::new(pool.clone())),
                entries: Arc::new(DieselEntryRepository::new(pool.clone())),
            };
            wire(config, repos, clock).await
        }
        None => {
            info!("no database configured; using in-memory storage");
            let store = Arc::new(InMemoryLabStore::new(clock.clone()));
            let repos = Repositories {
                users: store.clone(),
                patients: store.clone(),
                entries: store,
            };
            wire(config, repos, clock).await
        }
    }
}
