//! Throwaway PostgreSQL databases for the Diesel repository suites.
//!
//! Every test binary shares one embedded cluster. A template database with
//! the embedded migrations applied is created once per migration set and each
//! test clones it, so suites never see each other's rows.

use std::future::Future;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::Duration;

use labflow::domain::ports::{PatientRepository, UserRepository};
use labflow::domain::{
    PasswordHash, Patient, Role, RosterPlanner, User, UserAccount, UserId, UserName,
};
use labflow::outbound::persistence::{
    DbPool, DieselPatientRepository, DieselUserRepository, PoolConfig, run_migrations,
};
use pg_embedded_setup_unpriv::test_support::{hash_directory, shared_cluster_handle};
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use tokio::runtime::Runtime;
use uuid::Uuid;

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const TEMPLATE_NAME_PREFIX: &str = "labflow_template";
const PROVISION_RETRIES: usize = 5;
const PROVISION_RETRY_DELAY: Duration = Duration::from_millis(500);

fn template_database_name() -> Result<String, String> {
    let migrations = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let hash = hash_directory(migrations).map_err(|err| format!("hash migrations: {err}"))?;
    let short_hash = hash.get(..8).unwrap_or(&hash);
    Ok(format!("{TEMPLATE_NAME_PREFIX}_{short_hash}"))
}

/// Create the migrated template unless an earlier test already did.
fn ensure_template_database(cluster: &ClusterHandle, runtime: &Runtime) -> Result<String, String> {
    let template_name = template_database_name()?;
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    let exists = cluster
        .database_exists(template_name.as_str())
        .map_err(|err| format!("template check: {err:?}"))?;
    if !exists {
        cluster
            .create_database(template_name.as_str())
            .map_err(|err| format!("create template: {err:?}"))?;
        let url = cluster.connection().database_url(&template_name);
        runtime
            .block_on(run_migrations(&url))
            .map_err(|err| format!("migrate template: {err}"))?;
    }
    Ok(template_name)
}

fn clone_template(cluster: &ClusterHandle, runtime: &Runtime) -> Result<TemporaryDatabase, String> {
    let mut last_error = String::from("no provisioning attempt made");
    for attempt in 1..=PROVISION_RETRIES {
        let cloned = ensure_template_database(cluster, runtime).and_then(|template| {
            let name = format!("test_{}", Uuid::new_v4().simple());
            cluster
                .temporary_database_from_template(name.as_str(), template.as_str())
                .map_err(|err| format!("clone template: {err:?}"))
        });
        match cloned {
            Ok(database) => return Ok(database),
            Err(error) => last_error = format!("attempt {attempt}/{PROVISION_RETRIES}: {error}"),
        }
        if attempt < PROVISION_RETRIES {
            std::thread::sleep(PROVISION_RETRY_DELAY);
        }
    }
    Err(last_error)
}

/// A migrated database private to one test, with its pool and runtime.
///
/// Fields drop in order: the pool first, then the runtime that drives its
/// connections, then the database itself.
pub struct TestDatabase {
    pool: DbPool,
    runtime: Runtime,
    _database: TemporaryDatabase,
}

impl TestDatabase {
    /// Pool connected to this test's database.
    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    /// Drive `future` to completion on the test runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Insert an account with a placeholder hash.
    pub fn seed_user(&self, id: &str, name: &str, role: Role) -> User {
        let user = User::new(
            UserId::new(id).expect("valid user id"),
            UserName::new(name).expect("valid user name"),
            role,
        );
        let account = UserAccount::new(user.clone(), PasswordHash::new("unused"));
        self.block_on(DieselUserRepository::new(self.pool()).insert(&account))
            .expect("user insert succeeds");
        user
    }

    /// Regenerate the roster with a fixed seed and return the new patients.
    pub fn seed_roster(&self, size: usize, seed: u64) -> Vec<Patient> {
        let planner = RosterPlanner::with_seed(size, seed);
        self.block_on(DieselPatientRepository::new(self.pool()).regenerate(&planner))
            .expect("roster regeneration succeeds")
            .created
    }
}

/// Clone a fresh migrated database from the shared cluster.
pub fn provision_database() -> Result<TestDatabase, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster_handle().map_err(|err| err.to_string())?;
    let database = clone_template(cluster, &runtime)?;

    let config = PoolConfig::new(database.url())
        .with_max_size(4)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    Ok(TestDatabase {
        pool,
        runtime,
        _database: database,
    })
}
