//! In-memory store implementing every repository port.
//!
//! Used when no database is configured and as a realistic fake in tests.
//! One mutex guards all three tables, so each port call is atomic in the
//! same way a single Postgres transaction would be. Contents are lost on
//! restart.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{
    EntryRepository, EntryRepositoryError, PatientRepository, PatientRepositoryError,
    RosterRegeneration, UserRepository, UserRepositoryError,
};
use crate::domain::{
    Entry, EntryDraft, EntryId, EntryOrder, EntryStatus, Patient, PatientId, Role, RosterPlanner,
    TestResult, User, UserAccount, UserId,
};

#[derive(Default)]
struct LabTables {
    users: BTreeMap<UserId, UserAccount>,
    patients: BTreeMap<PatientId, Patient>,
    entries: BTreeMap<EntryId, Entry>,
    next_entry_id: i64,
}

impl LabTables {
    fn referenced_patients(&self) -> BTreeSet<PatientId> {
        self.entries
            .values()
            .map(|entry| entry.patient_id().clone())
            .collect()
    }
}

fn draft_of(entry: &Entry) -> EntryDraft {
    EntryDraft {
        id: entry.id(),
        patient_id: entry.patient_id().clone(),
        technician_id: entry.technician_id().cloned(),
        supervisor_id: entry.supervisor_id().cloned(),
        test_name: entry.test_name(),
        status: entry.status(),
        result: entry.result(),
        created_at: entry.created_at(),
    }
}

/// Entry with every reference to `user` cleared.
fn detach_user(entry: &Entry, user: &UserId) -> Entry {
    let mut draft = draft_of(entry);
    if draft.technician_id.as_ref() == Some(user) {
        draft.technician_id = None;
    }
    if draft.supervisor_id.as_ref() == Some(user) {
        draft.supervisor_id = None;
    }
    Entry::from(draft)
}

/// Users, patients and entries held in process memory.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use labflow::outbound::memory::InMemoryLabStore;
/// use mockable::DefaultClock;
///
/// let store = Arc::new(InMemoryLabStore::new(Arc::new(DefaultClock)));
/// ```
pub struct InMemoryLabStore {
    tables: Mutex<LabTables>,
    clock: Arc<dyn Clock>,
}

impl InMemoryLabStore {
    /// Empty store stamping new entries with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: Mutex::new(LabTables {
                next_entry_id: 1,
                ..LabTables::default()
            }),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LabTables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserRepository for InMemoryLabStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<UserAccount>, UserRepositoryError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|account| account.user().name().as_ref() == name)
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self
            .lock()
            .users
            .get(id)
            .map(|account| account.user().clone()))
    }

    async fn list(&self) -> Result<Vec<User>, UserRepositoryError> {
        Ok(self
            .lock()
            .users
            .values()
            .map(|account| account.user().clone())
            .collect())
    }

    async fn insert(&self, account: &UserAccount) -> Result<(), UserRepositoryError> {
        let mut tables = self.lock();
        let user = account.user();
        if tables
            .users
            .values()
            .any(|existing| existing.user().name() == user.name())
        {
            return Err(UserRepositoryError::duplicate_name(user.name().as_ref()));
        }
        if tables.users.contains_key(user.id()) {
            return Err(UserRepositoryError::duplicate_id(user.id().as_ref()));
        }
        tables.users.insert(user.id().clone(), account.clone());
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserRepositoryError> {
        let mut tables = self.lock();
        if tables.users.remove(id).is_none() {
            return Ok(false);
        }
        for entry in tables.entries.values_mut() {
            *entry = detach_user(entry, id);
        }
        debug!(user_id = %id, "user removed from memory store");
        Ok(true)
    }

    async fn update_role(
        &self,
        id: &UserId,
        role: Role,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut tables = self.lock();
        let Some(account) = tables.users.get_mut(id) else {
            return Ok(None);
        };
        let updated = account.user().with_role(role);
        *account = UserAccount::new(updated.clone(), account.password_hash().clone());
        Ok(Some(updated))
    }
}

#[async_trait]
impl PatientRepository for InMemoryLabStore {
    async fn list(&self) -> Result<Vec<Patient>, PatientRepositoryError> {
        Ok(self.lock().patients.values().cloned().collect())
    }

    async fn regenerate(
        &self,
        planner: &RosterPlanner,
    ) -> Result<RosterRegeneration, PatientRepositoryError> {
        let mut tables = self.lock();
        let referenced = tables.referenced_patients();
        let surviving: BTreeSet<PatientId> = tables
            .patients
            .keys()
            .filter(|id| referenced.contains(*id))
            .cloned()
            .collect();
        // A failed plan leaves the tables untouched.
        let created = planner.plan(&surviving)?;

        let before = tables.patients.len();
        tables.patients.retain(|id, _| surviving.contains(id));
        let removed = before - tables.patients.len();
        for patient in &created {
            tables.patients.insert(patient.id().clone(), patient.clone());
        }
        Ok(RosterRegeneration { removed, created })
    }
}

#[async_trait]
impl EntryRepository for InMemoryLabStore {
    async fn order(&self, order: &EntryOrder) -> Result<Entry, EntryRepositoryError> {
        let mut tables = self.lock();
        let patient_id = order.patient_id.as_ref();
        let test_name = order.test_name.as_str();
        let booked = tables
            .patients
            .get(&order.patient_id)
            .is_some_and(|patient| patient.test_name() == order.test_name);
        if !booked {
            return Err(EntryRepositoryError::invalid_order(patient_id, test_name));
        }
        let duplicate = tables.entries.values().any(|entry| {
            entry.patient_id() == &order.patient_id && entry.test_name() == order.test_name
        });
        if duplicate {
            return Err(EntryRepositoryError::duplicate_order(patient_id, test_name));
        }

        let id = EntryId::new(tables.next_entry_id);
        tables.next_entry_id += 1;
        let entry = Entry::from(EntryDraft {
            id,
            patient_id: order.patient_id.clone(),
            technician_id: Some(order.technician_id.clone()),
            supervisor_id: None,
            test_name: order.test_name,
            status: EntryStatus::Pending,
            result: TestResult::Pending,
            created_at: self.clock.utc(),
        });
        tables.entries.insert(id, entry.clone());
        Ok(entry)
    }

    async fn find_by_id(&self, id: EntryId) -> Result<Option<Entry>, EntryRepositoryError> {
        Ok(self.lock().entries.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Entry>, EntryRepositoryError> {
        Ok(self.lock().entries.values().cloned().collect())
    }

    async fn transition(
        &self,
        expected: EntryStatus,
        updated: &Entry,
    ) -> Result<bool, EntryRepositoryError> {
        let mut tables = self.lock();
        match tables.entries.get_mut(&updated.id()) {
            Some(current) if current.status() == expected => {
                *current = updated.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
