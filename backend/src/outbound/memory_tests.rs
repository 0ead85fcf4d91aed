//! Behavioural coverage for the in-memory store.

use super::*;
use chrono::{DateTime, Utc};
use rstest::{fixture, rstest};

use crate::domain::{EntryTransition, PasswordHash, TestName, UserName, Verdict};
use crate::test_support::MutableClock;

#[fixture]
fn store() -> InMemoryLabStore {
    InMemoryLabStore::new(Arc::new(MutableClock::new(DateTime::<Utc>::UNIX_EPOCH)))
}

fn account(id: &str, name: &str, role: Role) -> UserAccount {
    UserAccount::new(
        User::new(
            UserId::new(id).expect("valid id"),
            UserName::new(name).expect("valid name"),
            role,
        ),
        PasswordHash::new("$pbkdf2-sha256$stub"),
    )
}

fn patient_id(raw: &str) -> PatientId {
    PatientId::new(raw).expect("valid patient id")
}

fn user_id(raw: &str) -> UserId {
    UserId::new(raw).expect("valid user id")
}

async fn seed_roster(store: &InMemoryLabStore, size: usize) -> Vec<Patient> {
    PatientRepository::regenerate(store, &RosterPlanner::with_seed(size, 7))
        .await
        .expect("roster generated")
        .created
}

async fn order_first(store: &InMemoryLabStore, patients: &[Patient], tech: &str) -> Entry {
    let patient = &patients[0];
    store
        .order(&EntryOrder {
            patient_id: patient.id().clone(),
            test_name: patient.test_name(),
            technician_id: user_id(tech),
        })
        .await
        .expect("entry ordered")
}

#[rstest]
#[tokio::test]
async fn users_are_unique_by_name_and_id(store: InMemoryLabStore) {
    store
        .insert(&account("T01", "tech", Role::Technician))
        .await
        .expect("first insert");

    let by_name = store.insert(&account("T02", "tech", Role::Technician)).await;
    let by_id = store.insert(&account("T01", "other", Role::Technician)).await;

    assert_eq!(by_name, Err(UserRepositoryError::duplicate_name("tech")));
    assert_eq!(by_id, Err(UserRepositoryError::duplicate_id("T01")));
}

#[rstest]
#[tokio::test]
async fn users_list_in_id_order(store: InMemoryLabStore) {
    for (id, name) in [("T20", "b"), ("A01", "a"), ("S05", "c")] {
        store
            .insert(&account(id, name, Role::Technician))
            .await
            .expect("insert");
    }

    let ids: Vec<String> = UserRepository::list(&store)
        .await
        .expect("list")
        .iter()
        .map(|user| user.id().to_string())
        .collect();

    assert_eq!(ids, ["A01", "S05", "T20"]);
}

#[rstest]
#[tokio::test]
async fn promotion_keeps_id_and_hash(store: InMemoryLabStore) {
    store
        .insert(&account("T01", "tech", Role::Technician))
        .await
        .expect("insert");

    let promoted = store
        .update_role(&user_id("T01"), Role::Supervisor)
        .await
        .expect("update")
        .expect("user exists");
    let stored = store
        .find_by_name("tech")
        .await
        .expect("lookup")
        .expect("still present");

    assert_eq!(promoted.role(), Role::Supervisor);
    assert_eq!(stored.user().id(), &user_id("T01"));
    assert_eq!(stored.password_hash().as_str(), "$pbkdf2-sha256$stub");
    assert_eq!(
        store.update_role(&user_id("T99"), Role::Admin).await,
        Ok(None)
    );
}

#[rstest]
#[tokio::test]
async fn regeneration_sweeps_only_unreferenced_patients(store: InMemoryLabStore) {
    let first = seed_roster(&store, 5).await;
    let ordered = order_first(&store, &first, "T01").await;

    let second = PatientRepository::regenerate(&store, &RosterPlanner::with_seed(5, 99))
        .await
        .expect("regenerated");
    let listed = PatientRepository::list(&store).await.expect("list");

    assert_eq!(second.removed, 4);
    assert_eq!(second.created.len(), 5);
    assert_eq!(listed.len(), 6);
    assert!(listed.iter().any(|p| p.id() == ordered.patient_id()));
    assert!(second.created.iter().all(|p| p.id() != ordered.patient_id()));
}

#[rstest]
#[tokio::test]
async fn exhausted_plans_change_nothing(store: InMemoryLabStore) {
    seed_roster(&store, 5).await;

    let err = PatientRepository::regenerate(&store, &RosterPlanner::with_seed(91, 1))
        .await
        .expect_err("more patients than identifiers");

    assert!(matches!(err, PatientRepositoryError::Exhausted { .. }));
    assert_eq!(PatientRepository::list(&store).await.expect("list").len(), 5);
}

#[rstest]
#[tokio::test]
async fn orders_require_the_booked_test(store: InMemoryLabStore) {
    let patients = seed_roster(&store, 1).await;
    let patient = &patients[0];
    let other_test = TestName::ALL
        .into_iter()
        .find(|test| *test != patient.test_name())
        .expect("catalogue has several tests");

    let wrong_test = store
        .order(&EntryOrder {
            patient_id: patient.id().clone(),
            test_name: other_test,
            technician_id: user_id("T01"),
        })
        .await;
    let unused_id = (10..100)
        .map(|n| patient_id(&format!("P{n}")))
        .find(|id| id != patient.id())
        .expect("free identifier");
    let unknown_patient = store
        .order(&EntryOrder {
            patient_id: unused_id,
            test_name: patient.test_name(),
            technician_id: user_id("T01"),
        })
        .await;

    assert!(matches!(wrong_test, Err(EntryRepositoryError::InvalidOrder { .. })));
    assert!(matches!(
        unknown_patient,
        Err(EntryRepositoryError::InvalidOrder { .. })
    ));
}

#[rstest]
#[tokio::test]
async fn second_orders_for_a_pair_are_duplicates(store: InMemoryLabStore) {
    let patients = seed_roster(&store, 1).await;
    let first = order_first(&store, &patients, "T01").await;

    let again = store
        .order(&EntryOrder {
            patient_id: first.patient_id().clone(),
            test_name: first.test_name(),
            technician_id: user_id("T02"),
        })
        .await;

    assert_eq!(first.id(), EntryId::new(1));
    assert_eq!(first.status(), EntryStatus::Pending);
    assert_eq!(first.created_at(), DateTime::<Utc>::UNIX_EPOCH);
    assert!(matches!(again, Err(EntryRepositoryError::DuplicateOrder { .. })));
}

#[rstest]
#[tokio::test]
async fn transitions_compare_and_set_on_status(store: InMemoryLabStore) {
    let patients = seed_roster(&store, 1).await;
    let pending = order_first(&store, &patients, "T01").await;
    let processed = pending.apply(&EntryTransition::Process).expect("pending");

    assert!(
        store
            .transition(EntryStatus::Pending, &processed)
            .await
            .expect("write")
    );
    assert!(
        !store
            .transition(EntryStatus::Pending, &processed)
            .await
            .expect("write")
    );
    let stored = EntryRepository::find_by_id(&store, pending.id())
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(stored.status(), EntryStatus::Processed);
}

#[rstest]
#[tokio::test]
async fn deleting_a_user_clears_entry_references(store: InMemoryLabStore) {
    store
        .insert(&account("T01", "tech", Role::Technician))
        .await
        .expect("insert tech");
    store
        .insert(&account("S01", "super", Role::Supervisor))
        .await
        .expect("insert supervisor");
    let patients = seed_roster(&store, 1).await;
    let pending = order_first(&store, &patients, "T01").await;
    let processed = pending.apply(&EntryTransition::Process).expect("pending");
    store
        .transition(EntryStatus::Pending, &processed)
        .await
        .expect("process");
    let verified = processed
        .apply(&EntryTransition::Verify {
            supervisor: user_id("S01"),
            verdict: Verdict::Negative,
        })
        .expect("processed");
    store
        .transition(EntryStatus::Processed, &verified)
        .await
        .expect("verify");

    assert!(store.delete(&user_id("T01")).await.expect("delete"));
    assert!(!store.delete(&user_id("T01")).await.expect("second delete"));

    let entries = EntryRepository::list(&store).await.expect("list");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].technician_id(), None);
    assert_eq!(entries[0].supervisor_id(), Some(&user_id("S01")));
    assert_eq!(entries[0].result(), TestResult::Negative);
}
