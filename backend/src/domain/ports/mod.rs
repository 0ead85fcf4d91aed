//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, the password hasher) are implemented by the
//! outbound adapters. Driving ports are implemented by the domain services
//! and called by the HTTP adapter.

mod macros;
pub(crate) use macros::define_port_error;

mod entry_repository;
mod entry_workflow;
mod login_service;
mod password_hasher;
mod patient_repository;
mod roster;
mod user_admin;
mod user_repository;

#[cfg(test)]
pub use entry_repository::MockEntryRepository;
pub use entry_repository::{EntryRepository, EntryRepositoryError};
#[cfg(test)]
pub use entry_workflow::{MockEntriesQuery, MockEntryWorkflowCommand};
pub use entry_workflow::{EntriesQuery, EntryWorkflowCommand};
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use patient_repository::MockPatientRepository;
pub use patient_repository::{PatientRepository, PatientRepositoryError, RosterRegeneration};
#[cfg(test)]
pub use roster::{MockPatientsQuery, MockRosterCommand};
pub use roster::{PatientsQuery, RosterCommand};
#[cfg(test)]
pub use user_admin::MockUserAdministration;
pub use user_admin::UserAdministration;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
