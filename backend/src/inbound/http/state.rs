//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data` and only depend on
//! the driving ports, so they stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    EntriesQuery, EntryWorkflowCommand, LoginService, PatientsQuery, RosterCommand,
    UserAdministration,
};

/// Dependency bundle for HTTP handlers.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
///
/// use labflow::domain::ports::{
///     EntriesQuery, EntryWorkflowCommand, LoginService, PatientsQuery, RosterCommand,
///     UserAdministration,
/// };
/// use labflow::inbound::http::state::HttpState;
///
/// fn wire(
///     login: Arc<dyn LoginService>,
///     users: Arc<dyn UserAdministration>,
///     roster: Arc<dyn RosterCommand>,
///     patients: Arc<dyn PatientsQuery>,
///     entries: Arc<dyn EntryWorkflowCommand>,
///     entries_query: Arc<dyn EntriesQuery>,
/// ) -> HttpState {
///     HttpState {
///         login,
///         users,
///         roster,
///         patients,
///         entries,
///         entries_query,
///     }
/// }
/// ```
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UserAdministration>,
    pub roster: Arc<dyn RosterCommand>,
    pub patients: Arc<dyn PatientsQuery>,
    pub entries: Arc<dyn EntryWorkflowCommand>,
    pub entries_query: Arc<dyn EntriesQuery>,
}
