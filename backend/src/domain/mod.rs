//! Domain primitives, services and ports.
//!
//! Purpose: define the lab workflow's strongly typed values (users, patients,
//! entries, sessions), the services that implement the driving ports, and the
//! driven ports the outbound adapters fulfil. Nothing here knows about HTTP or
//! SQL.
//!
//! Public surface:
//! - Error / ErrorCode / FailureReason: transport agnostic failures.
//! - User, Patient, Entry and their identifiers.
//! - SessionRegistry: the in-memory token map shared with the HTTP layer.
//! - Services: AccountLoginService, UserAdminService, RosterService,
//!   EntryWorkflowService and AccountProvisioner.

mod access_policy;
mod account_support;
pub mod auth;
pub mod entry;
mod entry_workflow_service;
pub mod error;
mod login_service;
pub mod patient;
pub mod ports;
mod provisioning;
pub mod roster;
mod roster_service;
pub mod session;
pub mod trace_id;
pub mod user;
mod user_admin_service;

pub use self::access_policy::{can_manage_users, can_verify_entry};
pub use self::auth::{
    LoginCredentials, LoginOutcome, LoginValidationError, NewAccount, NewAccountValidationError,
    PASSWORD_MIN,
};
pub use self::entry::{
    Entry, EntryDraft, EntryId, EntryOrder, EntryStatus, EntryTransition, TestResult,
    TransitionError, UnknownVariant, Verdict,
};
pub use self::entry_workflow_service::EntryWorkflowService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, FailureReason, TRACE_ID_HEADER};
pub use self::login_service::AccountLoginService;
pub use self::patient::{Patient, PatientId, PatientValidationError, TestName};
pub use self::provisioning::{AccountProvisioner, AdminSeed, DEFAULT_ACCOUNTS, ProvisioningPlan};
pub use self::roster::{DEFAULT_ROSTER_SIZE, MAX_ROSTER_SIZE, RosterPlanError, RosterPlanner};
pub use self::roster_service::{PlannerFactory, RosterService};
pub use self::session::{DEFAULT_SESSION_TTL, SessionLookupError, SessionRegistry, SessionToken};
pub use self::trace_id::TraceId;
pub use self::user::{
    PasswordHash, Role, USER_NAME_MAX, User, UserAccount, UserId, UserName, UserValidationError,
};
pub use self::user_admin_service::UserAdminService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use labflow::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
