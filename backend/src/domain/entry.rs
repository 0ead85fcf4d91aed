//! Diagnostic entries and their workflow state machine.
//!
//! ```text
//! Pending --process--> Processed --verify--> Verified
//! ```
//!
//! Transitions only move forward and `Verified` is terminal. The result stays
//! `Pending` until the verify transition sets it, together with the
//! supervisor, in the same step.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::patient::{PatientId, TestName};
use super::user::UserId;

/// Monotonic numeric entry identity assigned by storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(i64);

impl EntryId {
    /// Wrap a storage-assigned identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Returned when a stored enumeration value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    /// Which enumeration was being parsed.
    pub kind: &'static str,
    /// The rejected text.
    pub value: String,
}

macro_rules! stored_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Stored and displayed text of the value.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

/// Workflow position of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum EntryStatus {
    /// Ordered, waiting to be processed.
    Pending,
    /// Processed by a technician, waiting for verification.
    Processed,
    /// Verified by a supervisor. Terminal.
    Verified,
}

stored_enum!(EntryStatus, "entry status", {
    Pending => "Pending",
    Processed => "Processed",
    Verified => "Verified",
});

/// Outcome recorded on an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum TestResult {
    /// No verdict yet.
    Pending,
    /// Verified positive.
    Positive,
    /// Verified negative.
    Negative,
}

stored_enum!(TestResult, "test result", {
    Pending => "Pending",
    Positive => "Positive",
    Negative => "Negative",
});

/// Verdict a supervisor may record when verifying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Verdict {
    /// The test came back positive.
    Positive,
    /// The test came back negative.
    Negative,
}

impl From<Verdict> for TestResult {
    fn from(value: Verdict) -> Self {
        match value {
            Verdict::Positive => Self::Positive,
            Verdict::Negative => Self::Negative,
        }
    }
}

/// A forward move through the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryTransition {
    /// Pending → Processed.
    Process,
    /// Processed → Verified, recording the verdict and the verifier.
    Verify {
        /// User performing the verification.
        supervisor: UserId,
        /// Verdict to record.
        verdict: Verdict,
    },
}

impl EntryTransition {
    /// Status the entry must hold for this transition to apply.
    #[must_use]
    pub const fn required_status(&self) -> EntryStatus {
        match self {
            Self::Process => EntryStatus::Pending,
            Self::Verify { .. } => EntryStatus::Processed,
        }
    }

    /// Verb used in messages and logs.
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Verify { .. } => "verify",
        }
    }
}

/// Rejected transition: the entry was not in the required state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {action} entry {entry_id}: status is {current}, expected {required}")]
pub struct TransitionError {
    /// Entry the transition targeted.
    pub entry_id: EntryId,
    /// Attempted action.
    pub action: &'static str,
    /// Status the entry actually holds.
    pub current: EntryStatus,
    /// Status the transition requires.
    pub required: EntryStatus,
}

/// Storage-facing field bundle used to rebuild an [`Entry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    /// Storage identity.
    pub id: EntryId,
    /// Patient the test was ordered for.
    pub patient_id: PatientId,
    /// Ordering technician, cleared if the account is deleted.
    pub technician_id: Option<UserId>,
    /// Verifying supervisor, set by the verify transition.
    pub supervisor_id: Option<UserId>,
    /// Ordered test.
    pub test_name: TestName,
    /// Workflow position.
    pub status: EntryStatus,
    /// Recorded outcome.
    pub result: TestResult,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A diagnostic test ordered for a patient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    id: EntryId,
    patient_id: PatientId,
    technician_id: Option<UserId>,
    supervisor_id: Option<UserId>,
    test_name: TestName,
    status: EntryStatus,
    result: TestResult,
    created_at: DateTime<Utc>,
}

impl From<EntryDraft> for Entry {
    fn from(draft: EntryDraft) -> Self {
        let EntryDraft {
            id,
            patient_id,
            technician_id,
            supervisor_id,
            test_name,
            status,
            result,
            created_at,
        } = draft;
        Self {
            id,
            patient_id,
            technician_id,
            supervisor_id,
            test_name,
            status,
            result,
            created_at,
        }
    }
}

impl Entry {
    /// Storage identity.
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Patient the test was ordered for.
    pub fn patient_id(&self) -> &PatientId {
        &self.patient_id
    }

    /// Ordering technician.
    pub fn technician_id(&self) -> Option<&UserId> {
        self.technician_id.as_ref()
    }

    /// Verifying supervisor.
    pub fn supervisor_id(&self) -> Option<&UserId> {
        self.supervisor_id.as_ref()
    }

    /// Ordered test.
    pub fn test_name(&self) -> TestName {
        self.test_name
    }

    /// Workflow position.
    pub fn status(&self) -> EntryStatus {
        self.status
    }

    /// Recorded outcome.
    pub fn result(&self) -> TestResult {
        self.result
    }

    /// Creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Compute the entry that results from `transition`.
    ///
    /// The receiver is left unchanged; persisting the returned value is the
    /// caller's job.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use labflow::domain::{
    ///     Entry, EntryDraft, EntryId, EntryStatus, EntryTransition, PatientId, TestName,
    ///     TestResult,
    /// };
    ///
    /// let pending = Entry::from(EntryDraft {
    ///     id: EntryId::new(1),
    ///     patient_id: PatientId::new("P10").unwrap(),
    ///     technician_id: None,
    ///     supervisor_id: None,
    ///     test_name: TestName::BloodTest,
    ///     status: EntryStatus::Pending,
    ///     result: TestResult::Pending,
    ///     created_at: Utc::now(),
    /// });
    /// let processed = pending.apply(&EntryTransition::Process).unwrap();
    /// assert_eq!(processed.status(), EntryStatus::Processed);
    /// ```
    pub fn apply(&self, transition: &EntryTransition) -> Result<Self, TransitionError> {
        let required = transition.required_status();
        if self.status != required {
            return Err(TransitionError {
                entry_id: self.id,
                action: transition.action(),
                current: self.status,
                required,
            });
        }

        let mut next = self.clone();
        match transition {
            EntryTransition::Process => {
                next.status = EntryStatus::Processed;
            }
            EntryTransition::Verify {
                supervisor,
                verdict,
            } => {
                next.status = EntryStatus::Verified;
                next.result = TestResult::from(*verdict);
                next.supervisor_id = Some(supervisor.clone());
            }
        }
        Ok(next)
    }
}

/// A request to create a new pending entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOrder {
    /// Patient to test.
    pub patient_id: PatientId,
    /// Test to run; the patient must hold it.
    pub test_name: TestName,
    /// Ordering technician.
    pub technician_id: UserId,
}
