//! Random short identifiers and synthetic patient rosters.
//!
//! This crate holds the pieces of the lab workflow tracker that only need a
//! random number generator: the short identifier allocator shared by users and
//! patients, the fixed name pools, and the patient batch generator. It is
//! independent of backend domain types; callers pass their own test catalogue
//! and convert the returned seeds into domain values.
//!
//! # Overview
//!
//! - Identifiers are a single-letter prefix followed by a number in `10..=99`.
//! - Allocation retries against a taken set and gives up after
//!   [`MAX_ALLOCATION_ATTEMPTS`] draws.
//! - Batches never reuse an identifier already taken or chosen earlier in the
//!   same batch.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeSet;
//!
//! use lab_roster::{generate_patients, seeded_rng};
//!
//! let mut rng = seeded_rng(42);
//! let existing = BTreeSet::from(["P10".to_owned()]);
//! let batch = generate_patients(&mut rng, 3, &existing, &["Blood Test", "MRI"])
//!     .expect("batch fits in the identifier space");
//!
//! assert_eq!(batch.len(), 3);
//! assert!(batch.iter().all(|seed| seed.id.to_string() != "P10"));
//! ```

mod allocator;
mod error;
mod names;
mod roster;

pub use allocator::{
    ID_NUMBER_MAX, ID_NUMBER_MIN, IDS_PER_PREFIX, MAX_ALLOCATION_ATTEMPTS, ShortId, allocate_id,
};
pub use error::{AllocationExhausted, RosterError};
pub use names::{FIRST_NAMES, LAST_NAMES, random_display_name};
pub use roster::{PATIENT_ID_PREFIX, PatientSeed, generate_patients, seeded_rng};

/// Deterministic generator used for roster batches.
pub type RosterRng = rand_chacha::ChaCha8Rng;
