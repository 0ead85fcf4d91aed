//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Lab staff accounts.
    users (id) {
        /// Role prefix letter plus two digits.
        id -> Varchar,
        /// Unique login name.
        name -> Varchar,
        /// PHC-encoded PBKDF2 hash.
        password_hash -> Text,
        /// `Technician`, `Supervisor` or `Admin`.
        role -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Synthetic patients, each booked for one test.
    patients (id) {
        /// `P` plus two digits.
        id -> Varchar,
        /// First and last name.
        name -> Varchar,
        /// Booked test.
        test_name -> Varchar,
    }
}

diesel::table! {
    /// Diagnostic entries moving through the workflow.
    entries (id) {
        /// Monotonic identifier.
        id -> Int8,
        /// Patient the test was ordered for.
        patient_id -> Varchar,
        /// Ordering technician; null once the account is deleted.
        technician_id -> Nullable<Varchar>,
        /// Verifying supervisor.
        supervisor_id -> Nullable<Varchar>,
        /// Ordered test.
        test_name -> Varchar,
        /// `Pending`, `Processed` or `Verified`.
        status -> Varchar,
        /// `Pending`, `Positive` or `Negative`.
        result -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(entries -> patients (patient_id));

diesel::allow_tables_to_appear_in_same_query!(users, patients, entries);
