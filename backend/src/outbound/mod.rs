//! Outbound adapters implementing domain ports.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel
//! - **memory**: a single-process store used when no database is configured
//! - **credentials**: PBKDF2 password hashing
//!
//! Adapters translate between domain types and storage representations and
//! contain no business logic.

pub mod credentials;
pub mod memory;
pub mod persistence;
