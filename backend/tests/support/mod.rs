//! Helpers shared by the Diesel repository integration suites.

pub mod cluster_skip;
pub mod embedded_postgres;

pub use cluster_skip::handle_cluster_setup_failure;
pub use embedded_postgres::{TestDatabase, provision_database};
