//! Laboratory workflow backend.
//!
//! Staff accounts, a synthetic patient roster and the diagnostic entry
//! workflow (order, process, verify), exposed over a JSON HTTP API.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
