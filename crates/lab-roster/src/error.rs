//! Error types for identifier allocation and roster generation.

use thiserror::Error;

/// Returned when every draw of an allocation collided with a taken value.
///
/// With 90 numbers per prefix this signals a full (or nearly full)
/// identifier space rather than bad luck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("identifier space for prefix '{prefix}' exhausted after {attempts} attempts")]
pub struct AllocationExhausted {
    /// Prefix that could not be allocated.
    pub prefix: char,
    /// Number of draws made before giving up.
    pub attempts: usize,
}

/// Errors that can occur while generating a patient batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    /// No free patient identifier could be found.
    #[error(transparent)]
    Allocation(#[from] AllocationExhausted),

    /// The caller supplied no test names to choose from.
    #[error("test catalogue must not be empty")]
    EmptyTestCatalogue,
}
