//! Synthetic patients and the diagnostic test catalogue.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Validation errors returned by the patient constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientValidationError {
    /// The identifier is not `P` followed by two digits.
    InvalidId,
    /// The name was blank.
    EmptyName,
    /// The test name is not in the catalogue.
    UnknownTest(String),
}

impl fmt::Display for PatientValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "patient id must be 'P' followed by two digits"),
            Self::EmptyName => write!(f, "patient name must not be empty"),
            Self::UnknownTest(raw) => write!(f, "unknown test '{raw}'"),
        }
    }
}

impl std::error::Error for PatientValidationError {}

/// Diagnostic tests a patient can be booked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum TestName {
    /// Blood panel.
    #[serde(rename = "Blood Test")]
    BloodTest,
    /// Urinalysis.
    #[serde(rename = "Urine Test")]
    UrineTest,
    /// Radiograph.
    #[serde(rename = "X-Ray")]
    XRay,
    /// Magnetic resonance imaging.
    #[serde(rename = "MRI")]
    Mri,
}

impl TestName {
    /// The full catalogue.
    pub const ALL: [Self; 4] = [Self::BloodTest, Self::UrineTest, Self::XRay, Self::Mri];

    /// Stored and displayed name of the test.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BloodTest => "Blood Test",
            Self::UrineTest => "Urine Test",
            Self::XRay => "X-Ray",
            Self::Mri => "MRI",
        }
    }
}

impl fmt::Display for TestName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestName {
    type Err = PatientValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|test| test.as_str() == s)
            .ok_or_else(|| PatientValidationError::UnknownTest(s.to_owned()))
    }
}

/// Patient identifier such as `P42`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PatientId(String);

impl PatientId {
    /// Validate and construct a [`PatientId`].
    ///
    /// # Examples
    /// ```
    /// use labflow::domain::PatientId;
    ///
    /// assert!(PatientId::new("P10").is_ok());
    /// assert!(PatientId::new("T10").is_err());
    /// ```
    pub fn new(id: impl Into<String>) -> Result<Self, PatientValidationError> {
        let id = id.into();
        let well_formed = id
            .strip_prefix(lab_roster::PATIENT_ID_PREFIX)
            .is_some_and(|digits| digits.len() == 2 && digits.bytes().all(|b| b.is_ascii_digit()));
        if well_formed {
            Ok(Self(id))
        } else {
            Err(PatientValidationError::InvalidId)
        }
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PatientId> for String {
    fn from(value: PatientId) -> Self {
        value.0
    }
}

impl TryFrom<String> for PatientId {
    type Error = PatientValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A patient booked for exactly one test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    id: PatientId,
    name: String,
    test_name: TestName,
}

impl Patient {
    /// Build a patient, rejecting blank names.
    pub fn new(
        id: PatientId,
        name: impl Into<String>,
        test_name: TestName,
    ) -> Result<Self, PatientValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(PatientValidationError::EmptyName);
        }
        Ok(Self {
            id,
            name,
            test_name,
        })
    }

    /// Patient identifier.
    pub fn id(&self) -> &PatientId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Booked test.
    pub fn test_name(&self) -> TestName {
        self.test_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("P10", true)]
    #[case("P99", true)]
    #[case("P1", false)]
    #[case("P100", false)]
    #[case("p10", false)]
    #[case("A10", false)]
    #[case("Pab", false)]
    fn validates_patient_ids(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(PatientId::new(raw).is_ok(), valid);
    }

    #[rstest]
    #[case(TestName::BloodTest, "\"Blood Test\"")]
    #[case(TestName::UrineTest, "\"Urine Test\"")]
    #[case(TestName::XRay, "\"X-Ray\"")]
    #[case(TestName::Mri, "\"MRI\"")]
    fn test_names_serialise_with_display_names(#[case] test: TestName, #[case] json: &str) {
        assert_eq!(serde_json::to_string(&test).expect("serialises"), json);
        assert_eq!(test.as_str().parse::<TestName>(), Ok(test));
    }

    #[rstest]
    fn unknown_tests_are_rejected() {
        assert_eq!(
            "CT Scan".parse::<TestName>(),
            Err(PatientValidationError::UnknownTest("CT Scan".to_owned()))
        );
    }

    #[rstest]
    fn blank_names_are_rejected() {
        let id = PatientId::new("P12").expect("valid id");
        assert_eq!(
            Patient::new(id, "  ", TestName::Mri),
            Err(PatientValidationError::EmptyName)
        );
    }
}
