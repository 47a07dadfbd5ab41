//! Participant intake information collected before the questions.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Demographic answers from the intake form.
///
/// Both fields are free-form strings (the form offers brackets such as
/// `"26-35"` and `"female"`), and both must be present to start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeInfo {
    age: String,
    gender: String,
}

impl IntakeInfo {
    /// Validates and builds intake info from raw form values.
    ///
    /// # Errors
    ///
    /// - `EmptyField` for a missing or blank age or gender
    pub fn new(age: Option<&str>, gender: Option<&str>) -> Result<Self, ValidationError> {
        let age = required("age", age)?;
        let gender = required("gender", gender)?;
        Ok(Self { age, gender })
    }

    /// Age bracket as submitted.
    pub fn age(&self) -> &str {
        &self.age
    }

    pub fn gender(&self) -> &str {
        &self.gender
    }
}

fn required(field: &str, value: Option<&str>) -> Result<String, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ValidationError::empty_field(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_both_fields() {
        let info = IntakeInfo::new(Some("26-35"), Some("female")).unwrap();
        assert_eq!(info.age(), "26-35");
        assert_eq!(info.gender(), "female");
    }

    #[test]
    fn trims_values() {
        let info = IntakeInfo::new(Some(" 55+ "), Some(" other")).unwrap();
        assert_eq!(info.age(), "55+");
        assert_eq!(info.gender(), "other");
    }

    #[test]
    fn missing_age_is_reported_first() {
        let err = IntakeInfo::new(None, None).unwrap_err();
        assert_eq!(err.field(), "age");
    }

    #[test]
    fn blank_gender_is_rejected() {
        let err = IntakeInfo::new(Some("18-25"), Some("  ")).unwrap_err();
        assert_eq!(err, ValidationError::empty_field("gender"));
    }
}
