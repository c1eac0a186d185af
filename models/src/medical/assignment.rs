// models/src/medical/assignment.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ValidationError, ValidationResult};
use crate::medical::doctor::Specialization;

/// A patient-doctor link as returned to callers, denormalized with the
/// display fields of both endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentRecord {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub doctor_specialization: Specialization,
    pub assigned_at: DateTime<Utc>,
}

/// Raw link body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignmentPayload {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
}

/// Validated link input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewAssignment {
    pub patient_id: i64,
    pub doctor_id: i64,
}

impl AssignmentPayload {
    pub fn validate(self) -> ValidationResult<NewAssignment> {
        let mut report = ValidationError::new();
        if self.patient_id.is_none() {
            report.add("patient_id", "this field is required");
        }
        if self.doctor_id.is_none() {
            report.add("doctor_id", "this field is required");
        }

        report.into_result()?;
        Ok(NewAssignment {
            patient_id: self.patient_id.unwrap(),
            doctor_id: self.doctor_id.unwrap(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::AssignmentPayload;

    #[test]
    fn both_ids_are_required() {
        let err = AssignmentPayload::default().validate().unwrap_err();
        assert!(err.errors.contains_key("patient_id"));
        assert!(err.errors.contains_key("doctor_id"));
    }

    #[test]
    fn complete_payload_passes() {
        let link = AssignmentPayload {
            patient_id: Some(1),
            doctor_id: Some(2),
        }
        .validate()
        .unwrap();
        assert_eq!(link.patient_id, 1);
        assert_eq!(link.doctor_id, 2);
    }
}
