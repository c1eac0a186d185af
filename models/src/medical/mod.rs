pub mod assignment;
pub mod doctor;
pub mod patient;
pub mod user;

pub use assignment::{AssignmentPayload, AssignmentRecord, NewAssignment};
pub use doctor::{Doctor, DoctorPatch, DoctorPayload, NewDoctor, Specialization};
pub use patient::{Gender, NewPatient, Patient, PatientPatch, PatientPayload};
pub use user::{AccountInfo, Login, NewUser, RegisterPayload, User};

use crate::errors::ValidationError;

/// Pulls a required text field out of a payload, recording a failure when it
/// is absent or blank.
pub(crate) fn required_text(
    report: &mut ValidationError,
    field: &'static str,
    value: Option<String>,
) -> Option<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Some(text),
        Some(_) => {
            report.add(field, "this field may not be blank");
            None
        }
        None => {
            report.add(field, "this field is required");
            None
        }
    }
}

/// Pulls a required integer field, enforcing an inclusive range.
pub(crate) fn required_int_in(
    report: &mut ValidationError,
    field: &'static str,
    value: Option<i64>,
    range: std::ops::RangeInclusive<i64>,
) -> Option<u32> {
    match value {
        Some(n) if range.contains(&n) => Some(n as u32),
        Some(_) => {
            report.add(
                field,
                format!("must be between {} and {}", range.start(), range.end()),
            );
            None
        }
        None => {
            report.add(field, "this field is required");
            None
        }
    }
}
