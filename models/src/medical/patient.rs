// models/src/medical/patient.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{UnknownVariant, ValidationError, ValidationResult};
use crate::medical::{required_int_in, required_text};

const AGE_RANGE: std::ops::RangeInclusive<i64> = 0..=150;

/// Closed set of gender codes carried on patient records. Stored and
/// serialized as the single-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Other => "O",
        }
    }
}

impl FromStr for Gender {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "M" => Ok(Gender::Male),
            "F" => Ok(Gender::Female),
            "O" => Ok(Gender::Other),
            other => Err(UnknownVariant {
                field: "gender",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored patient record, owned by the account behind `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Patient {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub contact: String,
    pub address: String,
    pub medical_history: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw create/update body for a patient.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientPayload {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub medical_history: Option<String>,
}

/// Validated create input.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub contact: String,
    pub address: String,
    pub medical_history: Option<String>,
}

/// Validated partial update; `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientPatch {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub medical_history: Option<String>,
}

impl PatientPayload {
    /// Validates a create body: every field but `medical_history` required,
    /// gender restricted to the closed set.
    pub fn validate_new(self) -> ValidationResult<NewPatient> {
        let mut report = ValidationError::new();

        let name = required_text(&mut report, "name", self.name);
        let age = required_int_in(&mut report, "age", self.age, AGE_RANGE);
        let gender = match self.gender {
            Some(ref code) => parse_gender(&mut report, code),
            None => {
                report.add("gender", "this field is required");
                None
            }
        };
        let contact = required_text(&mut report, "contact", self.contact);
        let address = required_text(&mut report, "address", self.address);

        report.into_result()?;
        Ok(NewPatient {
            name: name.unwrap(),
            age: age.unwrap(),
            gender: gender.unwrap(),
            contact: contact.unwrap(),
            address: address.unwrap(),
            medical_history: self.medical_history,
        })
    }

    /// Validates a partial-update body: only supplied fields are checked,
    /// and only they will change.
    pub fn validate_patch(self) -> ValidationResult<PatientPatch> {
        let mut report = ValidationError::new();

        let name = self.name.and_then(|n| {
            if n.trim().is_empty() {
                report.add("name", "this field may not be blank");
                None
            } else {
                Some(n)
            }
        });
        let age = self.age.and_then(|a| {
            if AGE_RANGE.contains(&a) {
                Some(a as u32)
            } else {
                report.add(
                    "age",
                    format!("must be between {} and {}", AGE_RANGE.start(), AGE_RANGE.end()),
                );
                None
            }
        });
        let gender = self.gender.and_then(|code| parse_gender(&mut report, &code));

        report.into_result()?;
        Ok(PatientPatch {
            name,
            age,
            gender,
            contact: self.contact,
            address: self.address,
            medical_history: self.medical_history,
        })
    }
}

fn parse_gender(report: &mut ValidationError, code: &str) -> Option<Gender> {
    match code.parse::<Gender>() {
        Ok(gender) => Some(gender),
        Err(err) => {
            report.add("gender", err.to_string());
            None
        }
    }
}
