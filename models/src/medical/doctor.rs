// models/src/medical/doctor.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{UnknownVariant, ValidationError, ValidationResult};
use crate::medical::{required_int_in, required_text};

const EXPERIENCE_RANGE: std::ops::RangeInclusive<i64> = 0..=80;

/// Closed set of practice areas a doctor record may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Specialization {
    Cardiologist,
    Dermatologist,
    Pediatrician,
    Neurologist,
    General,
}

impl Specialization {
    pub fn as_str(&self) -> &'static str {
        match self {
            Specialization::Cardiologist => "Cardiologist",
            Specialization::Dermatologist => "Dermatologist",
            Specialization::Pediatrician => "Pediatrician",
            Specialization::Neurologist => "Neurologist",
            Specialization::General => "General",
        }
    }
}

impl FromStr for Specialization {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cardiologist" => Ok(Specialization::Cardiologist),
            "Dermatologist" => Ok(Specialization::Dermatologist),
            "Pediatrician" => Ok(Specialization::Pediatrician),
            "Neurologist" => Ok(Specialization::Neurologist),
            "General" => Ok(Specialization::General),
            other => Err(UnknownVariant {
                field: "specialization",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Specialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored doctor record, owned by the account behind `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Doctor {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub name: String,
    pub specialization: Specialization,
    pub contact: String,
    pub address: String,
    pub experience: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw create/update body for a doctor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorPayload {
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub experience: Option<i64>,
}

/// Validated create input.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDoctor {
    pub name: String,
    pub specialization: Specialization,
    pub contact: String,
    pub address: String,
    pub experience: u32,
}

/// Validated partial update; `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DoctorPatch {
    pub name: Option<String>,
    pub specialization: Option<Specialization>,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub experience: Option<u32>,
}

impl DoctorPayload {
    pub fn validate_new(self) -> ValidationResult<NewDoctor> {
        let mut report = ValidationError::new();

        let name = required_text(&mut report, "name", self.name);
        let specialization = match self.specialization {
            Some(ref value) => parse_specialization(&mut report, value),
            None => {
                report.add("specialization", "this field is required");
                None
            }
        };
        let contact = required_text(&mut report, "contact", self.contact);
        let address = required_text(&mut report, "address", self.address);
        let experience =
            required_int_in(&mut report, "experience", self.experience, EXPERIENCE_RANGE);

        report.into_result()?;
        Ok(NewDoctor {
            name: name.unwrap(),
            specialization: specialization.unwrap(),
            contact: contact.unwrap(),
            address: address.unwrap(),
            experience: experience.unwrap(),
        })
    }

    pub fn validate_patch(self) -> ValidationResult<DoctorPatch> {
        let mut report = ValidationError::new();

        let name = self.name.and_then(|n| {
            if n.trim().is_empty() {
                report.add("name", "this field may not be blank");
                None
            } else {
                Some(n)
            }
        });
        let specialization = self
            .specialization
            .and_then(|value| parse_specialization(&mut report, &value));
        let experience = self.experience.and_then(|e| {
            if EXPERIENCE_RANGE.contains(&e) {
                Some(e as u32)
            } else {
                report.add(
                    "experience",
                    format!(
                        "must be between {} and {}",
                        EXPERIENCE_RANGE.start(),
                        EXPERIENCE_RANGE.end()
                    ),
                );
                None
            }
        });

        report.into_result()?;
        Ok(DoctorPatch {
            name,
            specialization,
            contact: self.contact,
            address: self.address,
            experience,
        })
    }
}

fn parse_specialization(report: &mut ValidationError, value: &str) -> Option<Specialization> {
    match value.parse::<Specialization>() {
        Ok(specialization) => Some(specialization),
        Err(err) => {
            report.add("specialization", err.to_string());
            None
        }
    }
}
