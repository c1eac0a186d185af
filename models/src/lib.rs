//! Domain types for the record service: accounts, patient and doctor
//! records, assignment links, and the validation layer that guards every
//! write coming in from the API.

pub mod errors;
pub mod medical;

pub use errors::{UnknownVariant, ValidationError, ValidationResult};
pub use medical::{
    AccountInfo, AssignmentPayload, AssignmentRecord, Doctor, DoctorPatch, DoctorPayload, Gender,
    Login, NewAssignment, NewDoctor, NewPatient, NewUser, Patient, PatientPatch, PatientPayload,
    RegisterPayload, Specialization, User,
};
