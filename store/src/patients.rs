use chrono::Utc;
use models::medical::{Gender, NewPatient, Patient, PatientPatch};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use crate::{Store, StoreError, StoreResult};

impl Store {
    pub async fn create_patient(&self, owner: i64, new: &NewPatient) -> StoreResult<Patient> {
        let conn = self.conn.lock().await;
        let now = Utc::now();
        conn.execute(
            "INSERT INTO patients (user_id, name, age, gender, contact, address,
                                   medical_history, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                owner,
                new.name,
                new.age,
                new.gender.as_str(),
                new.contact,
                new.address,
                new.medical_history,
                now,
                now
            ],
        )?;

        let id = conn.last_insert_rowid();
        patient_by_id(&conn, owner, id)?.ok_or(StoreError::NotFound("patient"))
    }

    /// All patients owned by `owner`, in natural store order.
    pub async fn list_patients(&self, owner: i64) -> StoreResult<Vec<Patient>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!("{PATIENT_COLUMNS} WHERE user_id = ?1;"))?;
        let rows = stmt.query_map([owner], patient_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::from)
    }

    pub async fn get_patient(&self, owner: i64, id: i64) -> StoreResult<Patient> {
        let conn = self.conn.lock().await;
        patient_by_id(&conn, owner, id)?.ok_or(StoreError::NotFound("patient"))
    }

    /// Applies a partial update: only fields present in `patch` change, and
    /// `updated_at` is bumped. Read and write share one transaction.
    pub async fn update_patient(
        &self,
        owner: i64,
        id: i64,
        patch: &PatientPatch,
    ) -> StoreResult<Patient> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut patient =
            patient_by_id(&tx, owner, id)?.ok_or(StoreError::NotFound("patient"))?;
        if let Some(ref name) = patch.name {
            patient.name = name.clone();
        }
        if let Some(age) = patch.age {
            patient.age = age;
        }
        if let Some(gender) = patch.gender {
            patient.gender = gender;
        }
        if let Some(ref contact) = patch.contact {
            patient.contact = contact.clone();
        }
        if let Some(ref address) = patch.address {
            patient.address = address.clone();
        }
        if let Some(ref history) = patch.medical_history {
            patient.medical_history = Some(history.clone());
        }
        patient.updated_at = Utc::now();

        tx.execute(
            "UPDATE patients
             SET name = ?1, age = ?2, gender = ?3, contact = ?4, address = ?5,
                 medical_history = ?6, updated_at = ?7
             WHERE id = ?8 AND user_id = ?9;",
            params![
                patient.name,
                patient.age,
                patient.gender.as_str(),
                patient.contact,
                patient.address,
                patient.medical_history,
                patient.updated_at,
                id,
                owner
            ],
        )?;
        tx.commit()?;
        Ok(patient)
    }

    /// Removes the record; assignments referencing it cascade away.
    pub async fn delete_patient(&self, owner: i64, id: i64) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "DELETE FROM patients WHERE id = ?1 AND user_id = ?2;",
            params![id, owner],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound("patient"));
        }
        Ok(())
    }
}

const PATIENT_COLUMNS: &str = "SELECT id, user_id, name, age, gender, contact, address,
        medical_history, created_at, updated_at
 FROM patients";

fn patient_by_id(conn: &Connection, owner: i64, id: i64) -> StoreResult<Option<Patient>> {
    conn.query_row(
        &format!("{PATIENT_COLUMNS} WHERE id = ?1 AND user_id = ?2;"),
        params![id, owner],
        patient_from_row,
    )
    .optional()
    .map_err(StoreError::from)
}

fn patient_from_row(row: &Row) -> rusqlite::Result<Patient> {
    let gender: String = row.get("gender")?;
    let gender = gender.parse::<Gender>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e))
    })?;
    Ok(Patient {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        name: row.get("name")?,
        age: row.get("age")?,
        gender,
        contact: row.get("contact")?,
        address: row.get("address")?,
        medical_history: row.get("medical_history")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
