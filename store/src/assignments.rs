use chrono::Utc;
use models::medical::{AssignmentRecord, NewAssignment, Specialization};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use crate::{Store, StoreError, StoreResult};

impl Store {
    /// Links a patient to a doctor. Both endpoints must be owned by
    /// `owner`; the UNIQUE constraint on the pair turns a concurrent
    /// duplicate insert into `Duplicate` rather than a second row.
    pub async fn create_assignment(
        &self,
        owner: i64,
        new: &NewAssignment,
    ) -> StoreResult<AssignmentRecord> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !owned_patient_exists(&tx, owner, new.patient_id)? {
            return Err(StoreError::NotFound("patient"));
        }
        if !owned_doctor_exists(&tx, owner, new.doctor_id)? {
            return Err(StoreError::NotFound("doctor"));
        }

        tx.execute(
            "INSERT INTO assignments (patient_id, doctor_id, assigned_at)
             VALUES (?1, ?2, ?3);",
            params![new.patient_id, new.doctor_id, Utc::now()],
        )
        .map_err(|e| StoreError::on_unique(e, "this doctor is already assigned to this patient"))?;

        let id = tx.last_insert_rowid();
        let record =
            assignment_by_id(&tx, owner, id)?.ok_or(StoreError::NotFound("mapping"))?;
        tx.commit()?;
        Ok(record)
    }

    /// Every assignment whose patient is owned by `owner`.
    pub async fn list_assignments(&self, owner: i64) -> StoreResult<Vec<AssignmentRecord>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!("{ASSIGNMENT_QUERY} WHERE p.user_id = ?1;"))?;
        let rows = stmt.query_map([owner], assignment_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::from)
    }

    /// Assignments for one patient. Callers ownership-check the patient
    /// first to get a 404 for a foreign or missing id; the owner filter
    /// here keeps the query safe regardless.
    pub async fn assignments_for_patient(
        &self,
        owner: i64,
        patient_id: i64,
    ) -> StoreResult<Vec<AssignmentRecord>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "{ASSIGNMENT_QUERY} WHERE p.user_id = ?1 AND p.id = ?2;"
        ))?;
        let rows = stmt.query_map(params![owner, patient_id], assignment_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::from)
    }

    /// Unlinks by assignment id, ownership-checked through the patient.
    pub async fn delete_assignment(&self, owner: i64, id: i64) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "DELETE FROM assignments
             WHERE id = ?1
               AND patient_id IN (SELECT id FROM patients WHERE user_id = ?2);",
            params![id, owner],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound("mapping"));
        }
        Ok(())
    }
}

const ASSIGNMENT_QUERY: &str = "SELECT a.id, a.patient_id, p.name AS patient_name,
        a.doctor_id, d.name AS doctor_name,
        d.specialization AS doctor_specialization, a.assigned_at
 FROM assignments a
 INNER JOIN patients p ON p.id = a.patient_id
 INNER JOIN doctors d ON d.id = a.doctor_id";

fn owned_patient_exists(conn: &Connection, owner: i64, id: i64) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM patients WHERE id = ?1 AND user_id = ?2);",
        params![id, owner],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn owned_doctor_exists(conn: &Connection, owner: i64, id: i64) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM doctors WHERE id = ?1 AND user_id = ?2);",
        params![id, owner],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn assignment_by_id(conn: &Connection, owner: i64, id: i64) -> StoreResult<Option<AssignmentRecord>> {
    conn.query_row(
        &format!("{ASSIGNMENT_QUERY} WHERE p.user_id = ?1 AND a.id = ?2;"),
        params![owner, id],
        assignment_from_row,
    )
    .optional()
    .map_err(StoreError::from)
}

fn assignment_from_row(row: &Row) -> rusqlite::Result<AssignmentRecord> {
    let specialization: String = row.get("doctor_specialization")?;
    let doctor_specialization = specialization.parse::<Specialization>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e))
    })?;
    Ok(AssignmentRecord {
        id: row.get("id")?,
        patient_id: row.get("patient_id")?,
        patient_name: row.get("patient_name")?,
        doctor_id: row.get("doctor_id")?,
        doctor_name: row.get("doctor_name")?,
        doctor_specialization,
        assigned_at: row.get("assigned_at")?,
    })
}
