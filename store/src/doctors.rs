use chrono::Utc;
use models::medical::{Doctor, DoctorPatch, NewDoctor, Specialization};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use crate::{Store, StoreError, StoreResult};

impl Store {
    pub async fn create_doctor(&self, owner: i64, new: &NewDoctor) -> StoreResult<Doctor> {
        let conn = self.conn.lock().await;
        let now = Utc::now();
        conn.execute(
            "INSERT INTO doctors (user_id, name, specialization, contact, address,
                                  experience, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                owner,
                new.name,
                new.specialization.as_str(),
                new.contact,
                new.address,
                new.experience,
                now,
                now
            ],
        )?;

        let id = conn.last_insert_rowid();
        doctor_by_id(&conn, owner, id)?.ok_or(StoreError::NotFound("doctor"))
    }

    /// All doctors owned by `owner`, in natural store order.
    pub async fn list_doctors(&self, owner: i64) -> StoreResult<Vec<Doctor>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!("{DOCTOR_COLUMNS} WHERE user_id = ?1;"))?;
        let rows = stmt.query_map([owner], doctor_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::from)
    }

    pub async fn get_doctor(&self, owner: i64, id: i64) -> StoreResult<Doctor> {
        let conn = self.conn.lock().await;
        doctor_by_id(&conn, owner, id)?.ok_or(StoreError::NotFound("doctor"))
    }

    /// Applies a partial update; see [`Store::update_patient`].
    pub async fn update_doctor(
        &self,
        owner: i64,
        id: i64,
        patch: &DoctorPatch,
    ) -> StoreResult<Doctor> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut doctor = doctor_by_id(&tx, owner, id)?.ok_or(StoreError::NotFound("doctor"))?;
        if let Some(ref name) = patch.name {
            doctor.name = name.clone();
        }
        if let Some(specialization) = patch.specialization {
            doctor.specialization = specialization;
        }
        if let Some(ref contact) = patch.contact {
            doctor.contact = contact.clone();
        }
        if let Some(ref address) = patch.address {
            doctor.address = address.clone();
        }
        if let Some(experience) = patch.experience {
            doctor.experience = experience;
        }
        doctor.updated_at = Utc::now();

        tx.execute(
            "UPDATE doctors
             SET name = ?1, specialization = ?2, contact = ?3, address = ?4,
                 experience = ?5, updated_at = ?6
             WHERE id = ?7 AND user_id = ?8;",
            params![
                doctor.name,
                doctor.specialization.as_str(),
                doctor.contact,
                doctor.address,
                doctor.experience,
                doctor.updated_at,
                id,
                owner
            ],
        )?;
        tx.commit()?;
        Ok(doctor)
    }

    /// Removes the record; assignments referencing it cascade away.
    pub async fn delete_doctor(&self, owner: i64, id: i64) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "DELETE FROM doctors WHERE id = ?1 AND user_id = ?2;",
            params![id, owner],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound("doctor"));
        }
        Ok(())
    }
}

const DOCTOR_COLUMNS: &str = "SELECT id, user_id, name, specialization, contact, address,
        experience, created_at, updated_at
 FROM doctors";

fn doctor_by_id(conn: &Connection, owner: i64, id: i64) -> StoreResult<Option<Doctor>> {
    conn.query_row(
        &format!("{DOCTOR_COLUMNS} WHERE id = ?1 AND user_id = ?2;"),
        params![id, owner],
        doctor_from_row,
    )
    .optional()
    .map_err(StoreError::from)
}

fn doctor_from_row(row: &Row) -> rusqlite::Result<Doctor> {
    let specialization: String = row.get("specialization")?;
    let specialization = specialization.parse::<Specialization>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e))
    })?;
    Ok(Doctor {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        name: row.get("name")?,
        specialization,
        contact: row.get("contact")?,
        address: row.get("address")?,
        experience: row.get("experience")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
