use diesel::prelude::*;

use crate::db::DatabaseError;
use crate::models::{NewSample, Sample};
use crate::repository::{diagnosis, patient};
use crate::schema::samples;

/// Newest first.
pub fn list_by_date(conn: &mut SqliteConnection) -> Result<Vec<Sample>, DatabaseError> {
    let rows = samples::table
        .order((samples::date.desc(), samples::id.desc()))
        .select(Sample::as_select())
        .load(conn)?;
    Ok(rows)
}

pub fn list_for_patient(
    conn: &mut SqliteConnection,
    patient_id: i32,
) -> Result<Vec<Sample>, DatabaseError> {
    let rows = samples::table
        .filter(samples::patient_id.eq(patient_id))
        .order((samples::date.desc(), samples::id.desc()))
        .select(Sample::as_select())
        .load(conn)?;
    Ok(rows)
}

pub fn count_for_diagnosis(
    conn: &mut SqliteConnection,
    diagnosis_id: i32,
) -> Result<i64, DatabaseError> {
    let count = samples::table
        .filter(samples::diagnosis_id.eq(diagnosis_id))
        .count()
        .get_result(conn)?;
    Ok(count)
}

pub fn find(conn: &mut SqliteConnection, id: i32) -> Result<Sample, DatabaseError> {
    samples::table
        .find(id)
        .select(Sample::as_select())
        .first(conn)
        .optional()?
        .ok_or(DatabaseError::NotFound {
            entity: "sample",
            id,
        })
}

/// Inserts a sample after checking that the patient and diagnosis it names
/// exist.
pub fn insert(conn: &mut SqliteConnection, sample: &NewSample) -> Result<Sample, DatabaseError> {
    conn.immediate_transaction::<_, DatabaseError, _>(|conn| {
        check_references(conn, sample)?;
        let created = diesel::insert_into(samples::table)
            .values(sample)
            .returning(Sample::as_returning())
            .get_result(conn)?;
        Ok(created)
    })
}

/// Overwrites every column of sample `id`; references are checked the same
/// way as on insert.
pub fn update(
    conn: &mut SqliteConnection,
    id: i32,
    changes: &NewSample,
) -> Result<Sample, DatabaseError> {
    conn.immediate_transaction::<_, DatabaseError, _>(|conn| {
        find(conn, id)?;
        check_references(conn, changes)?;
        let updated = diesel::update(samples::table.find(id))
            .set(changes)
            .returning(Sample::as_returning())
            .get_result(conn)?;
        Ok(updated)
    })
}

pub fn delete(conn: &mut SqliteConnection, id: i32) -> Result<(), DatabaseError> {
    let deleted = diesel::delete(samples::table.find(id)).execute(conn)?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity: "sample",
            id,
        });
    }
    Ok(())
}

pub fn delete_for_patient(
    conn: &mut SqliteConnection,
    patient_id: i32,
) -> Result<usize, DatabaseError> {
    let deleted =
        diesel::delete(samples::table.filter(samples::patient_id.eq(patient_id))).execute(conn)?;
    Ok(deleted)
}

pub fn delete_for_diagnosis(
    conn: &mut SqliteConnection,
    diagnosis_id: i32,
) -> Result<usize, DatabaseError> {
    let deleted = diesel::delete(samples::table.filter(samples::diagnosis_id.eq(diagnosis_id)))
        .execute(conn)?;
    Ok(deleted)
}

fn check_references(conn: &mut SqliteConnection, sample: &NewSample) -> Result<(), DatabaseError> {
    if !patient::exists(conn, sample.patient_id)? {
        return Err(DatabaseError::MissingReference {
            entity: "patient",
            id: sample.patient_id,
        });
    }
    if !diagnosis::exists(conn, sample.diagnosis_id)? {
        return Err(DatabaseError::MissingReference {
            entity: "diagnosis",
            id: sample.diagnosis_id,
        });
    }
    Ok(())
}
