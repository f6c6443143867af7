use diesel::prelude::*;

use crate::config::DiagnosisDeletePolicy;
use crate::db::DatabaseError;
use crate::models::{Diagnosis, NewDiagnosis};
use crate::repository::sample;
use crate::schema::diagnoses;

pub fn list_by_type(conn: &mut SqliteConnection) -> Result<Vec<Diagnosis>, DatabaseError> {
    let rows = diagnoses::table
        .order((diagnoses::diagnosis_type.asc(), diagnoses::id.asc()))
        .select(Diagnosis::as_select())
        .load(conn)?;
    Ok(rows)
}

pub fn find(conn: &mut SqliteConnection, id: i32) -> Result<Diagnosis, DatabaseError> {
    diagnoses::table
        .find(id)
        .select(Diagnosis::as_select())
        .first(conn)
        .optional()?
        .ok_or(DatabaseError::NotFound {
            entity: "diagnosis",
            id,
        })
}

pub fn exists(conn: &mut SqliteConnection, id: i32) -> Result<bool, DatabaseError> {
    let found =
        diesel::select(diesel::dsl::exists(diagnoses::table.find(id))).get_result(conn)?;
    Ok(found)
}

pub fn insert(
    conn: &mut SqliteConnection,
    diagnosis: &NewDiagnosis,
) -> Result<Diagnosis, DatabaseError> {
    let created = diesel::insert_into(diagnoses::table)
        .values(diagnosis)
        .returning(Diagnosis::as_returning())
        .get_result(conn)?;
    Ok(created)
}

pub fn update(
    conn: &mut SqliteConnection,
    id: i32,
    changes: &NewDiagnosis,
) -> Result<Diagnosis, DatabaseError> {
    diesel::update(diagnoses::table.find(id))
        .set(changes)
        .returning(Diagnosis::as_returning())
        .get_result(conn)
        .optional()?
        .ok_or(DatabaseError::NotFound {
            entity: "diagnosis",
            id,
        })
}

/// Deletes diagnosis `id`, treating samples that reference it according to
/// `policy`. Returns the number of samples deleted alongside it.
pub fn delete(
    conn: &mut SqliteConnection,
    id: i32,
    policy: DiagnosisDeletePolicy,
) -> Result<usize, DatabaseError> {
    conn.immediate_transaction::<_, DatabaseError, _>(|conn| {
        find(conn, id)?;

        let removed = match policy {
            DiagnosisDeletePolicy::Orphan => 0,
            DiagnosisDeletePolicy::Cascade => sample::delete_for_diagnosis(conn, id)?,
            DiagnosisDeletePolicy::Restrict => {
                let count = sample::count_for_diagnosis(conn, id)?;
                if count > 0 {
                    return Err(DatabaseError::StillReferenced {
                        entity: "diagnosis",
                        id,
                        count,
                    });
                }
                0
            }
        };

        diesel::delete(diagnoses::table.find(id)).execute(conn)?;
        Ok(removed)
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::db::test_pool;
    use crate::models::{NewPatient, NewSample, Sample};
    use crate::repository::patient;

    fn new_diagnosis(diagnosis_type: &str) -> NewDiagnosis {
        NewDiagnosis {
            diagnosis_type: diagnosis_type.to_string(),
            localization: "skin".to_string(),
        }
    }

    /// One patient, one diagnosis, one sample linking them.
    fn seed(conn: &mut SqliteConnection) -> (Diagnosis, Sample) {
        let p = patient::insert(
            conn,
            &NewPatient {
                name: "Ann".to_string(),
                surname: "Apple".to_string(),
                city: "Oslo".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
            },
        )
        .unwrap();
        let d = insert(conn, &new_diagnosis("melanoma")).unwrap();
        let s = sample::insert(
            conn,
            &NewSample {
                date: NaiveDate::from_ymd_opt(2024, 2, 2).unwrap(),
                patient_id: p.id,
                diagnosis_id: d.id,
                read_length: 150.0,
                total_length: 42,
            },
        )
        .unwrap();
        (d, s)
    }

    #[test]
    fn lists_diagnoses_by_type() {
        let (_dir, pool) = test_pool();
        let mut conn = pool.get().unwrap();
        insert(&mut conn, &new_diagnosis("sarcoma")).unwrap();
        insert(&mut conn, &new_diagnosis("adenoma")).unwrap();

        let types: Vec<String> = list_by_type(&mut conn)
            .unwrap()
            .into_iter()
            .map(|d| d.diagnosis_type)
            .collect();
        assert_eq!(types, ["adenoma", "sarcoma"]);
    }

    #[test]
    fn orphan_policy_leaves_dangling_samples() {
        let (_dir, pool) = test_pool();
        let mut conn = pool.get().unwrap();
        let (d, s) = seed(&mut conn);

        assert_eq!(delete(&mut conn, d.id, DiagnosisDeletePolicy::Orphan).unwrap(), 0);
        assert!(!exists(&mut conn, d.id).unwrap());

        let still_there = sample::find(&mut conn, s.id).unwrap();
        assert_eq!(still_there.diagnosis_id, d.id);
    }

    #[test]
    fn cascade_policy_removes_samples() {
        let (_dir, pool) = test_pool();
        let mut conn = pool.get().unwrap();
        let (d, s) = seed(&mut conn);

        assert_eq!(delete(&mut conn, d.id, DiagnosisDeletePolicy::Cascade).unwrap(), 1);
        assert!(matches!(
            sample::find(&mut conn, s.id),
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[test]
    fn restrict_policy_refuses_while_referenced() {
        let (_dir, pool) = test_pool();
        let mut conn = pool.get().unwrap();
        let (d, s) = seed(&mut conn);

        let err = delete(&mut conn, d.id, DiagnosisDeletePolicy::Restrict).unwrap_err();
        assert!(matches!(err, DatabaseError::StillReferenced { count: 1, .. }));
        assert!(exists(&mut conn, d.id).unwrap());

        sample::delete(&mut conn, s.id).unwrap();
        delete(&mut conn, d.id, DiagnosisDeletePolicy::Restrict).unwrap();
        assert!(!exists(&mut conn, d.id).unwrap());
    }

    #[test]
    fn deleted_ids_are_not_reused() {
        let (_dir, pool) = test_pool();
        let mut conn = pool.get().unwrap();
        let first = insert(&mut conn, &new_diagnosis("adenoma")).unwrap();
        delete(&mut conn, first.id, DiagnosisDeletePolicy::Orphan).unwrap();
        let second = insert(&mut conn, &new_diagnosis("adenoma")).unwrap();
        assert!(second.id > first.id);
    }
}
