use diesel::prelude::*;

use crate::db::DatabaseError;
use crate::models::{NewPatient, Patient};
use crate::repository::sample;
use crate::schema::patients;

pub fn list_by_surname(conn: &mut SqliteConnection) -> Result<Vec<Patient>, DatabaseError> {
    let rows = patients::table
        .order((patients::surname.asc(), patients::id.asc()))
        .select(Patient::as_select())
        .load(conn)?;
    Ok(rows)
}

pub fn find(conn: &mut SqliteConnection, id: i32) -> Result<Patient, DatabaseError> {
    patients::table
        .find(id)
        .select(Patient::as_select())
        .first(conn)
        .optional()?
        .ok_or(DatabaseError::NotFound {
            entity: "patient",
            id,
        })
}

pub fn exists(conn: &mut SqliteConnection, id: i32) -> Result<bool, DatabaseError> {
    let found = diesel::select(diesel::dsl::exists(patients::table.find(id))).get_result(conn)?;
    Ok(found)
}

pub fn insert(conn: &mut SqliteConnection, patient: &NewPatient) -> Result<Patient, DatabaseError> {
    let created = diesel::insert_into(patients::table)
        .values(patient)
        .returning(Patient::as_returning())
        .get_result(conn)?;
    Ok(created)
}

/// Overwrites every column of patient `id`.
pub fn update(
    conn: &mut SqliteConnection,
    id: i32,
    changes: &NewPatient,
) -> Result<Patient, DatabaseError> {
    diesel::update(patients::table.find(id))
        .set(changes)
        .returning(Patient::as_returning())
        .get_result(conn)
        .optional()?
        .ok_or(DatabaseError::NotFound {
            entity: "patient",
            id,
        })
}

/// Deletes the patient together with every sample taken from them, in one
/// transaction. Returns the number of samples removed.
pub fn delete_with_samples(conn: &mut SqliteConnection, id: i32) -> Result<usize, DatabaseError> {
    conn.immediate_transaction::<_, DatabaseError, _>(|conn| {
        find(conn, id)?;
        let removed = sample::delete_for_patient(conn, id)?;
        diesel::delete(patients::table.find(id)).execute(conn)?;
        Ok(removed)
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::db::test_pool;
    use crate::models::{NewDiagnosis, NewSample};
    use crate::repository::diagnosis;

    fn new_patient(name: &str, surname: &str) -> NewPatient {
        NewPatient {
            name: name.to_string(),
            surname: surname.to_string(),
            city: "Bergen".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1980, 5, 17).unwrap(),
        }
    }

    #[test]
    fn lists_patients_by_surname() {
        let (_dir, pool) = test_pool();
        let mut conn = pool.get().unwrap();
        insert(&mut conn, &new_patient("Zed", "Zorro")).unwrap();
        insert(&mut conn, &new_patient("Ann", "Apple")).unwrap();
        insert(&mut conn, &new_patient("Max", "Miller")).unwrap();

        let surnames: Vec<String> = list_by_surname(&mut conn)
            .unwrap()
            .into_iter()
            .map(|p| p.surname)
            .collect();
        assert_eq!(surnames, ["Apple", "Miller", "Zorro"]);
    }

    #[test]
    fn update_overwrites_all_fields() {
        let (_dir, pool) = test_pool();
        let mut conn = pool.get().unwrap();
        let created = insert(&mut conn, &new_patient("Ann", "Apple")).unwrap();

        let changes = NewPatient {
            name: "Anna".to_string(),
            surname: "Appleby".to_string(),
            city: "Tromso".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1981, 1, 2).unwrap(),
        };
        let updated = update(&mut conn, created.id, &changes).unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(find(&mut conn, created.id).unwrap(), updated);
        assert_eq!(updated.city, "Tromso");
    }

    #[test]
    fn update_of_unknown_patient_is_not_found() {
        let (_dir, pool) = test_pool();
        let mut conn = pool.get().unwrap();
        let err = update(&mut conn, 42, &new_patient("Ann", "Apple")).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { entity: "patient", id: 42 }));
    }

    #[test]
    fn delete_cascades_to_the_patients_samples_only() {
        let (_dir, pool) = test_pool();
        let mut conn = pool.get().unwrap();
        let doomed = insert(&mut conn, &new_patient("Zed", "Zorro")).unwrap();
        let kept = insert(&mut conn, &new_patient("Ann", "Apple")).unwrap();
        let diag = diagnosis::insert(
            &mut conn,
            &NewDiagnosis {
                diagnosis_type: "adenoma".to_string(),
                localization: "colon".to_string(),
            },
        )
        .unwrap();

        for patient_id in [doomed.id, doomed.id, kept.id] {
            sample::insert(
                &mut conn,
                &NewSample {
                    date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    patient_id,
                    diagnosis_id: diag.id,
                    read_length: 100.0,
                    total_length: 1000,
                },
            )
            .unwrap();
        }

        assert_eq!(delete_with_samples(&mut conn, doomed.id).unwrap(), 2);
        assert!(!exists(&mut conn, doomed.id).unwrap());
        assert!(sample::list_for_patient(&mut conn, doomed.id).unwrap().is_empty());
        assert_eq!(sample::list_for_patient(&mut conn, kept.id).unwrap().len(), 1);
    }

    #[test]
    fn deleting_unknown_patient_changes_nothing() {
        let (_dir, pool) = test_pool();
        let mut conn = pool.get().unwrap();
        insert(&mut conn, &new_patient("Ann", "Apple")).unwrap();

        let err = delete_with_samples(&mut conn, 999).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
        assert_eq!(list_by_surname(&mut conn).unwrap().len(), 1);
    }
}
