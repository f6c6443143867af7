use chrono::NaiveDate;
use diesel::prelude::*;

use crate::schema::{diagnoses, patients, samples};

#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = patients)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Patient {
    pub id: i32,
    pub name: String,
    pub surname: String,
    pub city: String,
    pub date_of_birth: NaiveDate,
}

// Used both for inserts and for full-row edits.
#[derive(Debug, Clone, PartialEq, Insertable, AsChangeset)]
#[diesel(table_name = patients)]
pub struct NewPatient {
    pub name: String,
    pub surname: String,
    pub city: String,
    pub date_of_birth: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = diagnoses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Diagnosis {
    pub id: i32,
    pub diagnosis_type: String,
    pub localization: String,
}

#[derive(Debug, Clone, PartialEq, Insertable, AsChangeset)]
#[diesel(table_name = diagnoses)]
pub struct NewDiagnosis {
    pub diagnosis_type: String,
    pub localization: String,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = samples)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Sample {
    pub id: i32,
    pub date: NaiveDate,
    pub patient_id: i32,
    pub diagnosis_id: i32,
    pub read_length: f64,
    pub total_length: i64,
}

#[derive(Debug, Clone, PartialEq, Insertable, AsChangeset)]
#[diesel(table_name = samples)]
pub struct NewSample {
    pub date: NaiveDate,
    pub patient_id: i32,
    pub diagnosis_id: i32,
    pub read_length: f64,
    pub total_length: i64,
}
