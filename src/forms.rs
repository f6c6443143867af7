//! URL-encoded form bodies as submitted by the browser.
//!
//! Every field is received as an optional string and converted here, after
//! the handler has confirmed the target record exists. A missing key surfaces
//! as [`AppError::MissingField`], an unparseable value as
//! [`AppError::MalformedField`].

use std::str::FromStr;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::{NewDiagnosis, NewPatient, NewSample};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
pub struct PatientForm {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub city: Option<String>,
    pub date_of_birth: Option<String>,
}

impl PatientForm {
    pub fn parse(&self) -> Result<NewPatient, AppError> {
        Ok(NewPatient {
            name: required("name", &self.name)?.to_string(),
            surname: required("surname", &self.surname)?.to_string(),
            city: required("city", &self.city)?.to_string(),
            date_of_birth: parse_date(
                "date_of_birth",
                required("date_of_birth", &self.date_of_birth)?,
            )?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct DiagnosisForm {
    #[serde(rename = "type")]
    pub diagnosis_type: Option<String>,
    pub localization: Option<String>,
}

impl DiagnosisForm {
    pub fn parse(&self) -> Result<NewDiagnosis, AppError> {
        Ok(NewDiagnosis {
            diagnosis_type: required("type", &self.diagnosis_type)?.to_string(),
            localization: required("localization", &self.localization)?.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SampleForm {
    pub date: Option<String>,
    pub patient_id: Option<String>,
    pub diagnosis_id: Option<String>,
    pub read_length: Option<String>,
    pub total_length: Option<String>,
}

impl SampleForm {
    pub fn parse(&self) -> Result<NewSample, AppError> {
        Ok(NewSample {
            date: parse_date("date", required("date", &self.date)?)?,
            patient_id: parse_number("patient_id", required("patient_id", &self.patient_id)?)?,
            diagnosis_id: parse_number(
                "diagnosis_id",
                required("diagnosis_id", &self.diagnosis_id)?,
            )?,
            read_length: parse_number("read_length", required("read_length", &self.read_length)?)?,
            total_length: parse_number(
                "total_length",
                required("total_length", &self.total_length)?,
            )?,
        })
    }
}

fn required<'a>(field: &'static str, value: &'a Option<String>) -> Result<&'a str, AppError> {
    value.as_deref().ok_or(AppError::MissingField { field })
}

pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| AppError::MalformedField {
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_number<T>(field: &'static str, value: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| AppError::MalformedField {
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
