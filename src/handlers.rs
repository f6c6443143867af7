use actix_web::http::header::{self, ContentType};
use actix_web::{web, HttpResponse};

use crate::config::DiagnosisDeletePolicy;
use crate::db::{with_conn, DbPool};
use crate::error::AppError;
use crate::forms::{DiagnosisForm, PatientForm, SampleForm};
use crate::repository::{diagnosis, patient, sample};
use crate::views;

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}

fn redirect(location: &'static str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub async fn index() -> HttpResponse {
    html(views::index())
}

// Patients

pub async fn list_patients(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let patients = with_conn(&pool, patient::list_by_surname).await?;
    Ok(html(views::patients(&patients)))
}

pub async fn new_patient_form() -> HttpResponse {
    html(views::new_patient())
}

pub async fn create_patient(
    pool: web::Data<DbPool>,
    form: web::Form<PatientForm>,
) -> Result<HttpResponse, AppError> {
    let new_patient = form.parse()?;
    let created = with_conn(&pool, move |conn| patient::insert(conn, &new_patient)).await?;
    tracing::info!(patient_id = created.id, "created patient");
    Ok(redirect("/patients"))
}

pub async fn edit_patient_form(
    pool: web::Data<DbPool>,
    patient_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = patient_id.into_inner();
    let (found, samples) = with_conn(&pool, move |conn| {
        Ok((patient::find(conn, id)?, sample::list_for_patient(conn, id)?))
    })
    .await?;
    Ok(html(views::edit_patient(&found, &samples)))
}

pub async fn update_patient(
    pool: web::Data<DbPool>,
    patient_id: web::Path<i32>,
    form: web::Form<PatientForm>,
) -> Result<HttpResponse, AppError> {
    let id = patient_id.into_inner();
    // An unknown id answers 404 whatever the submitted body looks like.
    with_conn(&pool, move |conn| patient::find(conn, id)).await?;
    let changes = form.parse()?;
    with_conn(&pool, move |conn| patient::update(conn, id, &changes)).await?;
    tracing::info!(patient_id = id, "updated patient");
    Ok(redirect("/patients"))
}

pub async fn delete_patient(
    pool: web::Data<DbPool>,
    patient_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = patient_id.into_inner();
    let removed = with_conn(&pool, move |conn| patient::delete_with_samples(conn, id)).await?;
    tracing::info!(patient_id = id, samples_removed = removed, "deleted patient");
    Ok(redirect("/patients"))
}

// Diagnoses

pub async fn list_diagnoses(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let diagnoses = with_conn(&pool, diagnosis::list_by_type).await?;
    Ok(html(views::diagnoses(&diagnoses)))
}

pub async fn new_diagnosis_form() -> HttpResponse {
    html(views::new_diagnosis())
}

pub async fn create_diagnosis(
    pool: web::Data<DbPool>,
    form: web::Form<DiagnosisForm>,
) -> Result<HttpResponse, AppError> {
    let new_diagnosis = form.parse()?;
    let created = with_conn(&pool, move |conn| diagnosis::insert(conn, &new_diagnosis)).await?;
    tracing::info!(diagnosis_id = created.id, "created diagnosis");
    Ok(redirect("/diagnoses"))
}

pub async fn edit_diagnosis_form(
    pool: web::Data<DbPool>,
    diagnosis_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = diagnosis_id.into_inner();
    let found = with_conn(&pool, move |conn| diagnosis::find(conn, id)).await?;
    Ok(html(views::edit_diagnosis(&found)))
}

pub async fn update_diagnosis(
    pool: web::Data<DbPool>,
    diagnosis_id: web::Path<i32>,
    form: web::Form<DiagnosisForm>,
) -> Result<HttpResponse, AppError> {
    let id = diagnosis_id.into_inner();
    with_conn(&pool, move |conn| diagnosis::find(conn, id)).await?;
    let changes = form.parse()?;
    with_conn(&pool, move |conn| diagnosis::update(conn, id, &changes)).await?;
    tracing::info!(diagnosis_id = id, "updated diagnosis");
    Ok(redirect("/diagnoses"))
}

pub async fn delete_diagnosis(
    pool: web::Data<DbPool>,
    policy: web::Data<DiagnosisDeletePolicy>,
    diagnosis_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = diagnosis_id.into_inner();
    let policy = **policy;
    let removed = with_conn(&pool, move |conn| diagnosis::delete(conn, id, policy)).await?;
    tracing::info!(
        diagnosis_id = id,
        %policy,
        samples_removed = removed,
        "deleted diagnosis"
    );
    Ok(redirect("/diagnoses"))
}

// Samples

pub async fn list_samples(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let (samples, patients, diagnoses) = with_conn(&pool, |conn| {
        Ok((
            sample::list_by_date(conn)?,
            patient::list_by_surname(conn)?,
            diagnosis::list_by_type(conn)?,
        ))
    })
    .await?;
    Ok(html(views::samples(&samples, &patients, &diagnoses)))
}

pub async fn new_sample_form(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let (patients, diagnoses) = with_conn(&pool, |conn| {
        Ok((patient::list_by_surname(conn)?, diagnosis::list_by_type(conn)?))
    })
    .await?;
    Ok(html(views::new_sample(&patients, &diagnoses)))
}

/// Serves both `/samples/new` and the form-less `/samples/add`.
pub async fn create_sample(
    pool: web::Data<DbPool>,
    form: web::Form<SampleForm>,
) -> Result<HttpResponse, AppError> {
    let new_sample = form.parse()?;
    let created = with_conn(&pool, move |conn| sample::insert(conn, &new_sample)).await?;
    tracing::info!(
        sample_id = created.id,
        patient_id = created.patient_id,
        diagnosis_id = created.diagnosis_id,
        "created sample"
    );
    Ok(redirect("/samples"))
}

pub async fn edit_sample_form(
    pool: web::Data<DbPool>,
    sample_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = sample_id.into_inner();
    let (found, patients, diagnoses) = with_conn(&pool, move |conn| {
        Ok((
            sample::find(conn, id)?,
            patient::list_by_surname(conn)?,
            diagnosis::list_by_type(conn)?,
        ))
    })
    .await?;
    Ok(html(views::edit_sample(&found, &patients, &diagnoses)))
}

pub async fn update_sample(
    pool: web::Data<DbPool>,
    sample_id: web::Path<i32>,
    form: web::Form<SampleForm>,
) -> Result<HttpResponse, AppError> {
    let id = sample_id.into_inner();
    with_conn(&pool, move |conn| sample::find(conn, id)).await?;
    let changes = form.parse()?;
    with_conn(&pool, move |conn| sample::update(conn, id, &changes)).await?;
    tracing::info!(sample_id = id, "updated sample");
    Ok(redirect("/samples"))
}

pub async fn delete_sample(
    pool: web::Data<DbPool>,
    sample_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = sample_id.into_inner();
    with_conn(&pool, move |conn| sample::delete(conn, id)).await?;
    tracing::info!(sample_id = id, "deleted sample");
    Ok(redirect("/samples"))
}
