use actix_web::web;

use crate::handlers;

/// The full route table, shared by `main` and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        // patients
        .route("/patients", web::get().to(handlers::list_patients))
        .service(
            web::resource("/new_patient")
                .route(web::get().to(handlers::new_patient_form))
                .route(web::post().to(handlers::create_patient)),
        )
        .service(
            web::resource("/edit_patient/{patient_id}")
                .route(web::get().to(handlers::edit_patient_form))
                .route(web::post().to(handlers::update_patient)),
        )
        .route(
            "/delete_patient/{patient_id}",
            web::post().to(handlers::delete_patient),
        )
        // diagnoses
        .route("/diagnoses", web::get().to(handlers::list_diagnoses))
        .service(
            web::resource("/diagnoses/new")
                .route(web::get().to(handlers::new_diagnosis_form))
                .route(web::post().to(handlers::create_diagnosis)),
        )
        .service(
            web::resource("/edit_diagnosis/{diagnosis_id}")
                .route(web::get().to(handlers::edit_diagnosis_form))
                .route(web::post().to(handlers::update_diagnosis)),
        )
        .route(
            "/delete_diagnosis/{diagnosis_id}",
            web::post().to(handlers::delete_diagnosis),
        )
        // samples
        .route("/samples", web::get().to(handlers::list_samples))
        .service(
            web::resource("/samples/new")
                .route(web::get().to(handlers::new_sample_form))
                .route(web::post().to(handlers::create_sample)),
        )
        .service(
            web::resource("/samples/edit/{sample_id}")
                .route(web::get().to(handlers::edit_sample_form))
                .route(web::post().to(handlers::update_sample)),
        )
        .route(
            "/samples/delete/{sample_id}",
            web::post().to(handlers::delete_sample),
        )
        .route("/samples/add", web::post().to(handlers::create_sample));
}
