//! Server-rendered HTML pages. Every user-supplied value passes through
//! [`escape`] before it is written into markup.

use std::collections::HashMap;
use std::fmt::Write;

use actix_web::http::StatusCode;

use crate::models::{Diagnosis, Patient, Sample};

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body{{font-family:sans-serif;margin:2rem;color:#1c1917}}
nav a{{margin-right:1rem}}
table{{border-collapse:collapse;margin:1rem 0}}
td,th{{border:1px solid #d6d3d1;padding:.3rem .6rem;text-align:left}}
form.inline{{display:inline}}
label{{display:block;margin:.4rem 0}}
.missing{{color:#b91c1c}}
</style>
</head>
<body>
<nav><a href="/">Home</a><a href="/patients">Patients</a><a href="/diagnoses">Diagnoses</a><a href="/samples">Samples</a></nav>
<h1>{title}</h1>
{body}
</body>
</html>
"##,
        title = escape(title),
    )
}

pub fn index() -> String {
    layout(
        "Sample Registry",
        r#"<ul>
<li><a href="/patients">Patients</a></li>
<li><a href="/diagnoses">Diagnoses</a></li>
<li><a href="/samples">Samples</a></li>
</ul>"#,
    )
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let title = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error")
    );
    layout(&title, &format!("<p>{}</p>", escape(message)))
}

// Patients

pub fn patients(patients: &[Patient]) -> String {
    let mut body = String::from(
        r#"<p><a href="/new_patient">New patient</a></p>
<table>
<tr><th>Name</th><th>Surname</th><th>City</th><th>Date of birth</th><th></th></tr>
"#,
    );
    for p in patients {
        let _ = writeln!(
            body,
            r#"<tr><td>{name}</td><td>{surname}</td><td>{city}</td><td>{dob}</td><td><a href="/edit_patient/{id}">Edit</a> <form class="inline" method="post" action="/delete_patient/{id}"><button type="submit">Delete</button></form></td></tr>"#,
            id = p.id,
            name = escape(&p.name),
            surname = escape(&p.surname),
            city = escape(&p.city),
            dob = p.date_of_birth,
        );
    }
    body.push_str("</table>");
    layout("Patients", &body)
}

fn patient_form(action: &str, patient: Option<&Patient>) -> String {
    let value = |f: fn(&Patient) -> String| patient.map(f).unwrap_or_default();
    format!(
        r#"<form method="post" action="{action}">
<label>Name <input name="name" value="{name}" required></label>
<label>Surname <input name="surname" value="{surname}" required></label>
<label>City <input name="city" value="{city}" required></label>
<label>Date of birth <input type="date" name="date_of_birth" value="{dob}" required></label>
<button type="submit">Save</button>
</form>"#,
        name = value(|p| escape(&p.name)),
        surname = value(|p| escape(&p.surname)),
        city = value(|p| escape(&p.city)),
        dob = value(|p| p.date_of_birth.to_string()),
    )
}

pub fn new_patient() -> String {
    layout("New patient", &patient_form("/new_patient", None))
}

/// Edit form followed by the samples taken from this patient, which are
/// removed together with the patient on delete.
pub fn edit_patient(patient: &Patient, samples: &[Sample]) -> String {
    let mut body = patient_form(&format!("/edit_patient/{}", patient.id), Some(patient));
    let _ = write!(body, "\n<h2>Samples ({})</h2>\n", samples.len());
    if !samples.is_empty() {
        body.push_str("<table>\n<tr><th>Date</th><th>Read length</th><th>Total length</th></tr>\n");
        for s in samples {
            let _ = writeln!(
                body,
                r#"<tr><td><a href="/samples/edit/{id}">{date}</a></td><td>{read}</td><td>{total}</td></tr>"#,
                id = s.id,
                date = s.date,
                read = s.read_length,
                total = s.total_length,
            );
        }
        body.push_str("</table>");
    }
    layout("Edit patient", &body)
}

// Diagnoses

pub fn diagnoses(diagnoses: &[Diagnosis]) -> String {
    let mut body = String::from(
        r#"<p><a href="/diagnoses/new">New diagnosis</a></p>
<table>
<tr><th>Type</th><th>Localization</th><th></th></tr>
"#,
    );
    for d in diagnoses {
        let _ = writeln!(
            body,
            r#"<tr><td>{kind}</td><td>{loc}</td><td><a href="/edit_diagnosis/{id}">Edit</a> <form class="inline" method="post" action="/delete_diagnosis/{id}"><button type="submit">Delete</button></form></td></tr>"#,
            id = d.id,
            kind = escape(&d.diagnosis_type),
            loc = escape(&d.localization),
        );
    }
    body.push_str("</table>");
    layout("Diagnoses", &body)
}

fn diagnosis_form(action: &str, diagnosis: Option<&Diagnosis>) -> String {
    format!(
        r#"<form method="post" action="{action}">
<label>Type <input name="type" value="{kind}" required></label>
<label>Localization <input name="localization" value="{loc}" required></label>
<button type="submit">Save</button>
</form>"#,
        kind = diagnosis.map(|d| escape(&d.diagnosis_type)).unwrap_or_default(),
        loc = diagnosis.map(|d| escape(&d.localization)).unwrap_or_default(),
    )
}

pub fn new_diagnosis() -> String {
    layout("New diagnosis", &diagnosis_form("/diagnoses/new", None))
}

pub fn edit_diagnosis(diagnosis: &Diagnosis) -> String {
    layout(
        "Edit diagnosis",
        &diagnosis_form(&format!("/edit_diagnosis/{}", diagnosis.id), Some(diagnosis)),
    )
}

// Samples

fn patient_label(p: &Patient) -> String {
    escape(&format!("{}, {}", p.surname, p.name))
}

fn diagnosis_label(d: &Diagnosis) -> String {
    escape(&format!("{} ({})", d.diagnosis_type, d.localization))
}

/// Selected placeholder for a reference whose row no longer exists.
fn missing_option(kind: &str, selected: Option<i32>, known: bool) -> String {
    match selected {
        Some(id) if !known => {
            format!(r#"<option value="" selected disabled>missing {kind} #{id}</option>"#)
        }
        _ => String::new(),
    }
}

fn patient_options(patients: &[Patient], selected: Option<i32>) -> String {
    let known = patients.iter().any(|p| Some(p.id) == selected);
    let mut out = missing_option("patient", selected, known);
    for p in patients {
        let sel = if Some(p.id) == selected { " selected" } else { "" };
        let _ = write!(out, r#"<option value="{}"{sel}>{}</option>"#, p.id, patient_label(p));
    }
    out
}

fn diagnosis_options(diagnoses: &[Diagnosis], selected: Option<i32>) -> String {
    let known = diagnoses.iter().any(|d| Some(d.id) == selected);
    let mut out = missing_option("diagnosis", selected, known);
    for d in diagnoses {
        let sel = if Some(d.id) == selected { " selected" } else { "" };
        let _ = write!(out, r#"<option value="{}"{sel}>{}</option>"#, d.id, diagnosis_label(d));
    }
    out
}

fn sample_form(
    action: &str,
    sample: Option<&Sample>,
    patients: &[Patient],
    diagnoses: &[Diagnosis],
) -> String {
    format!(
        r#"<form method="post" action="{action}">
<label>Date <input type="date" name="date" value="{date}" required></label>
<label>Patient <select name="patient_id" required>{patient_options}</select></label>
<label>Diagnosis <select name="diagnosis_id" required>{diagnosis_options}</select></label>
<label>Read length <input type="number" step="any" name="read_length" value="{read_length}" required></label>
<label>Total length <input type="number" step="1" name="total_length" value="{total_length}" required></label>
<button type="submit">Save</button>
</form>"#,
        date = sample.map(|s| s.date.to_string()).unwrap_or_default(),
        patient_options = patient_options(patients, sample.map(|s| s.patient_id)),
        diagnosis_options = diagnosis_options(diagnoses, sample.map(|s| s.diagnosis_id)),
        read_length = sample.map(|s| s.read_length.to_string()).unwrap_or_default(),
        total_length = sample.map(|s| s.total_length.to_string()).unwrap_or_default(),
    )
}

/// Sample table plus an inline add form posting to `/samples/add`. Rows whose
/// patient or diagnosis no longer exists show the raw id marked as missing.
pub fn samples(samples: &[Sample], patients: &[Patient], diagnoses: &[Diagnosis]) -> String {
    let patients_by_id: HashMap<i32, &Patient> = patients.iter().map(|p| (p.id, p)).collect();
    let diagnoses_by_id: HashMap<i32, &Diagnosis> = diagnoses.iter().map(|d| (d.id, d)).collect();

    let mut body = String::from(
        r#"<p><a href="/samples/new">New sample</a></p>
<table>
<tr><th>Date</th><th>Patient</th><th>Diagnosis</th><th>Read length</th><th>Total length</th><th></th></tr>
"#,
    );
    for s in samples {
        let patient = match patients_by_id.get(&s.patient_id) {
            Some(p) => patient_label(p),
            None => format!(r#"<span class="missing">missing patient #{}</span>"#, s.patient_id),
        };
        let diagnosis = match diagnoses_by_id.get(&s.diagnosis_id) {
            Some(d) => diagnosis_label(d),
            None => format!(
                r#"<span class="missing">missing diagnosis #{}</span>"#,
                s.diagnosis_id
            ),
        };
        let _ = writeln!(
            body,
            r#"<tr><td>{date}</td><td>{patient}</td><td>{diagnosis}</td><td>{read}</td><td>{total}</td><td><a href="/samples/edit/{id}">Edit</a> <form class="inline" method="post" action="/samples/delete/{id}"><button type="submit">Delete</button></form></td></tr>"#,
            id = s.id,
            date = s.date,
            read = s.read_length,
            total = s.total_length,
        );
    }
    body.push_str("</table>\n<h2>Add sample</h2>\n");
    body.push_str(&sample_form("/samples/add", None, patients, diagnoses));
    layout("Samples", &body)
}

pub fn new_sample(patients: &[Patient], diagnoses: &[Diagnosis]) -> String {
    layout(
        "New sample",
        &sample_form("/samples/new", None, patients, diagnoses),
    )
}

pub fn edit_sample(sample: &Sample, patients: &[Patient], diagnoses: &[Diagnosis]) -> String {
    layout(
        "Edit sample",
        &sample_form(
            &format!("/samples/edit/{}", sample.id),
            Some(sample),
            patients,
            diagnoses,
        ),
    )
}
