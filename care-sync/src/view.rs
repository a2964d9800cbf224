//! Pure view-model construction.
//!
//! Every function here is a deterministic mapping from domain records to a
//! display representation, independent of rendering order and of whatever
//! finally draws it (terminal, TUI, templating).

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{Doctor, Mapping, Patient};

pub const NO_PATIENTS: &str = "No patients found.";
pub const NO_DOCTORS: &str = "No doctors found.";
pub const NO_MAPPINGS: &str = "No mappings found.";

/// A rendered list. Empty input renders a placeholder, never an empty
/// container.
#[derive(Debug, Clone, PartialEq)]
pub enum ListView<T> {
    Empty { placeholder: &'static str },
    Rows(Vec<T>),
}

impl<T> ListView<T> {
    pub fn len(&self) -> usize {
        match self {
            ListView::Empty { .. } => 0,
            ListView::Rows(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rows(&self) -> &[T] {
        match self {
            ListView::Empty { .. } => &[],
            ListView::Rows(rows) => rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatientView {
    pub id: i64,
    pub full_name: String,
    pub gender: &'static str,
    pub date_of_birth: String,
    pub phone_number: String,
    pub address: String,
    pub medical_history: Option<String>,
    pub emergency_contact: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoctorView {
    pub id: i64,
    pub full_name: String,
    pub specialization: &'static str,
    pub license_number: String,
    pub phone_number: String,
    pub email: String,
    pub experience: String,
    pub availability: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappingView {
    pub id: i64,
    pub patient_name: String,
    pub doctor_name: String,
    pub assigned_date: String,
    pub notes: Option<String>,
}

/// Dashboard tile values. Only ever replaced wholesale, once all three
/// collection fetches of a refresh have resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardCounts {
    pub patients: usize,
    pub doctors: usize,
    pub mappings: usize,
    pub users: usize,
}

pub fn patient_views(patients: &[Patient]) -> ListView<PatientView> {
    if patients.is_empty() {
        return ListView::Empty { placeholder: NO_PATIENTS };
    }
    ListView::Rows(patients.iter().map(patient_view).collect())
}

fn patient_view(patient: &Patient) -> PatientView {
    PatientView {
        id: patient.id,
        full_name: patient.full_name(),
        gender: patient.gender.label(),
        date_of_birth: format_date(patient.date_of_birth),
        phone_number: patient.phone_number.clone(),
        address: patient.address.clone(),
        medical_history: patient.medical_history.clone(),
        emergency_contact: format!("{} ({})", patient.emergency_contact, patient.emergency_phone),
    }
}

pub fn doctor_views(doctors: &[Doctor]) -> ListView<DoctorView> {
    if doctors.is_empty() {
        return ListView::Empty { placeholder: NO_DOCTORS };
    }
    ListView::Rows(doctors.iter().map(doctor_view).collect())
}

fn doctor_view(doctor: &Doctor) -> DoctorView {
    DoctorView {
        id: doctor.id,
        full_name: doctor.full_name(),
        specialization: doctor.specialization.label(),
        license_number: doctor.license_number.clone(),
        phone_number: doctor.phone_number.clone(),
        email: doctor.email.clone(),
        experience: format!("{} years experience", doctor.experience_years),
        availability: if doctor.is_available { "Available" } else { "Unavailable" },
    }
}

pub fn mapping_views(mappings: &[Mapping]) -> ListView<MappingView> {
    if mappings.is_empty() {
        return ListView::Empty { placeholder: NO_MAPPINGS };
    }
    ListView::Rows(mappings.iter().map(mapping_view).collect())
}

fn mapping_view(mapping: &Mapping) -> MappingView {
    MappingView {
        id: mapping.id,
        patient_name: mapping.patient.full_name(),
        doctor_name: mapping.doctor.full_name(),
        assigned_date: format_datetime(mapping.assigned_date),
        notes: mapping.notes.clone(),
    }
}

/// Human-readable date, e.g. `Mar 4, 1987`. Raw ISO strings never reach a
/// rendered view.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Server timestamps render as their date part only.
pub fn format_datetime(timestamp: DateTime<Utc>) -> String {
    format_date(timestamp.date_naive())
}
