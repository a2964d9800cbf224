use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated account profile, as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
}

impl Gender {
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

/// Medical specializations, coded on the wire the way the backend stores
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Specialization {
    #[serde(rename = "CAR")]
    Cardiology,
    #[serde(rename = "DER")]
    Dermatology,
    #[serde(rename = "END")]
    Endocrinology,
    #[serde(rename = "GAST")]
    Gastroenterology,
    #[serde(rename = "NEU")]
    Neurology,
    #[serde(rename = "ONC")]
    Oncology,
    #[serde(rename = "ORT")]
    Orthopedics,
    #[serde(rename = "PED")]
    Pediatrics,
    #[serde(rename = "PSY")]
    Psychiatry,
    #[serde(rename = "RAD")]
    Radiology,
    #[serde(rename = "SUR")]
    Surgery,
    #[serde(rename = "GEN")]
    GeneralMedicine,
}

impl Specialization {
    pub fn label(&self) -> &'static str {
        match self {
            Specialization::Cardiology => "Cardiology",
            Specialization::Dermatology => "Dermatology",
            Specialization::Endocrinology => "Endocrinology",
            Specialization::Gastroenterology => "Gastroenterology",
            Specialization::Neurology => "Neurology",
            Specialization::Oncology => "Oncology",
            Specialization::Orthopedics => "Orthopedics",
            Specialization::Pediatrics => "Pediatrics",
            Specialization::Psychiatry => "Psychiatry",
            Specialization::Radiology => "Radiology",
            Specialization::Surgery => "Surgery",
            Specialization::GeneralMedicine => "General Medicine",
        }
    }

    /// Parse the backend's specialization code (case-insensitive).
    pub fn from_code(code: &str) -> Option<Self> {
        let spec = match code.to_ascii_uppercase().as_str() {
            "CAR" => Specialization::Cardiology,
            "DER" => Specialization::Dermatology,
            "END" => Specialization::Endocrinology,
            "GAST" => Specialization::Gastroenterology,
            "NEU" => Specialization::Neurology,
            "ONC" => Specialization::Oncology,
            "ORT" => Specialization::Orthopedics,
            "PED" => Specialization::Pediatrics,
            "PSY" => Specialization::Psychiatry,
            "RAD" => Specialization::Radiology,
            "SUR" => Specialization::Surgery,
            "GEN" => Specialization::GeneralMedicine,
            _ => return None,
        };
        Some(spec)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub phone_number: String,
    pub address: String,
    #[serde(default)]
    pub medical_history: Option<String>,
    pub emergency_contact: String,
    pub emergency_phone: String,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Fields accepted by `POST /patients/create/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub phone_number: String,
    pub address: String,
    #[serde(default)]
    pub medical_history: Option<String>,
    pub emergency_contact: String,
    pub emergency_phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub specialization: Specialization,
    pub license_number: String,
    pub phone_number: String,
    pub email: String,
    pub experience_years: u32,
    pub gender: Gender,
    pub address: String,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("Dr. {} {}", self.first_name, self.last_name)
    }
}

/// Fields accepted by `POST /doctors/create/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDoctor {
    pub first_name: String,
    pub last_name: String,
    pub specialization: Specialization,
    pub license_number: String,
    pub phone_number: String,
    pub email: String,
    pub experience_years: u32,
    pub gender: Gender,
    pub address: String,
}

/// A patient-doctor assignment. The backend embeds both referenced records
/// in list responses, so a rendered mapping never needs extra lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mapping {
    pub id: i64,
    pub patient: Patient,
    pub doctor: Doctor,
    pub assigned_date: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Fields accepted by `POST /mappings/create/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMapping {
    pub patient_id: i64,
    pub doctor_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password2: String,
    pub tc: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tokens {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Body of a successful `POST /auth/login/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub tokens: Tokens,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patient_deserializes_from_wire_format() {
        let patient: Patient = serde_json::from_value(json!({
            "id": 7,
            "user": {"id": 1, "email": "admin@clinic.test", "name": "Admin", "tc": true},
            "first_name": "Maria",
            "last_name": "Santos",
            "date_of_birth": "1987-03-04",
            "gender": "F",
            "phone_number": "555-0101",
            "address": "12 Main St",
            "medical_history": null,
            "emergency_contact": "Jo Santos",
            "emergency_phone": "555-0102",
            "full_name": "Maria Santos",
            "created_at": "2024-01-10T08:00:00Z",
            "updated_at": "2024-01-10T08:00:00Z"
        }))
        .unwrap();

        assert_eq!(patient.full_name(), "Maria Santos");
        assert_eq!(patient.gender, Gender::Female);
        assert_eq!(patient.medical_history, None);
    }

    #[test]
    fn specialization_codes_round_trip() {
        for code in [
            "CAR", "DER", "END", "GAST", "NEU", "ONC", "ORT", "PED", "PSY", "RAD", "SUR", "GEN",
        ] {
            let spec = Specialization::from_code(code).unwrap();
            let wire = serde_json::to_value(spec).unwrap();
            assert_eq!(wire, json!(code));
        }
        assert_eq!(Specialization::from_code("gen"), Some(Specialization::GeneralMedicine));
        assert_eq!(Specialization::from_code("XXX"), None);
    }

    #[test]
    fn new_mapping_omits_absent_notes() {
        let body = serde_json::to_value(NewMapping {
            patient_id: 1,
            doctor_id: 2,
            notes: None,
        })
        .unwrap();
        assert_eq!(body, json!({"patient_id": 1, "doctor_id": 2}));
    }
}
