use reqwest::Method;
use std::sync::Arc;

use crate::error::Result;
use crate::http::ApiClient;
use crate::models::{Doctor, Mapping, NewDoctor, NewMapping, NewPatient, Patient};

/// Remote-backed access to the patients collection.
///
/// Writes are fire-and-confirm: nothing here caches or mutates local
/// state, callers re-fetch the authoritative list after a confirmed write.
pub struct PatientRepository {
    api: Arc<ApiClient>,
}

impl PatientRepository {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Patient>> {
        self.api.get_json("patients/").await
    }

    /// Server-side filter by name. A blank query behaves exactly like
    /// `list()` rather than hitting the search endpoint.
    pub async fn search(&self, name: &str) -> Result<Vec<Patient>> {
        let name = name.trim();
        if name.is_empty() {
            return self.list().await;
        }
        self.api
            .get_json(&format!("patients/search/?name={}", urlencoding::encode(name)))
            .await
    }

    pub async fn create(&self, patient: &NewPatient) -> Result<()> {
        self.api.post("patients/create/", patient, true).await.map(|_| ())
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.api.delete(&format!("patients/{id}/")).await
    }
}

/// Remote-backed access to the doctors collection.
pub struct DoctorRepository {
    api: Arc<ApiClient>,
}

impl DoctorRepository {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Doctor>> {
        self.api.get_json("doctors/").await
    }

    pub async fn search(&self, name: &str) -> Result<Vec<Doctor>> {
        let name = name.trim();
        if name.is_empty() {
            return self.list().await;
        }
        self.api
            .get_json(&format!("doctors/search/?name={}", urlencoding::encode(name)))
            .await
    }

    pub async fn create(&self, doctor: &NewDoctor) -> Result<()> {
        self.api.post("doctors/create/", doctor, true).await.map(|_| ())
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.api.delete(&format!("doctors/{id}/")).await
    }
}

/// Remote-backed access to patient-doctor assignments.
pub struct MappingRepository {
    api: Arc<ApiClient>,
}

impl MappingRepository {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Mapping>> {
        self.api.get_json("mappings/").await
    }

    /// All doctors assigned to one patient.
    pub async fn for_patient(&self, patient_id: i64) -> Result<Vec<Mapping>> {
        self.api
            .get_json(&format!("mappings/patient/{patient_id}/"))
            .await
    }

    /// Both referenced records must already exist; the backend validates
    /// the pair and assigns the timestamp.
    pub async fn create(&self, mapping: &NewMapping) -> Result<()> {
        self.api.post("mappings/create/", mapping, true).await.map(|_| ())
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.api.delete(&format!("mappings/{id}/")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, User};
    use crate::session::{InMemorySessionStore, Session, SessionStore};
    use httpmock::prelude::*;
    use serde_json::json;

    async fn client(base_url: String) -> Arc<ApiClient> {
        let store = Arc::new(InMemorySessionStore::new());
        store
            .set(Session {
                token: "tok-123".to_string(),
                user: User {
                    id: 1,
                    name: "Admin".to_string(),
                    email: "admin@clinic.test".to_string(),
                },
            })
            .await;
        Arc::new(ApiClient::new(base_url, store))
    }

    fn patient_body(id: i64, first: &str, last: &str) -> serde_json::Value {
        json!({
            "id": id,
            "first_name": first,
            "last_name": last,
            "date_of_birth": "1990-06-15",
            "gender": "M",
            "phone_number": "555-0101",
            "address": "12 Main St",
            "medical_history": "asthma",
            "emergency_contact": "Pat Doe",
            "emergency_phone": "555-0102"
        })
    }

    #[tokio::test]
    async fn blank_search_behaves_like_list() {
        let server = MockServer::start_async().await;
        let list = server
            .mock_async(|when, then| {
                when.method(GET).path("/patients/");
                then.status(200).json_body(json!([patient_body(1, "John", "Doe")]));
            })
            .await;
        let search = server
            .mock_async(|when, then| {
                when.method(GET).path("/patients/search/");
                then.status(200).json_body(json!([]));
            })
            .await;

        let repo = PatientRepository::new(client(server.base_url()).await);
        let a = repo.search("").await.unwrap();
        let b = repo.search("   ").await.unwrap();
        let c = repo.list().await.unwrap();

        assert_eq!(a, c);
        assert_eq!(b, c);
        assert_eq!(list.hits_async().await, 3);
        assert_eq!(search.hits_async().await, 0);
    }

    #[tokio::test]
    async fn search_encodes_the_query() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/doctors/search/")
                    .query_param("name", "van der Berg");
                then.status(200).json_body(json!([]));
            })
            .await;

        let repo = DoctorRepository::new(client(server.base_url()).await);
        let doctors = repo.search("  van der Berg ").await.unwrap();

        assert!(doctors.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn create_posts_and_discards_the_echo() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/patients/create/")
                    .header("authorization", "Bearer tok-123")
                    .json_body_partial(r#"{"first_name": "John", "gender": "M"}"#);
                then.status(201).json_body(json!({"first_name": "John"}));
            })
            .await;

        let repo = PatientRepository::new(client(server.base_url()).await);
        repo.create(&crate::models::NewPatient {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            date_of_birth: chrono::NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
            gender: Gender::Male,
            phone_number: "555-0101".to_string(),
            address: "12 Main St".to_string(),
            medical_history: None,
            emergency_contact: "Pat Doe".to_string(),
            emergency_phone: "555-0102".to_string(),
        })
        .await
        .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn mappings_can_be_fetched_per_patient() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/mappings/patient/7/");
                then.status(200).json_body(json!([]));
            })
            .await;

        let repo = MappingRepository::new(client(server.base_url()).await);
        let mappings = repo.for_patient(7).await.unwrap();

        assert!(mappings.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn delete_targets_the_record_by_id() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/mappings/42/");
                then.status(204);
            })
            .await;

        let repo = MappingRepository::new(client(server.base_url()).await);
        repo.delete(42).await.unwrap();
        mock.assert_async().await;
    }
}
