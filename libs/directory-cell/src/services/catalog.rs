use reqwest::Method;
use tracing::debug;

use shared_config::AppConfig;
use shared_gateway::SchedulingClient;
use shared_models::api::Paginated;

use crate::models::{DirectoryError, Doctor, DoctorListQuery, Specialty, WorkLocation};

/// Read-only queries against the scheduling service's reference data.
pub struct CatalogService {
    gateway: SchedulingClient,
}

impl CatalogService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            gateway: SchedulingClient::new(config),
        }
    }

    pub async fn list_locations(
        &self,
        sort: Option<&str>,
    ) -> Result<Paginated<WorkLocation>, DirectoryError> {
        debug!("Fetching work locations");

        let path = match sort {
            Some(sort) => format!("/api/v1/locations?sort={}", sort),
            None => "/api/v1/locations".to_string(),
        };

        self.gateway
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DirectoryError::ServiceUnavailable(e.to_string()))
    }

    pub async fn list_specialties(&self) -> Result<Paginated<Specialty>, DirectoryError> {
        debug!("Fetching specialties");

        self.gateway
            .request(Method::GET, "/api/v1/specialties", None)
            .await
            .map_err(|e| DirectoryError::ServiceUnavailable(e.to_string()))
    }

    /// List doctors, optionally narrowed to specialties/locations/search text.
    pub async fn list_doctors(
        &self,
        query: &DoctorListQuery,
    ) -> Result<Paginated<Doctor>, DirectoryError> {
        debug!("Searching doctors with filters: {:?}", query);

        let mut query_parts = vec![
            format!("page={}", query.page),
            format!("limit={}", query.limit),
        ];

        if let Some(ref sort) = query.sort {
            query_parts.push(format!("sort={}", sort));
        }
        if !query.specialty_ids.is_empty() {
            query_parts.push(format!("specialty_ids={}", query.specialty_ids.join(",")));
        }
        if !query.work_location_ids.is_empty() {
            query_parts.push(format!(
                "work_location_ids={}",
                query.work_location_ids.join(",")
            ));
        }
        if let Some(ref search) = query.search {
            query_parts.push(format!("search={}", urlencoding::encode(search)));
        }

        let path = format!("/api/v1/doctors?{}", query_parts.join("&"));

        self.gateway
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DirectoryError::ServiceUnavailable(e.to_string()))
    }
}
