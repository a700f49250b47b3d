use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;

pub struct TestConfig {
    pub scheduling_api_url: String,
    pub scheduling_api_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            scheduling_api_url: "http://localhost:4010".to_string(),
            scheduling_api_key: "test-api-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Config pointing at a wiremock server.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            scheduling_api_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            scheduling_api_url: self.scheduling_api_url.clone(),
            scheduling_api_key: self.scheduling_api_key.clone(),
            request_timeout_secs: 5,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// Canned scheduling-service response bodies for wiremock tests.
pub struct MockSchedulingResponses;

impl MockSchedulingResponses {
    pub fn paginated(items: Vec<Value>) -> Value {
        let total = items.len();
        json!({
            "items": items,
            "meta": {
                "page": 1,
                "limit": 50,
                "total": total,
                "has_next": false,
                "has_prev": false,
                "total_pages": 1
            }
        })
    }

    pub fn envelope(data: Value) -> Value {
        json!({
            "success": true,
            "message": "ok",
            "data": data
        })
    }

    pub fn rejection(message: &str) -> Value {
        json!({
            "success": false,
            "message": message,
            "data": null
        })
    }

    pub fn location(id: &str, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "address": format!("12 Harbour Road, {}", name),
            "phone": "+353 1 555 0199",
            "timezone": "Europe/Dublin",
            "map_url": null
        })
    }

    pub fn specialty(id: &str, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "slug": name.to_lowercase().replace(' ', "-")
        })
    }

    pub fn doctor(id: &str, full_name: &str, specialty: Value, location: Value) -> Value {
        json!({
            "id": id,
            "full_name": full_name,
            "is_male": true,
            "degree": "MB BCh BAO",
            "avatar_url": null,
            "slot_duration_minutes": 30,
            "specialties": [specialty],
            "work_locations": [location]
        })
    }

    pub fn time_slot(time_start: &str, time_end: &str) -> Value {
        json!({
            "time_start": time_start,
            "time_end": time_end
        })
    }

    pub fn patient(id: &str, full_name: &str, email: &str) -> Value {
        json!({
            "id": id,
            "full_name": full_name,
            "email": email,
            "phone": "+353 85 555 0101",
            "is_male": false,
            "date_of_birth": "1990-01-01",
            "address_line": "4 Chapel Lane",
            "district": "Rathmines",
            "province": "Dublin"
        })
    }

    pub fn fresh_id() -> String {
        Uuid::new_v4().to_string()
    }
}
