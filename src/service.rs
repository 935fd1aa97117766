//! Request orchestration: validate, classify, route, respond.
//!
//! Responses carry a `ResponseStatus` so any transport can pick its own
//! status codes; the JSON bodies match what citizen and official clients
//! already parse.

use crate::auth::{AuthError, OfficialAuthenticator};
use crate::classifier::{Classifier, KeywordClassifier};
use crate::config::{Config, TrackingConfig, TrackingScheme};
use crate::department::Department;
use crate::models::{ComplaintSubmission, LoginRequest};
use crate::router::Router;
use crate::validation::{InputValidator, ValidationErrors};
use crate::workload::WorkloadStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

pub const STATUS_UNDER_REVIEW: &str = "Under Review";
const VALIDATION_FAILED_MESSAGE: &str = "One or more input fields failed server validation.";
const INTERNAL_ERROR_MESSAGE: &str = "Server Error: unable to process complaint.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Ok,
    BadRequest,
    Unauthorized,
    InternalError,
}

impl ResponseStatus {
    pub fn http_code(&self) -> u16 {
        match self {
            ResponseStatus::Ok => 200,
            ResponseStatus::BadRequest => 400,
            ResponseStatus::Unauthorized => 401,
            ResponseStatus::InternalError => 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SubmitResponse {
    Accepted {
        success: bool,
        tracking_id: String,
        status: String,
        assigned_to: String,
        priority: u8,
    },
    Rejected {
        success: bool,
        message: String,
        errors: ValidationErrors,
    },
    Failed {
        success: bool,
        message: String,
    },
}

impl SubmitResponse {
    pub fn status(&self) -> ResponseStatus {
        match self {
            SubmitResponse::Accepted { .. } => ResponseStatus::Ok,
            SubmitResponse::Rejected { .. } => ResponseStatus::BadRequest,
            SubmitResponse::Failed { .. } => ResponseStatus::InternalError,
        }
    }

    fn failed() -> Self {
        SubmitResponse::Failed {
            success: false,
            message: INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LoginResponse {
    Success {
        success: bool,
        message: String,
        token: String,
        department: Department,
        official_name: String,
    },
    Failure {
        success: bool,
        message: String,
        #[serde(skip)]
        error: AuthError,
    },
}

impl LoginResponse {
    pub fn status(&self) -> ResponseStatus {
        match self {
            LoginResponse::Success { .. } => ResponseStatus::Ok,
            LoginResponse::Failure {
                error: AuthError::MissingFields,
                ..
            } => ResponseStatus::BadRequest,
            LoginResponse::Failure { .. } => ResponseStatus::Unauthorized,
        }
    }
}

/// One line of a batch file.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Submit(ComplaintSubmission),
    Login(LoginRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Submit(SubmitResponse),
    Login(LoginResponse),
}

impl Response {
    pub fn status(&self) -> ResponseStatus {
        match self {
            Response::Submit(r) => r.status(),
            Response::Login(r) => r.status(),
        }
    }
}

pub struct TrackingIds {
    prefix: String,
    scheme: TrackingScheme,
}

impl TrackingIds {
    pub fn new(config: &TrackingConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            scheme: config.scheme,
        }
    }

    pub fn next_id(&self) -> String {
        match self.scheme {
            TrackingScheme::Clock => {
                let millis = chrono::Utc::now().timestamp_millis();
                format!("{}-{}", self.prefix, millis.rem_euclid(1_000_000))
            }
            TrackingScheme::Uuid => {
                format!("{}-{}", self.prefix, uuid::Uuid::new_v4().simple())
            }
        }
    }
}

pub struct ComplaintService {
    validator: InputValidator,
    classifier: Box<dyn Classifier>,
    router: Router,
    workloads: Arc<WorkloadStore>,
    authenticator: OfficialAuthenticator,
    tracking: TrackingIds,
}

impl ComplaintService {
    pub fn from_config(config: &Config) -> Self {
        Self::with_classifier(
            config,
            Box::new(KeywordClassifier::new(config.classification.clone())),
        )
    }

    pub fn with_classifier(config: &Config, classifier: Box<dyn Classifier>) -> Self {
        let workloads = Arc::new(WorkloadStore::new(config.routing.officers.clone()));
        Self {
            validator: InputValidator::new(),
            classifier,
            router: Router::new(&config.routing, Arc::clone(&workloads)),
            workloads,
            authenticator: OfficialAuthenticator::with_records(config.officials.clone()),
            tracking: TrackingIds::new(&config.tracking),
        }
    }

    pub fn with_authenticator(mut self, authenticator: OfficialAuthenticator) -> Self {
        self.authenticator = authenticator;
        self
    }

    pub fn submit(&self, submission: &ComplaintSubmission) -> SubmitResponse {
        let errors = self.validator.validate(submission);
        if !errors.is_empty() {
            log::warn!("Validation failed for citizen submission: {:?}", errors);
            return SubmitResponse::Rejected {
                success: false,
                message: VALIDATION_FAILED_MESSAGE.to_string(),
                errors,
            };
        }

        // A fault in a pluggable classifier must only fail this request
        match panic::catch_unwind(AssertUnwindSafe(|| self.process(submission))) {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                log::error!("Error processing complaint: {e:#}");
                SubmitResponse::failed()
            }
            Err(payload) => {
                let detail = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                log::error!("Error processing complaint: panic: {detail}");
                SubmitResponse::failed()
            }
        }
    }

    fn process(&self, submission: &ComplaintSubmission) -> anyhow::Result<SubmitResponse> {
        let tracking_id = self.tracking.next_id();

        let classification = self
            .classifier
            .classify(&submission.description, &submission.category);

        let decision = self
            .router
            .route(&classification.refined_category, classification.priority_score)?;

        log::info!(
            "New Complaint [{}] | P={} | Assigned to {}{}",
            tracking_id,
            classification.priority_score,
            decision.assignee,
            if decision.is_manager() { " (manager)" } else { "" }
        );

        Ok(SubmitResponse::Accepted {
            success: true,
            tracking_id,
            status: STATUS_UNDER_REVIEW.to_string(),
            assigned_to: decision.assignee,
            priority: classification.priority_score,
        })
    }

    pub fn login(&self, request: &LoginRequest) -> LoginResponse {
        let result = self.authenticator.login(
            request.username.as_deref(),
            request.password.as_deref(),
            request.govt_id.as_deref(),
        );

        match result {
            Ok(success) => LoginResponse::Success {
                success: true,
                message: "Login successful.".to_string(),
                token: success.token,
                department: success.department,
                official_name: success.official_name,
            },
            Err(error) => LoginResponse::Failure {
                success: false,
                message: error.public_message().to_string(),
                error,
            },
        }
    }

    pub fn handle(&self, request: &Request) -> Response {
        match request {
            Request::Submit(submission) => Response::Submit(self.submit(submission)),
            Request::Login(login) => Response::Login(self.login(login)),
        }
    }

    pub fn workloads(&self) -> anyhow::Result<BTreeMap<String, u32>> {
        self.workloads.snapshot()
    }

    pub fn total_load(&self) -> anyhow::Result<u64> {
        self.workloads.total_load()
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Jitter;
    use crate::models::ClassificationResult;

    fn service_with_jitter(jitter: u8) -> ComplaintService {
        let config = Config::default();
        ComplaintService::with_classifier(
            &config,
            Box::new(KeywordClassifier::with_jitter(
                config.classification.clone(),
                Jitter::Fixed(jitter),
            )),
        )
    }

    fn valid_submission(description: &str, category: &str) -> ComplaintSubmission {
        ComplaintSubmission {
            description: description.to_string(),
            category: category.to_string(),
            phone: "9876543210".to_string(),
            public_id: "AB12345678".to_string(),
            email: "a@b.com".to_string(),
            location_coords: "N/A".to_string(),
        }
    }

    fn tracking_suffix(tracking_id: &str) -> u32 {
        tracking_id
            .strip_prefix("GRV-")
            .expect("GRV prefix")
            .parse()
            .expect("numeric suffix")
    }

    #[test]
    fn test_end_to_end_pothole_flooding() {
        let service = ComplaintService::from_config(&Config::default());
        let before = service.workloads().unwrap();
        let submission = valid_submission("Major pothole causing dangerous flooding", "Road Maintenance");

        let response = service.submit(&submission);
        assert_eq!(response.status(), ResponseStatus::Ok);
        match response {
            SubmitResponse::Accepted {
                success,
                tracking_id,
                status,
                assigned_to,
                priority,
            } => {
                assert!(success);
                assert!(tracking_suffix(&tracking_id) < 1_000_000);
                assert_eq!(status, "Under Review");
                assert!((7..=9).contains(&priority));
                assert_eq!(assigned_to, "General_Admin_Dept_Manager");
            }
            other => panic!("expected acceptance, got {:?}", other),
        }
        assert_eq!(service.workloads().unwrap(), before);
    }

    #[test]
    fn test_validation_failure_skips_routing() {
        let service = service_with_jitter(0);
        let before = service.workloads().unwrap();
        let mut submission = valid_submission("Low pressure", "Water Supply");
        submission.phone = "12345".to_string();

        let response = service.submit(&submission);
        assert_eq!(response.status(), ResponseStatus::BadRequest);
        assert_eq!(response.status().http_code(), 400);
        match &response {
            SubmitResponse::Rejected { success, errors, .. } => {
                assert!(!success);
                assert_eq!(errors.len(), 1);
                assert!(errors.contains_key("phone"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(service.workloads().unwrap(), before);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["errors"]["phone"], "Phone number must be exactly 10 digits.");
    }

    #[test]
    fn test_water_supply_load_balanced() {
        let service = service_with_jitter(0);
        let response = service.submit(&valid_submission("Low pressure in the evenings", "Water Supply"));
        match response {
            SubmitResponse::Accepted {
                assigned_to,
                priority,
                ..
            } => {
                assert_eq!(assigned_to, "Officer_B_Water");
                assert_eq!(priority, 3);
            }
            other => panic!("expected acceptance, got {:?}", other),
        }
        let loads = service.workloads().unwrap();
        assert_eq!(loads["Officer_B_Water"], 6);
        assert_eq!(loads["Officer_A_Water"], 12);
    }

    #[test]
    fn test_urgent_water_supply_escalates() {
        let service = service_with_jitter(1);
        let before = service.workloads().unwrap();
        // 3 + 1 + 2 * 2 = 8
        let response = service.submit(&valid_submission("Urgent: dangerous pipe burst", "Water Supply"));
        match response {
            SubmitResponse::Accepted { assigned_to, priority, .. } => {
                assert_eq!(priority, 8);
                assert_eq!(assigned_to, "Water_Supply_Dept_Manager");
            }
            other => panic!("expected acceptance, got {:?}", other),
        }
        assert_eq!(service.workloads().unwrap(), before);
    }

    #[test]
    fn test_accepted_json_shape() {
        let service = service_with_jitter(0);
        let response = service.submit(&valid_submission("Low pressure", "Water Supply"));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["status"], "Under Review");
        assert_eq!(json["assigned_to"], "Officer_B_Water");
        assert_eq!(json["priority"], 3);
        assert!(json["tracking_id"].as_str().unwrap().starts_with("GRV-"));
    }

    struct PanickingClassifier;

    impl Classifier for PanickingClassifier {
        fn classify(&self, _description: &str, _declared: &str) -> ClassificationResult {
            panic!("model unavailable");
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    #[test]
    fn test_classifier_panic_is_isolated() {
        let service =
            ComplaintService::with_classifier(&Config::default(), Box::new(PanickingClassifier));
        let before = service.workloads().unwrap();

        let response = service.submit(&valid_submission("Low pressure", "Water Supply"));
        assert_eq!(response.status(), ResponseStatus::InternalError);
        match &response {
            SubmitResponse::Failed { message, .. } => {
                assert!(!message.contains("model unavailable"));
            }
            other => panic!("expected failure, got {:?}", other),
        }

        // Store remains usable after the failed request
        assert_eq!(service.workloads().unwrap(), before);
        assert_eq!(service.classifier_name(), "panicking");
    }

    #[test]
    fn test_login_statuses() {
        let service = service_with_jitter(0);
        let ok = service.login(&LoginRequest {
            username: Some("john.doe@gov.in".to_string()),
            password: Some("doe".to_string()),
            govt_id: Some("GOV1001A".to_string()),
        });
        assert_eq!(ok.status(), ResponseStatus::Ok);
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["department"], "Water_Supply_Dept");
        assert_eq!(json["official_name"], "John Doe");
        assert!(json["token"].as_str().unwrap().starts_with("JWT.Water_Supply_Dept."));

        let missing = service.login(&LoginRequest {
            username: Some("john.doe@gov.in".to_string()),
            password: None,
            govt_id: Some("GOV1001A".to_string()),
        });
        assert_eq!(missing.status(), ResponseStatus::BadRequest);

        let mismatch = service.login(&LoginRequest {
            username: Some("john.doe@gov.in".to_string()),
            password: Some("doe".to_string()),
            govt_id: Some("GOV9999Z".to_string()),
        });
        assert_eq!(mismatch.status(), ResponseStatus::Unauthorized);
        let json = serde_json::to_value(&mismatch).unwrap();
        assert_eq!(json["message"], "Authentication failed: Unique Government ID mismatch.");
        assert!(json.get("error").is_none());

        let unknown = service.login(&LoginRequest {
            username: Some("nobody@gov.in".to_string()),
            password: Some("nobody".to_string()),
            govt_id: Some("GOV1001A".to_string()),
        });
        assert_eq!(unknown.status().http_code(), 401);
    }

    #[test]
    fn test_custom_authenticator() {
        let service = service_with_jitter(0).with_authenticator(OfficialAuthenticator::with_records(vec![]));
        let response = service.login(&LoginRequest {
            username: Some("john.doe@gov.in".to_string()),
            password: Some("doe".to_string()),
            govt_id: Some("GOV1001A".to_string()),
        });
        assert_eq!(response.status(), ResponseStatus::Unauthorized);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["message"], "Authentication failed: Invalid credentials.");
    }

    #[test]
    fn test_request_dispatch() {
        let service = service_with_jitter(0);
        let request: Request = serde_json::from_str(
            r#"{"op": "submit", "description": "Low pressure", "category": "Water Supply",
                "phone": "9876543210", "public_id": "AB12345678", "email": "a@b.com"}"#,
        )
        .unwrap();
        assert_eq!(service.handle(&request).status(), ResponseStatus::Ok);

        let request: Request =
            serde_json::from_str(r#"{"op": "login", "username": "john.doe@gov.in"}"#).unwrap();
        assert_eq!(service.handle(&request).status(), ResponseStatus::BadRequest);
    }

    #[test]
    fn test_uuid_tracking_ids_are_unique() {
        let ids = TrackingIds::new(&TrackingConfig {
            prefix: "CMP".to_string(),
            scheme: TrackingScheme::Uuid,
        });
        let a = ids.next_id();
        let b = ids.next_id();
        assert!(a.starts_with("CMP-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_total_load_tracks_officer_assignments() {
        let service = service_with_jitter(0);
        // 12 + 5 + 9 + 15
        assert_eq!(service.total_load().unwrap(), 41);

        service.submit(&valid_submission("Low pressure", "Water Supply"));
        assert_eq!(service.total_load().unwrap(), 42);

        // Manager routes leave the officer table alone
        service.submit(&valid_submission("Streetlight out", "Electricity"));
        assert_eq!(service.total_load().unwrap(), 42);
    }

    #[test]
    fn test_concurrent_submissions_count_exactly() {
        let service = Arc::new(service_with_jitter(0));
        let before = service.total_load().unwrap();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let service = Arc::clone(&service);
                scope.spawn(move || {
                    for _ in 0..25 {
                        let response = service.submit(&valid_submission("Low pressure", "Drainage"));
                        assert_eq!(response.status(), ResponseStatus::Ok);
                    }
                });
            }
        });

        assert_eq!(service.total_load().unwrap(), before + 200);
        let after = service.workloads().unwrap();
        assert_eq!(after["Officer_C_Roads"], 9);
        assert_eq!(after["Officer_D_Roads"], 15);
    }
}
