pub mod auth;
pub mod batch;
pub mod classifier;
pub mod config;
pub mod department;
pub mod models;
pub mod router;
pub mod service;
pub mod validation;
pub mod workload;

pub use auth::{AuthError, OfficialAuthenticator, OfficialDirectory, OfficialRecord};
pub use classifier::{Classifier, KeywordClassifier};
pub use config::Config;
pub use department::Department;
pub use models::{ClassificationResult, ComplaintSubmission, LoginRequest};
pub use router::{Router, RoutingDecision, RoutingReason};
pub use service::{ComplaintService, Request, Response, ResponseStatus};
pub use validation::{InputValidator, ValidationErrors};
pub use workload::WorkloadStore;
