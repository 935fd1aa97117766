//! Server-side checks on citizen contact fields.
//!
//! Every rule runs on every call; errors accumulate per field rather than
//! stopping at the first failure.

use crate::models::ComplaintSubmission;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

/// Field name -> human readable reason. Empty means the submission is acceptable.
pub type ValidationErrors = BTreeMap<String, String>;

lazy_static! {
    static ref PHONE_PATTERN: Regex = Regex::new(r"^[0-9]{10}$").expect("valid phone pattern");
    static ref PUBLIC_ID_PATTERN: Regex =
        Regex::new(r"^[0-9A-Z]{10,12}$").expect("valid public id pattern");
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("valid email pattern");
}

pub const PHONE_MESSAGE: &str = "Phone number must be exactly 10 digits.";
pub const PUBLIC_ID_MESSAGE: &str = "Public ID must be 10 to 12 alphanumeric characters.";
pub const EMAIL_MESSAGE: &str = "Invalid email format.";

pub struct InputValidator;

impl Default for InputValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl InputValidator {
    pub fn new() -> Self {
        InputValidator
    }

    pub fn validate(&self, submission: &ComplaintSubmission) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        if !Self::is_valid_phone(&submission.phone) {
            errors.insert("phone".to_string(), PHONE_MESSAGE.to_string());
        }

        if !Self::is_valid_public_id(&submission.public_id) {
            errors.insert("public_id".to_string(), PUBLIC_ID_MESSAGE.to_string());
        }

        if !Self::is_valid_email(&submission.email) {
            errors.insert("email".to_string(), EMAIL_MESSAGE.to_string());
        }

        errors
    }

    pub fn is_valid_phone(phone: &str) -> bool {
        PHONE_PATTERN.is_match(phone)
    }

    pub fn is_valid_public_id(public_id: &str) -> bool {
        PUBLIC_ID_PATTERN.is_match(public_id)
    }

    pub fn is_valid_email(email: &str) -> bool {
        EMAIL_PATTERN.is_match(email)
    }
}
