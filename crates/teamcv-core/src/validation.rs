//! Field-level checks for the add/edit team member form

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

use crate::model::MemberInput;

pub const FULL_NAME_REQUIRED: &str = "Full name is required";
pub const ROLE_REQUIRED: &str = "Role is required";
pub const INVALID_EMAIL: &str = "Enter a valid email";

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"))
}

/// Raw form values as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberForm {
    pub full_name: String,
    pub role: String,
    pub email: String,
    pub avatar_url: String,
}

/// One message per failing field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("team member form has invalid fields")]
pub struct FieldErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'static str>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.role.is_none() && self.email.is_none()
    }

    pub fn code(&self) -> &'static str {
        "VALIDATION_ERROR"
    }
}

impl MemberForm {
    /// Trim, check and convert into a store input
    pub fn validate(&self) -> Result<MemberInput, FieldErrors> {
        let full_name = self.full_name.trim();
        let role = self.role.trim();
        let email = self.email.trim();
        let avatar_url = self.avatar_url.trim();

        let mut errors = FieldErrors::default();
        if full_name.is_empty() {
            errors.full_name = Some(FULL_NAME_REQUIRED);
        }
        if role.is_empty() {
            errors.role = Some(ROLE_REQUIRED);
        }
        if !email.is_empty() && !email_pattern().is_match(email) {
            errors.email = Some(INVALID_EMAIL);
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(MemberInput {
            full_name: full_name.to_string(),
            role: role.to_string(),
            email: email.to_string(),
            avatar_url: (!avatar_url.is_empty()).then(|| avatar_url.to_string()),
            resume_ids: Vec::new(),
        })
    }
}
