use serde::{Deserialize, Serialize};

pub const DEFAULT_RESUME_KEY: &str = "resume-store";
pub const DEFAULT_TEAM_KEY: &str = "team-store";
pub const DEFAULT_ONBOARDING_KEY: &str = "onboarding-store";

/// Storage keys and tunables shared by the store and the onboarding flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    /// Key of the resume collection blob
    pub resume_key: String,
    /// Key of the team member collection blob
    pub team_key: String,
    /// Key of the onboarding completion flag
    pub onboarding_key: String,
    /// Default size of the "recent resumes" view
    pub recent_limit: usize,
    /// Delay before the welcome prompt appears for first-time users
    pub welcome_delay_ms: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            resume_key: DEFAULT_RESUME_KEY.to_string(),
            team_key: DEFAULT_TEAM_KEY.to_string(),
            onboarding_key: DEFAULT_ONBOARDING_KEY.to_string(),
            recent_limit: 5,
            welcome_delay_ms: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let config: StoreConfig = serde_json::from_str(r#"{"resumeKey":"cv"}"#).unwrap();
        assert_eq!(config.resume_key, "cv");
        assert_eq!(config.team_key, DEFAULT_TEAM_KEY);
        assert_eq!(config.welcome_delay_ms, 1000);
    }
}
