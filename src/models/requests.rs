use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::Experience;

/// Request to create an account and its profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1))]
    pub display_name: String,
    #[validate(range(min = 18, max = 60))]
    pub age: u8,
    #[serde(default)]
    pub bio: String,
    #[validate(length(min = 1))]
    pub fight_style: String,
    #[serde(default)]
    pub experience: Experience,
    #[validate(range(min = 1))]
    pub weight: u16,
    #[validate(range(min = 1))]
    pub height: u16,
    #[validate(length(min = 1))]
    pub location: String,
}

/// Request to sign in with email and password
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Partial profile edit. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[validate(length(min = 1))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[validate(length(min = 1))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fight_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<Experience>,
    #[validate(range(min = 1))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u16>,
    #[validate(range(min = 1))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u16>,
    #[validate(length(min = 1))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Like/dislike on the current candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeRequest {
    pub liked: bool,
}

/// Fight date and place for a match.
///
/// Emptiness is checked by the lifecycle manager so that a blank form never
/// reaches the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    #[serde(default)]
    pub fight_date: String,
    #[serde(default)]
    pub location: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_up() -> SignUpRequest {
        SignUpRequest {
            email: "deniz@gym.test".to_string(),
            password: "hunter22".to_string(),
            display_name: "Deniz".to_string(),
            age: 24,
            bio: String::new(),
            fight_style: "Boxing".to_string(),
            experience: Experience::Beginner,
            weight: 70,
            height: 175,
            location: "Ankara".to_string(),
        }
    }

    #[test]
    fn test_sign_up_valid() {
        assert!(sign_up().validate().is_ok());
    }

    #[test]
    fn test_sign_up_rejects_underage() {
        let mut req = sign_up();
        req.age = 17;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_sign_up_password_needs_eight_characters() {
        let mut req = sign_up();
        req.password = "seven77".to_string();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));

        req.password = "eight888".to_string();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_sign_up_rejects_zero_weight_and_bad_email() {
        let mut req = sign_up();
        req.weight = 0;
        req.email = "not-an-email".to_string();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("weight"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn test_profile_update_serializes_only_present_fields() {
        let update = ProfileUpdate {
            bio: Some("Southpaw".to_string()),
            weight: Some(68),
            ..Default::default()
        };
        let value = serde_json::to_value(&update).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["bio"], "Southpaw");
        assert_eq!(obj["weight"], 68);
    }

    #[test]
    fn test_profile_update_rejects_blank_name() {
        let update = ProfileUpdate {
            display_name: Some(String::new()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
