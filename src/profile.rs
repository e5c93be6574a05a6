//! Questionnaire profile and its validation.
//!
//! [`ProfileRequest`] is what arrives over the wire: every field optional,
//! age possibly sent as a string by HTML forms. [`ProfileRequest::validate`]
//! turns it into a [`Profile`] with the structurally required fields
//! present. Unknown tags (budget, occasion, personality, plan) are not
//! errors; the analyzer substitutes defaults for them.

use gift_search::Plan;
use serde::{Deserialize, Serialize};

use crate::error::{GiftError, Result};

/// Oldest age accepted from the questionnaire.
pub const MAX_AGE: i64 = 130;

/// Age as sent by clients: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgeField {
    Number(i64),
    Text(String),
}

/// Raw questionnaire answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileRequest {
    pub age: Option<AgeField>,
    pub gender: Option<String>,
    /// Comma-separated free text, e.g. `"leitura, música"`.
    pub interests: Option<String>,
    pub personality: Option<String>,
    pub budget: Option<String>,
    pub occasion: Option<String>,
    pub plan: Option<String>,
}

/// A validated questionnaire profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub age: u32,
    pub gender: String,
    pub interests: String,
    pub personality: String,
    pub budget: String,
    pub occasion: String,
    pub plan: Plan,
}

impl ProfileRequest {
    /// Check required fields and normalise the rest.
    ///
    /// # Errors
    ///
    /// Returns [`GiftError::InvalidProfile`] when `age` is missing, not a
    /// whole number, or out of range, or when `interests` is missing or
    /// contains no non-blank token.
    pub fn validate(&self) -> Result<Profile> {
        let age = match &self.age {
            None => return Err(GiftError::InvalidProfile("age is required".into())),
            Some(AgeField::Number(n)) => *n,
            Some(AgeField::Text(s)) => s.trim().parse::<i64>().map_err(|_| {
                GiftError::InvalidProfile(format!("age must be a whole number, got {s:?}"))
            })?,
        };
        if !(0..=MAX_AGE).contains(&age) {
            return Err(GiftError::InvalidProfile(format!(
                "age must be between 0 and {MAX_AGE}"
            )));
        }

        let interests = self
            .interests
            .as_deref()
            .ok_or_else(|| GiftError::InvalidProfile("interests is required".into()))?;
        if interests.split(',').all(|token| token.trim().is_empty()) {
            return Err(GiftError::InvalidProfile(
                "interests must name at least one interest".into(),
            ));
        }

        let tag = |value: &Option<String>| value.as_deref().unwrap_or_default().trim().to_owned();

        Ok(Profile {
            // Range-checked above.
            age: age as u32,
            gender: tag(&self.gender),
            interests: interests.to_owned(),
            personality: tag(&self.personality),
            budget: tag(&self.budget),
            occasion: tag(&self.occasion),
            plan: Plan::from_tag(self.plan.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ProfileRequest {
        ProfileRequest {
            age: Some(AgeField::Number(8)),
            gender: Some("feminino".into()),
            interests: Some("leitura".into()),
            personality: Some("intelectual".into()),
            budget: Some("ate-50".into()),
            occasion: Some("aniversario".into()),
            plan: Some("essential".into()),
        }
    }

    #[test]
    fn valid_request_passes() {
        let profile = request().validate().expect("valid");
        assert_eq!(profile.age, 8);
        assert_eq!(profile.interests, "leitura");
        assert_eq!(profile.plan, Plan::Essential);
    }

    #[test]
    fn missing_age_rejected() {
        let req = ProfileRequest {
            age: None,
            ..request()
        };
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("age is required"));
    }

    #[test]
    fn string_age_accepted() {
        let req = ProfileRequest {
            age: Some(AgeField::Text(" 42 ".into())),
            ..request()
        };
        assert_eq!(req.validate().expect("valid").age, 42);
    }

    #[test]
    fn non_numeric_age_rejected() {
        let req = ProfileRequest {
            age: Some(AgeField::Text("oito".into())),
            ..request()
        };
        assert!(matches!(req.validate(), Err(GiftError::InvalidProfile(_))));
    }

    #[test]
    fn negative_age_rejected() {
        let req = ProfileRequest {
            age: Some(AgeField::Number(-3)),
            ..request()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn missing_interests_rejected() {
        let req = ProfileRequest {
            interests: None,
            ..request()
        };
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("interests is required"));
    }

    #[test]
    fn blank_interests_rejected() {
        let req = ProfileRequest {
            interests: Some(" , ,".into()),
            ..request()
        };
        assert!(matches!(req.validate(), Err(GiftError::InvalidProfile(_))));
    }

    #[test]
    fn unknown_tags_are_not_errors() {
        let req = ProfileRequest {
            budget: Some("muito-caro".into()),
            occasion: Some("formatura".into()),
            personality: None,
            plan: Some("platinum".into()),
            ..request()
        };
        let profile = req.validate().expect("unknown tags fall back later");
        assert_eq!(profile.budget, "muito-caro");
        assert_eq!(profile.personality, "");
        assert_eq!(profile.plan, Plan::Essential);
    }

    #[test]
    fn deserializes_from_questionnaire_json() {
        let json = r#"{"age":"30","interests":"arte, viagem","plan":"supremo"}"#;
        let req: ProfileRequest = serde_json::from_str(json).expect("deserialize");
        let profile = req.validate().expect("valid");
        assert_eq!(profile.age, 30);
        assert_eq!(profile.plan, Plan::Supreme);
        assert_eq!(profile.budget, "");
    }
}
