//! Contact form endpoint
//!
//! Accepts a submission as JSON or a browser form post, validates it, and
//! forwards a formatted message to the configured transactional-email
//! service. No state is kept between requests.

pub mod format;
pub mod handler;
pub mod mailer;

use std::env;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

pub use handler::serve;

/// `local-part@domain.tld`, the same shape browsers validate for
/// `input[type=email]`
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\w!#$%&'*+/=?`{|}~^.-]+@([\w-]+\.)+[A-Za-z]{2,}$").expect("valid email regex")
});

/// Raw submission as it arrives on the wire. Browser forms send
/// `project-type`, JSON clients send `projectType`; both normalize to one
/// field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
    pub company: Option<String>,
    pub budget: Option<String>,
    pub timeline: Option<String>,
    #[serde(default, alias = "project-type", alias = "projectType")]
    pub project_type: Option<String>,
}

/// A validated, trimmed submission ready to format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
    pub company: Option<String>,
    pub budget: Option<String>,
    pub timeline: Option<String>,
    pub project_type: Option<String>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ContactPayload {
    /// Trim everything and enforce the required fields. The error string
    /// is the user-facing guidance for the 422 response.
    pub fn validate(self) -> Result<ContactRequest, String> {
        let name = trimmed(self.name);
        let email = trimmed(self.email);
        let message = trimmed(self.message);

        let (Some(name), Some(email), Some(message)) = (name, email, message) else {
            return Err("Please provide your name, email, and a short message.".to_string());
        };

        if !EMAIL_RE.is_match(&email) {
            return Err("Please share a valid email address.".to_string());
        }

        Ok(ContactRequest {
            name,
            email,
            message,
            company: trimmed(self.company),
            budget: trimmed(self.budget),
            timeline: trimmed(self.timeline),
            project_type: trimmed(self.project_type),
        })
    }
}

/// Server configuration, read once at startup
#[derive(Debug, Clone)]
pub struct ContactConfig {
    pub bind_addr: String,
    /// Email service credential; submissions are rejected without it
    pub api_key: Option<String>,
    pub from: String,
    pub recipients: Vec<String>,
    /// Address offered to the submitter when delivery fails
    pub fallback_contact: String,
}

impl ContactConfig {
    pub fn from_env() -> Self {
        let recipients = read_env_list("CONTACT_TO", &["owner@localhost"]);
        let fallback_contact = env::var("CONTACT_FALLBACK")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| recipients[0].clone());
        Self {
            bind_addr: env::var("CONTACT_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            api_key: env::var("RESEND_API_KEY").ok().filter(|v| !v.is_empty()),
            from: env::var("CONTACT_FROM")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "Portfolio <no-reply@localhost>".to_string()),
            recipients,
            fallback_contact,
        }
    }
}

fn read_env_list(name: &str, default: &[&str]) -> Vec<String> {
    let parsed = env::var(name)
        .ok()
        .map(|value| {
            value
                .split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    if parsed.is_empty() {
        default.iter().map(|s| s.to_string()).collect()
    } else {
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str, email: &str, message: &str) -> ContactPayload {
        ContactPayload {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            message: Some(message.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_payload_passes() {
        let request = payload("Ada", "ada@example.com", "Hello").validate().unwrap();
        assert_eq!(request.name, "Ada");
        assert_eq!(request.email, "ada@example.com");
        assert_eq!(request.message, "Hello");
        assert_eq!(request.company, None);
    }

    #[test]
    fn test_fields_are_trimmed() {
        let request = payload("  Ada  ", " ada@example.com ", "  Hello  ")
            .validate()
            .unwrap();
        assert_eq!(request.name, "Ada");
        assert_eq!(request.email, "ada@example.com");
        assert_eq!(request.message, "Hello");
    }

    #[test]
    fn test_whitespace_only_required_field_fails() {
        let err = payload("Ada", "ada@example.com", "   ").validate().unwrap_err();
        assert!(err.contains("name, email, and a short message"));
    }

    #[test]
    fn test_missing_required_field_fails() {
        let mut p = payload("Ada", "ada@example.com", "Hello");
        p.message = None;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_invalid_email_fails() {
        for bad in ["not-an-email", "a@b", "a@b.", "@example.com", "spaces in@example.com"] {
            let err = payload("Ada", bad, "Hello").validate().unwrap_err();
            assert!(err.contains("valid email"), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_accepts_plus_and_dots() {
        for good in ["ada+tag@example.com", "first.last@sub.example.co"] {
            assert!(payload("Ada", good, "Hello").validate().is_ok(), "{good}");
        }
    }

    #[test]
    fn test_optional_fields_trimmed_to_none() {
        let mut p = payload("Ada", "ada@example.com", "Hello");
        p.company = Some("  ".to_string());
        p.project_type = Some(" Web app ".to_string());
        let request = p.validate().unwrap();
        assert_eq!(request.company, None);
        assert_eq!(request.project_type, Some("Web app".to_string()));
    }

    #[test]
    fn test_project_type_aliases() {
        let json: ContactPayload = serde_json::from_str(
            r#"{"name":"Ada","email":"ada@example.com","message":"Hi","projectType":"Site"}"#,
        )
        .unwrap();
        assert_eq!(json.project_type, Some("Site".to_string()));

        let form: ContactPayload =
            serde_urlencoded::from_str("name=Ada&email=ada%40example.com&message=Hi&project-type=Site")
                .unwrap();
        assert_eq!(form.project_type, Some("Site".to_string()));
    }
}
