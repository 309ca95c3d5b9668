use crate::core::document::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Email read from the delete button's data attribute. Only presence is checked,
/// and `from_attribute` is the only constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParticipantEmail(String);

impl ParticipantEmail {
    /// Returns `None` for a missing or blank attribute value.
    pub fn from_attribute(value: Option<&str>) -> Option<Self> {
        match value {
            Some(v) if !v.trim().is_empty() => Some(Self(v.to_string())),
            _ => None,
        }
    }
}

impl AsRef<str> for ParticipantEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body returned by `DELETE /unregister`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnregisterResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    /// Error text the server sends with 4xx responses.
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnregisterOutcome {
    Unregistered {
        email: ParticipantEmail,
        list_item: Option<NodeId>,
    },
    Rejected {
        email: ParticipantEmail,
        detail: Option<String>,
    },
    TransportFailed {
        email: ParticipantEmail,
        reason: String,
    },
}

impl UnregisterOutcome {
    pub fn email(&self) -> &ParticipantEmail {
        match self {
            Self::Unregistered { email, .. }
            | Self::Rejected { email, .. }
            | Self::TransportFailed { email, .. } => email,
        }
    }

    pub fn is_unregistered(&self) -> bool {
        matches!(self, Self::Unregistered { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_requires_presence() {
        assert!(ParticipantEmail::from_attribute(None).is_none());
        assert!(ParticipantEmail::from_attribute(Some("")).is_none());
        assert!(ParticipantEmail::from_attribute(Some("  ")).is_none());

        let email = ParticipantEmail::from_attribute(Some("a@example.com")).unwrap();
        assert_eq!(email.as_ref(), "a@example.com");
    }

    #[test]
    fn test_response_success_defaults_to_false() {
        let parsed: UnregisterResponse =
            serde_json::from_str(r#"{"detail": "Student is not signed up"}"#).unwrap();
        assert!(!parsed.success);
        assert_eq!(parsed.detail.as_deref(), Some("Student is not signed up"));

        let parsed: UnregisterResponse =
            serde_json::from_str(r#"{"success": true, "message": "Unregistered"}"#).unwrap();
        assert!(parsed.success);
    }

    #[test]
    fn test_outcome_exposes_email() {
        let email = ParticipantEmail::from_attribute(Some("a@example.com")).unwrap();
        let outcome = UnregisterOutcome::Rejected {
            email: email.clone(),
            detail: None,
        };
        assert_eq!(outcome.email(), &email);
        assert!(!outcome.is_unregistered());
    }
}
