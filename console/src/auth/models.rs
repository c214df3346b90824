//! Data structures for authentication-related entities.
//!
//! This module defines the closed role set, the credential payloads sent to
//! the backend, and the login response shape the session record is built
//! from.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use validator::Validate;

use crate::api::user::User;
use crate::session::SessionRecord;

/// The closed set of roles the backend issues.
///
/// Any other role string in a response is a decode error, surfaced at the
/// boundary instead of leaking into downstream branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    Player,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Player => "player",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            "player" => Ok(Role::Player),
            _ => Err(format!("Invalid role: {}", input)),
        }
    }
}

/// Login request payload
#[derive(Debug, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Player self-registration payload
#[derive(Debug, Serialize, Validate)]
pub struct RegistrationRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Login response as the backend sends it, token and profile in one object
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    pub id: String,
    pub role: Role,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extras: serde_json::Map<String, serde_json::Value>,
}

/// Registration response. The backend may or may not include a token here,
/// so every credential field is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationResponse {
    #[serde(rename = "accessToken", default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extras: serde_json::Map<String, serde_json::Value>,
}

impl RegistrationResponse {
    /// Reinterprets the response as a login when it carries a full credential
    /// set, which lets a fresh registration sign in without a second request.
    pub fn into_login(self) -> Option<LoginResponse> {
        match (self.access_token, self.id, self.role) {
            (Some(access_token), Some(id), Some(role)) => Some(LoginResponse {
                access_token,
                id,
                role,
                name: self.name,
                email: self.email,
                extras: self.extras,
            }),
            _ => None,
        }
    }
}

/// The signed-in user as guards and menus see it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub role: Role,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl From<&LoginResponse> for AuthUser {
    fn from(response: &LoginResponse) -> Self {
        AuthUser {
            id: response.id.clone(),
            role: response.role,
            name: response.name.clone(),
            email: response.email.clone(),
        }
    }
}

impl From<&SessionRecord> for AuthUser {
    fn from(record: &SessionRecord) -> Self {
        AuthUser {
            id: record.id.clone(),
            role: record.role,
            name: record.name.clone(),
            email: record.email.clone(),
        }
    }
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        AuthUser {
            id: user.id.clone(),
            role: user.role,
            name: Some(user.name.clone()),
            email: Some(user.email.clone()),
        }
    }
}

impl From<LoginResponse> for SessionRecord {
    fn from(response: LoginResponse) -> Self {
        SessionRecord {
            access_token: response.access_token,
            id: response.id,
            role: response.role,
            name: response.name,
            email: response.email,
            saved_at: Utc::now(),
            extras: response.extras,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::validate_dto;

    #[test]
    fn test_role_round_trips_through_serde() {
        let role: Role = serde_json::from_str(r#""staff""#).unwrap();
        assert_eq!(role, Role::Staff);
        assert_eq!(serde_json::to_string(&role).unwrap(), r#""staff""#);
    }

    #[test]
    fn test_unknown_role_is_a_decode_error() {
        assert!(serde_json::from_str::<Role>(r#""superuser""#).is_err());
    }

    #[test]
    fn test_login_response_keeps_unmodeled_fields() {
        let raw = r#"{
            "accessToken": "t",
            "id": "0198f1aa-1111-7000-8000-000000000001",
            "role": "player",
            "name": "Niran",
            "country": "np"
        }"#;
        let response: LoginResponse = serde_json::from_str(raw).unwrap();
        let record = SessionRecord::from(response);

        assert_eq!(record.role, Role::Player);
        assert_eq!(
            record.extras.get("country").and_then(|v| v.as_str()),
            Some("np")
        );
    }

    #[test]
    fn test_registration_response_without_token_is_not_a_login() {
        let raw = r#"{"message": "Player registered successfully"}"#;
        let response: RegistrationResponse = serde_json::from_str(raw).unwrap();
        assert!(response.into_login().is_none());
    }

    #[test]
    fn test_registration_response_with_full_credentials_becomes_a_login() {
        let raw = r#"{
            "accessToken": "t",
            "id": "0198f1aa-1111-7000-8000-000000000001",
            "role": "player"
        }"#;
        let response: RegistrationResponse = serde_json::from_str(raw).unwrap();
        let login = response.into_login().unwrap();
        assert_eq!(login.role, Role::Player);
    }

    #[test]
    fn test_login_request_validation() {
        let bad = LoginRequest {
            email: "not-an-email".to_string(),
            password: String::new(),
        };
        assert!(validate_dto(&bad).is_err());

        let good = LoginRequest {
            email: "ops@example.com".to_string(),
            password: "secret".to_string(),
        };
        assert!(validate_dto(&good).is_ok());
    }
}
