//! User account endpoints.
//!
//! Covers the canonical-record fetch used during session restore plus the
//! account management calls available to administrators.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::common::{PageRequest, Paginated};
use crate::auth::models::Role;
use crate::errors::{ServiceError, ServiceResult, validate_dto};
use crate::http::HttpClient;

/// A user account as the backend returns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Payload for creating a user account
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    pub role: Role,
}

/// Payload for updating a user account. The password travels only when it is
/// actually being changed.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,

    pub role: Role,
}

pub struct UserService<'a> {
    /// Shared backend transport
    http: &'a HttpClient,
}

impl<'a> UserService<'a> {
    /// Creates a new UserService instance.
    ///
    /// # Arguments
    /// * `http` - Reference to the shared HTTP transport
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    /// Fetches one user's canonical record.
    ///
    /// # Errors
    /// Returns `ServiceError::NotFound` if no user has this id
    pub async fn get_user(&self, id: &str) -> ServiceResult<User> {
        self.http
            .get(&format!("/user/{}", id), &[])
            .await
            .map_err(|e| remap_not_found(e, id))
    }

    /// Fetches one page of user accounts.
    pub async fn list_users(&self, page: PageRequest) -> ServiceResult<Paginated<User>> {
        self.http.get("/user", &page.to_query()).await
    }

    /// Creates a user account after validating the payload locally.
    pub async fn create_user(&self, request: &CreateUserRequest) -> ServiceResult<()> {
        validate_dto(request)?;
        let _: serde_json::Value = self.http.post("/user", request).await?;
        Ok(())
    }

    /// Replaces a user's profile.
    pub async fn update_user(&self, id: &str, request: &UpdateUserRequest) -> ServiceResult<()> {
        validate_dto(request)?;
        let _: serde_json::Value = self
            .http
            .put(&format!("/user/{}", id), request)
            .await
            .map_err(|e| remap_not_found(e, id))?;
        Ok(())
    }

    /// Deletes a user account.
    pub async fn delete_user(&self, id: &str) -> ServiceResult<()> {
        let _: serde_json::Value = self
            .http
            .delete(&format!("/user/{}", id))
            .await
            .map_err(|e| remap_not_found(e, id))?;
        Ok(())
    }
}

fn remap_not_found(e: ServiceError, id: &str) -> ServiceError {
    match e {
        ServiceError::NotFound { .. } => ServiceError::not_found("User", id),
        other => other,
    }
}
