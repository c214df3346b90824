//! The account administration table.
//!
//! Lists every console account a page at a time and carries the create,
//! edit and delete actions. Every mutation round-trips through the backend
//! first, then the listing is reloaded so the table shows what the backend
//! actually holds.

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::common::{PageRequest, Paginated};
use crate::api::user::{CreateUserRequest, UpdateUserRequest, User, UserService};
use crate::errors::ServiceResult;
use crate::http::HttpClient;
use crate::tables::collection::{PageFetcher, RemoteCollection};
use crate::tables::sort::{SortSource, SortValue};

impl SortSource for User {
    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "id" => Some(SortValue::Text(self.id.clone())),
            "name" => Some(SortValue::Text(self.name.clone())),
            "email" => Some(SortValue::Text(self.email.clone())),
            "role" => Some(SortValue::Text(self.role.as_str().to_string())),
            _ => None,
        }
    }
}

/// Fetches user pages from the account listing endpoint.
pub struct UserPageFetcher {
    http: Arc<HttpClient>,
}

#[async_trait]
impl PageFetcher<User> for UserPageFetcher {
    async fn fetch_page(&self, page: PageRequest) -> ServiceResult<Paginated<User>> {
        UserService::new(&self.http).list_users(page).await
    }
}

/// The user-management table.
pub struct UserTable {
    http: Arc<HttpClient>,
    pub collection: RemoteCollection<User, UserPageFetcher>,
}

impl UserTable {
    pub fn new(http: Arc<HttpClient>, page_size: u32) -> Self {
        let fetcher = UserPageFetcher { http: http.clone() };
        UserTable {
            http,
            collection: RemoteCollection::new(fetcher, page_size),
        }
    }

    /// Creates an account and reloads the listing.
    pub async fn create_user(&mut self, request: &CreateUserRequest) -> ServiceResult<()> {
        UserService::new(&self.http).create_user(request).await?;
        self.collection.refresh().await
    }

    /// Replaces an account's profile and reloads the listing.
    pub async fn update_user(
        &mut self,
        id: &str,
        request: &UpdateUserRequest,
    ) -> ServiceResult<()> {
        UserService::new(&self.http).update_user(id, request).await?;
        self.collection.refresh().await
    }

    /// Deletes an account and reloads the listing.
    pub async fn delete_user(&mut self, id: &str) -> ServiceResult<()> {
        UserService::new(&self.http).delete_user(id).await?;
        self.collection.refresh().await
    }
}
