//! Player record endpoints.
//!
//! Player rows nest their game statistics in a sub-record; listing supports
//! country and name filters on top of the usual page window. The active-flag
//! toggle is special: the backend only reports the new state through a
//! human-readable message.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::common::{MessageResponse, PageRequest, Paginated};
use crate::errors::{ServiceError, ServiceResult, validate_dto};
use crate::http::HttpClient;

/// The exact message the backend sends when a toggle landed on "active".
/// Anything else means the player is now inactive. Flagged with the backend
/// owners; until the contract grows a boolean field this string is load-bearing.
const PLAYER_SET_ACTIVE_MESSAGE: &str = "player set to Active";

/// Per-player game statistics nested under each player record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatistics {
    pub id: String,
    #[serde(default)]
    pub coins: u64,
    pub experience_point: u64,
    pub games_played: u64,
    pub games_won: u64,
}

/// A player record with nested statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub country: String,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats_id: Option<String>,
    pub statistics: PlayerStatistics,
}

/// Country and free-text filters for the player listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerFilter {
    pub country: Option<String>,
    pub search_key: Option<String>,
}

impl PlayerFilter {
    pub fn is_empty(&self) -> bool {
        self.country.is_none() && self.search_key.is_none()
    }
}

/// Payload for updating a player profile
#[derive(Debug, Clone, Serialize, Validate)]
pub struct UpdatePlayerRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

pub struct PlayerService<'a> {
    /// Shared backend transport
    http: &'a HttpClient,
}

impl<'a> PlayerService<'a> {
    /// Creates a new PlayerService instance.
    ///
    /// # Arguments
    /// * `http` - Reference to the shared HTTP transport
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    /// Fetches one page of player records, optionally filtered by country
    /// and/or a free-text key.
    pub async fn list_players(
        &self,
        page: PageRequest,
        filter: &PlayerFilter,
    ) -> ServiceResult<Paginated<Player>> {
        let mut query = page.to_query();
        if let Some(country) = &filter.country {
            query.push(("country", country.clone()));
        }
        if let Some(search_key) = &filter.search_key {
            query.push(("searchKey", search_key.clone()));
        }
        self.http.get("/user/players/all", &query).await
    }

    /// Replaces a player's profile.
    pub async fn update_player(
        &self,
        id: &str,
        request: &UpdatePlayerRequest,
    ) -> ServiceResult<()> {
        validate_dto(request)?;
        let _: serde_json::Value = self
            .http
            .put(&format!("/user/player/update/{}", id), request)
            .await
            .map_err(|e| remap_not_found(e, id))?;
        Ok(())
    }

    /// Flips a player's active flag and reports the state the backend landed
    /// on, parsed out of the response message.
    pub async fn toggle_active(&self, id: &str) -> ServiceResult<bool> {
        let response: MessageResponse = self
            .http
            .patch(&format!("/user/player/setInactive/{}", id))
            .await
            .map_err(|e| remap_not_found(e, id))?;
        Ok(is_active_message(&response.message))
    }

    /// Fetches the ranked player listing with statistics.
    pub async fn leaderboard(&self) -> ServiceResult<Paginated<Player>> {
        self.http.get("/player/leaderboard", &[]).await
    }
}

fn remap_not_found(e: ServiceError, id: &str) -> ServiceError {
    match e {
        ServiceError::NotFound { .. } => ServiceError::not_found("Player", id),
        other => other,
    }
}

fn is_active_message(message: &str) -> bool {
    message == PLAYER_SET_ACTIVE_MESSAGE
}
