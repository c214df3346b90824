//! The player administration table.
//!
//! Lists player records with their nested statistics, filtered by the
//! search box when one is active. Profile edits reload the listing; the
//! active toggle instead patches the loaded row with the state the backend
//! reported, so the switch never shows a state the backend did not confirm.

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::common::{PageRequest, Paginated};
use crate::api::player::{Player, PlayerFilter, PlayerService, PlayerStatistics, UpdatePlayerRequest};
use crate::errors::ServiceResult;
use crate::http::HttpClient;
use crate::tables::collection::{PageFetcher, RemoteCollection};
use crate::tables::sort::{SortSource, SortValue};

impl SortSource for Player {
    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "id" => Some(SortValue::Text(self.id.clone())),
            "name" => Some(SortValue::Text(self.name.clone())),
            "country" => Some(SortValue::Text(self.country.clone())),
            "email" => self.email.clone().map(SortValue::Text),
            "stats_id" => self.stats_id.clone().map(SortValue::Text),
            // The active flag is neither text nor number, so the column
            // header is a dead control.
            "active" => None,
            // Any other key is resolved against the nested statistics.
            _ => self.statistics.sort_value(key),
        }
    }
}

impl PlayerStatistics {
    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "coins" => Some(SortValue::Number(self.coins as f64)),
            "experience_point" => Some(SortValue::Number(self.experience_point as f64)),
            "games_played" => Some(SortValue::Number(self.games_played as f64)),
            "games_won" => Some(SortValue::Number(self.games_won as f64)),
            _ => None,
        }
    }
}

/// Fetches player pages, carrying whatever filter the table was given.
pub struct PlayerPageFetcher {
    http: Arc<HttpClient>,
    filter: PlayerFilter,
}

#[async_trait]
impl PageFetcher<Player> for PlayerPageFetcher {
    async fn fetch_page(&self, page: PageRequest) -> ServiceResult<Paginated<Player>> {
        PlayerService::new(&self.http)
            .list_players(page, &self.filter)
            .await
    }
}

/// The player-management table.
pub struct PlayerTable {
    http: Arc<HttpClient>,
    pub collection: RemoteCollection<Player, PlayerPageFetcher>,
}

impl PlayerTable {
    pub fn new(http: Arc<HttpClient>, page_size: u32) -> Self {
        Self::with_filter(http, page_size, PlayerFilter::default())
    }

    /// A table scoped to a filter, as when search results are shown.
    pub fn with_filter(http: Arc<HttpClient>, page_size: u32, filter: PlayerFilter) -> Self {
        let fetcher = PlayerPageFetcher {
            http: http.clone(),
            filter,
        };
        PlayerTable {
            http,
            collection: RemoteCollection::new(fetcher, page_size),
        }
    }

    /// Replaces a player's profile and reloads the listing.
    pub async fn update_player(
        &mut self,
        id: &str,
        request: &UpdatePlayerRequest,
    ) -> ServiceResult<()> {
        PlayerService::new(&self.http)
            .update_player(id, request)
            .await?;
        self.collection.refresh().await
    }

    /// Flips a player's active flag. The loaded row is only updated once
    /// the backend has answered, and it takes whatever state the backend
    /// reported rather than assuming the flip happened.
    pub async fn toggle_active(&mut self, id: &str) -> ServiceResult<bool> {
        let active = PlayerService::new(&self.http).toggle_active(id).await?;
        self.collection
            .patch_rows(|row| row.id == id, |row| row.active = active);
        Ok(active)
    }
}
