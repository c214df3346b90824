//! The leaderboard.
//!
//! A read-only ranking of players. The backend hands back the whole ranked
//! listing in one response; the table starts sorted on experience points
//! ascending and every header click re-sorts the loaded rows locally.

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::common::{PageRequest, Paginated};
use crate::api::player::{Player, PlayerService};
use crate::errors::ServiceResult;
use crate::http::HttpClient;
use crate::tables::collection::{PageFetcher, RemoteCollection};

/// Fetches the ranked listing. The endpoint takes no paging parameters,
/// so the request is ignored.
pub struct LeaderboardFetcher {
    http: Arc<HttpClient>,
}

#[async_trait]
impl PageFetcher<Player> for LeaderboardFetcher {
    async fn fetch_page(&self, _page: PageRequest) -> ServiceResult<Paginated<Player>> {
        PlayerService::new(&self.http).leaderboard().await
    }
}

/// The leaderboard table.
pub struct LeaderboardTable {
    pub collection: RemoteCollection<Player, LeaderboardFetcher>,
}

impl LeaderboardTable {
    pub fn new(http: Arc<HttpClient>, page_size: u32) -> Self {
        let fetcher = LeaderboardFetcher { http };
        LeaderboardTable {
            collection: RemoteCollection::new(fetcher, page_size)
                .with_initial_sort("experience_point"),
        }
    }

    /// Ranks are display positions in the current order, starting at one.
    pub fn ranked(&self) -> impl Iterator<Item = (usize, &Player)> {
        self.collection
            .rows()
            .iter()
            .enumerate()
            .map(|(i, player)| (i + 1, player))
    }
}
