// src/services/riot_client.rs
//
// Typed upstream calls, routed through the regional router. The router owns
// credential injection and error translation; this layer owns paths, query
// parameters and payload shapes.

use std::sync::Arc;

use crate::router::regions::{RegionCluster, DEFAULT_CLUSTER};
use crate::router::RegionalRouter;
use crate::types::{MatchHistoryQuery, MatchRecord, RiotAccount};
use crate::utils::{ProfileError, ProfileResult};

pub struct RiotApiClient {
    router: Arc<RegionalRouter>,
}

impl RiotApiClient {
    pub fn new(router: Arc<RegionalRouter>) -> Self {
        Self { router }
    }

    /// Resolve (name, tag) to a stable player id. Universal endpoint, always
    /// served by the default cluster.
    pub async fn get_account_by_riot_id(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> ProfileResult<RiotAccount> {
        let path = format!(
            "/riot/account/v1/accounts/by-riot-id/{}/{}",
            game_name, tag_line
        );
        let response = self.router.dispatch_to(DEFAULT_CLUSTER, &path, &[]).await?;
        if response.status == 404 {
            return Err(ProfileError::not_found(format!(
                "no account for '{}#{}'",
                game_name, tag_line
            )));
        }
        response.json()
    }

    pub async fn get_account_by_puuid(&self, puuid: &str) -> ProfileResult<RiotAccount> {
        let path = format!("/riot/account/v1/accounts/by-puuid/{}", puuid);
        let response = self.router.dispatch_to(DEFAULT_CLUSTER, &path, &[]).await?;
        if response.status == 404 {
            return Err(ProfileError::not_found(format!(
                "no account for player id '{}'",
                puuid
            )));
        }
        response.json()
    }

    /// Which cluster owns this player's match data.
    pub async fn get_active_region(&self, puuid: &str) -> ProfileResult<RegionCluster> {
        self.router.discover_active_region(puuid).await
    }

    /// Ordered match ids, most-recent-first.
    pub async fn get_match_ids(
        &self,
        cluster: RegionCluster,
        puuid: &str,
        query: &MatchHistoryQuery,
    ) -> ProfileResult<Vec<String>> {
        let path = format!("/lol/match/v5/matches/by-puuid/{}/ids", puuid);
        let response = self
            .router
            .dispatch_to(cluster, &path, &query.to_query_pairs())
            .await?;
        response.json()
    }

    pub async fn get_match(
        &self,
        cluster: RegionCluster,
        match_id: &str,
    ) -> ProfileResult<MatchRecord> {
        let path = format!("/lol/match/v5/matches/{}", match_id);
        let response = self.router.dispatch_to(cluster, &path, &[]).await?;
        if response.status == 404 {
            return Err(ProfileError::not_found(format!(
                "match '{}' not found",
                match_id
            )));
        }
        response.json()
    }
}
