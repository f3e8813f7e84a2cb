// src/router/mod.rs
//
// Regional request router: resolves which upstream cluster owns a request,
// injects the upstream credential and forwards, translating failures into the
// `{error, details}` taxonomy.

pub mod regions;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use std::sync::Arc;
use url::Url;

use crate::middleware::cors;
use crate::types::ActiveRegion;
use crate::utils::{ProfileError, ProfileResult};
use crate::{log_debug, log_warn};
use regions::{
    cluster_for_discovery_value, cluster_for_match_id, cluster_for_platform, RegionCluster,
    DEFAULT_CLUSTER, DISCOVERY_CLUSTER,
};

/// Query parameters carrying routing hints. Consumed by resolution and never
/// forwarded upstream.
const ROUTING_HINT_PARAMS: [&str; 2] = ["region", "platform"];

const ACCOUNT_BY_RIOT_ID_PATH: &str = "/riot/account/v1/accounts/by-riot-id/";
const UNIVERSAL_ACCOUNT_PREFIX: &str = "/riot/account/";
const MATCH_LOOKUP_PREFIX: &str = "/lol/match/v5/matches/";
const ACTIVE_REGION_PATH: &str = "/riot/account/v1/region/by-game/lol/by-puuid/";

#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Upstream API credential. Absence is a fatal configuration error
    /// surfaced as `MISSING_API_KEY`, never a per-request failure.
    pub api_key: Option<String>,
    pub allowed_origins: Vec<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
                "https://riftprofile.app".to_string(),
            ],
        }
    }
}

impl RouterConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("RIOT_API_KEY").ok(),
            ..Self::default()
        }
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }
}

/// Inbound request as seen by the edge handler.
#[derive(Debug, Clone)]
pub struct RouterRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub origin: Option<String>,
    /// Passed through unmodified for non-read methods.
    pub body: Option<Value>,
}

impl RouterRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            origin: None,
            body: None,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Response returned to the edge caller.
#[derive(Debug, Clone)]
pub struct RouterResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RouterResponse {
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: body.to_string(),
        }
    }

    /// `{error, details}` rendering of a pipeline/router error.
    pub fn from_error(err: &ProfileError) -> Self {
        Self::json(
            err.http_status(),
            &serde_json::json!({
                "error": err.code(),
                "details": err.message,
            }),
        )
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Outbound request the transport executes against a cluster host.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> ProfileResult<T> {
        serde_json::from_str(&self.body)
            .map_err(|e| ProfileError::parse_error(format!("malformed upstream payload: {}", e)))
    }
}

/// Seam between the router and the network, mockable in tests. Implementations
/// return `Err` only for network-level failures; HTTP error statuses come back
/// as normal responses for the router to translate.
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    async fn execute(&self, request: UpstreamRequest) -> ProfileResult<UpstreamResponse>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UpstreamTransport for ReqwestTransport {
    async fn execute(&self, request: UpstreamRequest) -> ProfileResult<UpstreamResponse> {
        let mut builder = self.client.request(request.method, request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(UpstreamResponse { status, body })
    }
}

pub struct RegionalRouter {
    config: RouterConfig,
    transport: Arc<dyn UpstreamTransport>,
}

impl RegionalRouter {
    pub fn new(config: RouterConfig, transport: Arc<dyn UpstreamTransport>) -> Self {
        Self { config, transport }
    }

    pub fn with_default_transport(config: RouterConfig) -> Self {
        Self::new(config, Arc::new(ReqwestTransport::new()))
    }

    pub fn allowed_origins(&self) -> &[String] {
        &self.config.allowed_origins
    }

    fn api_key(&self) -> ProfileResult<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(ProfileError::missing_api_key)
    }

    /// Full edge handler: preflight, forward, error rendering, CORS.
    pub async fn handle(&self, request: RouterRequest) -> RouterResponse {
        if request.method == Method::OPTIONS {
            return cors::preflight_response(
                request.origin.as_deref(),
                &self.config.allowed_origins,
            );
        }

        let origin = request.origin.clone();
        let response = match self.forward(request).await {
            Ok(response) => response,
            Err(err) => {
                log_warn!(
                    "request failed",
                    serde_json::json!({"error": err.code(), "details": err.message})
                );
                RouterResponse::from_error(&err)
            }
        };
        cors::apply_cors(response, origin.as_deref(), &self.config.allowed_origins)
    }

    /// Resolve the owning cluster and forward the request upstream. Routing
    /// hints are stripped from the forwarded query; method and body pass
    /// through unchanged.
    pub async fn forward(&self, request: RouterRequest) -> ProfileResult<RouterResponse> {
        let cluster = self.resolve_cluster(&request).await?;
        log_debug!(
            "resolved cluster",
            serde_json::json!({"path": request.path, "cluster": cluster.as_str()})
        );

        let mut url = Url::parse(&cluster.host())?;
        url.set_path(&request.path);
        for (key, value) in &request.query {
            if !ROUTING_HINT_PARAMS.contains(&key.as_str()) {
                url.query_pairs_mut().append_pair(key, value);
            }
        }

        let body = if request.method == Method::GET {
            None
        } else {
            request.body.clone()
        };

        let upstream = self.dispatch(request.method, url, body).await?;
        Ok(RouterResponse {
            status: upstream.status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: upstream.body,
        })
    }

    /// Resolution order, first match wins (see module docs).
    async fn resolve_cluster(&self, request: &RouterRequest) -> ProfileResult<RegionCluster> {
        // 1. Identity lookup by name is universal: fixed default cluster,
        //    regardless of any region hint.
        if request.path.starts_with(ACCOUNT_BY_RIOT_ID_PATH) {
            return Ok(DEFAULT_CLUSTER);
        }

        // 2. A player id in a non-universal path routes via active-region
        //    discovery.
        if let Some(puuid) = extract_puuid(&request.path) {
            if !request.path.starts_with(UNIVERSAL_ACCOUNT_PREFIX) {
                return self.discover_active_region(puuid).await;
            }
        }

        // 3. Explicit region/platform hint.
        if let Some(hint) = request
            .query_param("region")
            .or_else(|| request.query_param("platform"))
        {
            return cluster_for_platform(hint).ok_or_else(|| {
                ProfileError::validation_error(format!("unknown region hint '{}'", hint))
            });
        }

        // 4. Match lookups carry the platform in the id prefix.
        if request.path.starts_with(MATCH_LOOKUP_PREFIX) {
            if let Some(segment) = request.path.trim_end_matches('/').rsplit('/').next() {
                if let Some(cluster) = cluster_for_match_id(segment) {
                    return Ok(cluster);
                }
            }
        }

        // 5. Remaining identity endpoints without an id.
        if request.path.starts_with(UNIVERSAL_ACCOUNT_PREFIX) {
            return Ok(DEFAULT_CLUSTER);
        }

        Err(ProfileError::validation_error(
            "unable to resolve region: supply a 'region' query parameter or a player id",
        ))
    }

    /// Ask the authoritative cluster which region owns this player id. The
    /// response shape is validated explicitly: the region field may carry a
    /// cluster name or a platform code, anything else is a malformed upstream
    /// payload.
    pub async fn discover_active_region(&self, puuid: &str) -> ProfileResult<RegionCluster> {
        let url = Url::parse(&format!(
            "{}{}{}",
            DISCOVERY_CLUSTER.host(),
            ACTIVE_REGION_PATH,
            puuid
        ))?;
        let response = self.dispatch(Method::GET, url, None).await?;
        if response.status == 404 {
            return Err(ProfileError::not_found(format!(
                "no active region for player id '{}'",
                puuid
            )));
        }
        let active: ActiveRegion = response.json()?;
        cluster_for_discovery_value(&active.region).ok_or_else(|| {
            ProfileError::parse_error(format!(
                "active-region discovery returned unmapped region '{}'",
                active.region
            ))
        })
    }

    /// Single upstream dispatch with credential injection and status
    /// translation. The credential travels as a header, never a query
    /// parameter. 401/403 are terminal (retrying wastes quota); 5xx and
    /// network failures surface as gateway errors; other statuses pass
    /// through for the caller to interpret.
    pub async fn dispatch(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> ProfileResult<UpstreamResponse> {
        let api_key = self.api_key()?;
        let request = UpstreamRequest {
            method,
            url,
            headers: vec![("X-Riot-Token".to_string(), api_key.to_string())],
            body,
        };

        let response = self.transport.execute(request).await?;
        match response.status {
            401 | 403 => Err(ProfileError::upstream_auth_error(
                "upstream rejected the API credential; check RIOT_API_KEY",
            )),
            status if status >= 500 => Err(ProfileError::upstream_server_error(
                format!("upstream responded {}", status),
                status,
            )),
            _ => Ok(response),
        }
    }

    /// Dispatch a GET to a known cluster. Used by the typed client once the
    /// owning cluster is resolved (and cached) out of band.
    pub async fn dispatch_to(
        &self,
        cluster: RegionCluster,
        path: &str,
        query: &[(String, String)],
    ) -> ProfileResult<UpstreamResponse> {
        let mut url = Url::parse(&cluster.host())?;
        url.set_path(path);
        for (key, value) in query {
            url.query_pairs_mut().append_pair(key, value);
        }
        self.dispatch(Method::GET, url, None).await
    }
}

/// Player id embedded in a path, i.e. the segment following `by-puuid/`.
fn extract_puuid(path: &str) -> Option<&str> {
    let (_, rest) = path.split_once("/by-puuid/")?;
    let puuid = rest.split('/').next()?;
    if puuid.is_empty() {
        None
    } else {
        Some(puuid)
    }
}
