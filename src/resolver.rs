use crate::cache::{CachedCandidates, CandidateSource, EndpointCache};
use crate::candidate::EndpointCandidate;
use crate::config::GatewayConfig;
use crate::directory::{UserDirectory, UserRecord};
use crate::discovery::{fallback_candidates, CandidateTable, DiscoveryStrategy, OpenApiScanner};
use crate::errors::{AttemptError, ResolveError};
use crate::intent::{IntentCategory, RoleIntent, UserId};
use chrono::Utc;
use reqwest::{header::ALLOW, Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const DEFAULT_DESCRIPTION_PATH: &str = "/openapi.json";
pub const DEFAULT_USERS_PATH: &str = "/users/";

const NOT_FOUND_DETAIL: &str = "Not Found";

#[derive(Debug, Clone, Serialize)]
pub struct RoleChange {
    pub intent: RoleIntent,
    pub user_id: UserId,
    pub method: String,
    pub url: String,
    pub status: u16,
    /// User list fetched right after the change; `None` when the refresh failed.
    pub users: Option<Vec<UserRecord>>,
}

pub struct EndpointResolver {
    client: Client,
    base_url: String,
    description_path: String,
    strategy: Arc<dyn DiscoveryStrategy>,
    directory: UserDirectory,
    cache: Mutex<EndpointCache>,
}

impl EndpointResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::new();
        Self {
            directory: UserDirectory::new(client.clone(), base_url.clone(), DEFAULT_USERS_PATH),
            client,
            base_url,
            description_path: DEFAULT_DESCRIPTION_PATH.to_string(),
            strategy: Arc::new(OpenApiScanner),
            cache: Mutex::new(EndpointCache::default()),
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(config.backend_url.as_str())
            .with_description_path(config.description_path.as_str())
            .with_users_path(config.users_path.as_str())
    }

    pub fn with_strategy(mut self, strategy: impl DiscoveryStrategy + 'static) -> Self {
        self.strategy = Arc::new(strategy);
        self
    }

    pub fn with_description_path(mut self, path: impl Into<String>) -> Self {
        self.description_path = path.into();
        self
    }

    pub fn with_users_path(mut self, path: impl Into<String>) -> Self {
        self.directory = UserDirectory::new(self.client.clone(), self.base_url.clone(), path);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    /// Forgets every discovered endpoint; the next `resolve` scans again.
    pub async fn reset(&self) {
        self.cache.lock().await.clear();
        info!("endpoint cache cleared");
    }

    pub async fn resolve(
        &self,
        intent: RoleIntent,
        bearer: Option<&str>,
    ) -> Vec<EndpointCandidate> {
        self.resolve_entry(intent, bearer).await.candidates
    }

    pub async fn resolve_entry(
        &self,
        intent: RoleIntent,
        bearer: Option<&str>,
    ) -> CachedCandidates {
        let category = intent.category();
        if let Some(entry) = self.cache.lock().await.get(category) {
            return entry.clone();
        }

        // The lock is released during the fetch; a concurrent caller may scan too.
        let mut table = match self.fetch_description(bearer).await {
            Some(document) => self.strategy.scan(&document),
            None => CandidateTable::default(),
        };

        let other = match category {
            IntentCategory::Role => IntentCategory::Approval,
            IntentCategory::Approval => IntentCategory::Role,
        };
        let other_entry = settle(other, table.take(other));
        let entry = settle(category, table.take(category));

        let mut cache = self.cache.lock().await;
        cache.insert(other, other_entry);
        cache.insert(category, entry).clone()
    }

    pub async fn execute(
        &self,
        intent: RoleIntent,
        user_id: &UserId,
        bearer: Option<&str>,
    ) -> Result<RoleChange, ResolveError> {
        if !user_id.is_addressable() {
            warn!(%intent, ?user_id, "refusing to address an empty or dot user id");
            return Err(ResolveError::InvalidUserId(user_id.clone()));
        }

        let candidates = self.resolve(intent, bearer).await;
        let mut last_detail = NOT_FOUND_DETAIL.to_string();

        for candidate in &candidates {
            let url = join_url(&self.base_url, &candidate.path_for(user_id, intent));
            let body = candidate.body_for(intent);
            debug!(%intent, method = %candidate.method, %url, "trying candidate");

            match self.send(&candidate.method, &url, body.as_ref(), bearer).await {
                Ok(status) => {
                    return Ok(self
                        .finish(intent, user_id, &candidate.method, url, status, bearer)
                        .await);
                }
                Err(AttemptError::MethodNotAllowed { allow, .. }) => {
                    let accepted = self
                        .renegotiate(
                            intent,
                            &candidate.method,
                            &url,
                            body.as_ref(),
                            allow,
                            bearer,
                            &mut last_detail,
                        )
                        .await;
                    if let Some((method, target, status)) = accepted {
                        let change =
                            self.finish(intent, user_id, &method, target, status, bearer).await;
                        return Ok(change);
                    }
                }
                Err(AttemptError::NotFound) => debug!(%url, "candidate path does not exist"),
                Err(err) => {
                    debug!(%url, "candidate failed: {err}");
                    if let Some(detail) = err.detail() {
                        last_detail = detail;
                    }
                }
            }
        }

        warn!(%intent, %user_id, detail = %last_detail, "all endpoint candidates failed");
        Err(ResolveError::ExhaustedCandidates {
            intent,
            user_id: user_id.clone(),
            detail: last_detail,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn renegotiate(
        &self,
        intent: RoleIntent,
        rejected: &Method,
        url: &str,
        body: Option<&Value>,
        allow: Vec<Method>,
        bearer: Option<&str>,
        last_detail: &mut String,
    ) -> Option<(Method, String, StatusCode)> {
        let advertised = if allow.is_empty() {
            self.options_allow(url, bearer).await
        } else {
            allow
        };
        let advertised = if advertised.is_empty() {
            vec![Method::PATCH, Method::PUT, Method::POST]
        } else {
            advertised
        };

        let mut methods: Vec<Method> = Vec::new();
        for method in advertised {
            if is_mutating(&method) && method != *rejected && !methods.contains(&method) {
                methods.push(method);
            }
        }
        debug!(%url, ?methods, "renegotiating method");

        for method in methods {
            let mut attempts: Vec<(String, Option<&Value>)> = Vec::new();
            if body.is_some() {
                attempts.push((url.to_string(), body));
            }
            attempts.push((url.to_string(), None));
            if method == Method::POST {
                attempts.push((format!("{url}?action={}", intent.verb()), None));
            }

            for (target, payload) in attempts {
                match self.send(&method, &target, payload, bearer).await {
                    Ok(status) => return Some((method, target, status)),
                    Err(err) => {
                        if let Some(detail) = err.detail() {
                            *last_detail = detail;
                        }
                    }
                }
            }
        }

        None
    }

    async fn send(
        &self,
        method: &Method,
        url: &str,
        body: Option<&Value>,
        bearer: Option<&str>,
    ) -> Result<StatusCode, AttemptError> {
        let mut request = with_bearer(self.client.request(method.clone(), url), bearer);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(status);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(AttemptError::NotFound);
        }

        let allow = response
            .headers()
            .get(ALLOW)
            .and_then(|value| value.to_str().ok())
            .map(parse_allow)
            .unwrap_or_default();
        let detail = response.text().await?;

        if status == StatusCode::METHOD_NOT_ALLOWED {
            Err(AttemptError::MethodNotAllowed { allow, detail })
        } else {
            Err(AttemptError::Http { status, detail })
        }
    }

    async fn options_allow(&self, url: &str, bearer: Option<&str>) -> Vec<Method> {
        match with_bearer(self.client.request(Method::OPTIONS, url), bearer).send().await {
            Ok(response) if response.status().is_success() => response
                .headers()
                .get(ALLOW)
                .and_then(|value| value.to_str().ok())
                .map(parse_allow)
                .unwrap_or_default(),
            Ok(response) => {
                debug!(%url, status = %response.status(), "options request rejected");
                Vec::new()
            }
            Err(err) => {
                debug!(%url, "options request failed: {err}");
                Vec::new()
            }
        }
    }

    async fn fetch_description(&self, bearer: Option<&str>) -> Option<Value> {
        let url = join_url(&self.base_url, &self.description_path);
        let response = match with_bearer(self.client.get(&url), bearer).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(%url, "api description unavailable: {err}");
                return None;
            }
        };
        if !response.status().is_success() {
            warn!(%url, status = %response.status(), "api description unavailable");
            return None;
        }
        match response.json::<Value>().await {
            Ok(document) => Some(document),
            Err(err) => {
                warn!(%url, "api description is not json: {err}");
                None
            }
        }
    }

    async fn finish(
        &self,
        intent: RoleIntent,
        user_id: &UserId,
        method: &Method,
        url: String,
        status: StatusCode,
        bearer: Option<&str>,
    ) -> RoleChange {
        info!(%intent, %user_id, %method, %url, "role change applied");
        let users = self.directory.refresh_users(bearer).await;

        RoleChange {
            intent,
            user_id: user_id.clone(),
            method: method.to_string(),
            url,
            status: status.as_u16(),
            users,
        }
    }
}

fn settle(category: IntentCategory, discovered: Vec<EndpointCandidate>) -> CachedCandidates {
    let discovered_at = Utc::now();
    if discovered.is_empty() {
        info!(?category, "no endpoints discovered, using fallback list");
        CachedCandidates {
            candidates: fallback_candidates(category),
            source: CandidateSource::Fallback,
            discovered_at,
        }
    } else {
        info!(?category, count = discovered.len(), "endpoints discovered");
        CachedCandidates {
            candidates: discovered,
            source: CandidateSource::Discovered,
            discovered_at,
        }
    }
}

fn is_mutating(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}

pub fn parse_allow(header: &str) -> Vec<Method> {
    header
        .split(',')
        .map(|token| token.trim().to_ascii_uppercase())
        .filter(|token| !token.is_empty())
        .filter_map(|token| Method::from_bytes(token.as_bytes()).ok())
        .collect()
}

pub(crate) fn with_bearer(request: RequestBuilder, bearer: Option<&str>) -> RequestBuilder {
    match bearer {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
