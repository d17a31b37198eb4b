use crate::candidate::{EndpointCandidate, PayloadKind};
use crate::errors::AttemptError;
use crate::intent::{RoleIntent, UserId};
use crate::resolver::{join_url, with_bearer};
use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const PROFILE_PATHS: [&str; 3] = ["/users/me", "/auth/me", "/me"];
pub const PENDING_USERS_PATH: &str = "/admin/pending_users";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_employee: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<UserId>,
}

/// Read side of the backend's user collection, plus the employee self-flag.
#[derive(Debug, Clone)]
pub struct UserDirectory {
    client: Client,
    base_url: String,
    users_path: String,
}

impl UserDirectory {
    pub fn new(client: Client, base_url: impl Into<String>, users_path: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            users_path: users_path.into(),
        }
    }

    /// Current user list; `None` when the backend would not hand it out.
    pub async fn refresh_users(&self, bearer: Option<&str>) -> Option<Vec<UserRecord>> {
        match self.fetch_users(&self.users_path, bearer).await {
            Ok(users) => Some(users),
            Err(err) => {
                warn!("user list refresh failed: {err}");
                None
            }
        }
    }

    /// Users still waiting for approval.
    pub async fn pending_users(
        &self,
        bearer: Option<&str>,
    ) -> Result<Vec<UserRecord>, AttemptError> {
        self.fetch_users(PENDING_USERS_PATH, bearer).await
    }

    /// First profile path that answers with a user object.
    pub async fn current_profile(&self, bearer: Option<&str>) -> Option<UserRecord> {
        for path in PROFILE_PATHS {
            let url = join_url(&self.base_url, path);
            let response = match with_bearer(self.client.get(&url), bearer).send().await {
                Ok(response) if response.status().is_success() => response,
                Ok(response) => {
                    debug!(%url, status = %response.status(), "profile path rejected");
                    continue;
                }
                Err(err) => {
                    debug!(%url, "profile request failed: {err}");
                    continue;
                }
            };
            match response.json::<UserRecord>().await {
                Ok(profile) => return Some(profile),
                Err(err) => debug!(%url, "profile body not a user: {err}"),
            }
        }
        None
    }

    /// Marks `user_id` as an employee through the user resource, PATCH first
    /// then PUT. Returns whether either write was accepted.
    pub async fn ensure_employee_flag(&self, user_id: &UserId, bearer: Option<&str>) -> bool {
        if !user_id.is_addressable() {
            return false;
        }

        for method in [Method::PATCH, Method::PUT] {
            let candidate = EndpointCandidate::new(method, "/users/{id}", PayloadKind::Flags);
            let url = join_url(&self.base_url, &candidate.path_for(user_id, RoleIntent::Approve));
            let mut request =
                with_bearer(self.client.request(candidate.method.clone(), &url), bearer);
            if let Some(body) = candidate.body_for(RoleIntent::Approve) {
                request = request.json(&body);
            }

            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    info!(%user_id, method = %candidate.method, "employee flag set");
                    return true;
                }
                Ok(response) => {
                    debug!(%url, status = %response.status(), "employee flag rejected");
                }
                Err(err) => debug!(%url, "employee flag request failed: {err}"),
            }
        }
        false
    }

    async fn fetch_users(
        &self,
        path: &str,
        bearer: Option<&str>,
    ) -> Result<Vec<UserRecord>, AttemptError> {
        let url = join_url(&self.base_url, path);
        let response = with_bearer(self.client.get(&url), bearer).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AttemptError::NotFound);
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AttemptError::Http { status, detail });
        }
        Ok(response.json().await?)
    }
}
