use crate::cache::{CachedCandidates, CandidateSource};
use crate::candidate::EndpointCandidate;
use crate::intent::{IntentCategory, RoleIntent, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct EndpointsResponse {
    pub intent: RoleIntent,
    pub category: IntentCategory,
    pub source: CandidateSource,
    pub discovered_at: DateTime<Utc>,
    pub candidates: Vec<EndpointCandidate>,
}

impl EndpointsResponse {
    pub fn new(intent: RoleIntent, entry: CachedCandidates) -> Self {
        Self {
            intent,
            category: intent.category(),
            source: entry.source,
            discovered_at: entry.discovered_at,
            candidates: entry.candidates,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EmployeeFlagResponse {
    pub user_id: UserId,
    pub is_employee: bool,
}
