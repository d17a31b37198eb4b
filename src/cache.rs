use crate::candidate::EndpointCandidate;
use crate::intent::IntentCategory;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateSource {
    Discovered,
    Fallback,
}

#[derive(Debug, Clone, Serialize)]
pub struct CachedCandidates {
    pub candidates: Vec<EndpointCandidate>,
    pub source: CandidateSource,
    pub discovered_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct EndpointCache {
    role: Option<CachedCandidates>,
    approval: Option<CachedCandidates>,
}

impl EndpointCache {
    pub fn get(&self, category: IntentCategory) -> Option<&CachedCandidates> {
        self.slot(category).as_ref()
    }

    /// Keeps an existing entry; the first completed discovery wins.
    pub fn insert(
        &mut self,
        category: IntentCategory,
        entry: CachedCandidates,
    ) -> &CachedCandidates {
        let slot = match category {
            IntentCategory::Role => &mut self.role,
            IntentCategory::Approval => &mut self.approval,
        };
        slot.get_or_insert(entry)
    }

    pub fn clear(&mut self) {
        self.role = None;
        self.approval = None;
    }

    fn slot(&self, category: IntentCategory) -> &Option<CachedCandidates> {
        match category {
            IntentCategory::Role => &self.role,
            IntentCategory::Approval => &self.approval,
        }
    }
}
