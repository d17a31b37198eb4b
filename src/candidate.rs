use crate::intent::{RoleIntent, UserId};
use reqwest::Method;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    None,
    Flags,
    ToggleRole,
    Guess,
}

impl PayloadKind {
    pub fn body_for(self, intent: RoleIntent) -> Option<Value> {
        match (self, intent) {
            (PayloadKind::None, _) => None,
            (PayloadKind::Flags, RoleIntent::Promote) => Some(json!({ "is_admin": true })),
            (PayloadKind::Flags, RoleIntent::Demote) => Some(json!({ "is_admin": false })),
            (PayloadKind::Flags, RoleIntent::Approve) => Some(json!({ "is_employee": true })),
            (PayloadKind::ToggleRole, intent) => Some(json!({ "role": intent.target_role() })),
            (PayloadKind::Guess, RoleIntent::Approve) => {
                Some(json!({ "is_employee": true, "is_approved": true }))
            }
            (PayloadKind::Guess, intent) => Some(json!({
                "is_admin": intent == RoleIntent::Promote,
                "role": intent.target_role(),
            })),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointCandidate {
    #[serde(serialize_with = "method_name")]
    pub method: Method,
    pub url_template: String,
    pub payload: PayloadKind,
}

impl EndpointCandidate {
    pub fn new(method: Method, url_template: impl Into<String>, payload: PayloadKind) -> Self {
        Self {
            method,
            url_template: url_template.into(),
            payload,
        }
    }

    /// Path with `{id}`, `{user_id}` and `{action}` filled in. The id always
    /// stays a single segment.
    pub fn path_for(&self, user_id: &UserId, intent: RoleIntent) -> String {
        let segment = user_id.path_segment();
        self.url_template
            .replace("{id}", &segment)
            .replace("{user_id}", &segment)
            .replace("{action}", intent.verb())
    }

    pub fn body_for(&self, intent: RoleIntent) -> Option<Value> {
        self.payload.body_for(intent)
    }
}

fn method_name<S: Serializer>(method: &Method, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(method.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_substitutes_every_placeholder() {
        let user = UserId::from(12u64);
        let by_id =
            EndpointCandidate::new(Method::POST, "/admin/users/{id}/{action}", PayloadKind::None);
        let by_user_id =
            EndpointCandidate::new(Method::PATCH, "/users/{user_id}", PayloadKind::Flags);

        assert_eq!(by_id.path_for(&user, RoleIntent::Demote), "/admin/users/12/demote");
        assert_eq!(by_user_id.path_for(&user, RoleIntent::Promote), "/users/12");
    }

    #[test]
    fn slashes_in_ids_do_not_escape_the_segment() {
        let candidate = EndpointCandidate::new(Method::PATCH, "/users/{id}", PayloadKind::Flags);
        assert_eq!(
            candidate.path_for(&UserId::from("2/../3"), RoleIntent::Promote),
            "/users/2%2F..%2F3"
        );
    }

    #[test]
    fn flags_payload_follows_intent() {
        assert_eq!(
            PayloadKind::Flags.body_for(RoleIntent::Promote),
            Some(json!({ "is_admin": true }))
        );
        assert_eq!(
            PayloadKind::Flags.body_for(RoleIntent::Demote),
            Some(json!({ "is_admin": false }))
        );
        assert_eq!(
            PayloadKind::Flags.body_for(RoleIntent::Approve),
            Some(json!({ "is_employee": true }))
        );
    }

    #[test]
    fn toggle_role_sends_role_name() {
        assert_eq!(
            PayloadKind::ToggleRole.body_for(RoleIntent::Promote),
            Some(json!({ "role": "admin" }))
        );
        assert_eq!(
            PayloadKind::ToggleRole.body_for(RoleIntent::Demote),
            Some(json!({ "role": "employee" }))
        );
    }

    #[test]
    fn guess_payload_is_a_superset_of_flags() {
        for intent in RoleIntent::ALL {
            let flags = PayloadKind::Flags.body_for(intent).unwrap();
            let guess = PayloadKind::Guess.body_for(intent).unwrap();
            for (key, value) in flags.as_object().unwrap() {
                assert_eq!(guess.get(key), Some(value), "{intent}: {key}");
            }
        }
    }

    #[test]
    fn none_payload_has_no_body() {
        for intent in RoleIntent::ALL {
            assert!(PayloadKind::None.body_for(intent).is_none());
        }
    }

    #[test]
    fn candidates_serialize_method_as_text() {
        let candidate = EndpointCandidate::new(Method::PUT, "/users/{id}", PayloadKind::Flags);
        let value = serde_json::to_value(&candidate).unwrap();
        assert_eq!(value["method"], "PUT");
        assert_eq!(value["payload"], "flags");
    }
}
