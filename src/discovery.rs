use crate::candidate::{EndpointCandidate, PayloadKind};
use crate::intent::IntentCategory;
use reqwest::Method;
use serde_json::Value;

/// `$ref` links followed along one branch before giving up (cycles).
const MAX_REF_HOPS: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateTable {
    role: Vec<EndpointCandidate>,
    approval: Vec<EndpointCandidate>,
}

impl CandidateTable {
    pub fn get(&self, category: IntentCategory) -> &[EndpointCandidate] {
        match category {
            IntentCategory::Role => &self.role,
            IntentCategory::Approval => &self.approval,
        }
    }

    pub fn push(&mut self, category: IntentCategory, candidate: EndpointCandidate) {
        let list = match category {
            IntentCategory::Role => &mut self.role,
            IntentCategory::Approval => &mut self.approval,
        };
        if !list.contains(&candidate) {
            list.push(candidate);
        }
    }

    pub fn take(&mut self, category: IntentCategory) -> Vec<EndpointCandidate> {
        match category {
            IntentCategory::Role => std::mem::take(&mut self.role),
            IntentCategory::Approval => std::mem::take(&mut self.approval),
        }
    }
}

/// Turns an API description document into candidate endpoints.
pub trait DiscoveryStrategy: Send + Sync {
    fn scan(&self, document: &Value) -> CandidateTable;
}

impl<F> DiscoveryStrategy for F
where
    F: Fn(&Value) -> CandidateTable + Send + Sync,
{
    fn scan(&self, document: &Value) -> CandidateTable {
        self(document)
    }
}

/// Name-and-schema heuristics over an OpenAPI `paths` object.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenApiScanner;

impl DiscoveryStrategy for OpenApiScanner {
    fn scan(&self, document: &Value) -> CandidateTable {
        let mut table = CandidateTable::default();
        let Some(paths) = document.get("paths").and_then(Value::as_object) else {
            return table;
        };

        for (path, item) in paths {
            let Some(operations) = item.as_object() else {
                continue;
            };
            let lower = path.to_ascii_lowercase();

            for (name, operation) in operations {
                let Some(method) = mutating_method(name) else {
                    continue;
                };

                if lower.contains("/users/")
                    && (lower.contains("role") || lower.contains("admin"))
                    && !lower.contains("approve")
                {
                    table.push(
                        IntentCategory::Role,
                        EndpointCandidate::new(
                            method.clone(),
                            path.as_str(),
                            PayloadKind::ToggleRole,
                        ),
                    );
                }

                if lower.contains("approve") && lower.contains("user") {
                    table.push(
                        IntentCategory::Approval,
                        EndpointCandidate::new(method.clone(), path.as_str(), PayloadKind::None),
                    );
                }

                if is_user_resource(&lower) {
                    let schema = request_schema(operation, document);
                    if mentions_field(&schema, "is_admin") {
                        table.push(
                            IntentCategory::Role,
                            EndpointCandidate::new(
                                method.clone(),
                                path.as_str(),
                                PayloadKind::Flags,
                            ),
                        );
                    }
                    if mentions_field(&schema, "is_employee")
                        || mentions_field(&schema, "is_approved")
                    {
                        table.push(
                            IntentCategory::Approval,
                            EndpointCandidate::new(
                                method.clone(),
                                path.as_str(),
                                PayloadKind::Flags,
                            ),
                        );
                    }
                }
            }
        }

        table
    }
}

pub fn fallback_candidates(category: IntentCategory) -> Vec<EndpointCandidate> {
    use PayloadKind::{Flags, Guess, ToggleRole};

    let ranked: Vec<(Method, &str, PayloadKind)> = match category {
        IntentCategory::Role => vec![
            (Method::PATCH, "/users/{id}", Flags),
            (Method::PUT, "/users/{id}", Flags),
            (Method::POST, "/users/{id}/role", ToggleRole),
            (Method::PUT, "/users/{id}/role", ToggleRole),
            (Method::POST, "/admin/users/{id}/{action}", PayloadKind::None),
            (Method::POST, "/users/{id}/admin", Guess),
            (Method::POST, "/admin/role/{id}", Guess),
            (Method::POST, "/users/role/{id}", Guess),
        ],
        IntentCategory::Approval => vec![
            (Method::POST, "/admin/approve_user/{id}", PayloadKind::None),
            (Method::POST, "/admin/users/{id}/approve", PayloadKind::None),
            (Method::POST, "/users/{id}/approve", PayloadKind::None),
            (Method::PATCH, "/users/{id}", Flags),
            (Method::PUT, "/users/{id}", Flags),
        ],
    };

    ranked
        .into_iter()
        .map(|(method, template, payload)| EndpointCandidate::new(method, template, payload))
        .collect()
}

fn mutating_method(name: &str) -> Option<Method> {
    match name.to_ascii_lowercase().as_str() {
        "post" => Some(Method::POST),
        "put" => Some(Method::PUT),
        "patch" => Some(Method::PATCH),
        _ => None,
    }
}

fn is_user_resource(lower_path: &str) -> bool {
    let segments: Vec<&str> = lower_path.trim_end_matches('/').rsplit('/').take(2).collect();
    match segments.as_slice() {
        [last, parent] => {
            *parent == "users" && matches!(last.trim_matches(&['{', '}'][..]), "id" | "user_id")
        }
        _ => false,
    }
}

fn request_schema(operation: &Value, document: &Value) -> Value {
    operation
        .pointer("/requestBody/content/application~1json")
        .map(|schema| inline_refs(schema, document, 0))
        .unwrap_or(Value::Null)
}

fn inline_refs(value: &Value, document: &Value, hops: usize) -> Value {
    match value {
        Value::Object(map) => {
            if let Some(target) = map.get("$ref").and_then(Value::as_str) {
                if hops >= MAX_REF_HOPS {
                    return Value::Null;
                }
                return target
                    .strip_prefix('#')
                    .and_then(|pointer| document.pointer(pointer))
                    .map(|resolved| inline_refs(resolved, document, hops + 1))
                    .unwrap_or(Value::Null);
            }
            Value::Object(
                map.iter()
                    .map(|(key, child)| (key.clone(), inline_refs(child, document, hops)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|child| inline_refs(child, document, hops))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn mentions_field(value: &Value, field: &str) -> bool {
    match value {
        Value::Object(map) => map
            .iter()
            .any(|(key, child)| key == field || mentions_field(child, field)),
        Value::Array(items) => items.iter().any(|child| mentions_field(child, field)),
        Value::String(text) => text == field,
        _ => false,
    }
}
