use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleIntent {
    Promote,
    Demote,
    Approve,
}

/// Promote and demote are served by the same endpoints, approval has its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentCategory {
    Role,
    Approval,
}

impl RoleIntent {
    pub const ALL: [RoleIntent; 3] = [RoleIntent::Promote, RoleIntent::Demote, RoleIntent::Approve];

    pub fn category(self) -> IntentCategory {
        match self {
            RoleIntent::Promote | RoleIntent::Demote => IntentCategory::Role,
            RoleIntent::Approve => IntentCategory::Approval,
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            RoleIntent::Promote => "promote",
            RoleIntent::Demote => "demote",
            RoleIntent::Approve => "approve",
        }
    }

    /// Role name the user ends up with.
    pub fn target_role(self) -> &'static str {
        match self {
            RoleIntent::Promote => "admin",
            RoleIntent::Demote | RoleIntent::Approve => "employee",
        }
    }
}

impl fmt::Display for RoleIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownIntent(pub String);

impl fmt::Display for UnknownIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role intent '{}' (expected promote, demote or approve)", self.0)
    }
}

impl std::error::Error for UnknownIntent {}

impl FromStr for RoleIntent {
    type Err = UnknownIntent;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "promote" => Ok(RoleIntent::Promote),
            "demote" => Ok(RoleIntent::Demote),
            "approve" => Ok(RoleIntent::Approve),
            _ => Err(UnknownIntent(value.to_string())),
        }
    }
}

/// Opaque user identifier; backends hand out either numbers or strings and
/// get the same JSON form back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Number(i64),
    Text(String),
}

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Empty ids and dot segments would address a different resource.
    pub fn is_addressable(&self) -> bool {
        match self {
            UserId::Number(_) => true,
            UserId::Text(text) => {
                let text = text.trim();
                !text.is_empty() && text != "." && text != ".."
            }
        }
    }

    /// The id as a single percent-encoded path segment.
    pub fn path_segment(&self) -> String {
        match self {
            UserId::Number(value) => value.to_string(),
            UserId::Text(text) => urlencoding::encode(text).into_owned(),
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Number(value) => write!(f, "{value}"),
            UserId::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<u64> for UserId {
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(Self::Number)
            .unwrap_or_else(|_| Self::Text(value.to_string()))
    }
}
