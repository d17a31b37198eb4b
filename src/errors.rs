use crate::intent::{RoleIntent, UserId};
use axum::http::StatusCode;
use reqwest::Method;
use thiserror::Error;

/// Outcome of a single request against one candidate endpoint.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),
    #[error("not found")]
    NotFound,
    #[error("method not allowed: {detail}")]
    MethodNotAllowed { allow: Vec<Method>, detail: String },
    #[error("http {status}: {detail}")]
    Http {
        status: reqwest::StatusCode,
        detail: String,
    },
}

impl AttemptError {
    /// Text worth surfacing to the caller. A 404 only means the path is absent.
    pub fn detail(&self) -> Option<String> {
        match self {
            AttemptError::Network(err) => Some(err.to_string()),
            AttemptError::NotFound => None,
            AttemptError::MethodNotAllowed { detail, .. } | AttemptError::Http { detail, .. } => {
                Some(detail.clone())
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("user id '{0}' does not address a single user")]
    InvalidUserId(UserId),
    #[error("could not {intent} user {user_id}: {detail}")]
    ExhaustedCandidates {
        intent: RoleIntent,
        user_id: UserId,
        detail: String,
    },
}

impl ResolveError {
    pub fn detail(&self) -> String {
        match self {
            ResolveError::InvalidUserId(_) => self.to_string(),
            ResolveError::ExhaustedCandidates { detail, .. } => detail.clone(),
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        let status = match err {
            ResolveError::InvalidUserId(_) => StatusCode::BAD_REQUEST,
            ResolveError::ExhaustedCandidates { .. } => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: err.detail(),
        }
    }
}

impl From<AttemptError> for AppError {
    fn from(err: AttemptError) -> Self {
        match err {
            AttemptError::NotFound => Self::not_found("backend does not offer this resource"),
            other => Self {
                status: StatusCode::BAD_GATEWAY,
                message: other.detail().unwrap_or_else(|| other.to_string()),
            },
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_ids_are_client_errors() {
        let err = AppError::from(ResolveError::InvalidUserId(UserId::from("")));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn exhaustion_reports_the_last_detail() {
        let err = AppError::from(ResolveError::ExhaustedCandidates {
            intent: RoleIntent::Promote,
            user_id: UserId::from(2u64),
            detail: "forbidden".to_string(),
        });
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(err.message, "forbidden");
    }

    #[test]
    fn missing_backend_resource_is_not_found() {
        assert_eq!(AppError::from(AttemptError::NotFound).status, StatusCode::NOT_FOUND);
    }
}
