use crate::resolver::{DEFAULT_DESCRIPTION_PATH, DEFAULT_USERS_PATH};
use std::{env, net::SocketAddr};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub port: u16,
    pub backend_url: String,
    pub description_path: String,
    pub users_path: String,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str, default: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            port: lookup("PORT")
                .and_then(|value| value.trim().parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
            backend_url: value("ROLE_GATEWAY_BACKEND_URL", DEFAULT_BACKEND_URL),
            description_path: value("ROLE_GATEWAY_OPENAPI_PATH", DEFAULT_DESCRIPTION_PATH),
            users_path: value("ROLE_GATEWAY_USERS_PATH", DEFAULT_USERS_PATH),
        }
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
