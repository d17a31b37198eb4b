pub mod app;
pub mod cache;
pub mod candidate;
pub mod config;
pub mod directory;
pub mod discovery;
pub mod errors;
pub mod handlers;
pub mod intent;
pub mod models;
pub mod resolver;
pub mod state;

pub use app::router;
pub use candidate::{EndpointCandidate, PayloadKind};
pub use config::GatewayConfig;
pub use discovery::{CandidateTable, DiscoveryStrategy, OpenApiScanner};
pub use errors::ResolveError;
pub use intent::{IntentCategory, RoleIntent, UserId};
pub use resolver::{EndpointResolver, RoleChange};
pub use state::AppState;
