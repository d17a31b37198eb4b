use crate::resolver::EndpointResolver;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<EndpointResolver>,
}

impl AppState {
    pub fn new(resolver: EndpointResolver) -> Self {
        Self {
            resolver: Arc::new(resolver),
        }
    }
}
