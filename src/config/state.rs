// Application state module
// Immutable state shared by every connection task

use std::sync::Arc;

use super::types::Config;
use crate::proxy::Upstream;
use crate::routing::TargetResolver;

/// Application state
///
/// Built once at startup; request tasks only ever read it, so it is shared
/// through a plain `Arc` with no locking.
pub struct AppState {
    pub config: Config,
    pub resolver: TargetResolver,
    pub upstream: Arc<dyn Upstream>,
}

impl AppState {
    pub fn new(config: Config, upstream: Arc<dyn Upstream>) -> Self {
        let resolver = TargetResolver::new(&config.upstream.region, &config.upstream.domain);
        Self {
            config,
            resolver,
            upstream,
        }
    }
}
