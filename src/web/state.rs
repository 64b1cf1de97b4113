//! Application state shared across handlers

use crate::cache::ResultCache;
use crate::config::Settings;
use crate::graphql::{create_schema, GraphQLSchema};
use crate::metrics::Metrics;
use crate::repository::Repositories;
use crate::search::{Search, SearchLimits};
use std::sync::Arc;
use std::time::Duration;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Catalog repositories
    pub repositories: Repositories,
    /// Search aggregator
    pub search: Search,
    pub schema: GraphQLSchema,
    /// Cache for list pages; search responses are cached inside `search`
    pub cache: Option<ResultCache>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Wire the aggregator, cache, metrics and GraphQL schema over the repositories
    pub fn new(settings: Settings, repositories: Repositories) -> Self {
        let metrics = Arc::new(Metrics::new());
        let cache = ResultCache::from_settings(&settings.cache);

        let search = Search::new(&repositories)
            .with_limits(SearchLimits {
                default_take: settings.search.default_take as usize,
                max_take: settings.search.max_take as usize,
            })
            .with_timeout(Duration::from_secs_f64(settings.search.timeout_secs))
            .with_cache(cache.clone())
            .with_metrics(metrics.clone());

        let schema = create_schema(repositories.clone(), search.clone());

        Self {
            settings: Arc::new(settings),
            repositories,
            search,
            schema,
            cache,
            metrics,
        }
    }

    /// Get instance name
    pub fn instance_name(&self) -> &str {
        &self.settings.general.instance_name
    }
}
