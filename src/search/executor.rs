//! Search execution and orchestration

use super::models::{SearchLimits, SearchQuery, ValidatedQuery};
use crate::cache::{search_cache_key, ResultCache};
use crate::error::{RepositoryError, SearchError};
use crate::metrics::Metrics;
use crate::query::normalize;
use crate::repository::{CourseRepository, InstructorRepository, Matches, Repositories};
use crate::results::{ResultContainer, ResultType, SearchResponse};
use futures::future::try_join;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Search aggregator that fans a query out to the course and instructor
/// repositories and merges their hits into one ranked page.
///
/// Stateless apart from injected handles, so one instance serves every
/// request concurrently.
#[derive(Clone)]
pub struct Search {
    courses: Arc<dyn CourseRepository>,
    instructors: Arc<dyn InstructorRepository>,
    limits: SearchLimits,
    /// Time limit for each repository query
    timeout: Duration,
    cache: Option<ResultCache>,
    metrics: Option<Arc<Metrics>>,
}

impl Search {
    /// Create a new search aggregator
    pub fn new(repositories: &Repositories) -> Self {
        Self {
            courses: repositories.courses.clone(),
            instructors: repositories.instructors.clone(),
            limits: SearchLimits::default(),
            timeout: Duration::from_secs(5),
            cache: None,
            metrics: None,
        }
    }

    /// Set paging limits
    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the per-repository timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Cache serialized responses
    pub fn with_cache(mut self, cache: Option<ResultCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn limits(&self) -> &SearchLimits {
        &self.limits
    }

    /// Validate and run a search, serving repeated queries from the cache
    pub async fn execute(&self, query: &SearchQuery) -> Result<SearchResponse, SearchError> {
        let query = match query.validate(&self.limits) {
            Ok(query) => query,
            Err(e) => {
                if let Some(metrics) = &self.metrics {
                    metrics.inc_rejected();
                }
                return Err(e);
            }
        };
        if let Some(metrics) = &self.metrics {
            metrics.inc_search();
        }

        let Some(cache) = &self.cache else {
            return self.run(&query).await;
        };

        let key = search_cache_key(&normalize(&query.text), &query.types, query.skip, query.take);
        if let Some(bytes) = cache.get(&key).await {
            match serde_json::from_slice::<SearchResponse>(&bytes) {
                Ok(response) => {
                    self.record_cache(true);
                    debug!("Cache hit for search '{}'", query.text);
                    return Ok(response);
                }
                Err(e) => warn!("Discarding unreadable cache entry: {}", e),
            }
        }
        self.record_cache(false);

        let response = self.run(&query).await?;
        match serde_json::to_vec(&response) {
            Ok(bytes) => cache.set(key, bytes).await,
            Err(e) => warn!("Failed to cache search response: {}", e),
        }
        Ok(response)
    }

    /// Run an already validated query against the repositories
    pub async fn run(&self, query: &ValidatedQuery) -> Result<SearchResponse, SearchError> {
        let window = query.window();
        let text = query.text.as_str();

        info!(
            "Executing search '{}' on {} sources (skip {}, take {})",
            text,
            query.types.len(),
            query.skip,
            query.take
        );

        let courses = async {
            if !query.wants(ResultType::Course) {
                return Ok(None);
            }
            self.search_source(ResultType::Course, self.courses.find_by_text(text, window, 0))
                .await
                .map(Some)
        };
        let instructors = async {
            if !query.wants(ResultType::Instructor) {
                return Ok(None);
            }
            self.search_source(
                ResultType::Instructor,
                self.instructors.find_by_text(text, window, 0),
            )
            .await
            .map(Some)
        };

        // Fail fast: the first repository error drops the other query.
        let (courses, instructors) = try_join(courses, instructors).await?;

        let mut container = ResultContainer::new();
        if let Some(matches) = courses {
            container.add_courses(matches);
        }
        if let Some(matches) = instructors {
            container.add_instructors(matches);
        }

        debug!(
            "Search '{}' merged {} of {} matches",
            text,
            container.result_count(),
            container.total_count()
        );

        Ok(container.into_response(query.skip, query.take))
    }

    /// Await one repository query under the timeout, recording metrics
    async fn search_source<T, F>(
        &self,
        source: ResultType,
        query: F,
    ) -> Result<Matches<T>, SearchError>
    where
        F: Future<Output = Result<Matches<T>, RepositoryError>>,
    {
        let start = Instant::now();
        let result = timeout(self.timeout, query).await;
        let elapsed = start.elapsed();

        let error = match result {
            Ok(Ok(matches)) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_source_query(source.as_str(), elapsed.as_millis() as u64);
                }
                debug!(
                    "Source {} returned {} matches in {:?}",
                    source, matches.total, elapsed
                );
                return Ok(matches);
            }
            Ok(Err(e)) => e,
            Err(_) => RepositoryError::Timeout(source.to_string()),
        };

        error!("Search on {} failed: {}", source, error);
        if let Some(metrics) = &self.metrics {
            metrics.record_error(source.as_str());
        }
        Err(error.into())
    }

    fn record_cache(&self, hit: bool) {
        if let Some(metrics) = &self.metrics {
            metrics.record_cache(hit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogSnapshot, Course, Instructor};
    use crate::error::RepositoryResult;
    use crate::repository::{MemoryCatalog, Page};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fixture() -> Repositories {
        Repositories::from_catalog(MemoryCatalog::new(CatalogSnapshot {
            courses: vec![
                Course::new("COMPSCI", "161", "Design and Analysis of Algorithms"),
                Course::new("COMPSCI", "162", "Formal Languages and Automata"),
                Course::new("ART", "1", "Drawing"),
            ],
            instructors: vec![
                Instructor::new("mikes", "Michael Shindler").with_courses(&["COMPSCI161"]),
                Instructor::new("thornton", "Alex Thornton"),
            ],
            ..Default::default()
        }))
    }

    /// Course repository that counts calls and can be told to fail or stall
    struct StubCourses {
        calls: AtomicUsize,
        fail: bool,
        stall: bool,
    }

    impl StubCourses {
        fn new(fail: bool, stall: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
                stall,
            }
        }
    }

    #[async_trait]
    impl CourseRepository for StubCourses {
        async fn find_by_text(
            &self,
            _text: &str,
            _limit: usize,
            _offset: usize,
        ) -> RepositoryResult<Matches<Course>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.stall {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            if self.fail {
                return Err(RepositoryError::Database("disk I/O error".to_string()));
            }
            Ok(Matches::empty())
        }

        async fn get(&self, _id: &str) -> RepositoryResult<Option<Course>> {
            Ok(None)
        }

        async fn get_many(&self, _ids: &[String]) -> RepositoryResult<Vec<Course>> {
            Ok(vec![])
        }

        async fn list(&self, _limit: usize, _offset: usize) -> RepositoryResult<Page<Course>> {
            Ok(Page {
                items: vec![],
                total: 0,
            })
        }
    }

    fn with_courses(courses: Arc<StubCourses>) -> Search {
        let mut repos = fixture();
        repos.courses = courses;
        Search::new(&repos)
    }

    #[tokio::test]
    async fn test_merges_both_sources() {
        let search = Search::new(&fixture());
        let response = search.execute(&SearchQuery::simple("COMPSCI 161")).await.unwrap();

        // COMPSCI 161 exact, the instructor via taught course, COMPSCI 162 via similarity
        assert_eq!(response.items[0].id(), "COMPSCI161");
        assert_eq!(response.items[1].id(), "mikes");
        assert_eq!(response.items[0].score(), response.items[1].score());
        assert!(response.total_count >= response.items.len());
    }

    #[tokio::test]
    async fn test_type_filter_skips_repository() {
        let courses = Arc::new(StubCourses::new(true, false));
        let search = with_courses(courses.clone());

        let query = SearchQuery::simple("shindler").with_types(&[ResultType::Instructor]);
        let response = search.execute(&query).await.unwrap();

        assert_eq!(courses.calls.load(Ordering::SeqCst), 0);
        assert_eq!(response.total_count, 1);
        assert_eq!(response.items[0].result_type(), ResultType::Instructor);
    }

    #[tokio::test]
    async fn test_validation_happens_before_io() {
        let courses = Arc::new(StubCourses::new(false, false));
        let search = with_courses(courses.clone());

        let err = search.execute(&SearchQuery::simple("  ")).await.unwrap_err();
        assert!(matches!(err, SearchError::Validation(_)));
        assert_eq!(courses.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_repository_failure_fails_whole_search() {
        let search = with_courses(Arc::new(StubCourses::new(true, false)));
        let err = search.execute(&SearchQuery::simple("thornton")).await.unwrap_err();
        assert!(matches!(
            err,
            SearchError::Repository(RepositoryError::Database(_))
        ));
    }

    #[tokio::test]
    async fn test_stalled_repository_times_out() {
        let search = with_courses(Arc::new(StubCourses::new(false, true)))
            .with_timeout(Duration::from_millis(20));
        let err = search.execute(&SearchQuery::simple("thornton")).await.unwrap_err();
        assert_eq!(
            err,
            SearchError::Repository(RepositoryError::Timeout("course".to_string()))
        );
    }

    #[tokio::test]
    async fn test_cache_serves_repeat_queries() {
        let metrics = Arc::new(Metrics::new());
        let search = Search::new(&fixture())
            .with_cache(Some(ResultCache::new(60, 100)))
            .with_metrics(metrics.clone());

        let first = search.execute(&SearchQuery::simple("COMPSCI 161")).await.unwrap();
        let second = search.execute(&SearchQuery::simple("compsci161")).await.unwrap();

        assert_eq!(first, second);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.cache_misses, 1);
        assert_eq!(snapshot.cache_hits, 1);
        assert_eq!(snapshot.total_searches, 2);
    }
}
