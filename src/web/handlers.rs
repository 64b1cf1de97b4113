//! HTTP request handlers

use super::error::ApiError;
use super::state::AppState;
use crate::cache::page_cache_key;
use crate::error::RepositoryResult;
use crate::metrics::MetricsSnapshot;
use crate::models::{Course, Degree, Instructor, Major, Minor};
use crate::repository::Page;
use crate::results::{ResultType, SearchResponse};
use crate::search::SearchQuery;
use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::future::Future;
use tracing::{debug, warn};

/// Paged list of records
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total_count: usize,
}

impl<T> From<Page<T>> for ListResponse<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            items: page.items,
            total_count: page.total,
        }
    }
}

/// Query parameters for listings. Kept as strings so bad integers become
/// validation errors instead of extractor rejections.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub skip: Option<String>,
    pub take: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MajorParams {
    pub degree_id: Option<String>,
}

/// Search handler
///
/// Accepts `q`, repeated `types[]` or `types` values (comma-separated lists
/// allowed), `skip` and `take`.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<SearchResponse>, ApiError> {
    let mut query = SearchQuery::simple("");

    for (key, value) in params {
        match key.as_str() {
            "q" => query.query_text = value,
            "types" | "types[]" => {
                for name in value.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                    let result_type = ResultType::parse(name).ok_or_else(|| {
                        ApiError::validation(format!("Unknown result type '{}'", name))
                    })?;
                    query.result_types.push(result_type);
                }
            }
            "skip" => query.skip = parse_int("skip", &value)?,
            "take" => query.take = Some(parse_int("take", &value)?),
            _ => debug!("Ignoring search parameter '{}'", key),
        }
    }

    let response = state.search.execute(&query).await?;
    Ok(Json(response))
}

fn parse_int(name: &str, value: &str) -> Result<i64, ApiError> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::validation(format!("{} must be an integer, got '{}'", name, value)))
}

/// Clamp listing parameters with the same policy as search
fn page_bounds(state: &AppState, params: &PageParams) -> Result<(usize, usize), ApiError> {
    let skip = params
        .skip
        .as_deref()
        .map(|v| parse_int("skip", v))
        .transpose()?;
    let take = params
        .take
        .as_deref()
        .map(|v| parse_int("take", v))
        .transpose()?;
    Ok(state.search.limits().clamp_page(skip, take))
}

/// Serve one listing page, going through the cache when it is enabled
async fn cached_page<T, F, Fut>(
    state: &AppState,
    resource: &str,
    params: &PageParams,
    fetch: F,
) -> Result<Json<ListResponse<T>>, ApiError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce(usize, usize) -> Fut,
    Fut: Future<Output = RepositoryResult<Page<T>>>,
{
    let (skip, take) = page_bounds(state, params)?;

    let Some(cache) = &state.cache else {
        return Ok(Json(fetch(take, skip).await?.into()));
    };

    let key = page_cache_key(resource, skip, take);
    if let Some(bytes) = cache.get(&key).await {
        match serde_json::from_slice::<ListResponse<T>>(&bytes) {
            Ok(page) => {
                state.metrics.record_cache(true);
                return Ok(Json(page));
            }
            Err(e) => warn!("Discarding unreadable cache entry for {}: {}", resource, e),
        }
    }
    state.metrics.record_cache(false);

    let page: ListResponse<T> = fetch(take, skip).await?.into();
    match serde_json::to_vec(&page) {
        Ok(bytes) => cache.set(key, bytes).await,
        Err(e) => warn!("Failed to cache {} page: {}", resource, e),
    }
    Ok(Json(page))
}

fn found<T>(record: Option<T>, kind: &str, id: &str) -> Result<Json<T>, ApiError> {
    record
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("{} '{}'", kind, id)))
}

pub async fn list_courses(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<ListResponse<Course>>, ApiError> {
    let courses = state.repositories.courses.clone();
    cached_page(&state, "courses", &params, |take, skip| async move {
        courses.list(take, skip).await
    })
    .await
}

pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Course>, ApiError> {
    let course = state.repositories.courses.get(&id).await?;
    found(course, "Course", &id)
}

pub async fn list_instructors(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<ListResponse<Instructor>>, ApiError> {
    let instructors = state.repositories.instructors.clone();
    cached_page(&state, "instructors", &params, |take, skip| async move {
        instructors.list(take, skip).await
    })
    .await
}

pub async fn get_instructor(
    State(state): State<AppState>,
    Path(ucinetid): Path<String>,
) -> Result<Json<Instructor>, ApiError> {
    let instructor = state.repositories.instructors.get(&ucinetid).await?;
    found(instructor, "Instructor", &ucinetid)
}

pub async fn list_degrees(State(state): State<AppState>) -> Result<Json<Vec<Degree>>, ApiError> {
    Ok(Json(state.repositories.programs.list_degrees().await?))
}

pub async fn get_degree(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Degree>, ApiError> {
    let degree = state.repositories.programs.get_degree(&id).await?;
    found(degree, "Degree", &id)
}

/// Majors, optionally filtered by `degreeId`
pub async fn list_majors(
    State(state): State<AppState>,
    Query(params): Query<MajorParams>,
) -> Result<Json<Vec<Major>>, ApiError> {
    let majors = state
        .repositories
        .programs
        .list_majors(params.degree_id.as_deref())
        .await?;
    Ok(Json(majors))
}

pub async fn get_major(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Major>, ApiError> {
    let major = state.repositories.programs.get_major(&id).await?;
    found(major, "Major", &id)
}

pub async fn list_minors(State(state): State<AppState>) -> Result<Json<Vec<Minor>>, ApiError> {
    Ok(Json(state.repositories.programs.list_minors().await?))
}

pub async fn get_minor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Minor>, ApiError> {
    let minor = state.repositories.programs.get_minor(&id).await?;
    found(minor, "Minor", &id)
}

/// GraphQL endpoint handler
pub async fn graphql(
    State(state): State<AppState>,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    Json(state.schema.execute(request).await)
}

/// GraphiQL IDE
pub async fn graphiql() -> impl IntoResponse {
    Html(
        async_graphql::http::GraphiQLSource::build()
            .endpoint("/graphql")
            .finish(),
    )
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "instanceName": state.instance_name(),
        "version": crate::VERSION
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub instance_name: String,
    pub cache_entries: u64,
    #[serde(flatten)]
    pub metrics: MetricsSnapshot,
}

/// Runtime counters
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        instance_name: state.instance_name().to_string(),
        cache_entries: state.cache.as_ref().map(|c| c.size()).unwrap_or(0),
        metrics: state.metrics.snapshot(),
    })
}
