//! End-to-end tests driving the axum router over the fixture catalog

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use catalog_api::{
    config::Settings,
    models::CatalogSnapshot,
    repository::{MemoryCatalog, Repositories, SqliteCatalog},
    web::{create_router, AppState},
};
use serde_json::{json, Value};
use tower::ServiceExt;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/catalog.json");

fn snapshot() -> CatalogSnapshot {
    CatalogSnapshot::from_file(FIXTURE).unwrap()
}

fn memory_app() -> Router {
    let repositories = Repositories::from_catalog(MemoryCatalog::new(snapshot()));
    create_router(AppState::new(Settings::default(), repositories))
}

fn sqlite_app() -> Router {
    let catalog = SqliteCatalog::open(":memory:").unwrap();
    catalog.import(&snapshot()).unwrap();
    create_router(AppState::new(Settings::default(), Repositories::from_catalog(catalog)))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn ids(body: &Value) -> Vec<String> {
    body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| {
            item.get("id")
                .or_else(|| item.get("ucinetid"))
                .and_then(Value::as_str)
                .unwrap()
                .to_string()
        })
        .collect()
}

#[tokio::test]
async fn search_merges_courses_and_instructors() {
    let app = memory_app();
    let (status, body) = get(
        &app,
        "/search?q=COMPSCI%20161&types%5B%5D=course&types%5B%5D=instructor&skip=0&take=5",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], json!(4));
    assert_eq!(
        ids(&body),
        vec!["COMPSCI161", "mikes", "COMPSCI162", "COMPSCI163"]
    );

    let items = body["items"].as_array().unwrap();
    assert_eq!(items[0]["type"], json!("course"));
    assert_eq!(items[0]["score"], json!(1.0));
    assert_eq!(items[0]["title"], json!("Design and Analysis of Algorithms"));
    assert_eq!(items[1]["type"], json!("instructor"));
    assert_eq!(items[1]["score"], items[0]["score"]);
    assert_eq!(items[1]["name"], json!("Michael Shindler"));
}

#[tokio::test]
async fn search_results_are_ordered_and_bounded() {
    let app = memory_app();
    let (status, body) = get(&app, "/search?q=compsci&take=3").await;

    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(body["totalCount"], json!(4));

    let scores: Vec<f64> = items.iter().map(|i| i["score"].as_f64().unwrap()).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn search_pages_are_consistent() {
    let app = memory_app();
    let (_, first) = get(&app, "/search?q=COMPSCI%20161&skip=0&take=2").await;
    let (_, second) = get(&app, "/search?q=COMPSCI%20161&skip=2&take=2").await;
    let (_, whole) = get(&app, "/search?q=COMPSCI%20161&skip=0&take=4").await;

    let mut joined = ids(&first);
    joined.extend(ids(&second));
    assert_eq!(joined, ids(&whole));
    assert_eq!(first["totalCount"], whole["totalCount"]);
}

#[tokio::test]
async fn search_respects_type_filter() {
    let app = memory_app();
    let (status, body) = get(&app, "/search?q=COMPSCI%20161&types=course").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], json!(3));
    assert!(body["items"]
        .as_array()
        .unwrap()
        .iter()
        .all(|item| item["type"] == json!("course")));

    let (_, both) = get(&app, "/search?q=COMPSCI%20161&types=course,instructor").await;
    assert_eq!(both["totalCount"], json!(4));
}

#[tokio::test]
async fn search_rejects_bad_input() {
    let app = memory_app();

    for uri in [
        "/search?q=%20%20",
        "/search",
        "/search?q=algorithms&types=building",
        "/search?q=algorithms&take=ten",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", uri);
        assert!(body["error"].is_string(), "{}", uri);
    }
}

#[tokio::test]
async fn search_clamps_paging() {
    let app = memory_app();
    let (status, body) = get(&app, "/search?q=COMPSCI%20161&skip=-3&take=0").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["COMPSCI161"]);
    assert_eq!(body["totalCount"], json!(4));
}

#[tokio::test]
async fn sqlite_store_matches_memory_store() {
    let uri = "/search?q=COMPSCI%20161&take=5";
    let (_, memory) = get(&memory_app(), uri).await;
    let (status, sqlite) = get(&sqlite_app(), uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(sqlite, memory);
}

#[tokio::test]
async fn course_endpoints() {
    let app = memory_app();

    let (status, body) = get(&app, "/courses/COMPSCI161").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["courseNumber"], json!("161"));
    assert_eq!(body["instructorIds"], json!(["mikes"]));

    let (status, body) = get(&app, "/courses/NOPE999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("NOPE999"));

    let (status, body) = get(&app, "/courses?skip=1&take=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], json!(5));
    assert_eq!(ids(&body), vec!["COMPSCI162", "COMPSCI163"]);

    // Served from the page cache the second time
    let (_, again) = get(&app, "/courses?skip=1&take=2").await;
    assert_eq!(again, body);
}

#[tokio::test]
async fn instructor_endpoints() {
    let app = sqlite_app();

    let (status, body) = get(&app, "/instructors").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["alee", "jsmith", "mikes"]);

    let (status, body) = get(&app, "/instructors/mikes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["courseIds"], json!(["COMPSCI161"]));

    let (status, _) = get(&app, "/instructors/nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn program_endpoints() {
    let app = memory_app();

    let (status, body) = get(&app, "/degrees").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, body) = get(&app, "/degrees/MS").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["division"], json!("Graduate"));

    let (_, body) = get(&app, "/majors?degreeId=BS").await;
    let majors = body.as_array().unwrap();
    assert_eq!(majors.len(), 2);
    assert!(majors.iter().all(|m| m["degreeId"] == json!("BS")));

    let (status, body) = get(&app, "/majors/BA-0G4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], json!("English"));

    let (_, body) = get(&app, "/minors").await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = get(&app, "/minors/none").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn graphql_search() {
    let app = memory_app();
    let query = r#"{
        search(input: { queryText: "COMPSCI 161", resultTypes: [COURSE], take: 2 }) {
            totalCount
            items { ... on CourseResult { type score course { id code } } }
        }
    }"#;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "query": query }).to_string()))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("errors").is_none(), "{}", body);

    let search = &body["data"]["search"];
    assert_eq!(search["totalCount"], json!(3));
    assert_eq!(search["items"][0]["type"], json!("COURSE"));
    assert_eq!(search["items"][0]["course"]["code"], json!("COMPSCI 161"));
    assert_eq!(search["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn health_and_stats() {
    let app = memory_app();

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));

    get(&app, "/search?q=algorithms").await;
    get(&app, "/search?q=%20").await;

    let (status, body) = get(&app, "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalSearches"], json!(1));
    assert_eq!(body["rejectedSearches"], json!(1));
    assert!(body["sources"]["course"]["queries"].as_u64().unwrap() >= 1);
}
