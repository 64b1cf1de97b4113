//! GraphQL transport over the catalog repositories and the search aggregator

pub mod loaders;
pub mod resolvers;
pub mod schema;
pub mod types;

pub use schema::{create_schema, GraphQLContext, GraphQLSchema};

use crate::error::SearchError;
use async_graphql::ErrorExtensions;
use tracing::error;

/// Convert a domain error into a GraphQL error carrying a `code` extension.
///
/// Repository failures are logged and reported with a generic message.
pub fn to_graphql_error(err: impl Into<SearchError>) -> async_graphql::Error {
    match err.into() {
        SearchError::Validation(message) => async_graphql::Error::new(message)
            .extend_with(|_, e| e.set("code", "BAD_USER_INPUT")),
        SearchError::NotFound(message) => {
            async_graphql::Error::new(message).extend_with(|_, e| e.set("code", "NOT_FOUND"))
        }
        SearchError::Repository(err) => {
            error!("Repository failure during GraphQL request: {}", err);
            async_graphql::Error::new("Internal server error")
                .extend_with(|_, e| e.set("code", "INTERNAL_SERVER_ERROR"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CatalogSnapshot;
    use crate::repository::{MemoryCatalog, Repositories};
    use crate::search::Search;
    use serde_json::{json, Value};

    fn schema() -> GraphQLSchema {
        let snapshot =
            CatalogSnapshot::from_json(include_str!("../../fixtures/catalog.json")).unwrap();
        let repositories = Repositories::from_catalog(MemoryCatalog::new(snapshot));
        let search = Search::new(&repositories);
        create_schema(repositories, search)
    }

    async fn run(query: &str) -> async_graphql::Response {
        schema().execute(query).await
    }

    #[tokio::test]
    async fn test_search_returns_union_items() {
        let response = run(
            r#"{
                search(input: { queryText: "COMPSCI 161", resultTypes: [COURSE, INSTRUCTOR], skip: 0, take: 5 }) {
                    totalCount
                    items {
                        __typename
                        ... on CourseResult { type score course { id } }
                        ... on InstructorResult { type score instructor { ucinetid } }
                    }
                }
            }"#,
        )
        .await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);

        let data = response.data.into_json().unwrap();
        let search = &data["search"];
        assert_eq!(search["totalCount"], json!(4));

        let items = search["items"].as_array().unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0]["__typename"], json!("CourseResult"));
        assert_eq!(items[0]["type"], json!("COURSE"));
        assert_eq!(items[0]["course"]["id"], json!("COMPSCI161"));
        assert_eq!(items[1]["__typename"], json!("InstructorResult"));
        assert_eq!(items[1]["instructor"]["ucinetid"], json!("mikes"));
    }

    #[tokio::test]
    async fn test_blank_search_is_bad_user_input() {
        let response = run(r#"{ search(input: { queryText: "  " }) { totalCount } }"#).await;
        assert_eq!(response.errors.len(), 1);

        let error = serde_json::to_value(&response.errors[0]).unwrap();
        assert_eq!(error["extensions"]["code"], json!("BAD_USER_INPUT"));
    }

    #[tokio::test]
    async fn test_course_resolves_instructors() {
        let response = run(
            r#"{ course(id: "COMPSCI161") { code title instructors { ucinetid name } } }"#,
        )
        .await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);

        let data = response.data.into_json().unwrap();
        assert_eq!(data["course"]["code"], json!("COMPSCI 161"));
        assert_eq!(
            data["course"]["instructors"],
            json!([{ "ucinetid": "mikes", "name": "Michael Shindler" }])
        );
    }

    #[tokio::test]
    async fn test_unknown_course_is_null() {
        let response = run(r#"{ course(id: "NOPE999") { id } }"#).await;
        assert!(response.errors.is_empty());
        assert_eq!(response.data.into_json().unwrap()["course"], Value::Null);
    }

    #[tokio::test]
    async fn test_course_listing_is_paged() {
        let response = run(r#"{ courses(skip: 1, take: 2) { totalCount items { id } } }"#).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);

        let data = response.data.into_json().unwrap();
        assert_eq!(data["courses"]["totalCount"], json!(5));
        assert_eq!(
            data["courses"]["items"],
            json!([{ "id": "COMPSCI162" }, { "id": "COMPSCI163" }])
        );
    }

    #[tokio::test]
    async fn test_majors_by_degree_resolve_degree() {
        let response =
            run(r#"{ majors(degreeId: "BS") { id degree { name division } } }"#).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);

        let data = response.data.into_json().unwrap();
        let majors = data["majors"].as_array().unwrap();
        assert_eq!(majors.len(), 2);
        assert!(majors
            .iter()
            .all(|m| m["degree"]["name"] == json!("Bachelor of Science")));
    }

    #[test]
    fn test_repository_error_is_masked() {
        let err = to_graphql_error(crate::error::RepositoryError::Database("disk".into()));
        assert_eq!(err.message, "Internal server error");
    }
}
