use super::loaders::{CourseLoader, InstructorLoader};
use super::resolvers::QueryRoot;
use crate::repository::Repositories;
use crate::search::Search;
use async_graphql::{EmptyMutation, EmptySubscription, Schema};

/// GraphQL context containing shared application state
pub struct GraphQLContext {
    pub repositories: Repositories,
    pub search: Search,
}

/// The complete GraphQL schema
pub type GraphQLSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

/// Create a new GraphQL schema over the given repositories and aggregator
pub fn create_schema(repositories: Repositories, search: Search) -> GraphQLSchema {
    let course_loader = CourseLoader::new(repositories.courses.clone());
    let instructor_loader = InstructorLoader::new(repositories.instructors.clone());

    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(GraphQLContext {
            repositories,
            search,
        })
        .data(course_loader)
        .data(instructor_loader)
        .finish()
}
