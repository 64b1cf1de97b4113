use super::schema::GraphQLContext;
use super::to_graphql_error;
use super::types::{
    clamp_count, CourseObject, CoursePage, DegreeObject, InstructorObject, InstructorPage,
    MajorObject, MinorObject, SearchInput, SearchResponseObject,
};
use crate::results::ResultType;
use crate::search::SearchQuery;
use async_graphql::{Context, FieldResult, Object, ID};

/// Root query object for GraphQL
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Search courses and instructors with one ranked, paginated result list
    async fn search(
        &self,
        ctx: &Context<'_>,
        input: SearchInput,
    ) -> FieldResult<SearchResponseObject> {
        let context = ctx.data::<GraphQLContext>()?;

        let query = SearchQuery {
            query_text: input.query_text,
            result_types: input
                .result_types
                .unwrap_or_default()
                .into_iter()
                .map(ResultType::from)
                .collect(),
            skip: input.skip.map(i64::from).unwrap_or(0),
            take: input.take.map(i64::from),
        };

        let response = context
            .search
            .execute(&query)
            .await
            .map_err(to_graphql_error)?;
        Ok(response.into())
    }

    /// Get a course by id
    async fn course(&self, ctx: &Context<'_>, id: ID) -> FieldResult<Option<CourseObject>> {
        let context = ctx.data::<GraphQLContext>()?;
        let course = context
            .repositories
            .courses
            .get(&id)
            .await
            .map_err(to_graphql_error)?;
        Ok(course.map(CourseObject))
    }

    /// List courses ordered by id
    async fn courses(
        &self,
        ctx: &Context<'_>,
        skip: Option<i32>,
        take: Option<i32>,
    ) -> FieldResult<CoursePage> {
        let context = ctx.data::<GraphQLContext>()?;
        let (skip, take) = context
            .search
            .limits()
            .clamp_page(skip.map(i64::from), take.map(i64::from));

        let page = context
            .repositories
            .courses
            .list(take, skip)
            .await
            .map_err(to_graphql_error)?;
        Ok(CoursePage {
            items: page.items.into_iter().map(CourseObject).collect(),
            total_count: clamp_count(page.total),
        })
    }

    /// Get an instructor by UCInetID
    async fn instructor(
        &self,
        ctx: &Context<'_>,
        ucinetid: ID,
    ) -> FieldResult<Option<InstructorObject>> {
        let context = ctx.data::<GraphQLContext>()?;
        let instructor = context
            .repositories
            .instructors
            .get(&ucinetid)
            .await
            .map_err(to_graphql_error)?;
        Ok(instructor.map(InstructorObject))
    }

    /// List instructors ordered by UCInetID
    async fn instructors(
        &self,
        ctx: &Context<'_>,
        skip: Option<i32>,
        take: Option<i32>,
    ) -> FieldResult<InstructorPage> {
        let context = ctx.data::<GraphQLContext>()?;
        let (skip, take) = context
            .search
            .limits()
            .clamp_page(skip.map(i64::from), take.map(i64::from));

        let page = context
            .repositories
            .instructors
            .list(take, skip)
            .await
            .map_err(to_graphql_error)?;
        Ok(InstructorPage {
            items: page.items.into_iter().map(InstructorObject).collect(),
            total_count: clamp_count(page.total),
        })
    }

    async fn degrees(&self, ctx: &Context<'_>) -> FieldResult<Vec<DegreeObject>> {
        let context = ctx.data::<GraphQLContext>()?;
        let degrees = context
            .repositories
            .programs
            .list_degrees()
            .await
            .map_err(to_graphql_error)?;
        Ok(degrees.into_iter().map(DegreeObject).collect())
    }

    async fn degree(&self, ctx: &Context<'_>, id: ID) -> FieldResult<Option<DegreeObject>> {
        let context = ctx.data::<GraphQLContext>()?;
        let degree = context
            .repositories
            .programs
            .get_degree(&id)
            .await
            .map_err(to_graphql_error)?;
        Ok(degree.map(DegreeObject))
    }

    /// List majors, optionally only those leading to one degree
    async fn majors(
        &self,
        ctx: &Context<'_>,
        degree_id: Option<ID>,
    ) -> FieldResult<Vec<MajorObject>> {
        let context = ctx.data::<GraphQLContext>()?;
        let majors = context
            .repositories
            .programs
            .list_majors(degree_id.as_ref().map(|id| id.as_str()))
            .await
            .map_err(to_graphql_error)?;
        Ok(majors.into_iter().map(MajorObject).collect())
    }

    async fn major(&self, ctx: &Context<'_>, id: ID) -> FieldResult<Option<MajorObject>> {
        let context = ctx.data::<GraphQLContext>()?;
        let major = context
            .repositories
            .programs
            .get_major(&id)
            .await
            .map_err(to_graphql_error)?;
        Ok(major.map(MajorObject))
    }

    async fn minors(&self, ctx: &Context<'_>) -> FieldResult<Vec<MinorObject>> {
        let context = ctx.data::<GraphQLContext>()?;
        let minors = context
            .repositories
            .programs
            .list_minors()
            .await
            .map_err(to_graphql_error)?;
        Ok(minors.into_iter().map(MinorObject).collect())
    }

    async fn minor(&self, ctx: &Context<'_>, id: ID) -> FieldResult<Option<MinorObject>> {
        let context = ctx.data::<GraphQLContext>()?;
        let minor = context
            .repositories
            .programs
            .get_minor(&id)
            .await
            .map_err(to_graphql_error)?;
        Ok(minor.map(MinorObject))
    }
}
