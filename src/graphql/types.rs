//! GraphQL object types wrapping the catalog models

use super::loaders::{load_ordered, CourseLoader, InstructorLoader};
use super::schema::GraphQLContext;
use super::to_graphql_error;
use crate::models::{Course, Degree, Instructor, Major, Minor};
use crate::results::{ResultType, SearchResponse, SearchResultItem};
use async_graphql::dataloader::DataLoader;
use async_graphql::{Context, Enum, FieldResult, InputObject, Object, SimpleObject, Union, ID};

/// GraphQL representation of a Course
#[derive(Clone)]
pub struct CourseObject(pub Course);

#[Object(name = "Course")]
impl CourseObject {
    /// Course identifier, e.g. COMPSCI161
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn department(&self) -> &str {
        &self.0.department
    }

    async fn course_number(&self) -> &str {
        &self.0.course_number
    }

    /// Display code, e.g. "COMPSCI 161"
    async fn code(&self) -> String {
        self.0.display_code()
    }

    async fn title(&self) -> &str {
        &self.0.title
    }

    async fn description(&self) -> &str {
        &self.0.description
    }

    async fn school(&self) -> &str {
        &self.0.school
    }

    async fn min_units(&self) -> f64 {
        self.0.min_units
    }

    async fn max_units(&self) -> f64 {
        self.0.max_units
    }

    async fn prerequisite_text(&self) -> &str {
        &self.0.prerequisite_text
    }

    /// Instructors who have taught this course
    async fn instructors(&self, ctx: &Context<'_>) -> FieldResult<Vec<InstructorObject>> {
        let loader = ctx.data::<DataLoader<InstructorLoader>>()?;
        let instructors = load_ordered(loader, &self.0.instructor_ids)
            .await
            .map_err(to_graphql_error)?;
        Ok(instructors.into_iter().map(InstructorObject).collect())
    }
}

/// GraphQL representation of an Instructor
#[derive(Clone)]
pub struct InstructorObject(pub Instructor);

#[Object(name = "Instructor")]
impl InstructorObject {
    async fn ucinetid(&self) -> ID {
        ID(self.0.ucinetid.clone())
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn title(&self) -> &str {
        &self.0.title
    }

    async fn email(&self) -> &str {
        &self.0.email
    }

    async fn department(&self) -> &str {
        &self.0.department
    }

    async fn schools(&self) -> &Vec<String> {
        &self.0.schools
    }

    /// Courses this instructor has taught
    async fn courses(&self, ctx: &Context<'_>) -> FieldResult<Vec<CourseObject>> {
        let loader = ctx.data::<DataLoader<CourseLoader>>()?;
        let courses = load_ordered(loader, &self.0.course_ids)
            .await
            .map_err(to_graphql_error)?;
        Ok(courses.into_iter().map(CourseObject).collect())
    }
}

#[derive(Clone)]
pub struct DegreeObject(pub Degree);

#[Object(name = "Degree")]
impl DegreeObject {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn division(&self) -> &str {
        self.0.division.as_str()
    }
}

#[derive(Clone)]
pub struct MajorObject(pub Major);

#[Object(name = "Major")]
impl MajorObject {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn code(&self) -> &str {
        &self.0.code
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn requirements(&self) -> &Vec<String> {
        &self.0.requirements
    }

    /// The degree this major leads to
    async fn degree(&self, ctx: &Context<'_>) -> FieldResult<Option<DegreeObject>> {
        let context = ctx.data::<GraphQLContext>()?;
        let degree = context
            .repositories
            .programs
            .get_degree(&self.0.degree_id)
            .await
            .map_err(to_graphql_error)?;
        Ok(degree.map(DegreeObject))
    }
}

#[derive(Clone)]
pub struct MinorObject(pub Minor);

#[Object(name = "Minor")]
impl MinorObject {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn requirements(&self) -> &Vec<String> {
        &self.0.requirements
    }
}

/// Entity type a search can return
#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum SearchResultType {
    Course,
    Instructor,
}

impl From<SearchResultType> for ResultType {
    fn from(value: SearchResultType) -> Self {
        match value {
            SearchResultType::Course => ResultType::Course,
            SearchResultType::Instructor => ResultType::Instructor,
        }
    }
}

/// Search arguments
#[derive(InputObject, Debug, Clone)]
pub struct SearchInput {
    pub query_text: String,
    /// Types to search; omitted or empty searches all
    pub result_types: Option<Vec<SearchResultType>>,
    pub skip: Option<i32>,
    pub take: Option<i32>,
}

/// A course search hit
#[derive(Clone)]
pub struct CourseResultObject {
    score: f64,
    course: CourseObject,
}

#[Object(name = "CourseResult")]
impl CourseResultObject {
    #[graphql(name = "type")]
    async fn result_type(&self) -> SearchResultType {
        SearchResultType::Course
    }

    async fn score(&self) -> f64 {
        self.score
    }

    async fn course(&self) -> &CourseObject {
        &self.course
    }
}

/// An instructor search hit
#[derive(Clone)]
pub struct InstructorResultObject {
    score: f64,
    instructor: InstructorObject,
}

#[Object(name = "InstructorResult")]
impl InstructorResultObject {
    #[graphql(name = "type")]
    async fn result_type(&self) -> SearchResultType {
        SearchResultType::Instructor
    }

    async fn score(&self) -> f64 {
        self.score
    }

    async fn instructor(&self) -> &InstructorObject {
        &self.instructor
    }
}

/// A search hit of either type
#[derive(Union, Clone)]
pub enum SearchResult {
    Course(CourseResultObject),
    Instructor(InstructorResultObject),
}

impl From<SearchResultItem> for SearchResult {
    fn from(item: SearchResultItem) -> Self {
        match item {
            SearchResultItem::Course(r) => SearchResult::Course(CourseResultObject {
                score: r.score,
                course: CourseObject(r.course),
            }),
            SearchResultItem::Instructor(r) => SearchResult::Instructor(InstructorResultObject {
                score: r.score,
                instructor: InstructorObject(r.instructor),
            }),
        }
    }
}

#[derive(SimpleObject)]
#[graphql(name = "SearchResponse")]
pub struct SearchResponseObject {
    pub items: Vec<SearchResult>,
    pub total_count: i32,
}

impl From<SearchResponse> for SearchResponseObject {
    fn from(response: SearchResponse) -> Self {
        Self {
            items: response.items.into_iter().map(SearchResult::from).collect(),
            total_count: clamp_count(response.total_count),
        }
    }
}

#[derive(SimpleObject)]
pub struct CoursePage {
    pub items: Vec<CourseObject>,
    pub total_count: i32,
}

#[derive(SimpleObject)]
pub struct InstructorPage {
    pub items: Vec<InstructorObject>,
    pub total_count: i32,
}

/// GraphQL Int is 32-bit; counts beyond that saturate
pub fn clamp_count(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}
