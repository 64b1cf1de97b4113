//! SQLite-backed catalog store
//!
//! Text search reads only `(id, search_text)` for every row, scores the rows in
//! process with [`TextMatcher`], and then hydrates just the requested page.
//! `search_text` holds one searchable field per line.

use super::traits::*;
use crate::error::{RepositoryError, RepositoryResult};
use crate::models::{
    course_codes, CatalogSnapshot, Course, Degree, Division, Instructor, Major, Minor, Searchable,
};
use crate::query::{TextMatcher, DEFAULT_MIN_SIMILARITY};
use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS courses (
        id                 TEXT PRIMARY KEY,
        department         TEXT NOT NULL,
        course_number      TEXT NOT NULL,
        title              TEXT NOT NULL,
        description        TEXT NOT NULL DEFAULT '',
        school             TEXT NOT NULL DEFAULT '',
        min_units          REAL NOT NULL DEFAULT 0,
        max_units          REAL NOT NULL DEFAULT 0,
        prerequisite_text  TEXT NOT NULL DEFAULT '',
        instructor_ids     TEXT NOT NULL DEFAULT '[]',
        search_text        TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS instructors (
        ucinetid     TEXT PRIMARY KEY,
        name         TEXT NOT NULL,
        title        TEXT NOT NULL DEFAULT '',
        email        TEXT NOT NULL DEFAULT '',
        department   TEXT NOT NULL DEFAULT '',
        schools      TEXT NOT NULL DEFAULT '[]',
        course_ids   TEXT NOT NULL DEFAULT '[]',
        search_text  TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS degrees (
        id        TEXT PRIMARY KEY,
        name      TEXT NOT NULL,
        division  TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS majors (
        id            TEXT PRIMARY KEY,
        degree_id     TEXT NOT NULL,
        code          TEXT NOT NULL DEFAULT '',
        name          TEXT NOT NULL,
        requirements  TEXT NOT NULL DEFAULT '[]'
    );
    CREATE TABLE IF NOT EXISTS minors (
        id            TEXT PRIMARY KEY,
        name          TEXT NOT NULL,
        requirements  TEXT NOT NULL DEFAULT '[]'
    );
"#;

const COURSE_COLUMNS: &str = "id, department, course_number, title, description, school, \
     min_units, max_units, prerequisite_text, instructor_ids";

const INSTRUCTOR_COLUMNS: &str = "ucinetid, name, title, email, department, schools, course_ids";

/// Catalog stored in a SQLite database.
///
/// The connection is opened once and shared process-wide; queries run on the
/// blocking thread pool.
#[derive(Clone)]
pub struct SqliteCatalog {
    conn: Arc<Mutex<Connection>>,
    min_similarity: f64,
}

impl SqliteCatalog {
    /// Open (or create) a catalog database. `:memory:` opens a private in-memory database.
    pub fn open<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let path = path.as_ref();
        let conn = if path.as_os_str() == ":memory:" {
            Connection::open_in_memory()?
        } else {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .map_err(|e| RepositoryError::Database(e.to_string()))?;
            }
            Connection::open(path)?
        };
        conn.execute_batch(SCHEMA)?;
        info!("Opened catalog database at {}", path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            min_similarity: DEFAULT_MIN_SIMILARITY,
        })
    }

    /// Set the minimum trigram similarity for fuzzy matches
    pub fn with_min_similarity(mut self, min_similarity: f64) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    /// Insert or replace every record of a snapshot in one transaction
    pub fn import(&self, snapshot: &CatalogSnapshot) -> RepositoryResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        for course in &snapshot.courses {
            tx.execute(
                "INSERT OR REPLACE INTO courses (id, department, course_number, title, description, \
                 school, min_units, max_units, prerequisite_text, instructor_ids, search_text) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    course.id,
                    course.department,
                    course.course_number,
                    course.title,
                    course.description,
                    course.school,
                    course.min_units,
                    course.max_units,
                    course.prerequisite_text,
                    serde_json::to_string(&course.instructor_ids)?,
                    course.search_fields().join("\n"),
                ],
            )?;
        }

        for instructor in &snapshot.instructors {
            tx.execute(
                "INSERT OR REPLACE INTO instructors (ucinetid, name, title, email, department, \
                 schools, course_ids, search_text) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    instructor.ucinetid,
                    instructor.name,
                    instructor.title,
                    instructor.email,
                    instructor.department,
                    serde_json::to_string(&instructor.schools)?,
                    serde_json::to_string(&instructor.course_ids)?,
                    "",
                ],
            )?;
        }
        // Courses from earlier imports may be taught by these instructors and
        // vice versa, so every row is rebuilt against the stored courses.
        refresh_instructor_search_text(&tx)?;

        for degree in &snapshot.degrees {
            tx.execute(
                "INSERT OR REPLACE INTO degrees (id, name, division) VALUES (?1, ?2, ?3)",
                params![degree.id, degree.name, degree.division.as_str()],
            )?;
        }

        for major in &snapshot.majors {
            tx.execute(
                "INSERT OR REPLACE INTO majors (id, degree_id, code, name, requirements) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    major.id,
                    major.degree_id,
                    major.code,
                    major.name,
                    serde_json::to_string(&major.requirements)?,
                ],
            )?;
        }

        for minor in &snapshot.minors {
            tx.execute(
                "INSERT OR REPLACE INTO minors (id, name, requirements) VALUES (?1, ?2, ?3)",
                params![minor.id, minor.name, serde_json::to_string(&minor.requirements)?],
            )?;
        }

        tx.commit()?;
        info!(
            "Imported {} courses, {} instructors, {} degrees, {} majors, {} minors",
            snapshot.courses.len(),
            snapshot.instructors.len(),
            snapshot.degrees.len(),
            snapshot.majors.len(),
            snapshot.minors.len()
        );
        Ok(())
    }

    fn lock(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RepositoryError::Task("catalog connection lock poisoned".to_string()))
    }

    /// Run a closure against the connection on the blocking pool
    async fn with_conn<F, R>(&self, f: F) -> RepositoryResult<R>
    where
        F: FnOnce(&Connection) -> RepositoryResult<R> + Send + 'static,
        R: Send + 'static,
    {
        let this = self.clone();
        tokio::task::spawn_blocking(move || {
            let conn = this.lock()?;
            f(&conn)
        })
        .await?
    }
}

/// Rebuild instructor `search_text` with taught courses as display codes
fn refresh_instructor_search_text(conn: &Connection) -> RepositoryResult<()> {
    let courses = {
        let mut stmt = conn.prepare(&format!("SELECT {} FROM courses", COURSE_COLUMNS))?;
        let rows = stmt.query_map([], course_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()?
    };
    let codes = course_codes(&courses);

    let instructors = {
        let mut stmt = conn.prepare(&format!("SELECT {} FROM instructors", INSTRUCTOR_COLUMNS))?;
        let rows = stmt.query_map([], instructor_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()?
    };

    let mut update = conn.prepare("UPDATE instructors SET search_text = ?1 WHERE ucinetid = ?2")?;
    for instructor in &instructors {
        update.execute(params![
            instructor.search_fields(&codes).join("\n"),
            instructor.ucinetid
        ])?;
    }
    debug!("Refreshed search text for {} instructors", instructors.len());
    Ok(())
}

fn json_list(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn course_from_row(row: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        id: row.get(0)?,
        department: row.get(1)?,
        course_number: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        school: row.get(5)?,
        min_units: row.get(6)?,
        max_units: row.get(7)?,
        prerequisite_text: row.get(8)?,
        instructor_ids: json_list(row, 9)?,
    })
}

fn instructor_from_row(row: &Row<'_>) -> rusqlite::Result<Instructor> {
    Ok(Instructor {
        ucinetid: row.get(0)?,
        name: row.get(1)?,
        title: row.get(2)?,
        email: row.get(3)?,
        department: row.get(4)?,
        schools: json_list(row, 5)?,
        course_ids: json_list(row, 6)?,
    })
}

fn course_id(course: &Course) -> &str {
    &course.id
}

fn instructor_id(instructor: &Instructor) -> &str {
    &instructor.ucinetid
}

fn degree_from_row(row: &Row<'_>) -> rusqlite::Result<Degree> {
    let division: String = row.get(2)?;
    Ok(Degree {
        id: row.get(0)?,
        name: row.get(1)?,
        division: Division::parse(&division).unwrap_or_default(),
    })
}

fn major_from_row(row: &Row<'_>) -> rusqlite::Result<Major> {
    Ok(Major {
        id: row.get(0)?,
        degree_id: row.get(1)?,
        code: row.get(2)?,
        name: row.get(3)?,
        requirements: json_list(row, 4)?,
    })
}

fn minor_from_row(row: &Row<'_>) -> rusqlite::Result<Minor> {
    Ok(Minor {
        id: row.get(0)?,
        name: row.get(1)?,
        requirements: json_list(row, 2)?,
    })
}

/// Load `(id, search_text)` for every row of a table
fn load_candidates(conn: &Connection, table: &str, id_column: &str) -> RepositoryResult<Vec<SearchEntry>> {
    let sql = format!("SELECT {}, search_text FROM {}", id_column, table);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        let search_text: String = row.get(1)?;
        Ok(SearchEntry {
            id: row.get(0)?,
            fields: search_text.lines().map(str::to_string).collect(),
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Select full rows for the given ids, in no particular order
fn select_by_ids<T>(
    conn: &Connection,
    columns: &str,
    table: &str,
    id_column: &str,
    ids: &[String],
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> RepositoryResult<Vec<T>> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!(
        "SELECT {} FROM {} WHERE {} IN ({}) ORDER BY {}",
        columns, table, id_column, placeholders, id_column
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(ids.iter()), map)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Rank all rows of a table, then hydrate only the requested page
#[allow(clippy::too_many_arguments)]
fn search_table<T>(
    conn: &Connection,
    matcher: &TextMatcher,
    columns: &str,
    table: &str,
    id_column: &str,
    limit: usize,
    offset: usize,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
    id_of: fn(&T) -> &str,
) -> RepositoryResult<Matches<T>> {
    let candidates = load_candidates(conn, table, id_column)?;
    let page = paginate(rank(matcher, candidates), limit, offset);

    let ids: Vec<String> = page.items.iter().map(|s| s.record.id.clone()).collect();
    let mut rows: HashMap<String, T> = select_by_ids(conn, columns, table, id_column, &ids, map)?
        .into_iter()
        .map(|record| (id_of(&record).to_string(), record))
        .collect();

    let items = page
        .items
        .into_iter()
        .filter_map(|scored| {
            rows.remove(&scored.record.id).map(|record| Scored {
                record,
                score: scored.score,
            })
        })
        .collect();

    debug!("Table {} matched {} rows for '{}'", table, page.total, matcher.query());
    Ok(Matches {
        items,
        total: page.total,
    })
}

fn list_table<T>(
    conn: &Connection,
    columns: &str,
    table: &str,
    id_column: &str,
    limit: usize,
    offset: usize,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> RepositoryResult<Page<T>> {
    let total: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })?;
    let sql = format!(
        "SELECT {} FROM {} ORDER BY {} LIMIT ?1 OFFSET ?2",
        columns, table, id_column
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![limit as i64, offset as i64], map)?;
    Ok(Page {
        items: rows.collect::<rusqlite::Result<Vec<_>>>()?,
        total: total as usize,
    })
}

fn get_one<T>(
    conn: &Connection,
    columns: &str,
    table: &str,
    id_column: &str,
    id: &str,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> RepositoryResult<Option<T>> {
    let sql = format!("SELECT {} FROM {} WHERE {} = ?1", columns, table, id_column);
    Ok(conn.query_row(&sql, params![id], map).optional()?)
}

#[async_trait]
impl CourseRepository for SqliteCatalog {
    async fn find_by_text(
        &self,
        text: &str,
        limit: usize,
        offset: usize,
    ) -> RepositoryResult<Matches<Course>> {
        let matcher = TextMatcher::new(text, self.min_similarity);
        self.with_conn(move |conn| {
            search_table(
                conn,
                &matcher,
                COURSE_COLUMNS,
                "courses",
                "id",
                limit,
                offset,
                course_from_row,
                course_id,
            )
        })
        .await
    }

    async fn get(&self, id: &str) -> RepositoryResult<Option<Course>> {
        let id = id.to_string();
        self.with_conn(move |conn| get_one(conn, COURSE_COLUMNS, "courses", "id", &id, course_from_row))
            .await
    }

    async fn get_many(&self, ids: &[String]) -> RepositoryResult<Vec<Course>> {
        let ids = ids.to_vec();
        self.with_conn(move |conn| {
            select_by_ids(conn, COURSE_COLUMNS, "courses", "id", &ids, course_from_row)
        })
        .await
    }

    async fn list(&self, limit: usize, offset: usize) -> RepositoryResult<Page<Course>> {
        self.with_conn(move |conn| {
            list_table(conn, COURSE_COLUMNS, "courses", "id", limit, offset, course_from_row)
        })
        .await
    }
}

#[async_trait]
impl InstructorRepository for SqliteCatalog {
    async fn find_by_text(
        &self,
        text: &str,
        limit: usize,
        offset: usize,
    ) -> RepositoryResult<Matches<Instructor>> {
        let matcher = TextMatcher::new(text, self.min_similarity);
        self.with_conn(move |conn| {
            search_table(
                conn,
                &matcher,
                INSTRUCTOR_COLUMNS,
                "instructors",
                "ucinetid",
                limit,
                offset,
                instructor_from_row,
                instructor_id,
            )
        })
        .await
    }

    async fn get(&self, ucinetid: &str) -> RepositoryResult<Option<Instructor>> {
        let ucinetid = ucinetid.to_string();
        self.with_conn(move |conn| {
            get_one(
                conn,
                INSTRUCTOR_COLUMNS,
                "instructors",
                "ucinetid",
                &ucinetid,
                instructor_from_row,
            )
        })
        .await
    }

    async fn get_many(&self, ucinetids: &[String]) -> RepositoryResult<Vec<Instructor>> {
        let ids = ucinetids.to_vec();
        self.with_conn(move |conn| {
            select_by_ids(
                conn,
                INSTRUCTOR_COLUMNS,
                "instructors",
                "ucinetid",
                &ids,
                instructor_from_row,
            )
        })
        .await
    }

    async fn list(&self, limit: usize, offset: usize) -> RepositoryResult<Page<Instructor>> {
        self.with_conn(move |conn| {
            list_table(
                conn,
                INSTRUCTOR_COLUMNS,
                "instructors",
                "ucinetid",
                limit,
                offset,
                instructor_from_row,
            )
        })
        .await
    }
}

#[async_trait]
impl ProgramRepository for SqliteCatalog {
    async fn list_degrees(&self) -> RepositoryResult<Vec<Degree>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, name, division FROM degrees ORDER BY id")?;
            let rows = stmt.query_map([], degree_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }

    async fn get_degree(&self, id: &str) -> RepositoryResult<Option<Degree>> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            get_one(conn, "id, name, division", "degrees", "id", &id, degree_from_row)
        })
        .await
    }

    async fn list_majors(&self, degree_id: Option<&str>) -> RepositoryResult<Vec<Major>> {
        let degree_id = degree_id.map(str::to_string);
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, degree_id, code, name, requirements FROM majors \
                 WHERE ?1 IS NULL OR degree_id = ?1 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![degree_id], major_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }

    async fn get_major(&self, id: &str) -> RepositoryResult<Option<Major>> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            get_one(
                conn,
                "id, degree_id, code, name, requirements",
                "majors",
                "id",
                &id,
                major_from_row,
            )
        })
        .await
    }

    async fn list_minors(&self) -> RepositoryResult<Vec<Minor>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, name, requirements FROM minors ORDER BY id")?;
            let rows = stmt.query_map([], minor_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }

    async fn get_minor(&self, id: &str) -> RepositoryResult<Option<Minor>> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            get_one(conn, "id, name, requirements", "minors", "id", &id, minor_from_row)
        })
        .await
    }
}
