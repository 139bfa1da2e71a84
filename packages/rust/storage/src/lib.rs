//! libSQL access to the course records enriched in details mode.
//!
//! The table is created and populated upstream; this crate only selects rows
//! still flagged `full_desc_uploaded_flg = 0` and writes the scraped fields
//! back, one statement per row, matched by `offer_rk`.

use std::path::Path;

use coursecrawl_shared::{CourseCrawlError, CourseDetails, Result, StoredCourse, validate_table_name};
use libsql::{Connection, Database, params};

/// Storage handle for one course table.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    table: String,
}

impl Storage {
    /// Open the database at `database_url` and bind it to `table`.
    ///
    /// Accepts a plain path or a `sqlite:` / `file:` prefixed one.
    pub async fn open(database_url: &str, table: &str) -> Result<Self> {
        validate_table_name(table)?;

        let path = local_path(database_url);
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| CourseCrawlError::Persistence(format!("{database_url}: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| CourseCrawlError::Persistence(e.to_string()))?;

        tracing::debug!(path = %path.display(), table, "storage opened");
        Ok(Self {
            db,
            conn,
            table: table.to_string(),
        })
    }

    /// All records still awaiting enrichment, ordered by primary key.
    ///
    /// A NULL `url` is returned as `None`; rejecting it is up to the caller.
    pub async fn pending_courses(&self) -> Result<Vec<StoredCourse>> {
        let sql = format!(
            "SELECT offer_rk, url FROM {} WHERE full_desc_uploaded_flg = 0 ORDER BY offer_rk",
            self.table
        );
        let mut rows = self
            .conn
            .query(&sql, params![])
            .await
            .map_err(|e| CourseCrawlError::Persistence(e.to_string()))?;

        let mut results = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| CourseCrawlError::Persistence(e.to_string()))?
        {
            results.push(StoredCourse {
                offer_rk: row
                    .get::<i64>(0)
                    .map_err(|e| CourseCrawlError::Persistence(e.to_string()))?,
                url: row
                    .get::<Option<String>>(1)
                    .map_err(|e| CourseCrawlError::Persistence(e.to_string()))?,
            });
        }
        Ok(results)
    }

    /// Write the scraped fields and mark the record done.
    ///
    /// `None` fields are written as NULL. Matching no row is an error.
    pub async fn update_course_details(&self, offer_rk: i64, details: &CourseDetails) -> Result<()> {
        let sql = format!(
            "UPDATE {} SET description = ?1, language = ?2, full_desc_uploaded_flg = 1
             WHERE offer_rk = ?3",
            self.table
        );
        let affected = self
            .conn
            .execute(
                &sql,
                params![
                    details.description.as_deref(),
                    details.language.as_deref(),
                    offer_rk
                ],
            )
            .await
            .map_err(|e| CourseCrawlError::Persistence(format!("offer_rk {offer_rk}: {e}")))?;

        if affected == 0 {
            return Err(CourseCrawlError::Persistence(format!(
                "offer_rk {offer_rk}: no such row in {}",
                self.table
            )));
        }
        Ok(())
    }
}

fn local_path(database_url: &str) -> &Path {
    let trimmed = ["sqlite://", "sqlite:", "file:"]
        .iter()
        .find_map(|prefix| database_url.strip_prefix(prefix))
        .unwrap_or(database_url);
    Path::new(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"
CREATE TABLE offers (
    offer_rk               INTEGER PRIMARY KEY,
    url                    TEXT NOT NULL,
    description            TEXT,
    language               TEXT,
    full_desc_uploaded_flg INTEGER NOT NULL DEFAULT 0
);
INSERT INTO offers (offer_rk, url, full_desc_uploaded_flg) VALUES
    (30, 'https://example.com/course/c/', 0),
    (10, 'https://example.com/course/a/', 0),
    (20, 'https://example.com/course/b/', 1);
"#;

    async fn seeded(tag: &str) -> (Storage, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!("coursecrawl-{tag}-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let db_path = dir.join("test.db");
        let storage = Storage::open(db_path.to_str().unwrap(), "offers").await.unwrap();
        storage.conn.execute_batch(SCHEMA).await.unwrap();
        (storage, dir)
    }

    async fn row(storage: &Storage, offer_rk: i64) -> (Option<String>, Option<String>, i64) {
        let mut rows = storage
            .conn
            .query(
                "SELECT description, language, full_desc_uploaded_flg FROM offers WHERE offer_rk = ?1",
                params![offer_rk],
            )
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        (
            row.get::<Option<String>>(0).unwrap(),
            row.get::<Option<String>>(1).unwrap(),
            row.get::<i64>(2).unwrap(),
        )
    }

    #[test]
    fn local_path_strips_scheme_prefixes() {
        assert_eq!(local_path("sqlite:///tmp/x.db"), Path::new("/tmp/x.db"));
        assert_eq!(local_path("file:data/x.db"), Path::new("data/x.db"));
        assert_eq!(local_path("x.db"), Path::new("x.db"));
    }

    #[tokio::test]
    async fn open_rejects_unsafe_table_name() {
        let result = Storage::open(":memory:", "offers WHERE 1=1; --").await;
        assert!(matches!(result, Err(CourseCrawlError::Config { .. })));
    }

    #[tokio::test]
    async fn pending_courses_filters_on_flag() {
        let (storage, dir) = seeded("pending").await;

        let pending = storage.pending_courses().await.unwrap();
        let keys: Vec<i64> = pending.iter().map(|c| c.offer_rk).collect();
        assert_eq!(keys, vec![10, 30]);
        assert_eq!(pending[0].url.as_deref(), Some("https://example.com/course/a/"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn null_url_row_is_returned_without_failing_the_selection() {
        let (storage, dir) = seeded("null-url").await;
        storage
            .conn
            .execute_batch(
                "CREATE TABLE loose (
                    offer_rk               INTEGER PRIMARY KEY,
                    url                    TEXT,
                    description            TEXT,
                    language               TEXT,
                    full_desc_uploaded_flg INTEGER NOT NULL DEFAULT 0
                );
                INSERT INTO loose (offer_rk, url) VALUES
                    (1, 'https://example.com/course/a/'),
                    (2, NULL),
                    (3, 'https://example.com/course/c/');",
            )
            .await
            .unwrap();
        let loose = Storage {
            db: storage.db,
            conn: storage.conn,
            table: "loose".into(),
        };

        let pending = loose.pending_courses().await.unwrap();
        let urls: Vec<(i64, Option<&str>)> = pending
            .iter()
            .map(|c| (c.offer_rk, c.url.as_deref()))
            .collect();
        assert_eq!(
            urls,
            vec![
                (1, Some("https://example.com/course/a/")),
                (2, None),
                (3, Some("https://example.com/course/c/")),
            ]
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn update_sets_fields_and_flag() {
        let (storage, dir) = seeded("update").await;

        let details = CourseDetails {
            description: Some("<div>About</div>".into()),
            language: None,
        };
        storage.update_course_details(10, &details).await.unwrap();

        let (description, language, flag) = row(&storage, 10).await;
        assert_eq!(description.as_deref(), Some("<div>About</div>"));
        assert_eq!(language, None);
        assert_eq!(flag, 1);

        let keys: Vec<i64> = storage
            .pending_courses()
            .await
            .unwrap()
            .iter()
            .map(|c| c.offer_rk)
            .collect();
        assert_eq!(keys, vec![30]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn update_of_unknown_row_is_persistence_error() {
        let (storage, dir) = seeded("update-missing").await;

        let err = storage
            .update_course_details(999, &CourseDetails::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CourseCrawlError::Persistence(_)));
        assert!(err.to_string().contains("999"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn missing_table_is_persistence_error() {
        let dir = std::env::temp_dir().join(format!("coursecrawl-notable-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let db_path = dir.join("empty.db");
        let storage = Storage::open(db_path.to_str().unwrap(), "offers").await.unwrap();

        let err = storage.pending_courses().await.unwrap_err();
        assert!(matches!(err, CourseCrawlError::Persistence(_)));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
