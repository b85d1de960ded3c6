use std::fs;
use std::path::Path;

use blog_core::BlogError;
use blog_core::model::{NewPost, Post, PostId, Visibility};
use blog_core::store::PostStore;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Params, Row, params};
use tracing::{info, warn};

use crate::error::StoreError;

pub const SCHEMA_VERSION: i64 = 2;

/// Posts carried a boolean `hidden` column instead of a visibility.
const HIDDEN_FLAG_SCHEMA_VERSION: i64 = 1;

const POST_COLUMNS: &str =
    "id, title, handle, content, summary, visibility, post_ts, post_update_ts";

pub struct SqlitePostStore {
    conn: Connection,
}

impl SqlitePostStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(mut conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS meta(\
                key TEXT PRIMARY KEY,\
                value INTEGER NOT NULL\
            );",
        )?;
        let version: Option<i64> = conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        match version {
            None | Some(SCHEMA_VERSION) => {}
            Some(HIDDEN_FLAG_SCHEMA_VERSION) => migrate_hidden_to_visibility(&mut conn)?,
            Some(other) => {
                warn!(found = other, expected = SCHEMA_VERSION, "unknown post schema");
                return Err(StoreError::UnsupportedSchema(other));
            }
        }
        create_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn schema_version(&self) -> Result<i64, StoreError> {
        Ok(self.conn.query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )?)
    }

    fn insert_post(&mut self, post: NewPost) -> Result<Post, StoreError> {
        self.conn.execute(
            "INSERT INTO posts (title, handle, content, summary, visibility, post_ts, post_update_ts)\n\
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                post.title,
                post.handle,
                post.content,
                post.summary,
                post.visibility.ordinal(),
                format_ts(&post.post_ts),
                format_ts(&post.post_update_ts),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        Ok(post.into_post(id))
    }

    fn update_post(&mut self, post: &Post) -> Result<usize, StoreError> {
        Ok(self.conn.execute(
            "UPDATE posts SET\n\
                title = ?1,\n\
                handle = ?2,\n\
                content = ?3,\n\
                summary = ?4,\n\
                visibility = ?5,\n\
                post_ts = ?6,\n\
                post_update_ts = ?7\n\
            WHERE id = ?8",
            params![
                post.title,
                post.handle,
                post.content,
                post.summary,
                post.visibility.ordinal(),
                format_ts(&post.post_ts),
                format_ts(&post.post_update_ts),
                post.id,
            ],
        )?)
    }

    fn delete_post(&mut self, id: PostId) -> Result<usize, StoreError> {
        Ok(self
            .conn
            .execute("DELETE FROM posts WHERE id = ?1", params![id])?)
    }

    fn query_posts<P: Params>(&self, filter: &str, params: P) -> Result<Vec<Post>, StoreError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts {filter} ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params, read_row)?;
        let mut posts = Vec::new();
        for row in rows {
            posts.push(row?.into_post()?);
        }
        Ok(posts)
    }
}

fn create_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS posts(\
            id INTEGER PRIMARY KEY AUTOINCREMENT,\
            title TEXT NOT NULL,\
            handle TEXT NOT NULL,\
            content TEXT NOT NULL,\
            summary TEXT NOT NULL,\
            visibility INTEGER NOT NULL DEFAULT 0,\
            post_ts TEXT NOT NULL,\
            post_update_ts TEXT NOT NULL\
        );\
        CREATE INDEX IF NOT EXISTS posts_handle ON posts(handle);",
    )?;
    conn.execute(
        "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1)",
        params![SCHEMA_VERSION],
    )?;
    Ok(())
}

fn migrate_hidden_to_visibility(conn: &mut Connection) -> Result<(), StoreError> {
    info!(
        from = HIDDEN_FLAG_SCHEMA_VERSION,
        to = SCHEMA_VERSION,
        "migrating hidden flag to visibility"
    );
    let tx = conn.transaction()?;
    tx.execute_batch(
        "ALTER TABLE posts ADD COLUMN visibility INTEGER NOT NULL DEFAULT 0;\
        UPDATE posts SET visibility = CASE WHEN hidden THEN 0 ELSE 2 END;\
        ALTER TABLE posts DROP COLUMN hidden;",
    )?;
    tx.execute(
        "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1)",
        params![SCHEMA_VERSION],
    )?;
    tx.commit()?;
    Ok(())
}

struct PostRow {
    id: PostId,
    title: String,
    handle: String,
    content: String,
    summary: String,
    visibility: i64,
    post_ts: String,
    post_update_ts: String,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        title: row.get(1)?,
        handle: row.get(2)?,
        content: row.get(3)?,
        summary: row.get(4)?,
        visibility: row.get(5)?,
        post_ts: row.get(6)?,
        post_update_ts: row.get(7)?,
    })
}

impl PostRow {
    fn into_post(self) -> Result<Post, StoreError> {
        let visibility = Visibility::from_ordinal(self.visibility)
            .ok_or(StoreError::InvalidVisibility(self.visibility))?;
        Ok(Post {
            id: self.id,
            title: self.title,
            handle: self.handle,
            content: self.content,
            summary: self.summary,
            visibility,
            post_ts: parse_ts(self.post_ts)?,
            post_update_ts: parse_ts(self.post_update_ts)?,
        })
    }
}

fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn parse_ts(value: String) -> Result<DateTime<Utc>, StoreError> {
    match DateTime::parse_from_rfc3339(&value) {
        Ok(ts) => Ok(ts.with_timezone(&Utc)),
        Err(source) => Err(StoreError::InvalidTimestamp { value, source }),
    }
}

impl PostStore for SqlitePostStore {
    fn insert(&mut self, post: NewPost) -> Result<Post, BlogError> {
        Ok(self.insert_post(post)?)
    }

    fn get(&self, id: PostId) -> Result<Option<Post>, BlogError> {
        Ok(self
            .query_posts("WHERE id = ?1", params![id])?
            .into_iter()
            .next())
    }

    fn all(&self) -> Result<Vec<Post>, BlogError> {
        Ok(self.query_posts("", [])?)
    }

    fn find_by_handle(
        &self,
        handle: &str,
        visibility: Visibility,
    ) -> Result<Vec<Post>, BlogError> {
        Ok(self.query_posts(
            "WHERE handle = ?1 AND visibility = ?2",
            params![handle, visibility.ordinal()],
        )?)
    }

    fn update(&mut self, post: &Post) -> Result<(), BlogError> {
        match self.update_post(post)? {
            0 => Err(BlogError::PostNotFound(post.id)),
            _ => Ok(()),
        }
    }

    fn delete(&mut self, id: PostId) -> Result<(), BlogError> {
        match self.delete_post(id)? {
            0 => Err(BlogError::PostNotFound(id)),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_hidden_flag_db(path: &Path) {
        let conn = Connection::open(path).expect("open legacy db");
        conn.execute_batch(
            "CREATE TABLE meta(key TEXT PRIMARY KEY, value INTEGER NOT NULL);\
            INSERT INTO meta (key, value) VALUES ('schema_version', 1);\
            CREATE TABLE posts(\
                id INTEGER PRIMARY KEY AUTOINCREMENT,\
                title TEXT NOT NULL,\
                handle TEXT NOT NULL,\
                content TEXT NOT NULL,\
                summary TEXT NOT NULL,\
                hidden INTEGER,\
                post_ts TEXT NOT NULL,\
                post_update_ts TEXT NOT NULL\
            );\
            INSERT INTO posts (title, handle, content, summary, hidden, post_ts, post_update_ts)\
                VALUES ('Draft', 'draft', '', '', 1, '2024-03-05T16:01:37Z', '2024-03-05T16:01:37Z');\
            INSERT INTO posts (title, handle, content, summary, hidden, post_ts, post_update_ts)\
                VALUES ('Live', 'live', '', '', 0, '2024-03-06T09:00:00Z', '2024-03-06T09:00:00Z');",
        )
        .expect("seed legacy db");
    }

    #[test]
    fn migrates_hidden_flag_to_visibility() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("blog.db");
        write_hidden_flag_db(&path);

        let store = SqlitePostStore::open(&path).expect("open");
        assert_eq!(store.schema_version().expect("version"), SCHEMA_VERSION);
        let posts = store.all().expect("all");
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].handle, "draft");
        assert_eq!(posts[0].visibility, Visibility::Hidden);
        assert_eq!(posts[1].handle, "live");
        assert_eq!(posts[1].visibility, Visibility::Published);
    }

    #[test]
    fn links_resolve_against_migrated_handles() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("blog.db");
        write_hidden_flag_db(&path);
        {
            let conn = Connection::open(&path).expect("open legacy db");
            conn.execute(
                "INSERT INTO posts (title, handle, content, summary, hidden, post_ts, post_update_ts)\
                    VALUES ('Cats & Dogs', 'cats__dogs', '', '', 0, '2024-03-07T09:00:00Z', '2024-03-07T09:00:00Z')",
                [],
            )
            .expect("seed legacy post");
        }

        let store = SqlitePostStore::open(&path).expect("open");
        let html = blog_core::links::rewrite_internal_links("<p>[[Cats & Dogs]]</p>", "/blog", &store)
            .expect("rewrite");
        assert_eq!(html, "<p><a href='/blog/cats__dogs'>Cats & Dogs</a></p>");
    }

    #[test]
    fn rejects_unknown_schema_version() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("blog.db");
        {
            let conn = Connection::open(&path).expect("open");
            conn.execute_batch(
                "CREATE TABLE meta(key TEXT PRIMARY KEY, value INTEGER NOT NULL);\
                INSERT INTO meta (key, value) VALUES ('schema_version', 99);",
            )
            .expect("seed");
        }
        let err = SqlitePostStore::open(&path).err().expect("unsupported");
        assert!(matches!(err, StoreError::UnsupportedSchema(99)));
    }

    #[test]
    fn sqlite_failure_keeps_its_source_chain() {
        let store = SqlitePostStore::open_in_memory().expect("open");
        store
            .conn
            .execute_batch("DROP TABLE posts;")
            .expect("drop posts");
        let err = store.all().expect_err("missing table");
        let source = std::error::Error::source(&err).expect("store error source");
        let store_err = source.downcast_ref::<StoreError>().expect("store error");
        assert!(matches!(store_err, StoreError::Sqlite(_)));
        assert!(std::error::Error::source(store_err).is_some());
    }

    #[test]
    fn bad_visibility_ordinal_is_reported() {
        let store = SqlitePostStore::open_in_memory().expect("open");
        store
            .conn
            .execute(
                "INSERT INTO posts (title, handle, content, summary, visibility, post_ts, post_update_ts)\
                    VALUES ('x', 'x', '', '', 7, '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
                [],
            )
            .expect("insert");
        let err = store.all().expect_err("bad ordinal");
        assert!(err.to_string().contains("ordinal 7"));
        let source = std::error::Error::source(&err).expect("store error source");
        assert!(matches!(
            source.downcast_ref::<StoreError>(),
            Some(StoreError::InvalidVisibility(7))
        ));
    }
}
