// Local SQLite snapshot of the backend tables, for offline generation

use launchpad_core::{CategoryRow, PostRow, SiteRows, SourceTable, StartupRow};
use rusqlite::{Connection, Result, params};
use std::fs;
use std::path::Path;

pub struct SnapshotStore {
    conn: Connection,
}

impl SnapshotStore {
    pub fn remove(path: &Path) -> std::io::Result<()> {
        fs::remove_file(path)
    }

    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        let store = SnapshotStore { conn };
        store.init_schema()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let store = SnapshotStore {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    // Columns stay nullable: a snapshot mirrors the backend, bad rows included
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS categories (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                slug TEXT
            );

            CREATE TABLE IF NOT EXISTS startups (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT,
                slug TEXT,
                status TEXT,
                updated_at TEXT,
                created_at TEXT
            );

            CREATE TABLE IF NOT EXISTS posts (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT,
                slug TEXT,
                updated_at TEXT,
                created_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_startups_status ON startups(status);
            ",
        )
    }

    pub fn insert_category(&self, row: &CategoryRow) -> Result<()> {
        insert_category(&self.conn, row)
    }

    pub fn insert_startup(&self, row: &StartupRow) -> Result<()> {
        insert_startup(&self.conn, row)
    }

    pub fn insert_post(&self, row: &PostRow) -> Result<()> {
        insert_post(&self.conn, row)
    }

    /// Replaces the stored snapshot with `rows` in one transaction.
    pub fn import(&mut self, rows: &SiteRows) -> Result<()> {
        let tx = self.conn.transaction()?;

        tx.execute_batch("DELETE FROM categories; DELETE FROM startups; DELETE FROM posts;")?;
        for row in &rows.categories {
            insert_category(&tx, row)?;
        }
        for row in &rows.startups {
            insert_startup(&tx, row)?;
        }
        for row in &rows.posts {
            insert_post(&tx, row)?;
        }

        tx.commit()
    }

    /// Categories sorted by slug, so repeated builds diff cleanly.
    pub fn get_categories(&self) -> Result<Vec<CategoryRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT slug FROM categories ORDER BY slug, seq")?;

        let categories = stmt
            .query_map([], |row| Ok(CategoryRow { slug: row.get(0)? }))?
            .collect::<Result<Vec<_>>>()?;

        Ok(categories)
    }

    pub fn get_startups(&self, approved_only: bool) -> Result<Vec<StartupRow>> {
        let sql = if approved_only {
            "SELECT id, slug, status, updated_at, created_at FROM startups
             WHERE status = 'approved' ORDER BY seq"
        } else {
            "SELECT id, slug, status, updated_at, created_at FROM startups ORDER BY seq"
        };
        let mut stmt = self.conn.prepare(sql)?;

        let startups = stmt
            .query_map([], |row| {
                Ok(StartupRow {
                    id: row.get(0)?,
                    slug: row.get(1)?,
                    status: row.get(2)?,
                    updated_at: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;

        Ok(startups)
    }

    pub fn get_posts(&self) -> Result<Vec<PostRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, slug, updated_at, created_at FROM posts ORDER BY seq")?;

        let posts = stmt
            .query_map([], |row| {
                Ok(PostRow {
                    id: row.get(0)?,
                    slug: row.get(1)?,
                    updated_at: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;

        Ok(posts)
    }

    pub fn load_rows(&self, approved_only: bool) -> Result<SiteRows> {
        Ok(SiteRows {
            categories: self.get_categories()?,
            startups: self.get_startups(approved_only)?,
            posts: self.get_posts()?,
        })
    }

    pub fn count(&self, table: SourceTable) -> Result<i64> {
        self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.as_str()),
            [],
            |row| row.get(0),
        )
    }
}

fn insert_category(conn: &Connection, row: &CategoryRow) -> Result<()> {
    conn.execute(
        "INSERT INTO categories (slug) VALUES (?1)",
        params![row.slug],
    )?;
    Ok(())
}

fn insert_startup(conn: &Connection, row: &StartupRow) -> Result<()> {
    conn.execute(
        "INSERT INTO startups (id, slug, status, updated_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![row.id, row.slug, row.status, row.updated_at, row.created_at],
    )?;
    Ok(())
}

fn insert_post(conn: &Connection, row: &PostRow) -> Result<()> {
    conn.execute(
        "INSERT INTO posts (id, slug, updated_at, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![row.id, row.slug, row.updated_at, row.created_at],
    )?;
    Ok(())
}
