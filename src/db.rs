use crate::config::Config;
use crate::model::{Book, BookFilter, BookInput};
use anyhow::Result;
use libsql::{Builder, Connection, Database as LibsqlDatabase};
use std::path::Path;
use std::time::Duration;

const SYSTEM_MIGRATIONS: &[(&str, &str)] =
    &[("system/000_migrations_table.sql", include_str!("migrations/system/000_migrations_table.sql"))];

const MIGRATIONS: &[(&str, &str)] = &[("001_schema.sql", include_str!("migrations/001_schema.sql"))];

const BOOK_COLUMNS: &str = "id, title, author, year, detail";

pub struct Database {
    _db: LibsqlDatabase,
    conn: Connection,
}

impl Database {
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    async fn is_migration_applied(conn: &Connection, name: &str) -> Result<bool> {
        let query = "SELECT 1 FROM _migrations WHERE name = ?";
        match conn.query(query, libsql::params![name]).await {
            Ok(mut rows) => Ok(rows.next().await?.is_some()),
            Err(e) => {
                if e.to_string().contains("no such table") {
                    Ok(false)
                } else {
                    Err(e.into())
                }
            }
        }
    }

    async fn record_migration(conn: &Connection, name: &str) -> Result<()> {
        let query = r#"
            INSERT INTO _migrations (name, applied_at)
            VALUES (?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        "#;
        conn.execute(query, libsql::params![name]).await?;
        Ok(())
    }

    async fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
        if Self::is_migration_applied(conn, name).await? {
            tracing::debug!("migration {} already applied, skipping", name);
            return Ok(());
        }

        tracing::info!("applying migration: {}", name);
        conn.execute_batch(sql)
            .await
            .map_err(|e| anyhow::anyhow!("failed to execute migration {name}: {e}"))?;

        Self::record_migration(conn, name).await?;
        Ok(())
    }

    async fn migrate(conn: &Connection) -> Result<()> {
        for (filename, sql) in SYSTEM_MIGRATIONS.iter().chain(MIGRATIONS) {
            Self::run_migration(conn, filename, sql).await?;
        }
        Ok(())
    }

    pub async fn new(cfg: &Config, data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(cfg.app.get_db());

        let db = match (&cfg.app.turso_url, &cfg.app.turso_auth_token) {
            (Some(url), Some(token)) => {
                tracing::info!("[db] running in synced database mode (offline writes)");
                let sync_interval = Duration::from_secs(cfg.app.sync_interval_seconds);
                Builder::new_synced_database(&path, url.clone(), token.clone())
                    .sync_interval(sync_interval)
                    .build()
                    .await?
            }
            _ => {
                tracing::info!(path = ?path, "[db] running in local mode");
                Builder::new_local(&path).build().await?
            }
        };

        Self::open(db).await
    }

    pub async fn in_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:").build().await?;
        Self::open(db).await
    }

    async fn open(db: LibsqlDatabase) -> Result<Self> {
        let conn = db.connect()?;
        conn.query("SELECT 1", ()).await?;
        Self::migrate(&conn).await?;

        Ok(Database { _db: db, conn })
    }

    pub async fn list_books(&self, filter: &BookFilter) -> Result<Vec<Book>> {
        // LIMIT -1 means no limit in sqlite
        let limit = filter.limit.map(i64::from).unwrap_or(-1);
        let offset = i64::from(filter.offset.unwrap_or(0));

        let mut rows = match filter.q.as_deref().filter(|q| !q.trim().is_empty()) {
            Some(q) => {
                let query = format!(
                    "SELECT {BOOK_COLUMNS} FROM book WHERE title LIKE ? OR author LIKE ? ORDER BY id LIMIT ? OFFSET ?"
                );
                let pattern = format!("%{}%", q.trim());
                self.conn
                    .query(&query, libsql::params![pattern.clone(), pattern, limit, offset])
                    .await?
            }
            None => {
                let query = format!("SELECT {BOOK_COLUMNS} FROM book ORDER BY id LIMIT ? OFFSET ?");
                self.conn.query(&query, libsql::params![limit, offset]).await?
            }
        };

        let mut books = Vec::new();
        while let Some(row) = rows.next().await? {
            books.push(Self::row_to_book(&row)?);
        }

        Ok(books)
    }

    pub async fn get_book(&self, id: i32) -> Result<Option<Book>> {
        let query = format!("SELECT {BOOK_COLUMNS} FROM book WHERE id = ?");
        let mut rows = self.conn.query(&query, libsql::params![id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_book(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn create_book(&self, input: BookInput) -> Result<Book> {
        let query = r#"
            INSERT INTO book (title, author, year, detail)
            VALUES (?, ?, ?, ?)
            RETURNING id
        "#;

        let mut rows = self
            .conn
            .query(
                query,
                libsql::params![
                    input.title.as_str(),
                    input.author.as_str(),
                    input.year,
                    input.detail.clone()
                ],
            )
            .await?;

        let id: i32 = if let Some(row) = rows.next().await? {
            row.get(0)?
        } else {
            anyhow::bail!("Failed to create book")
        };

        Ok(input.into_book(id))
    }

    /// Returns `None` when no book has this id.
    pub async fn update_book(&self, id: i32, input: BookInput) -> Result<Option<Book>> {
        let affected = self
            .conn
            .execute(
                "UPDATE book SET title = ?, author = ?, year = ?, detail = ? WHERE id = ?",
                libsql::params![
                    input.title.as_str(),
                    input.author.as_str(),
                    input.year,
                    input.detail.clone(),
                    id
                ],
            )
            .await?;

        if affected == 0 {
            return Ok(None);
        }

        Ok(Some(input.into_book(id)))
    }

    pub async fn delete_book(&self, id: i32) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM book WHERE id = ?", libsql::params![id])
            .await?;
        Ok(affected > 0)
    }

    fn row_to_book(row: &libsql::Row) -> Result<Book> {
        Ok(Book {
            id: row.get(0)?,
            title: row.get(1)?,
            author: row.get(2)?,
            year: row.get(3)?,
            detail: row.get::<Option<String>>(4)?,
        })
    }
}
