// db/pool.rs
// Async connection pool using deadpool-sqlite
//
// Database access goes through `interact`, which runs the closure on a
// blocking thread pool so it never blocks the async runtime. Best-effort
// writes (the question audit trail) use `try_interact_warn`, which logs
// failures instead of propagating them.
//
// In-memory pools use a shared-cache URI so multiple pooled connections
// see the same database state; this is what makes them usable in tests.

use anyhow::{Context, Result};
use deadpool_sqlite::{Config, Hook, Pool, Runtime};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Database pool wrapper with per-connection setup.
pub struct DatabasePool {
    pool: Pool,
    path: Option<PathBuf>,
}

impl DatabasePool {
    /// Open a pooled database at the given path, creating it if needed.
    pub async fn open(path: &Path) -> Result<Self> {
        ensure_parent_directory(path)?;

        let conn_str = path.to_string_lossy().into_owned();
        let hook = make_file_post_create_hook(path.to_path_buf());

        let cfg = Config::new(&conn_str);
        let pool = cfg
            .builder(Runtime::Tokio1)
            .context("Failed to create pool builder")?
            .max_size(8)
            .post_create(hook)
            .build()
            .context("Failed to build connection pool")?;

        let db_pool = Self {
            pool,
            path: Some(path.to_path_buf()),
        };
        db_pool.run_migrations().await?;

        Ok(db_pool)
    }

    /// Open a pooled in-memory database.
    ///
    /// Uses a shared cache URI so all connections access the same in-memory
    /// database. Without shared cache, each pooled connection would get its
    /// own separate empty database.
    pub async fn open_in_memory() -> Result<Self> {
        let uri = format!("file:memdb_{}?mode=memory&cache=shared", uuid::Uuid::new_v4());

        let cfg = Config::new(&uri);
        let pool = cfg
            .builder(Runtime::Tokio1)
            .context("Failed to create pool builder")?
            .max_size(8)
            .post_create(make_memory_post_create_hook())
            .build()
            .context("Failed to build connection pool")?;

        let db_pool = Self { pool, path: None };
        db_pool.run_migrations().await?;

        Ok(db_pool)
    }

    /// Run a closure with a connection from the pool.
    ///
    /// This is the primary API for database access. The closure runs on a
    /// blocking thread pool, so it won't block the async runtime.
    pub async fn interact<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Connection) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let conn = self
            .pool
            .get()
            .await
            .context("Failed to get connection from pool")?;

        conn.interact(move |conn| f(conn))
            .await
            .map_err(|e| anyhow::anyhow!("interact failed: {e}"))?
    }

    /// Run a closure on a pooled connection, logging failures at warn but
    /// not propagating them. Use for best-effort writes whose failure must
    /// not fail the surrounding request (question audit records).
    pub async fn try_interact_warn<F, R>(&self, label: &str, f: F) -> Option<R>
    where
        F: FnOnce(&Connection) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let label = label.to_string();
        match self.interact(move |conn| f(conn)).await {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("{}: {}", label, e);
                None
            }
        }
    }

    /// Get the database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run schema migrations. Called during pool creation.
    async fn run_migrations(&self) -> Result<()> {
        self.interact(|conn| {
            super::schema::run_all_migrations(conn)?;
            if let Err(e) = conn.execute_batch("PRAGMA optimize") {
                tracing::debug!("PRAGMA optimize skipped: {}", e);
            }
            Ok(())
        })
        .await
    }
}

/// Ensure the parent directory of a database file exists.
fn ensure_parent_directory(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

/// Create a post_create hook for file-based databases.
///
/// Applies connection pragmas and restricts the database file to the
/// owning user (memory records are personal data).
fn make_file_post_create_hook(path: PathBuf) -> Hook {
    Hook::async_fn(move |conn, _metrics| {
        let path_for_perms = path.clone();
        Box::pin(async move {
            conn.interact(move |conn| {
                setup_connection(conn)?;

                #[cfg(unix)]
                if let Ok(metadata) = std::fs::metadata(&path_for_perms) {
                    let mut perms = metadata.permissions();
                    perms.set_mode(0o600); // rw-------
                    if let Err(e) = std::fs::set_permissions(&path_for_perms, perms) {
                        tracing::warn!("Failed to set database file permissions to 0600: {}", e);
                    }
                }
                #[cfg(not(unix))]
                tracing::debug!(
                    "Skipping DB file permission restriction on non-Unix platform: {}",
                    path_for_perms.display()
                );

                Ok::<_, rusqlite::Error>(())
            })
            .await
            .map_err(|e| {
                deadpool_sqlite::HookError::Message(format!("interact failed: {e}").into())
            })?
            .map_err(|e| {
                deadpool_sqlite::HookError::Message(format!("connection setup failed: {e}").into())
            })
        })
    })
}

/// Create a post_create hook for in-memory databases.
///
/// Enables foreign keys and busy_timeout (WAL mode is not applicable to
/// in-memory DBs).
fn make_memory_post_create_hook() -> Hook {
    Hook::async_fn(|conn, _metrics| {
        Box::pin(async move {
            conn.interact(|conn| {
                conn.execute_batch(
                    "PRAGMA foreign_keys=ON; \
                     PRAGMA busy_timeout=5000;",
                )?;
                Ok::<_, rusqlite::Error>(())
            })
            .await
            .map_err(|e| {
                deadpool_sqlite::HookError::Message(format!("interact failed: {e}").into())
            })?
            .map_err(|e| {
                deadpool_sqlite::HookError::Message(format!("connection setup failed: {e}").into())
            })
        })
    })
}

/// Configure a connection after it's created.
fn setup_connection(conn: &Connection) -> rusqlite::Result<()> {
    // WAL for concurrent readers, foreign keys on, 5s busy timeout,
    // NORMAL synchronous (safe with WAL).
    conn.execute_batch(
        "PRAGMA journal_mode=WAL; \
         PRAGMA foreign_keys=ON; \
         PRAGMA busy_timeout=5000; \
         PRAGMA synchronous=NORMAL;",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory() {
        let pool = DatabasePool::open_in_memory().await.unwrap();
        assert!(pool.path().is_none());

        // Schema must be in place
        let count: i64 = pool
            .interact(|conn| {
                conn.query_row("SELECT COUNT(*) FROM memories", [], |row| row.get(0))
                    .map_err(Into::into)
            })
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_shared_cache_across_connections() {
        let pool = DatabasePool::open_in_memory().await.unwrap();

        pool.interact(|conn| {
            conn.execute(
                "INSERT INTO memories (elder_id, kind, body) VALUES ('e1', 'story', 'lake trip')",
                [],
            )?;
            Ok(())
        })
        .await
        .unwrap();

        // A different pooled connection must see the row
        let count: i64 = pool
            .interact(|conn| {
                conn.query_row("SELECT COUNT(*) FROM memories", [], |row| row.get(0))
                    .map_err(Into::into)
            })
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_open_file_db() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("keepsake.db");
        let pool = DatabasePool::open(&db_path).await.unwrap();
        assert_eq!(pool.path(), Some(db_path.as_path()));
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_try_interact_warn_swallows_errors() {
        let pool = DatabasePool::open_in_memory().await.unwrap();

        let result: Option<()> = pool
            .try_interact_warn("bad insert", |conn| {
                conn.execute("INSERT INTO no_such_table VALUES (1)", [])?;
                Ok(())
            })
            .await;
        assert!(result.is_none());
    }
}
