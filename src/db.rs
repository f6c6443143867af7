use std::time::Duration;

use actix_web::web;
use diesel::connection::SimpleConnection;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use diesel::SqliteConnection;
use thiserror::Error;

use crate::error::AppError;

// Database connection pool type
pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

const MIGRATIONS: &[(i64, &str)] = &[(1, include_str!("../migrations/001_initial.sql"))];

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("database error: {0}")]
    Diesel(#[from] diesel::result::Error),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("{entity} {id} does not exist")]
    MissingReference { entity: &'static str, id: i32 },

    #[error("{entity} {id} is still referenced by {count} sample(s)")]
    StillReferenced {
        entity: &'static str,
        id: i32,
        count: i64,
    },

    #[error("migration {version} failed: {reason}")]
    MigrationFailed { version: i64, reason: String },
}

/// Applied to every connection the pool hands out.
#[derive(Debug)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(r2d2::Error::QueryError)
    }
}

/// Builds the pool for the SQLite file at `database_url` and makes sure the
/// schema exists.
pub fn init_pool(database_url: &str, max_size: u32) -> anyhow::Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .max_size(max_size)
        .connection_timeout(Duration::from_secs(10))
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)?;

    let mut conn = pool.get()?;
    // Persistent for the file; lets readers proceed while a writer holds the lock.
    conn.batch_execute("PRAGMA journal_mode = WAL;")?;
    run_migrations(&mut conn)?;
    Ok(pool)
}

/// Creates any missing tables. Every statement is idempotent, so this runs
/// unconditionally at startup.
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<(), DatabaseError> {
    for (version, sql) in MIGRATIONS {
        tracing::debug!("applying schema v{version}");
        conn.batch_execute(sql)
            .map_err(|e| DatabaseError::MigrationFailed {
                version: *version,
                reason: e.to_string(),
            })?;
    }
    Ok(())
}

/// Runs `f` on a pooled connection inside actix's blocking thread pool. The
/// connection goes back to the pool as soon as `f` returns.
pub async fn with_conn<F, T>(pool: &web::Data<DbPool>, f: F) -> Result<T, AppError>
where
    F: FnOnce(&mut SqliteConnection) -> Result<T, DatabaseError> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    web::block(move || -> Result<T, AppError> {
        let mut conn = pool.get()?;
        f(&mut conn).map_err(AppError::from)
    })
    .await?
}

#[cfg(test)]
pub(crate) fn test_pool() -> (tempfile::TempDir, DbPool) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("test.db");
    let pool = init_pool(path.to_str().expect("utf-8 temp path"), 2).expect("init test pool");
    (dir, pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::prelude::*;
    use diesel::sql_types::Integer;

    #[derive(QueryableByName)]
    struct Pragma {
        #[diesel(sql_type = Integer)]
        foreign_keys: i32,
    }

    #[test]
    fn migrations_are_idempotent() {
        let (_dir, pool) = test_pool();
        let mut conn = pool.get().unwrap();
        run_migrations(&mut conn).unwrap();
        run_migrations(&mut conn).unwrap();
    }

    #[test]
    fn pooled_connections_enforce_foreign_keys() {
        let (_dir, pool) = test_pool();
        let mut conn = pool.get().unwrap();
        let pragma: Pragma = diesel::sql_query("PRAGMA foreign_keys")
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(pragma.foreign_keys, 1);
    }

    #[derive(QueryableByName)]
    struct JournalMode {
        #[diesel(sql_type = diesel::sql_types::Text)]
        journal_mode: String,
    }

    #[test]
    fn database_runs_in_wal_mode() {
        let (_dir, pool) = test_pool();
        let mut conn = pool.get().unwrap();
        let mode: JournalMode = diesel::sql_query("PRAGMA journal_mode")
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(mode.journal_mode.to_lowercase(), "wal");
    }

    #[test]
    fn creates_the_database_file() {
        let (dir, _pool) = test_pool();
        assert!(dir.path().join("test.db").exists());
    }
}
