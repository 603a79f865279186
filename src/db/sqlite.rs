//! Connection setup for the diagnostics database.
//!
//! Every connection runs the same preparation: WAL + foreign-key
//! pragmas, then any schema migrations not yet applied. Scripts live
//! under `resources/migrations/` and are compiled in; the slice index
//! plus one is the schema version a script brings the database to.

use std::path::Path;

use rusqlite::Connection;

use super::DatabaseError;

const MIGRATIONS: &[&str] = &[include_str!("../../resources/migrations/001_initial.sql")];

/// Open a prepared connection to the database at `path`, creating and
/// migrating it as needed.
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = Connection::open(path)?;
    prepare(&conn)?;
    Ok(conn)
}

/// In-memory variant for tests.
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    prepare(&conn)?;
    Ok(conn)
}

fn prepare(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA foreign_keys=ON;",
    )?;
    apply_migrations(conn)
}

fn apply_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let applied = schema_version(conn);
    for (idx, sql) in MIGRATIONS.iter().enumerate() {
        let version = idx as i64 + 1;
        if version <= applied {
            continue;
        }
        tracing::info!(version, "Applying schema migration");
        conn.execute_batch(sql)
            .map_err(|e| DatabaseError::MigrationFailed {
                version,
                reason: e.to_string(),
            })?;
    }
    Ok(())
}

/// Highest applied migration, 0 on a fresh database (no
/// `schema_version` table yet).
fn schema_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, i64>(0)
    })
    .unwrap_or(0)
}
