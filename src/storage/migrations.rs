//! Schema upgrades for the credential database.
//!
//! The applied version lives in SQLite's `user_version` header field. Each
//! step runs in its own transaction together with the version bump, so a
//! failed step leaves the file at the last good version.

use rusqlite::Connection;
use tracing::info;

use super::StorageError;

struct Migration {
    version: i64,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("sql/001_credentials.sql"),
}];

fn schema_version(conn: &Connection) -> Result<i64, StorageError> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let from = schema_version(conn)?;

    for migration in MIGRATIONS.iter().filter(|m| m.version > from) {
        let failed = |e: rusqlite::Error| StorageError::Migration {
            version: migration.version,
            error: e.to_string(),
        };
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(migration.sql).map_err(failed)?;
        tx.pragma_update(None, "user_version", migration.version)
            .map_err(failed)?;
        tx.commit()?;
        info!(version = migration.version, "credential schema upgraded");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latest() -> i64 {
        MIGRATIONS.last().map_or(0, |m| m.version)
    }

    #[test]
    fn test_fresh_db_gets_credentials_table() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 0);
        run_migrations(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='credentials'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(schema_version(&conn).unwrap(), latest());
    }

    #[test]
    fn test_rerun_is_noop() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn.execute(
            "INSERT INTO credentials (slot, value, saved_at) VALUES ('access_token', 'kept', 0)",
            [],
        )
        .unwrap();

        run_migrations(&conn).unwrap();

        let value: String = conn
            .query_row("SELECT value FROM credentials", [], |r| r.get(0))
            .unwrap();
        assert_eq!(value, "kept");
    }

    #[test]
    fn test_newer_schema_is_left_alone() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", latest() + 1).unwrap();

        run_migrations(&conn).unwrap();

        let tables: i64 = conn
            .query_row("SELECT COUNT(*) FROM sqlite_master", [], |r| r.get(0))
            .unwrap();
        assert_eq!(tables, 0);
        assert_eq!(schema_version(&conn).unwrap(), latest() + 1);
    }
}
