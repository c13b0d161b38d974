use rusqlite::{Connection, OptionalExtension, params};

use super::StorageError;
use crate::time::now_unix;

pub fn save_credential(conn: &Connection, slot: &str, value: &str) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO credentials (slot, value, saved_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(slot) DO UPDATE SET value = excluded.value, saved_at = excluded.saved_at",
        params![slot, value, now_unix() as i64],
    )?;
    Ok(())
}

pub fn load_credential(conn: &Connection, slot: &str) -> Result<Option<String>, StorageError> {
    let value = conn
        .query_row(
            "SELECT value FROM credentials WHERE slot = ?1",
            params![slot],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

pub fn clear_credential(conn: &Connection, slot: &str) -> Result<(), StorageError> {
    conn.execute("DELETE FROM credentials WHERE slot = ?1", params![slot])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::migrations::run_migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn test_upsert_keeps_single_row() {
        let conn = conn();
        save_credential(&conn, "access_token", "one").unwrap();
        save_credential(&conn, "access_token", "two").unwrap();

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM credentials", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
        assert_eq!(
            load_credential(&conn, "access_token").unwrap().as_deref(),
            Some("two")
        );
    }

    #[test]
    fn test_missing_slot_is_none() {
        let conn = conn();
        assert_eq!(load_credential(&conn, "access_token").unwrap(), None);
    }
}
