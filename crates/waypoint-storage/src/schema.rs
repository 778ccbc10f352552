use super::*;

const TABLE_STATEMENTS: &[&str] = &["CREATE TABLE IF NOT EXISTS tour_progress (
        tour_key TEXT PRIMARY KEY NOT NULL,
        highest_index INTEGER NOT NULL DEFAULT 0,
        total_length INTEGER NOT NULL DEFAULT 0,
        completed INTEGER NOT NULL DEFAULT 0
    )"];

pub(super) fn create_tables(conn: &Connection) -> Result<(), StorageError> {
    for statement in TABLE_STATEMENTS {
        conn.execute(statement, [])?;
    }
    Ok(())
}

pub(super) fn apply_schema_migrations(store: &SqliteProgressStore) -> Result<(), StorageError> {
    let stored_version = store.schema_version()?;

    if stored_version > SCHEMA_VERSION {
        return Err(StorageError::Other(format!(
            "Unsupported progress schema version: {stored_version} (max supported: {SCHEMA_VERSION})"
        )));
    }

    if stored_version < SCHEMA_VERSION {
        store.set_schema_version(SCHEMA_VERSION)?;
    }
    Ok(())
}
