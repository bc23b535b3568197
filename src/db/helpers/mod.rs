use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};

pub fn read_value(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM kv_store WHERE key = ?1",
        params![key],
        |row| row.get::<_, String>(0),
    )
    .optional()
    .with_context(|| format!("failed to read {key}"))
}

pub fn write_value(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value, Utc::now().to_rfc3339()],
    )
    .with_context(|| format!("failed to write {key}"))?;
    Ok(())
}

pub fn remove_value(conn: &Connection, key: &str) -> Result<()> {
    conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])
        .with_context(|| format!("failed to remove {key}"))?;
    Ok(())
}

/// Serialize and store a whole collection, replacing whatever was there.
pub fn write_json<T: Serialize + ?Sized>(conn: &Connection, key: &str, value: &T) -> Result<()> {
    let serialized =
        serde_json::to_string(value).with_context(|| format!("failed to serialize {key}"))?;
    write_value(conn, key, &serialized)
}

/// Outcome of reading a JSON blob: absent, parsed, or present but unreadable.
pub enum Blob<T> {
    Missing,
    Parsed(T),
    Corrupt(serde_json::Error),
}

pub fn read_json<T: DeserializeOwned>(conn: &Connection, key: &str) -> Result<Blob<T>> {
    let Some(raw) = read_value(conn, key)? else {
        return Ok(Blob::Missing);
    };

    Ok(match serde_json::from_str(&raw) {
        Ok(value) => Blob::Parsed(value),
        Err(err) => Blob::Corrupt(err),
    })
}
