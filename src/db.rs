//! Durable conversation records
//!
//! Each room is one row holding the JSON document of its
//! [`ConversationState`], mirroring how clients see it.

mod schema;

use schema::SCHEMA;

use crate::conversation::{ConversationState, ConversationStore, StoreError, StoreResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }
}

fn read_state(conn: &Connection, room: &str) -> StoreResult<Option<ConversationState>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT state FROM conversations WHERE room = ?1",
            params![room],
            |row| row.get(0),
        )
        .optional()
        .map_err(DbError::from)?;

    raw.map(|json| {
        serde_json::from_str(&json).map_err(|source| StoreError::Corrupt {
            room: room.to_string(),
            source,
        })
    })
    .transpose()
}

fn write_state(conn: &Connection, room: &str, state: &ConversationState) -> DbResult<()> {
    let json = serde_json::to_string(state)?;
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO conversations (room, state, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?3)
         ON CONFLICT(room) DO UPDATE SET state = excluded.state, updated_at = excluded.updated_at",
        params![room, json, now],
    )?;
    Ok(())
}

impl ConversationStore for Database {
    fn load(&self, room: &str) -> StoreResult<Option<ConversationState>> {
        let conn = self.conn.lock().unwrap();
        read_state(&conn, room)
    }

    fn modify(
        &self,
        room: &str,
        apply: &mut dyn FnMut(&mut Option<ConversationState>),
    ) -> StoreResult<Option<ConversationState>> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction().map_err(DbError::from)?;

        let mut record = read_state(&tx, room)?;
        apply(&mut record);
        if let Some(state) = &record {
            write_state(&tx, room, state)?;
        }

        tx.commit().map_err(DbError::from)?;
        Ok(record)
    }

    fn clear_generating(&self) -> StoreResult<usize> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction().map_err(DbError::from)?;

        let rows: Vec<(String, String)> = {
            let mut stmt = tx
                .prepare("SELECT room, state FROM conversations")
                .map_err(DbError::from)?;
            let rows = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
                .map_err(DbError::from)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(DbError::from)?;
            rows
        };

        let mut cleared = 0;
        for (room, json) in rows {
            let Ok(mut state) = serde_json::from_str::<ConversationState>(&json) else {
                tracing::warn!(room = %room, "Skipping unreadable conversation record");
                continue;
            };
            if state.is_generating {
                state.is_generating = false;
                write_state(&tx, &room, &state)?;
                cleared += 1;
            }
        }

        tx.commit().map_err(DbError::from)?;
        Ok(cleared)
    }
}
