//! Session-expiry marker persisted in `local_state`.

use crate::db::{self, DbResult, SharedConnection};
use log::info;
use rusqlite::{params, OptionalExtension};

const SESSION_EXPIRY_KEY: &str = "session_expiry";

/// Session lifetime granted by a successful login (14 days).
pub const SESSION_TTL_MS: i64 = 14 * 24 * 60 * 60 * 1000;

/// Client-local persistence of the session-expiry marker.
#[derive(Clone)]
pub struct SessionMarkerStore {
    conn: SharedConnection,
}

impl SessionMarkerStore {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Records a fresh marker expiring `SESSION_TTL_MS` after `now_ms`.
    ///
    /// Returns the stored expiry.
    pub fn write_expiry(&self, now_ms: i64) -> DbResult<i64> {
        let expiry = now_ms.saturating_add(SESSION_TTL_MS);
        let conn = db::lock(&self.conn)?;
        conn.execute(
            "INSERT INTO local_state (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![SESSION_EXPIRY_KEY, expiry.to_string()],
        )?;
        info!("event=session_marker_write module=session status=ok expiry_ms={expiry}");
        Ok(expiry)
    }

    /// Reads the stored expiry; unparsable values read as absent.
    pub fn read_expiry(&self) -> DbResult<Option<i64>> {
        let conn = db::lock(&self.conn)?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM local_state WHERE key = ?1;",
                [SESSION_EXPIRY_KEY],
                |row| row.get(0),
            )
            .optional()?;
        Ok(raw.and_then(|value| value.trim().parse::<i64>().ok()))
    }

    pub fn clear(&self) -> DbResult<()> {
        let conn = db::lock(&self.conn)?;
        conn.execute(
            "DELETE FROM local_state WHERE key = ?1;",
            [SESSION_EXPIRY_KEY],
        )?;
        info!("event=session_marker_clear module=session status=ok");
        Ok(())
    }

    /// Whether a marker exists and has not yet expired at `now_ms`.
    pub fn is_valid(&self, now_ms: i64) -> DbResult<bool> {
        Ok(self.read_expiry()?.is_some_and(|expiry| now_ms < expiry))
    }
}
