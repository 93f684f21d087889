use anyhow::{Result, anyhow};
use rusqlite::params;

use super::Store;
use super::types::{ConnectionLogRecord, ConnectionRecord, ConnectionStatus};

fn row_to_connection(row: &rusqlite::Row) -> rusqlite::Result<ConnectionRecord> {
    let status: String = row.get(8)?;
    Ok(ConnectionRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        engine: row.get(2)?,
        host: row.get(3)?,
        port: row.get(4)?,
        username: row.get(5)?,
        password_enc: row.get(6)?,
        database_name: row.get(7)?,
        status: ConnectionStatus::parse(&status).unwrap_or(ConnectionStatus::Unknown),
        last_tested_at: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

const CONNECTION_COLUMNS: &str = "id, name, engine, host, port, username, password_enc, \
     database_name, status, last_tested_at, created_at, updated_at";

impl Store {
    pub async fn list_connections(&self) -> Result<Vec<ConnectionRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(&format!(
            "SELECT {CONNECTION_COLUMNS} FROM connections ORDER BY id"
        ))?;
        let rows = stmt.query_map([], row_to_connection)?;
        let mut connections = Vec::new();
        for row in rows {
            connections.push(row?);
        }
        Ok(connections)
    }

    pub async fn get_connection(&self, id: i64) -> Result<Option<ConnectionRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(&format!(
            "SELECT {CONNECTION_COLUMNS} FROM connections WHERE id = ?1"
        ))?;
        let mut rows = stmt.query_map(params![id], row_to_connection)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_connection(
        &self,
        name: &str,
        engine: &str,
        host: &str,
        port: i64,
        username: &str,
        password_enc: &str,
        database_name: &str,
    ) -> Result<ConnectionRecord> {
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO connections (name, engine, host, port, username, password_enc, database_name)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![name, engine, host, port, username, password_enc, database_name],
        )?;
        let id = db.last_insert_rowid();
        drop(db);
        self.get_connection(id)
            .await?
            .ok_or_else(|| anyhow!("connection {} vanished after insert", id))
    }

    /// Update the editable fields. A `None` password keeps the stored secret.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_connection(
        &self,
        id: i64,
        name: &str,
        engine: &str,
        host: &str,
        port: i64,
        username: &str,
        password_enc: Option<&str>,
        database_name: &str,
    ) -> Result<bool> {
        let db = self.db.lock().await;
        let rows = match password_enc {
            Some(enc) => db.execute(
                "UPDATE connections SET name = ?1, engine = ?2, host = ?3, port = ?4,
                        username = ?5, password_enc = ?6, database_name = ?7,
                        updated_at = CURRENT_TIMESTAMP
                 WHERE id = ?8",
                params![name, engine, host, port, username, enc, database_name, id],
            )?,
            None => db.execute(
                "UPDATE connections SET name = ?1, engine = ?2, host = ?3, port = ?4,
                        username = ?5, database_name = ?6, updated_at = CURRENT_TIMESTAMP
                 WHERE id = ?7",
                params![name, engine, host, port, username, database_name, id],
            )?,
        };
        Ok(rows > 0)
    }

    /// Removes the connection only. Its log rows are part of the
    /// append-only trail and stay behind.
    pub async fn delete_connection(&self, id: i64) -> Result<bool> {
        let db = self.db.lock().await;
        let rows = db.execute("DELETE FROM connections WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub async fn set_connection_status(&self, id: i64, status: ConnectionStatus) -> Result<bool> {
        let db = self.db.lock().await;
        let rows = db.execute(
            "UPDATE connections SET status = ?1, last_tested_at = CURRENT_TIMESTAMP,
                    updated_at = CURRENT_TIMESTAMP
             WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        Ok(rows > 0)
    }

    /// Insert into the append-only audit trail. Rows are never updated.
    pub async fn append_connection_log(
        &self,
        connection_id: i64,
        action: &str,
        outcome: &str,
        detail: &str,
    ) -> Result<()> {
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO connection_logs (connection_id, action, outcome, detail)
             VALUES (?1, ?2, ?3, ?4)",
            params![connection_id, action, outcome, detail],
        )?;
        Ok(())
    }

    pub async fn list_connection_logs(
        &self,
        connection_id: Option<i64>,
    ) -> Result<Vec<ConnectionLogRecord>> {
        let db = self.db.lock().await;
        let mut logs = Vec::new();
        match connection_id {
            Some(id) => {
                let mut stmt = db.prepare(
                    "SELECT id, connection_id, action, outcome, detail, created_at
                     FROM connection_logs WHERE connection_id = ?1 ORDER BY id DESC",
                )?;
                let rows = stmt.query_map(params![id], row_to_log)?;
                for row in rows {
                    logs.push(row?);
                }
            }
            None => {
                let mut stmt = db.prepare(
                    "SELECT id, connection_id, action, outcome, detail, created_at
                     FROM connection_logs ORDER BY id DESC",
                )?;
                let rows = stmt.query_map([], row_to_log)?;
                for row in rows {
                    logs.push(row?);
                }
            }
        }
        Ok(logs)
    }
}

fn row_to_log(row: &rusqlite::Row) -> rusqlite::Result<ConnectionLogRecord> {
    Ok(ConnectionLogRecord {
        id: row.get(0)?,
        connection_id: row.get(1)?,
        action: row.get(2)?,
        outcome: row.get(3)?,
        detail: row.get(4)?,
        created_at: row.get(5)?,
    })
}
