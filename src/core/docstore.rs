//! Tenant-scoped document cache: a second SQLite file holding JSON
//! bodies keyed by `(tenant_id, collection, external_id)`. Population is
//! strictly insert-if-absent: once a tenant's collection has rows,
//! neither the collector nor the seed data touches it again.

use anyhow::Result;
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

pub mod collections {
    pub const AGENTS: &str = "agents";
    pub const TEAMS: &str = "teams";
    pub const WORKSPACES: &str = "workspaces";
    pub const PROCESSES: &str = "processes";
    pub const SCHEDULE: &str = "schedule";
    pub const AUDIT: &str = "audit";
    pub const LAYOUTS: &str = "layouts";
}

pub struct DocStore {
    db: Arc<Mutex<Connection>>,
}

impl DocStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(db: Connection) -> Result<Self> {
        db.execute(
            "CREATE TABLE IF NOT EXISTS documents (
                tenant_id TEXT NOT NULL,
                collection TEXT NOT NULL,
                external_id TEXT NOT NULL,
                body TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (tenant_id, collection, external_id)
            )",
            [],
        )?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    pub async fn is_empty(&self, tenant: &str, collection: &str) -> Result<bool> {
        let db = self.db.lock().await;
        let count: i64 = db.query_row(
            "SELECT COUNT(*) FROM documents WHERE tenant_id = ?1 AND collection = ?2",
            params![tenant, collection],
            |row| row.get(0),
        )?;
        Ok(count == 0)
    }

    /// Insert a document unless one already exists under the same key.
    /// Returns true when a row was written.
    pub async fn insert_if_absent(
        &self,
        tenant: &str,
        collection: &str,
        external_id: &str,
        body: &serde_json::Value,
    ) -> Result<bool> {
        let db = self.db.lock().await;
        let rows = db.execute(
            "INSERT OR IGNORE INTO documents (tenant_id, collection, external_id, body)
             VALUES (?1, ?2, ?3, ?4)",
            params![tenant, collection, external_id, body.to_string()],
        )?;
        Ok(rows > 0)
    }

    /// Unconditional write, used for layout documents and audit entries
    /// where the latest version wins.
    pub async fn put(
        &self,
        tenant: &str,
        collection: &str,
        external_id: &str,
        body: &serde_json::Value,
    ) -> Result<()> {
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO documents (tenant_id, collection, external_id, body)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(tenant_id, collection, external_id)
             DO UPDATE SET body = excluded.body, updated_at = CURRENT_TIMESTAMP",
            params![tenant, collection, external_id, body.to_string()],
        )?;
        Ok(())
    }

    pub async fn get(
        &self,
        tenant: &str,
        collection: &str,
        external_id: &str,
    ) -> Result<Option<serde_json::Value>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT body FROM documents
             WHERE tenant_id = ?1 AND collection = ?2 AND external_id = ?3",
        )?;
        let mut rows = stmt.query(params![tenant, collection, external_id])?;
        match rows.next()? {
            Some(row) => {
                let body: String = row.get(0)?;
                Ok(Some(serde_json::from_str(&body)?))
            }
            None => Ok(None),
        }
    }

    pub async fn list(&self, tenant: &str, collection: &str) -> Result<Vec<serde_json::Value>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT body FROM documents
             WHERE tenant_id = ?1 AND collection = ?2 ORDER BY external_id",
        )?;
        let rows = stmt.query_map(params![tenant, collection], |row| {
            row.get::<_, String>(0)
        })?;
        let mut docs = Vec::new();
        for row in rows {
            docs.push(serde_json::from_str(&row?)?);
        }
        Ok(docs)
    }
}
