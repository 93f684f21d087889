use anyhow::{Result, anyhow};
use rusqlite::params;

use super::Store;
use super::types::{ProcessRecord, ProcessStatus};

fn row_to_process(row: &rusqlite::Row) -> rusqlite::Result<ProcessRecord> {
    let status: String = row.get(3)?;
    Ok(ProcessRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        status: ProcessStatus::parse(&status).unwrap_or(ProcessStatus::Paused),
        agent_id: row.get(4)?,
        workspace_id: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

impl Store {
    pub async fn list_processes(&self) -> Result<Vec<ProcessRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, name, description, status, agent_id, workspace_id, created_at, updated_at
             FROM processes ORDER BY id",
        )?;
        let rows = stmt.query_map([], row_to_process)?;
        let mut processes = Vec::new();
        for row in rows {
            processes.push(row?);
        }
        Ok(processes)
    }

    /// Processes attached to a schedule entry whose `[start_hour, end_hour)`
    /// window contains `hour`.
    pub async fn running_processes_at(&self, hour: i64) -> Result<Vec<ProcessRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT DISTINCT p.id, p.name, p.description, p.status, p.agent_id,
                    p.workspace_id, p.created_at, p.updated_at
             FROM processes p
             JOIN schedule_entries s ON s.process_id = p.id
             WHERE s.start_hour <= ?1 AND ?1 < s.end_hour
             ORDER BY p.id",
        )?;
        let rows = stmt.query_map(params![hour], row_to_process)?;
        let mut processes = Vec::new();
        for row in rows {
            processes.push(row?);
        }
        Ok(processes)
    }

    pub async fn create_process(
        &self,
        name: &str,
        description: &str,
        agent_id: Option<i64>,
        workspace_id: Option<i64>,
    ) -> Result<ProcessRecord> {
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO processes (name, description, agent_id, workspace_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![name, description, agent_id, workspace_id],
        )?;
        let id = db.last_insert_rowid();
        let mut stmt = db.prepare(
            "SELECT id, name, description, status, agent_id, workspace_id, created_at, updated_at
             FROM processes WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], row_to_process)?;
        match rows.next() {
            Some(row) => Ok(row?),
            None => Err(anyhow!("process {} vanished after insert", id)),
        }
    }

    pub async fn update_process_status(&self, id: i64, status: ProcessStatus) -> Result<bool> {
        let db = self.db.lock().await;
        let rows = db.execute(
            "UPDATE processes SET status = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_scheduled_process(start: i64, end: i64) -> (Store, i64) {
        let store = Store::open_in_memory().unwrap();
        let process = store
            .create_process("nightly-sync", "", None, None)
            .await
            .unwrap();
        store
            .create_schedule_entry("sync window", 0, start, end, None, Some(process.id))
            .await
            .unwrap();
        (store, process.id)
    }

    #[tokio::test]
    async fn running_window_is_half_open() {
        let (store, id) = store_with_scheduled_process(9, 17).await;

        // Inside the window, including the start hour.
        for hour in [9, 12, 16] {
            let running = store.running_processes_at(hour).await.unwrap();
            assert_eq!(running.len(), 1, "hour {hour} should match");
            assert_eq!(running[0].id, id);
        }
        // End hour and outside are excluded.
        for hour in [8, 17, 23] {
            assert!(
                store.running_processes_at(hour).await.unwrap().is_empty(),
                "hour {hour} should not match"
            );
        }
    }

    #[tokio::test]
    async fn overlapping_entries_yield_distinct_processes() {
        let (store, _) = store_with_scheduled_process(0, 24).await;
        // Second entry on the same process must not duplicate the row.
        let running = store.running_processes_at(12).await.unwrap();
        store
            .create_schedule_entry("backup window", 1, 10, 14, None, Some(running[0].id))
            .await
            .unwrap();
        assert_eq!(store.running_processes_at(12).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_process_status_roundtrip() {
        let store = Store::open_in_memory().unwrap();
        let process = store.create_process("etl", "", None, None).await.unwrap();
        assert_eq!(process.status, ProcessStatus::Paused);
        assert!(
            store
                .update_process_status(process.id, ProcessStatus::Running)
                .await
                .unwrap()
        );
        let all = store.list_processes().await.unwrap();
        assert_eq!(all[0].status, ProcessStatus::Running);
    }
}
