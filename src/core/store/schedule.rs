use anyhow::Result;
use rusqlite::params;

use super::Store;
use super::types::ScheduleEntryRecord;

fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<ScheduleEntryRecord> {
    Ok(ScheduleEntryRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        day_of_week: row.get(2)?,
        start_hour: row.get(3)?,
        end_hour: row.get(4)?,
        agent_id: row.get(5)?,
        process_id: row.get(6)?,
        created_at: row.get(7)?,
    })
}

impl Store {
    pub async fn list_schedule_entries(&self) -> Result<Vec<ScheduleEntryRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, title, day_of_week, start_hour, end_hour, agent_id, process_id, created_at
             FROM schedule_entries ORDER BY day_of_week, start_hour, id",
        )?;
        let rows = stmt.query_map([], row_to_entry)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    pub async fn create_schedule_entry(
        &self,
        title: &str,
        day_of_week: i64,
        start_hour: i64,
        end_hour: i64,
        agent_id: Option<i64>,
        process_id: Option<i64>,
    ) -> Result<i64> {
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO schedule_entries (title, day_of_week, start_hour, end_hour, agent_id, process_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![title, day_of_week, start_hour, end_hour, agent_id, process_id],
        )?;
        Ok(db.last_insert_rowid())
    }

    pub async fn delete_schedule_entry(&self, id: i64) -> Result<bool> {
        let db = self.db.lock().await;
        let rows = db.execute("DELETE FROM schedule_entries WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn entries_are_ordered_by_day_then_start() {
        let store = Store::open_in_memory().unwrap();
        store
            .create_schedule_entry("late", 1, 14, 18, None, None)
            .await
            .unwrap();
        store
            .create_schedule_entry("early", 1, 6, 10, None, None)
            .await
            .unwrap();
        store
            .create_schedule_entry("sunday", 0, 9, 12, None, None)
            .await
            .unwrap();

        let entries = store.list_schedule_entries().await.unwrap();
        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["sunday", "early", "late"]);
    }

    #[tokio::test]
    async fn delete_schedule_entry_reports_absence() {
        let store = Store::open_in_memory().unwrap();
        let id = store
            .create_schedule_entry("standup", 2, 9, 10, None, None)
            .await
            .unwrap();
        assert!(store.delete_schedule_entry(id).await.unwrap());
        assert!(!store.delete_schedule_entry(id).await.unwrap());
    }
}
