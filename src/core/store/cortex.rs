use anyhow::Result;
use rusqlite::params;

use super::Store;
use super::types::CortexEntryRecord;

fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<CortexEntryRecord> {
    Ok(CortexEntryRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        category: row.get(3)?,
        tags: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

impl Store {
    pub async fn list_cortex_entries(&self) -> Result<Vec<CortexEntryRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, title, content, category, tags, created_at, updated_at
             FROM cortex_entries ORDER BY id",
        )?;
        let rows = stmt.query_map([], row_to_entry)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    /// Case-insensitive substring match over title, content, category and tags.
    pub async fn search_cortex_entries(&self, query: &str) -> Result<Vec<CortexEntryRecord>> {
        let pattern = format!("%{}%", query.to_lowercase());
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, title, content, category, tags, created_at, updated_at
             FROM cortex_entries
             WHERE lower(title) LIKE ?1 OR lower(content) LIKE ?1
                OR lower(category) LIKE ?1 OR lower(tags) LIKE ?1
             ORDER BY id",
        )?;
        let rows = stmt.query_map(params![pattern], row_to_entry)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    pub async fn create_cortex_entry(
        &self,
        title: &str,
        content: &str,
        category: &str,
        tags: &str,
    ) -> Result<i64> {
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO cortex_entries (title, content, category, tags) VALUES (?1, ?2, ?3, ?4)",
            params![title, content, category, tags],
        )?;
        Ok(db.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded_store() -> Store {
        let store = Store::open_in_memory().unwrap();
        store
            .create_cortex_entry(
                "Deploy runbook",
                "How to roll the fleet forward safely",
                "operations",
                "deploy,runbook",
            )
            .await
            .unwrap();
        store
            .create_cortex_entry(
                "Onboarding",
                "First-week checklist for new operators",
                "people",
                "hiring",
            )
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn search_matches_title_case_insensitive() {
        let store = seeded_store().await;
        let hits = store.search_cortex_entries("DEPLOY").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Deploy runbook");
    }

    #[tokio::test]
    async fn search_matches_tags_and_content() {
        let store = seeded_store().await;
        assert_eq!(store.search_cortex_entries("hiring").await.unwrap().len(), 1);
        assert_eq!(
            store.search_cortex_entries("checklist").await.unwrap().len(),
            1
        );
        assert!(store.search_cortex_entries("nothing").await.unwrap().is_empty());
    }
}
