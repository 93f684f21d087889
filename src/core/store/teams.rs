use anyhow::Result;

use super::Store;
use super::types::TeamRecord;

impl Store {
    pub async fn list_teams(&self) -> Result<Vec<TeamRecord>> {
        let db = self.db.lock().await;
        let mut stmt =
            db.prepare("SELECT id, name, description, created_at FROM teams ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(TeamRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;
        let mut teams = Vec::new();
        for row in rows {
            teams.push(row?);
        }
        Ok(teams)
    }

    pub async fn count_teams(&self) -> Result<i64> {
        let db = self.db.lock().await;
        let count = db.query_row("SELECT COUNT(*) FROM teams", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::seed;

    #[tokio::test]
    async fn list_returns_rows_in_id_order() {
        let store = Store::open_in_memory().unwrap();
        for team in seed::teams() {
            store.seed_team(&team).await.unwrap();
        }
        let teams = store.list_teams().await.unwrap();
        assert_eq!(teams.len(), seed::teams().len());
        assert_eq!(teams[0].name, "Operations");
        assert_eq!(store.count_teams().await.unwrap(), teams.len() as i64);
    }
}
