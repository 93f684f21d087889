use anyhow::Result;

use super::Store;
use super::types::{WorkspaceRecord, WorkspaceStatus};

impl Store {
    pub async fn list_workspaces(&self) -> Result<Vec<WorkspaceRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, name, description, status, agent_id, created_at
             FROM workspaces ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            let status: String = row.get(3)?;
            Ok(WorkspaceRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                status: WorkspaceStatus::parse(&status).unwrap_or(WorkspaceStatus::Active),
                agent_id: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;
        let mut workspaces = Vec::new();
        for row in rows {
            workspaces.push(row?);
        }
        Ok(workspaces)
    }

    pub async fn count_workspaces(&self) -> Result<i64> {
        let db = self.db.lock().await;
        let count = db.query_row("SELECT COUNT(*) FROM workspaces", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::seed;

    #[tokio::test]
    async fn list_parses_statuses() {
        let store = Store::open_in_memory().unwrap();
        for team in seed::teams() {
            store.seed_team(&team).await.unwrap();
        }
        for agent in seed::agents() {
            store.seed_agent(&agent).await.unwrap();
        }
        for workspace in seed::workspaces() {
            store.seed_workspace(&workspace).await.unwrap();
        }
        let workspaces = store.list_workspaces().await.unwrap();
        assert_eq!(workspaces.len(), seed::workspaces().len());
        assert!(workspaces.iter().any(|w| w.status == WorkspaceStatus::Archived));
        assert_eq!(
            store.count_workspaces().await.unwrap(),
            workspaces.len() as i64
        );
    }
}
