use anyhow::{Result, anyhow};
use rusqlite::params;

use super::Store;
use super::types::{AgentRecord, AgentStatus};

fn row_to_agent(row: &rusqlite::Row) -> rusqlite::Result<AgentRecord> {
    let status: String = row.get(3)?;
    Ok(AgentRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        role: row.get(2)?,
        status: AgentStatus::parse(&status).unwrap_or(AgentStatus::Offline),
        team_id: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

impl Store {
    pub async fn list_agents(&self) -> Result<Vec<AgentRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, name, role, status, team_id, created_at, updated_at
             FROM agents ORDER BY id",
        )?;
        let rows = stmt.query_map([], row_to_agent)?;
        let mut agents = Vec::new();
        for row in rows {
            agents.push(row?);
        }
        Ok(agents)
    }

    pub async fn get_agent(&self, id: i64) -> Result<Option<AgentRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, name, role, status, team_id, created_at, updated_at
             FROM agents WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], row_to_agent)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub async fn create_agent(
        &self,
        name: &str,
        role: &str,
        status: AgentStatus,
        team_id: Option<i64>,
    ) -> Result<AgentRecord> {
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO agents (name, role, status, team_id) VALUES (?1, ?2, ?3, ?4)",
            params![name, role, status.as_str(), team_id],
        )?;
        let id = db.last_insert_rowid();
        drop(db);
        self.get_agent(id)
            .await?
            .ok_or_else(|| anyhow!("agent {} vanished after insert", id))
    }

    pub async fn update_agent_status(&self, id: i64, status: AgentStatus) -> Result<bool> {
        let db = self.db.lock().await;
        let rows = db.execute(
            "UPDATE agents SET status = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        Ok(rows > 0)
    }

    pub async fn delete_agent(&self, id: i64) -> Result<bool> {
        let db = self.db.lock().await;
        let rows = db.execute("DELETE FROM agents WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub async fn count_agents_by_status(&self) -> Result<Vec<(String, i64)>> {
        let db = self.db.lock().await;
        let mut stmt =
            db.prepare("SELECT status, COUNT(*) FROM agents GROUP BY status ORDER BY status")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_list_and_delete_agent() {
        let store = Store::open_in_memory().unwrap();
        let agent = store
            .create_agent("atlas", "researcher", AgentStatus::Active, None)
            .await
            .unwrap();
        assert_eq!(agent.name, "atlas");
        assert_eq!(agent.status, AgentStatus::Active);

        let all = store.list_agents().await.unwrap();
        assert_eq!(all.len(), 1);

        assert!(store.delete_agent(agent.id).await.unwrap());
        assert!(store.list_agents().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_status_reflects_in_get() {
        let store = Store::open_in_memory().unwrap();
        let agent = store
            .create_agent("hermes", "dispatcher", AgentStatus::Idle, None)
            .await
            .unwrap();
        assert!(
            store
                .update_agent_status(agent.id, AgentStatus::Busy)
                .await
                .unwrap()
        );
        let fetched = store.get_agent(agent.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, AgentStatus::Busy);
    }

    #[tokio::test]
    async fn update_unknown_agent_returns_false() {
        let store = Store::open_in_memory().unwrap();
        assert!(
            !store
                .update_agent_status(999, AgentStatus::Active)
                .await
                .unwrap()
        );
        assert!(!store.delete_agent(999).await.unwrap());
    }

    #[tokio::test]
    async fn deleting_a_referenced_agent_detaches_its_workspaces() {
        let store = Store::open_in_memory().unwrap();
        for team in crate::core::seed::teams() {
            store.seed_team(&team).await.unwrap();
        }
        for agent in crate::core::seed::agents() {
            store.seed_agent(&agent).await.unwrap();
        }
        for workspace in crate::core::seed::workspaces() {
            store.seed_workspace(&workspace).await.unwrap();
        }

        assert!(store.delete_agent(1).await.unwrap());
        let workspaces = store.list_workspaces().await.unwrap();
        assert_eq!(workspaces.len(), crate::core::seed::workspaces().len());
        assert!(workspaces.iter().all(|w| w.agent_id != Some(1)));
    }

    #[tokio::test]
    async fn status_counts_group_correctly() {
        let store = Store::open_in_memory().unwrap();
        for status in [AgentStatus::Active, AgentStatus::Active, AgentStatus::Idle] {
            store.create_agent("a", "", status, None).await.unwrap();
        }
        let counts = store.count_agents_by_status().await.unwrap();
        assert_eq!(
            counts,
            vec![("active".to_string(), 2), ("idle".to_string(), 1)]
        );
    }
}
