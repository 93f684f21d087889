//! Idempotent inserts used by the `seed` command. Rows keep their fixed
//! ids so schedule and workspace references stay intact; an existing row
//! with the same id is left untouched.

use anyhow::Result;
use rusqlite::params;

use super::Store;
use super::types::{
    AgentRecord, CortexEntryRecord, ProcessRecord, ScheduleEntryRecord, TeamRecord,
    WorkspaceRecord,
};

impl Store {
    pub async fn seed_team(&self, team: &TeamRecord) -> Result<bool> {
        let db = self.db.lock().await;
        let rows = db.execute(
            "INSERT OR IGNORE INTO teams (id, name, description, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![team.id, team.name, team.description, team.created_at],
        )?;
        Ok(rows > 0)
    }

    pub async fn seed_agent(&self, agent: &AgentRecord) -> Result<bool> {
        let db = self.db.lock().await;
        let rows = db.execute(
            "INSERT OR IGNORE INTO agents (id, name, role, status, team_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                agent.id,
                agent.name,
                agent.role,
                agent.status.as_str(),
                agent.team_id,
                agent.created_at,
                agent.updated_at,
            ],
        )?;
        Ok(rows > 0)
    }

    pub async fn seed_workspace(&self, workspace: &WorkspaceRecord) -> Result<bool> {
        let db = self.db.lock().await;
        let rows = db.execute(
            "INSERT OR IGNORE INTO workspaces (id, name, description, status, agent_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                workspace.id,
                workspace.name,
                workspace.description,
                workspace.status.as_str(),
                workspace.agent_id,
                workspace.created_at,
            ],
        )?;
        Ok(rows > 0)
    }

    pub async fn seed_process(&self, process: &ProcessRecord) -> Result<bool> {
        let db = self.db.lock().await;
        let rows = db.execute(
            "INSERT OR IGNORE INTO processes
                (id, name, description, status, agent_id, workspace_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                process.id,
                process.name,
                process.description,
                process.status.as_str(),
                process.agent_id,
                process.workspace_id,
                process.created_at,
                process.updated_at,
            ],
        )?;
        Ok(rows > 0)
    }

    pub async fn seed_schedule_entry(&self, entry: &ScheduleEntryRecord) -> Result<bool> {
        let db = self.db.lock().await;
        let rows = db.execute(
            "INSERT OR IGNORE INTO schedule_entries
                (id, title, day_of_week, start_hour, end_hour, agent_id, process_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                entry.id,
                entry.title,
                entry.day_of_week,
                entry.start_hour,
                entry.end_hour,
                entry.agent_id,
                entry.process_id,
                entry.created_at,
            ],
        )?;
        Ok(rows > 0)
    }

    pub async fn seed_cortex_entry(&self, entry: &CortexEntryRecord) -> Result<bool> {
        let db = self.db.lock().await;
        let rows = db.execute(
            "INSERT OR IGNORE INTO cortex_entries
                (id, title, content, category, tags, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.id,
                entry.title,
                entry.content,
                entry.category,
                entry.tags,
                entry.created_at,
                entry.updated_at,
            ],
        )?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::seed;

    #[tokio::test]
    async fn seeding_twice_inserts_nothing_new() {
        let store = Store::open_in_memory().unwrap();
        for team in seed::teams() {
            assert!(store.seed_team(&team).await.unwrap());
        }
        for team in seed::teams() {
            assert!(!store.seed_team(&team).await.unwrap());
        }
        assert_eq!(store.count_teams().await.unwrap(), seed::teams().len() as i64);
    }

    // Referential order matters: teams before agents, agents before
    // workspaces, and so on down the chain.
    async fn seed_all(store: &Store) {
        for team in seed::teams() {
            store.seed_team(&team).await.unwrap();
        }
        for agent in seed::agents() {
            store.seed_agent(&agent).await.unwrap();
        }
        for workspace in seed::workspaces() {
            store.seed_workspace(&workspace).await.unwrap();
        }
        for process in seed::processes() {
            store.seed_process(&process).await.unwrap();
        }
        for entry in seed::schedule_entries() {
            store.seed_schedule_entry(&entry).await.unwrap();
        }
    }

    #[tokio::test]
    async fn seeded_schedule_drives_the_running_query() {
        let store = Store::open_in_memory().unwrap();
        seed_all(&store).await;
        // The benchmark block covers hours 9..13.
        let running = store.running_processes_at(10).await.unwrap();
        assert!(running.iter().any(|p| p.name == "benchmark-replay"));
    }

    #[tokio::test]
    async fn seeding_preserves_existing_rows() {
        let store = Store::open_in_memory().unwrap();
        for team in seed::teams() {
            store.seed_team(&team).await.unwrap();
        }
        let mut agent = seed::agents().remove(0);
        store.seed_agent(&agent).await.unwrap();
        store
            .update_agent_status(agent.id, super::super::types::AgentStatus::Busy)
            .await
            .unwrap();

        agent.name = "impostor".to_string();
        assert!(!store.seed_agent(&agent).await.unwrap());
        let kept = store.get_agent(agent.id).await.unwrap().unwrap();
        assert_ne!(kept.name, "impostor");
        assert_eq!(kept.status, super::super::types::AgentStatus::Busy);
    }
}
