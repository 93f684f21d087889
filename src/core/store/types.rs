use serde::{Deserialize, Serialize};

/// Operational status of an agent as shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Active,
    Idle,
    Offline,
    Busy,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Active => "active",
            AgentStatus::Idle => "idle",
            AgentStatus::Offline => "offline",
            AgentStatus::Busy => "busy",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(AgentStatus::Active),
            "idle" => Some(AgentStatus::Idle),
            "offline" => Some(AgentStatus::Offline),
            "busy" => Some(AgentStatus::Busy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceStatus {
    Active,
    Archived,
}

impl WorkspaceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkspaceStatus::Active => "active",
            WorkspaceStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(WorkspaceStatus::Active),
            "archived" => Some(WorkspaceStatus::Archived),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    Running,
    Paused,
    Failed,
    Completed,
}

impl ProcessStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessStatus::Running => "running",
            ProcessStatus::Paused => "paused",
            ProcessStatus::Failed => "failed",
            ProcessStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "running" => Some(ProcessStatus::Running),
            "paused" => Some(ProcessStatus::Paused),
            "failed" => Some(ProcessStatus::Failed),
            "completed" => Some(ProcessStatus::Completed),
            _ => None,
        }
    }
}

/// Result of the most recent connection test, stored on the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Unknown,
    Ok,
    Failed,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Unknown => "unknown",
            ConnectionStatus::Ok => "ok",
            ConnectionStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unknown" => Some(ConnectionStatus::Unknown),
            "ok" => Some(ConnectionStatus::Ok),
            "failed" => Some(ConnectionStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: i64,
    pub name: String,
    pub role: String,
    pub status: AgentStatus,
    pub team_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceRecord {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub status: WorkspaceStatus,
    pub agent_id: Option<i64>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub status: ProcessStatus,
    pub agent_id: Option<i64>,
    pub workspace_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// A recurring on-duty window. Hours are whole hours of the day and the
/// window is half-open: the entry covers `start_hour <= h < end_hour`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntryRecord {
    pub id: i64,
    pub title: String,
    pub day_of_week: i64,
    pub start_hour: i64,
    pub end_hour: i64,
    pub agent_id: Option<i64>,
    pub process_id: Option<i64>,
    pub created_at: String,
}

/// Knowledge-base entry ("cortex").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CortexEntryRecord {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A managed database connection. `password_enc` holds the vault
/// ciphertext and must never leave the server in responses.
#[derive(Debug, Clone)]
pub struct ConnectionRecord {
    pub id: i64,
    pub name: String,
    pub engine: String,
    pub host: String,
    pub port: i64,
    pub username: String,
    pub password_enc: String,
    pub database_name: String,
    pub status: ConnectionStatus,
    pub last_tested_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ConnectionRecord {
    /// Response shape with the secret stripped.
    pub fn to_public_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "engine": self.engine,
            "host": self.host,
            "port": self.port,
            "username": self.username,
            "database_name": self.database_name,
            "status": self.status.as_str(),
            "last_tested_at": self.last_tested_at,
            "created_at": self.created_at,
            "updated_at": self.updated_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionLogRecord {
    pub id: i64,
    pub connection_id: i64,
    pub action: String,
    pub outcome: String,
    pub detail: String,
    pub created_at: String,
}
