//! Deterministic seed data. Served whenever the relational store is
//! unconfigured or a query fails, and used to prime empty tenant caches
//! when no collector is reachable.

use super::store::types::{
    AgentRecord, AgentStatus, CortexEntryRecord, ProcessRecord, ProcessStatus,
    ScheduleEntryRecord, TeamRecord, WorkspaceRecord, WorkspaceStatus,
};

const SEED_TS: &str = "2026-01-01 00:00:00";

pub fn teams() -> Vec<TeamRecord> {
    [
        (1, "Operations", "Keeps the fleet healthy and deploys moving"),
        (2, "Research", "Prototype agents and evaluation harnesses"),
        (3, "Customer Success", "Tenant onboarding and escalations"),
    ]
    .into_iter()
    .map(|(id, name, description)| TeamRecord {
        id,
        name: name.to_string(),
        description: description.to_string(),
        created_at: SEED_TS.to_string(),
    })
    .collect()
}

pub fn agents() -> Vec<AgentRecord> {
    [
        (1, "atlas", "fleet supervisor", AgentStatus::Active, Some(1)),
        (2, "hermes", "dispatch router", AgentStatus::Busy, Some(1)),
        (3, "mnemo", "knowledge curator", AgentStatus::Idle, Some(2)),
        (4, "quill", "report writer", AgentStatus::Active, Some(2)),
        (5, "sentry", "anomaly watcher", AgentStatus::Offline, Some(1)),
        (6, "concierge", "tenant liaison", AgentStatus::Idle, Some(3)),
    ]
    .into_iter()
    .map(|(id, name, role, status, team_id)| AgentRecord {
        id,
        name: name.to_string(),
        role: role.to_string(),
        status,
        team_id,
        created_at: SEED_TS.to_string(),
        updated_at: SEED_TS.to_string(),
    })
    .collect()
}

pub fn workspaces() -> Vec<WorkspaceRecord> {
    [
        (1, "fleet-ops", "Live fleet monitoring", WorkspaceStatus::Active, Some(1)),
        (2, "eval-lab", "Benchmark runs and scorecards", WorkspaceStatus::Active, Some(3)),
        (3, "tenant-acme", "Dedicated workspace for ACME", WorkspaceStatus::Active, Some(6)),
        (4, "q3-archive", "Retired Q3 experiments", WorkspaceStatus::Archived, None),
    ]
    .into_iter()
    .map(|(id, name, description, status, agent_id)| WorkspaceRecord {
        id,
        name: name.to_string(),
        description: description.to_string(),
        status,
        agent_id,
        created_at: SEED_TS.to_string(),
    })
    .collect()
}

pub fn processes() -> Vec<ProcessRecord> {
    [
        (1, "heartbeat-sweep", "Poll every agent for liveness", ProcessStatus::Running, Some(1), Some(1)),
        (2, "nightly-digest", "Summarize the day for each tenant", ProcessStatus::Paused, Some(4), Some(1)),
        (3, "benchmark-replay", "Re-run the eval suite on new builds", ProcessStatus::Running, Some(3), Some(2)),
        (4, "escalation-triage", "Route tenant escalations to a human", ProcessStatus::Paused, Some(6), Some(3)),
        (5, "cost-rollup", "Aggregate per-tenant spend", ProcessStatus::Completed, Some(2), Some(1)),
        (6, "drift-audit", "Diff agent personas against baselines", ProcessStatus::Failed, Some(5), Some(2)),
    ]
    .into_iter()
    .map(|(id, name, description, status, agent_id, workspace_id)| ProcessRecord {
        id,
        name: name.to_string(),
        description: description.to_string(),
        status,
        agent_id,
        workspace_id,
        created_at: SEED_TS.to_string(),
        updated_at: SEED_TS.to_string(),
    })
    .collect()
}

pub fn schedule_entries() -> Vec<ScheduleEntryRecord> {
    [
        (1, "overnight heartbeat", 1, 0, 24, Some(1), Some(1)),
        (2, "digest window", 1, 22, 24, Some(4), Some(2)),
        (3, "benchmark block", 2, 9, 13, Some(3), Some(3)),
        (4, "office hours triage", 3, 9, 17, Some(6), Some(4)),
        (5, "cost rollup", 5, 6, 7, Some(2), Some(5)),
        (6, "weekend drift audit", 6, 3, 5, Some(5), Some(6)),
    ]
    .into_iter()
    .map(
        |(id, title, day_of_week, start_hour, end_hour, agent_id, process_id)| {
            ScheduleEntryRecord {
                id,
                title: title.to_string(),
                day_of_week,
                start_hour,
                end_hour,
                agent_id,
                process_id,
                created_at: SEED_TS.to_string(),
            }
        },
    )
    .collect()
}

pub fn cortex_entries() -> Vec<CortexEntryRecord> {
    [
        (
            1,
            "Incident response runbook",
            "Page the operations team, freeze deploys, capture agent transcripts before restarting anything.",
            "operations",
            "incident,runbook",
        ),
        (
            2,
            "Tenant onboarding checklist",
            "Provision the workspace, assign a concierge agent, schedule the kickoff digest.",
            "customer-success",
            "onboarding,tenant",
        ),
        (
            3,
            "Benchmark scoring notes",
            "Scores below 0.7 on the replay suite block promotion to the active fleet.",
            "research",
            "benchmark,policy",
        ),
        (
            4,
            "Connection vault rotation",
            "Rotate warehouse credentials quarterly; re-test every connection after rotation.",
            "operations",
            "security,connections",
        ),
    ]
    .into_iter()
    .map(|(id, title, content, category, tags)| CortexEntryRecord {
        id,
        title: title.to_string(),
        content: content.to_string(),
        category: category.to_string(),
        tags: tags.to_string(),
        created_at: SEED_TS.to_string(),
        updated_at: SEED_TS.to_string(),
    })
    .collect()
}
