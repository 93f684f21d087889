use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::config::Config;
use crate::core::seed;
use crate::core::store::Store;

#[derive(Parser)]
#[command(name = "cockpit", about = "Multi-tenant operations dashboard", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the API server and dashboard (default).
    Serve,
    /// Check which subsystems the environment enables and whether they respond.
    Doctor,
    /// Insert the demo dataset into the relational database, skipping
    /// rows that already exist.
    Seed,
}

pub async fn run(log_tx: tokio::sync::broadcast::Sender<String>) -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => crate::interfaces::web::serve(config, log_tx).await,
        Command::Doctor => doctor(&config).await,
        Command::Seed => seed_database(&config).await,
    }
}

async fn doctor(config: &Config) -> Result<()> {
    let mut problems = 0;

    match &config.database_url {
        Some(path) => match Store::open(path) {
            Ok(store) => {
                let users = store.count_users().await.unwrap_or(0);
                let teams = store.count_teams().await.unwrap_or(0);
                let workspaces = store.count_workspaces().await.unwrap_or(0);
                println!(
                    "database        ok         {} ({} users, {} teams, {} workspaces)",
                    path, users, teams, workspaces
                );
            }
            Err(e) => {
                println!("database        error      {}", e);
                problems += 1;
            }
        },
        None => println!("database        disabled   set DATABASE_URL to enable writes"),
    }

    match &config.docstore_url {
        Some(path) => match crate::core::docstore::DocStore::open(path) {
            Ok(_) => println!("docstore        ok         {}", path),
            Err(e) => {
                println!("docstore        error      {}", e);
                problems += 1;
            }
        },
        None => println!("docstore        disabled   set DOCSTORE_URL to enable the tenant cache"),
    }

    match &config.collector_base_url {
        Some(url) => {
            let client = crate::core::collector::CollectorClient::new(url);
            if client.ping().await {
                println!("collector       ok         {}", client.base_url());
            } else {
                println!("collector       unreachable {}", client.base_url());
                problems += 1;
            }
        }
        None => println!("collector       disabled   set COLLECTOR_BASE_URL to prime caches"),
    }

    match &config.jwt_secret {
        Some(_) => println!("jwt secret      ok         sessions survive restarts"),
        None => println!("jwt secret      random     sessions reset on every restart"),
    }

    match &config.oauth_server_url {
        Some(url) => println!("oauth           ok         {}", url),
        None => println!("oauth           disabled   set OAUTH_SERVER_URL for the callback flow"),
    }

    if config.standalone_mode {
        println!("standalone      on         demo credentials accepted");
    } else {
        println!("standalone      off");
    }

    if problems > 0 {
        anyhow::bail!("{} subsystem(s) reported problems", problems);
    }
    Ok(())
}

/// Mirrors the insert-if-absent cache priming: re-running `seed` never
/// duplicates or overwrites rows.
async fn seed_database(config: &Config) -> Result<()> {
    let Some(path) = &config.database_url else {
        anyhow::bail!("DATABASE_URL is not set; nothing to seed");
    };
    let store = Store::open(path)?;

    let mut inserted = 0usize;
    for team in seed::teams() {
        if store.seed_team(&team).await? {
            inserted += 1;
        }
    }
    for agent in seed::agents() {
        if store.seed_agent(&agent).await? {
            inserted += 1;
        }
    }
    for workspace in seed::workspaces() {
        if store.seed_workspace(&workspace).await? {
            inserted += 1;
        }
    }
    for process in seed::processes() {
        if store.seed_process(&process).await? {
            inserted += 1;
        }
    }
    for entry in seed::schedule_entries() {
        if store.seed_schedule_entry(&entry).await? {
            inserted += 1;
        }
    }
    for entry in seed::cortex_entries() {
        if store.seed_cortex_entry(&entry).await? {
            inserted += 1;
        }
    }

    if inserted == 0 {
        warn!("seed data already present, nothing inserted");
    } else {
        info!("inserted {} seed rows into {}", inserted, path);
    }
    println!("seeded {} rows", inserted);
    Ok(())
}
