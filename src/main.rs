mod cli;
mod config;
mod core;
mod interfaces;
mod logging;

#[tokio::main]
async fn main() {
    let (log_tx, _) = tokio::sync::broadcast::channel(256);
    logging::init(log_tx.clone());

    if let Err(e) = cli::run(log_tx).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}
