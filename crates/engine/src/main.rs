//! Werewolf Arena - runner entry point.

use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use werewolf_engine::config::GameConfig;
use werewolf_engine::infrastructure::ollama::OllamaClient;
use werewolf_engine::infrastructure::ports::LlmPort;
use werewolf_engine::runner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "werewolf_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Werewolf Arena");

    let config = GameConfig::from_env();
    let llm: Arc<dyn LlmPort> = Arc::new(OllamaClient::from_env());
    let villager_model =
        std::env::var("WEREWOLF_VILLAGER_MODEL").unwrap_or_else(|_| "llama3:8b".into());
    let werewolf_model =
        std::env::var("WEREWOLF_WEREWOLF_MODEL").unwrap_or_else(|_| "llama3:8b".into());

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.split_first() {
        Some((mode, directories)) if mode == "resume" => {
            if directories.is_empty() {
                anyhow::bail!("resume requires at least one session directory");
            }
            let directories: Vec<PathBuf> = directories.iter().map(PathBuf::from).collect();
            let report = runner::resume_games(&directories, &config, llm).await;
            println!("Successful resumes: {:?}", report.successful);
            println!("Failed resumes: {:?}", report.failed);
            println!(
                "Invalid resumes (no resumable game found): {:?}",
                report.invalid
            );
        }
        _ => {
            tracing::info!(
                villagers = %villager_model,
                werewolves = %werewolf_model,
                "running a single game"
            );
            let outcome =
                runner::run_session(config, llm, &villager_model, &werewolf_model).await?;
            match outcome.winner {
                Some(winner) => println!(
                    "The winner is {}! Logs: {}",
                    winner,
                    outcome.directory.display()
                ),
                None => println!(
                    "Game did not finish. Resumable logs: {}",
                    outcome.directory.display()
                ),
            }
        }
    }
    Ok(())
}
