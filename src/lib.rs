pub mod commands;
pub mod content;
pub mod db;
pub mod matching;
pub mod models;
pub mod progress;
pub mod session;
pub mod settings;
pub mod utils;

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use log::info;

use commands::Cli;
use content::{ContentGenerator, ContentService, GeminiClient, OfflineGenerator};
use db::Database;
use matching::MatchConfig;
use session::SessionController;
use settings::SettingsStore;

pub struct AppState {
    pub db: Database,
    pub settings: SettingsStore,
    pub content: ContentService,
    pub sessions: SessionController,
    pub match_config: MatchConfig,
}

impl AppState {
    /// Open the store and settings under `data_dir` and pick a content backend.
    pub async fn initialize(data_dir: &Path, api_key: Option<String>) -> Result<Self> {
        std::fs::create_dir_all(data_dir).with_context(|| {
            format!("failed to create data directory {}", data_dir.display())
        })?;

        let db = Database::new(data_dir.join("skillswap.sqlite3"))?;
        db.init_defaults()
            .await
            .context("failed to seed default roster")?;

        let settings = SettingsStore::new(data_dir.join("settings.json"))?;
        let content = content_service(&settings, api_key)?;
        info!("Content backend: {}", content.backend());

        Ok(Self {
            db,
            settings,
            sessions: SessionController::new(content.clone()),
            content,
            match_config: MatchConfig::default(),
        })
    }
}

/// Gemini when a usable key is configured, otherwise fallback content only.
fn content_service(settings: &SettingsStore, api_key: Option<String>) -> Result<ContentService> {
    let client = GeminiClient::new(&settings.content(), api_key)?;
    let generator: Arc<dyn ContentGenerator> = if client.has_api_key() {
        Arc::new(client)
    } else {
        info!("No API key configured; using built-in content");
        Arc::new(OfflineGenerator)
    };
    Ok(ContentService::new(generator))
}

pub async fn run(cli: Cli) -> Result<()> {
    utils::init_logging(cli.verbose);
    info!("SkillSwap starting up...");

    let data_dir = settings::resolve_data_dir(cli.data_dir.clone())?;
    let state = AppState::initialize(&data_dir, settings::api_key_from_env()).await?;

    commands::dispatch(&state, cli.command).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_backend_follows_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let settings = SettingsStore::new(dir.path().join("settings.json")).unwrap();

        let backend = |key: Option<&str>| {
            content_service(&settings, key.map(str::to_string))
                .unwrap()
                .backend()
        };
        assert_eq!(backend(None), "offline");
        assert_eq!(backend(Some("   ")), "offline");
        assert_eq!(backend(Some("key")), "gemini");
    }

    #[tokio::test]
    async fn initialize_seeds_a_fresh_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");

        let state = AppState::initialize(&data_dir, None).await.unwrap();
        assert_eq!(state.content.backend(), "offline");
        assert_eq!(state.db.get_students().await.unwrap().len(), 4);
        assert!(data_dir.join("skillswap.sqlite3").exists());
    }
}
