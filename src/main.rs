//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here.

use std::path::PathBuf;
use std::sync::Arc;

use dotenv::dotenv;
use leaflog::adapters::ai::{GeminiAdapter, MockModelAdapter};
use leaflog::adapters::persistence::JsonStore;
use leaflog::adapters::ui::TuiInputPort;
use leaflog::ports::{InputPort, ModelPort, StoragePort};
use leaflog::usecases::{DiagnosisService, DiaryService};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(path) = &env_loaded {
        info!(path = %path.display(), "loaded .env");
    }

    leaflog::adapters::ui::init_ui();

    let cfg = leaflog::shared::config::AppConfig::load().unwrap_or_default();

    let data_dir = PathBuf::from(cfg.data_dir_or_default());
    info!(path = %data_dir.display(), "data directory");

    // --- Diary: JSON blob store + aggregate service ---
    let storage: Arc<dyn StoragePort> = Arc::new(JsonStore::new(data_dir.join("plants.json")));
    let diary = Arc::new(DiaryService::new(Arc::clone(&storage)));
    diary
        .load()
        .await
        .map_err(|e| anyhow::anyhow!("load diary: {}", e))?;

    // --- Model adapter: Gemini when a key is configured, mock otherwise ---
    let model: Arc<dyn ModelPort> = if cfg.is_model_configured() {
        info!(
            text_model = %cfg.text_model_or_default(),
            image_model = %cfg.image_model_or_default(),
            url = %cfg.api_url_or_default(),
            "diagnosis enabled with Gemini adapter"
        );
        Arc::new(GeminiAdapter::from_config(&cfg).map_err(|e| anyhow::anyhow!("{}", e))?)
    } else {
        warn!("LEAFLOG_API_KEY not set, using mock model adapter");
        Arc::new(MockModelAdapter::new())
    };

    let diagnosis = Arc::new(DiagnosisService::new(model));

    // --- Run (main menu -> diagnose / diary) ---
    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(
        diagnosis,
        Arc::clone(&diary),
        data_dir.join("images"),
    ));
    input_port.run().await.map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
