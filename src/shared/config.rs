//! Application configuration. API credentials, models, paths.

use serde::Deserialize;

/// Default Gemini API base (REST `generateContent` endpoints live under it).
pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model for diagnosis and chat.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";

/// Default model for image-output calls (recolor, future bloom).
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Gemini API key. Read from LEAFLOG_API_KEY.
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL override (e.g. a proxy). Read from LEAFLOG_API_URL.
    #[serde(default)]
    pub api_url: Option<String>,

    /// Model for diagnosis and chat. Read from LEAFLOG_TEXT_MODEL.
    #[serde(default)]
    pub text_model: Option<String>,

    /// Model for image edits. Read from LEAFLOG_IMAGE_MODEL.
    #[serde(default)]
    pub image_model: Option<String>,

    /// Directory for the diary blob and generated images. Read from LEAFLOG_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("LEAFLOG"));
        if let Ok(path) = std::env::var("LEAFLOG_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// Returns the API key if configured. Reads from config or LEAFLOG_API_KEY env.
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("LEAFLOG_API_KEY").ok())
    }

    /// Returns the API base URL. Defaults to the public Gemini endpoint.
    pub fn api_url_or_default(&self) -> String {
        self.api_url
            .clone()
            .or_else(|| std::env::var("LEAFLOG_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Returns the diagnosis/chat model name.
    pub fn text_model_or_default(&self) -> String {
        self.text_model
            .clone()
            .or_else(|| std::env::var("LEAFLOG_TEXT_MODEL").ok())
            .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string())
    }

    /// Returns the image-edit model name.
    pub fn image_model_or_default(&self) -> String {
        self.image_model
            .clone()
            .or_else(|| std::env::var("LEAFLOG_IMAGE_MODEL").ok())
            .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string())
    }

    /// Returns the data directory. Defaults to ./data.
    pub fn data_dir_or_default(&self) -> String {
        self.data_dir
            .clone()
            .or_else(|| std::env::var("LEAFLOG_DATA_DIR").ok())
            .unwrap_or_else(|| "./data".to_string())
    }

    /// Returns true if the real model can be used (API key present).
    pub fn is_model_configured(&self) -> bool {
        self.api_key().is_some()
    }
}
