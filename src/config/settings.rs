//! Configuration settings for FlightLens.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
///
/// Built once at start-up (file, then environment overrides) and passed by
/// reference to every component that needs it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub paths: PathSettings,
    pub embedding: EmbeddingSettings,
    pub chunking: ChunkingSettings,
    pub vector_store: VectorStoreSettings,
    pub rag: RagSettings,
    pub weather: WeatherSettings,
    pub prompts: PromptSettings,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.flightlens".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Locations of documents, the chunk corpus and evaluation output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Directory holding text renderings of the source documents.
    pub raw_dir: String,
    /// Line-delimited JSON chunk corpus.
    pub chunks_file: String,
    /// Directory for evaluation run artifacts.
    pub results_dir: String,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            raw_dir: "~/.flightlens/raw".to_string(),
            chunks_file: "~/.flightlens/processed/chunks.jsonl".to_string(),
            results_dir: "~/.flightlens/results".to_string(),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Document splitting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters of trailing context repeated at the start of the next chunk.
    pub chunk_overlap: usize,
    /// Separators tried in order; procedure headings come first so
    /// checklists stay in one piece.
    pub separators: Vec<String>,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 700,
            chunk_overlap: 150,
            separators: ["\nCHECKLIST", "\nPROCEDURE", "\nWARNING", "\nNOTE", "\n\n", "\n", " "]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Vector store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    /// Path to SQLite database.
    pub sqlite_path: String,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            sqlite_path: "~/.flightlens/index.db".to_string(),
        }
    }
}

/// RAG (Retrieval-Augmented Generation) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// LLM model for response generation.
    pub model: String,
    /// Number of passages retrieved per question.
    pub top_k: usize,
    /// Minimum similarity score for a passage to be used.
    pub min_score: f32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            top_k: 3,
            min_score: 0.2,
            temperature: 0.2,
        }
    }
}

/// Weather provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    /// Primary aviation weather data service endpoint.
    pub primary_url: String,
    /// Secondary provider endpoint.
    pub weatherapi_url: String,
    /// API key for the secondary provider. Provider is skipped when unset.
    pub weatherapi_key: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// User-Agent sent to the providers.
    pub user_agent: String,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            primary_url: "https://aviationweather.gov/api/data/metar".to_string(),
            weatherapi_url: "http://api.weatherapi.com/v1/current.json".to_string(),
            weatherapi_key: None,
            timeout_secs: 3,
            user_agent: "FlightLens/1.0".to_string(),
        }
    }
}

impl WeatherSettings {
    /// Configured secondary provider key, ignoring blank values.
    pub fn weatherapi_key(&self) -> Option<&str> {
        self.weatherapi_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}


impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// Environment overrides are applied after the file is read.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Apply overrides from environment-style lookups.
    ///
    /// Takes the lookup as a closure so tests don't have to touch the
    /// process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("WEATHERAPI_KEY") {
            self.weather.weatherapi_key = Some(key);
        }
        if let Some(model) = get("FLIGHTLENS_LLM_MODEL") {
            self.rag.model = model;
        }
        if let Some(model) = get("FLIGHTLENS_EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        if let Some(dir) = get("PROCESSED_DATA_PATH") {
            self.paths.chunks_file = format!("{}/chunks.jsonl", dir.trim_end_matches('/'));
        }
        if let Some(path) = get("FLIGHTLENS_INDEX_PATH") {
            self.vector_store.sqlite_path = path;
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::FlightLensError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("flightlens")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded raw document directory.
    pub fn raw_dir(&self) -> PathBuf {
        Self::expand_path(&self.paths.raw_dir)
    }

    /// Get the expanded chunk corpus path.
    pub fn chunks_file(&self) -> PathBuf {
        Self::expand_path(&self.paths.chunks_file)
    }

    /// Get the expanded evaluation results directory.
    pub fn results_dir(&self) -> PathBuf {
        Self::expand_path(&self.paths.results_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.vector_store.sqlite_path)
    }
}
