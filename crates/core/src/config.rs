//! Configuration management for vrag.
//!
//! Settings are layered, later layers winning:
//! 1. Built-in defaults
//! 2. YAML config file (`.vrag/config.yaml` in the workspace, or `--config`)
//! 3. Environment variables (`LLM_EMBEDDING_MODEL`, `COLLECTION_PATH`, ...)
//! 4. Command-line flags
//!
//! Relative paths in the configuration are resolved against the workspace.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Workspace root (contains .vrag/)
    pub workspace: PathBuf,

    /// Config file that was merged, if any
    pub config_file: Option<PathBuf>,

    /// Log filter override
    pub log_level: Option<String>,

    /// Log record format ("pretty" or "json")
    pub log_format: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Ingestion and retrieval settings
    pub rag: RagSettings,
}

/// Settings for the indexing and retrieval pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RagSettings {
    /// Embedding backend: "ollama" or "mock"
    pub embedding_provider: String,

    /// Embedding model identifier (required for the ollama backend)
    pub embedding_model: Option<String>,

    /// Generation model identifier (required to answer queries)
    pub generation_model: Option<String>,

    /// Sampling temperature passed to the generator
    pub temperature: f32,

    /// Base URL of the Ollama service
    pub ollama_endpoint: String,

    /// HTTP timeout for backend calls
    pub request_timeout_secs: u64,

    /// Directory holding the persisted vector collection
    pub collection_path: PathBuf,

    /// Name of the collection (table) inside `collection_path`
    pub collection_name: String,

    /// Directory scanned for PDF files during ingestion
    pub pdf_path: PathBuf,

    /// Maximum chunk length in characters
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks of one page
    pub chunk_overlap: usize,

    /// Number of chunks retrieved per query (`k`)
    pub chunks_to_return: usize,

    /// Number of chunks embedded and written per batch
    pub embedding_batch_size: usize,

    /// Optional YAML prompt template replacing the built-in one
    pub prompt_file: Option<PathBuf>,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            embedding_provider: "ollama".to_string(),
            embedding_model: None,
            generation_model: None,
            temperature: 0.0,
            ollama_endpoint: "http://localhost:11434".to_string(),
            request_timeout_secs: 120,
            collection_path: PathBuf::from(".vrag/collection"),
            collection_name: "documents".to_string(),
            pdf_path: PathBuf::from("data"),
            chunk_size: 800,
            chunk_overlap: 80,
            chunks_to_return: 5,
            embedding_batch_size: 32,
            prompt_file: None,
        }
    }
}

/// On-disk config file layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    rag: Option<RagSettings>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    format: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            log_level: None,
            log_format: None,
            verbose: false,
            no_color: false,
            rag: RagSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file and the process
    /// environment.
    ///
    /// # Example
    /// ```no_run
    /// use vrag_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None, None).expect("Failed to load config");
    /// println!("Collection: {:?}", config.collection_dir());
    /// ```
    pub fn load(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        Self::load_with_env(workspace, config_file, |key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::load`] with an injectable environment lookup.
    pub fn load_with_env<F>(
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        env: F,
    ) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                Some(path)
            }
            None => {
                let default_path = config.vrag_dir().join("config.yaml");
                default_path.exists().then_some(default_path)
            }
        };

        if let Some(path) = config_path {
            config.merge_yaml(&path)?;
            config.config_file = Some(path);
        }

        config.apply_env(env)?;

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &Path) -> AppResult<()> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        if let Some(rag) = file.rag {
            self.rag = rag;
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(format) = logging.format {
                self.log_format = Some(format);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(())
    }

    /// Apply environment variable overrides.
    ///
    /// Variable names match the `configuration.env` files of existing
    /// deployments so those files can be sourced unchanged.
    fn apply_env<F>(&mut self, env: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rag = &mut self.rag;

        if let Some(v) = env("VRAG_EMBEDDING_PROVIDER") {
            rag.embedding_provider = v;
        }
        if let Some(v) = env("LLM_EMBEDDING_MODEL") {
            rag.embedding_model = non_empty(v);
        }
        if let Some(v) = env("LLM_QUERY_MODEL") {
            rag.generation_model = non_empty(v);
        }
        if let Some(v) = env("LLM_TEMPERATURE") {
            rag.temperature = parse_env("LLM_TEMPERATURE", &v)?;
        }
        if let Some(v) = env("OLLAMA_URL") {
            rag.ollama_endpoint = v;
        }
        if let Some(v) = env("COLLECTION_PATH") {
            rag.collection_path = PathBuf::from(v);
        }
        if let Some(v) = env("COLLECTION_NAME") {
            rag.collection_name = v;
        }
        if let Some(v) = env("PDF_PATH") {
            rag.pdf_path = PathBuf::from(v);
        }
        if let Some(v) = env("CHUNK_SIZE") {
            rag.chunk_size = parse_env("CHUNK_SIZE", &v)?;
        }
        if let Some(v) = env("CHUNK_OVERLAP") {
            rag.chunk_overlap = parse_env("CHUNK_OVERLAP", &v)?;
        }
        if let Some(v) = env("CHUNKS_TO_RETURN") {
            rag.chunks_to_return = parse_env("CHUNKS_TO_RETURN", &v)?;
        }

        if env("NO_COLOR").is_some() {
            self.no_color = true;
        }

        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    pub fn with_overrides(
        mut self,
        log_level: Option<String>,
        log_format: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if let Some(log_format) = log_format {
            self.log_format = Some(log_format);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Path to the .vrag directory.
    pub fn vrag_dir(&self) -> PathBuf {
        self.workspace.join(".vrag")
    }

    /// Ensure the .vrag directory exists.
    pub fn ensure_vrag_dir(&self) -> AppResult<()> {
        let dir = self.vrag_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create .vrag directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Resolved directory of the vector collection.
    pub fn collection_dir(&self) -> PathBuf {
        self.resolve(&self.rag.collection_path)
    }

    /// Resolved PDF source directory.
    pub fn pdf_dir(&self) -> PathBuf {
        self.resolve(&self.rag.pdf_path)
    }

    /// Resolved prompt template file, if one is configured.
    pub fn prompt_path(&self) -> Option<PathBuf> {
        self.rag.prompt_file.as_ref().map(|p| self.resolve(p))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace.join(path)
        }
    }

    /// Embedding model identifier, or a configuration error naming the
    /// missing setting.
    pub fn require_embedding_model(&self) -> AppResult<&str> {
        self.rag.embedding_model.as_deref().ok_or_else(|| {
            AppError::Config(
                "LLM_EMBEDDING_MODEL not set (config key rag.embeddingModel)".to_string(),
            )
        })
    }

    /// Generation model identifier, or a configuration error.
    pub fn require_generation_model(&self) -> AppResult<&str> {
        self.rag.generation_model.as_deref().ok_or_else(|| {
            AppError::Config("LLM_QUERY_MODEL not set (config key rag.generationModel)".to_string())
        })
    }

    /// Validate pipeline settings.
    pub fn validate(&self) -> AppResult<()> {
        let rag = &self.rag;

        if rag.chunk_size == 0 {
            return Err(AppError::Config("chunk size must be greater than 0".to_string()));
        }

        if rag.chunk_overlap >= rag.chunk_size {
            return Err(AppError::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                rag.chunk_overlap, rag.chunk_size
            )));
        }

        if rag.chunks_to_return == 0 {
            return Err(AppError::Config(
                "number of chunks to return must be greater than 0".to_string(),
            ));
        }

        if rag.embedding_batch_size == 0 {
            return Err(AppError::Config(
                "embedding batch size must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&rag.temperature) {
            return Err(AppError::Config(format!(
                "temperature {} is outside 0.0..=2.0",
                rag.temperature
            )));
        }

        if rag.collection_name.trim().is_empty() {
            return Err(AppError::Config("collection name is empty".to_string()));
        }

        let known_providers = ["ollama", "mock"];
        if !known_providers.contains(&rag.embedding_provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                rag.embedding_provider,
                known_providers.join(", ")
            )));
        }

        Ok(())
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_env<T>(key: &str, value: &str) -> AppResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid value for {}: '{}' ({})", key, value, e)))
}
