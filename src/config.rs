//! Global configuration.
//!
//! Loaded from ~/.config/jmlbench/jmlbench.yml or .jmlbench.yml

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Global configuration for jmlbench.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GlobalConfig {
    /// Generator (Ollama) settings.
    pub generator: GeneratorConfig,

    /// Retry ceilings.
    pub retry: RetryConfig,

    /// Concurrency limits.
    pub concurrency: ConcurrencyConfig,

    /// Verification tool commands.
    pub backends: BackendsConfig,
}

impl GlobalConfig {
    /// Load configuration with fallback chain.
    ///
    /// Search order:
    /// 1. Explicit path if provided
    /// 2. .jmlbench.yml in current directory
    /// 3. ~/.config/jmlbench/jmlbench.yml
    /// 4. Defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_config = PathBuf::from(".jmlbench.yml");
        if project_config.exists() {
            match Self::load_from_file(&project_config) {
                Ok(config) => {
                    log::info!("Loaded config from .jmlbench.yml");
                    return Ok(config);
                }
                Err(e) => {
                    log::warn!("Failed to load .jmlbench.yml: {}", e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("jmlbench").join("jmlbench.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", user_config.display());
                        return Ok(config);
                    }
                    Err(e) => {
                        log::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.retry.max_retries == 0 {
            eyre::bail!("retry.max-retries must be > 0");
        }
        if self.concurrency.max_jobs == 0 {
            eyre::bail!("concurrency.max-jobs must be > 0");
        }
        if self.generator.timeout_secs == 0 {
            eyre::bail!("generator.timeout-secs must be > 0");
        }
        Ok(())
    }
}

/// Generator (Ollama) settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Base URL of the Ollama endpoint.
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Sampling temperature.
    pub temperature: f64,

    /// Timeout per generation call in seconds.
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Max tokens per response (0 = backend default).
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            temperature: 0.7,
            timeout_secs: 60,
            max_tokens: 0,
        }
    }
}

/// Retry ceilings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Verification retry ceiling per job (attempts).
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Additional generator calls allowed per attempt on generation failure.
    /// Distinct from max-retries; this covers backend outages, not failed
    /// verification.
    #[serde(rename = "generator-retries")]
    pub generator_retries: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            generator_retries: 2,
        }
    }
}

/// Concurrency limits.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ConcurrencyConfig {
    /// Maximum jobs running in parallel. Keep well below external-tool
    /// license/process limits.
    #[serde(rename = "max-jobs")]
    pub max_jobs: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self { max_jobs: 2 }
    }
}

/// Commands for the three verification tools.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BackendsConfig {
    /// OpenJML compile check.
    #[serde(default = "default_openjml")]
    pub openjml: ToolConfig,

    /// SpotBugs static analysis.
    #[serde(default = "default_spotbugs")]
    pub spotbugs: ToolConfig,

    /// KeY deductive proof.
    #[serde(default = "default_key")]
    pub key: ToolConfig,
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            openjml: default_openjml(),
            spotbugs: default_spotbugs(),
            key: default_key(),
        }
    }
}

fn default_openjml() -> ToolConfig {
    ToolConfig::new("openjml", Vec::new(), 120)
}

fn default_spotbugs() -> ToolConfig {
    ToolConfig::new("spotbugs", vec!["-textui".to_string()], 120)
}

fn default_key() -> ToolConfig {
    ToolConfig::new("key", vec!["--prove".to_string()], 300)
}

/// One verification tool's invocation.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ToolConfig {
    /// Program to invoke.
    pub program: String,

    /// Arguments placed before the candidate file path.
    #[serde(default)]
    pub args: Vec<String>,

    /// Timeout per invocation in seconds.
    #[serde(rename = "timeout-secs", default = "default_tool_timeout")]
    pub timeout_secs: u64,
}

fn default_tool_timeout() -> u64 {
    120
}

impl ToolConfig {
    /// Create a tool invocation config.
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout_secs: u64) -> Self {
        Self {
            program: program.into(),
            args,
            timeout_secs,
        }
    }
}
