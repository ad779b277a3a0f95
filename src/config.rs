use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{ForgeError, ForgeResult};
use crate::optimizer::catalogue::{ComponentType, Parameter};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Per-type overrides layered over the built-in catalogue.
    #[serde(default)]
    pub catalogue: CatalogueConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Any variant at or above this quality ends the search immediately.
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: f64,
    /// Consecutive non-improving iterations before the search gives up.
    #[serde(default = "default_stagnation_limit")]
    pub stagnation_limit: u32,
    #[serde(default = "default_max_intensity")]
    pub max_intensity: f64,
    /// Quality assigned to the unevaluated starting candidate.
    #[serde(default = "default_base_quality")]
    pub base_quality: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            quality_threshold: default_quality_threshold(),
            stagnation_limit: default_stagnation_limit(),
            max_intensity: default_max_intensity(),
            base_quality: default_base_quality(),
        }
    }
}

fn default_quality_threshold() -> f64 {
    0.95
}

fn default_stagnation_limit() -> u32 {
    3
}

fn default_max_intensity() -> f64 {
    0.3
}

fn default_base_quality() -> f64 {
    0.3
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory; each job writes into `<directory>/<job id>/`.
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
    /// Extension of component and aggregator files.
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default = "default_manifest_extension")]
    pub manifest_extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            extension: default_extension(),
            manifest_extension: default_manifest_extension(),
        }
    }
}

/// `<local data dir>/uiforge/jobs`, falling back to `./generated`.
fn default_output_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("uiforge").join("jobs"))
        .unwrap_or_else(|| PathBuf::from("generated"))
}

fn default_extension() -> String {
    "tsx".into()
}

fn default_manifest_extension() -> String {
    "json".into()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogueConfig {
    /// Element type → component, e.g. `widget = "card"`.
    #[serde(default)]
    pub component_types: HashMap<String, ComponentType>,
    /// Element type → ordered key parameters, e.g. `button = ["width", "text"]`.
    #[serde(default)]
    pub key_parameters: HashMap<String, Vec<Parameter>>,
}

fn resolve_config_path() -> ForgeResult<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join("config.toml");
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Ok(candidate);
            }
        }
    }

    let cwd = std::env::current_dir()?;
    let candidate = cwd.join("config.toml");
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found in working directory");
        return Ok(candidate);
    }

    Err(ForgeError::Config(
        "config.toml not found next to executable or in working directory".into(),
    ))
}

pub fn parse_config(content: &str) -> ForgeResult<AppConfig> {
    let mut config: AppConfig = toml::from_str(content)?;
    if let Ok(dir) = std::env::var("UIFORGE_OUTPUT_DIR") {
        if !dir.trim().is_empty() {
            config.output.directory = PathBuf::from(dir);
        }
    }
    config.validate()?;
    Ok(config)
}

pub fn load_config() -> ForgeResult<AppConfig> {
    let path = resolve_config_path()?;
    let content = std::fs::read_to_string(&path)?;
    let config = parse_config(&content)?;
    tracing::info!(
        path = %path.display(),
        output = %config.output.directory.display(),
        "config loaded"
    );
    Ok(config)
}

impl AppConfig {
    fn validate(&self) -> ForgeResult<()> {
        let o = &self.optimizer;
        if !(o.max_intensity > 0.0 && o.max_intensity <= 0.3) {
            return Err(ForgeError::Config(format!(
                "optimizer.max_intensity must be in (0, 0.3], got {}",
                o.max_intensity
            )));
        }
        if o.stagnation_limit == 0 {
            return Err(ForgeError::Config(
                "optimizer.stagnation_limit must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&o.base_quality) {
            return Err(ForgeError::Config(format!(
                "optimizer.base_quality must be in [0, 1], got {}",
                o.base_quality
            )));
        }
        if self.output.extension.trim().is_empty() {
            return Err(ForgeError::Config("output.extension must not be empty".into()));
        }
        Ok(())
    }
}
