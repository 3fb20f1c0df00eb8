//! Reading model files
//!
//! The format is chosen by file extension: `.json`, or `.yaml`/`.yml`.

use std::fs;
use std::path::{Path, PathBuf};

use finmodel_core::ModelData;

/// Model file encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Json,
    Yaml,
}

impl ModelFormat {
    pub fn from_path(path: &Path) -> Option<ModelFormat> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(ModelFormat::Json),
            "yaml" | "yml" => Some(ModelFormat::Yaml),
            _ => None,
        }
    }
}

/// Error types for loading a model
#[derive(Debug)]
pub enum LoadError {
    Io { path: PathBuf, message: String },
    Parse { path: PathBuf, message: String },
    UnsupportedFormat(PathBuf),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io { path, message } => {
                write!(f, "IO error reading {}: {}", path.display(), message)
            }
            LoadError::Parse { path, message } => {
                write!(f, "Parse error in {}: {}", path.display(), message)
            }
            LoadError::UnsupportedFormat(path) => write!(
                f,
                "Unsupported model file {} (expected .json, .yaml or .yml)",
                path.display()
            ),
        }
    }
}

impl std::error::Error for LoadError {}

/// Parse model text in the given format.
pub fn parse_model_text(text: &str, format: ModelFormat) -> Result<ModelData, String> {
    match format {
        ModelFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        ModelFormat::Yaml => serde_saphyr::from_str(text).map_err(|e| e.to_string()),
    }
}

/// Load a model from disk.
pub fn load_model(path: &Path) -> Result<ModelData, LoadError> {
    let format =
        ModelFormat::from_path(path).ok_or_else(|| LoadError::UnsupportedFormat(path.into()))?;
    let text = fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.into(),
        message: e.to_string(),
    })?;
    let model = parse_model_text(&text, format).map_err(|message| LoadError::Parse {
        path: path.into(),
        message,
    })?;
    tracing::debug!(
        path = %path.display(),
        assets = model.assets.len(),
        incomes = model.incomes.len(),
        expenses = model.expenses.len(),
        transactions = model.transactions.len(),
        "model loaded"
    );
    Ok(model)
}
