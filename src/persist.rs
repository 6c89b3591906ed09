//! Data files: species catalog, save data and the run-start hand-off

use std::path::{Path, PathBuf};

use crate::dex::SaveData;
use crate::species::Catalog;
use crate::state::RunStart;

#[derive(thiserror::Error, Debug)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid data: {0}")]
    Invalid(String),
}

pub async fn load_catalog(path: Option<&Path>) -> Result<Catalog, DataError> {
    match path {
        Some(path) => Catalog::from_ron(&read_to_string(path).await?),
        None => Catalog::builtin(),
    }
}

pub async fn load_save(path: Option<&Path>) -> Result<SaveData, DataError> {
    match path {
        Some(path) => SaveData::from_ron(&read_to_string(path).await?),
        None => SaveData::demo(),
    }
}

/// Hand the finalized party to whoever launched the screen
pub async fn write_run_start(path: &Path, run: &RunStart) -> Result<(), DataError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| DataError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    let json = serde_json::to_string_pretty(run)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|source| DataError::Write {
            path: path.to_path_buf(),
            source,
        })
}

pub fn default_output_path() -> PathBuf {
    let base = dirs_next::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("starter-select").join("run.json")
}

async fn read_to_string(path: &Path) -> Result<String, DataError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DataError::Read {
            path: path.to_path_buf(),
            source,
        })
}
