use crate::core::{ArtifactStore, PublicationState, StateStore};
use crate::utils::error::{InclusionError, Result};
use async_trait::async_trait;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const STATE_FILE: &str = "meta.json";

/// 先寫到暫存檔再 rename，避免留下寫到一半的檔案
fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, data)?;
    fs::rename(&tmp, path).inspect_err(|_| {
        let _ = fs::remove_file(&tmp);
    })
}

/// 資料夾內的 .ils 檔案
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    base_path: PathBuf,
}

impl LocalArtifactStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn list_names(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.base_path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    async fn write(&self, name: &str, data: &[u8]) -> Result<()> {
        write_atomic(&self.path_of(name), data).map_err(|source| InclusionError::SerializationIo {
            name: name.to_string(),
            source,
        })
    }

    async fn delete(&self, name: &str) -> Result<()> {
        match fs::remove_file(self.path_of(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(InclusionError::DeleteFailed {
                name: name.to_string(),
                source,
            }),
        }
    }
}

/// meta.json 形式的發佈狀態
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(STATE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StateStore for JsonStateStore {
    async fn load(&self) -> Result<PublicationState> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(PublicationState::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, state: &PublicationState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        write_atomic(&self.path, json.as_bytes())?;
        tracing::debug!("Saved publication state to {}", self.path.display());
        Ok(())
    }
}
