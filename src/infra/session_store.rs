//! File-backed persistence for session credentials and the sync position.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{
    domain::credentials::SessionCredentials,
    infra::{contracts::CredentialsStore, error::AppError},
};

#[derive(Debug, Clone)]
pub struct FileCredentialsStore {
    path: PathBuf,
}

impl FileCredentialsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialsStore for FileCredentialsStore {
    fn load(&self) -> Result<Option<SessionCredentials>> {
        Ok(read_json(&self.path)?)
    }

    fn save(&mut self, credentials: &SessionCredentials) -> Result<()> {
        Ok(write_json(&self.path, credentials)?)
    }

    fn clear(&mut self) -> Result<bool> {
        Ok(remove_if_exists(&self.path)?)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SyncPosition {
    next_batch: String,
}

/// Remembers where the last sync stopped so a restart resumes from there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStore {
    path: PathBuf,
}

impl SyncStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load_next_batch(&self) -> Result<Option<String>, AppError> {
        Ok(read_json::<SyncPosition>(&self.path)?.map(|position| position.next_batch))
    }

    pub fn save_next_batch(&self, next_batch: &str) -> Result<(), AppError> {
        write_json(
            &self.path,
            &SyncPosition {
                next_batch: next_batch.to_owned(),
            },
        )
    }

    pub fn clear(&self) -> Result<bool, AppError> {
        remove_if_exists(&self.path)
    }
}

fn read_json<T>(path: &Path) -> Result<Option<T>, AppError>
where
    T: for<'de> Deserialize<'de>,
{
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(source) if source.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(AppError::SessionFile {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| AppError::SessionFileCorrupt {
            path: path.to_path_buf(),
            source,
        })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| AppError::StorageDirCreate {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let raw = serde_json::to_string_pretty(value).map_err(|source| {
        AppError::SessionFileCorrupt {
            path: path.to_path_buf(),
            source,
        }
    })?;

    fs::write(path, raw).map_err(|source| AppError::SessionFile {
        path: path.to_path_buf(),
        source,
    })
}

fn remove_if_exists(path: &Path) -> Result<bool, AppError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(source) if source.kind() == ErrorKind::NotFound => Ok(false),
        Err(source) => Err(AppError::SessionFile {
            path: path.to_path_buf(),
            source,
        }),
    }
}
