use crate::errors::AppError;
use crate::visitor::Visitor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{path::Path, path::PathBuf, sync::Arc};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::error;

pub const ADMIN_FLAG_KEY: &str = "site_admin";

pub fn registered_flag_key(date: &str) -> String {
    format!("joined_event_{date}")
}

/// Flags grouped by visitor id, then by flag key.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StoredFlags {
    pub visitors: BTreeMap<String, BTreeMap<String, String>>,
}

/// String key-value store for each visitor's local flags. Every write is
/// flushed to the backing file; a store without a path lives in memory.
#[derive(Clone)]
pub struct LocalStore {
    path: Option<PathBuf>,
    flags: Arc<Mutex<StoredFlags>>,
}

impl LocalStore {
    pub fn new(path: PathBuf, flags: StoredFlags) -> Self {
        Self {
            path: Some(path),
            flags: Arc::new(Mutex::new(flags)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            flags: Arc::new(Mutex::new(StoredFlags::default())),
        }
    }

    pub async fn open(path: PathBuf) -> Self {
        let flags = load_data(&path).await;
        Self::new(path, flags)
    }

    pub async fn get(&self, visitor: &Visitor, key: &str) -> Option<String> {
        self.flags
            .lock()
            .await
            .visitors
            .get(visitor.id())
            .and_then(|flags| flags.get(key))
            .cloned()
    }

    pub async fn is_set(&self, visitor: &Visitor, key: &str) -> bool {
        self.get(visitor, key).await.as_deref() == Some("true")
    }

    pub async fn set(&self, visitor: &Visitor, key: &str, value: &str) -> Result<(), AppError> {
        let mut flags = self.flags.lock().await;
        flags
            .visitors
            .entry(visitor.id().to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        self.flush(&flags).await
    }

    pub async fn remove(&self, visitor: &Visitor, key: &str) -> Result<(), AppError> {
        let mut flags = self.flags.lock().await;
        let Some(entries) = flags.visitors.get_mut(visitor.id()) else {
            return Ok(());
        };
        if entries.remove(key).is_none() {
            return Ok(());
        }
        if entries.is_empty() {
            flags.visitors.remove(visitor.id());
        }
        self.flush(&flags).await
    }

    async fn flush(&self, flags: &StoredFlags) -> Result<(), AppError> {
        match &self.path {
            Some(path) => persist_data(path, flags).await,
            None => Ok(()),
        }
    }
}

pub async fn load_data(path: &Path) -> StoredFlags {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                StoredFlags::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => StoredFlags::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            StoredFlags::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &StoredFlags) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}
