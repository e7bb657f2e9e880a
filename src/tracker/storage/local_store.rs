use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
};
use tracing::debug;

use crate::tracker::session::SiteKey;

use super::entities::{StorageDocument, TimeLogs};

pub const STORAGE_FILE: &str = "storage.json";

/// Interface for the durable state of the tracker.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn user_id(&self) -> Result<Option<String>>;

    async fn set_user_id(&self, user_id: &str) -> Result<()>;

    async fn time_logs(&self) -> Result<TimeLogs>;

    /// Adds `seconds` to the total of `site` and returns the new total. This is a single
    /// read-modify-write, either all of it lands on disk or none of it does.
    async fn add_time(&self, site: &SiteKey, seconds: u64) -> Result<u64>;

    async fn clear_time_logs(&self) -> Result<()>;
}

/// The main realization of [LocalStore]. Keeps everything in one JSON file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: &Path) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(dir)?;

        Ok(Self {
            path: dir.join(STORAGE_FILE),
        })
    }

    async fn read(&self) -> Result<StorageDocument> {
        let mut file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StorageDocument::default()),
            Err(e) => return Err(e).with_context(|| format!("Failed to open {:?}", self.path)),
        };

        file.lock_shared()?;
        let mut content = String::new();
        let result = file.read_to_string(&mut content).await;
        file.unlock_async().await?;
        result?;

        parse_document(&content).with_context(|| format!("Storage {:?} is corrupted", self.path))
    }

    /// Applies `change` to the stored document while holding an exclusive lock on it.
    async fn update<R>(&self, change: impl FnOnce(&mut StorageDocument) -> R) -> Result<R> {
        let mut file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open {:?}", self.path))?;

        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let result = Self::update_with_file(&mut file, change).await;
        file.unlock_async().await?;
        result.with_context(|| format!("Failed to update {:?}", self.path))
    }

    async fn update_with_file<R>(
        file: &mut File,
        change: impl FnOnce(&mut StorageDocument) -> R,
    ) -> Result<R> {
        let mut content = String::new();
        file.read_to_string(&mut content).await?;
        let mut document = parse_document(&content)?;

        let result = change(&mut document);

        let buffer = serde_json::to_vec(&document)?;
        file.rewind().await?;
        file.set_len(0).await?;
        file.write_all(&buffer).await?;
        file.flush().await?;
        file.sync_data().await?;
        Ok(result)
    }
}

fn parse_document(content: &str) -> Result<StorageDocument> {
    if content.trim().is_empty() {
        return Ok(StorageDocument::default());
    }
    Ok(serde_json::from_str(content)?)
}

#[async_trait]
impl LocalStore for JsonFileStore {
    async fn user_id(&self) -> Result<Option<String>> {
        Ok(self.read().await?.user_id)
    }

    async fn set_user_id(&self, user_id: &str) -> Result<()> {
        self.update(|document| document.user_id = Some(user_id.to_owned()))
            .await
    }

    async fn time_logs(&self) -> Result<TimeLogs> {
        Ok(self.read().await?.time_logs)
    }

    async fn add_time(&self, site: &SiteKey, seconds: u64) -> Result<u64> {
        let total = self
            .update(|document| document.add_time(site, seconds))
            .await?;
        debug!("Stored {seconds}s for {site}, {total}s pending");
        Ok(total)
    }

    async fn clear_time_logs(&self) -> Result<()> {
        self.update(|document| document.time_logs.clear()).await
    }
}
