use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::activities::dto::ActivityEntry;
use crate::planner::dto::PlannerEntry;

/// Persistence for planner entries and the activity log.
#[async_trait]
pub trait LogStore: Send + Sync {
    async fn planner_entries(&self) -> anyhow::Result<Vec<PlannerEntry>>;
    async fn add_planner_entry(&self, entry: PlannerEntry) -> anyhow::Result<()>;
    /// Removes every entry equal to `entry`, returning how many were dropped.
    async fn remove_planner_entries(&self, entry: &PlannerEntry) -> anyhow::Result<usize>;
    /// Oldest first.
    async fn activities(&self) -> anyhow::Result<Vec<ActivityEntry>>;
    async fn append_activity(&self, activity: ActivityEntry) -> anyhow::Result<()>;
}

/// Two pretty-printed JSON arrays on disk. Every read-modify-write cycle holds `write_lock`.
pub struct FileLogStore {
    planner_path: PathBuf,
    activities_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileLogStore {
    pub async fn open(dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("create storage dir {}", dir.display()))?;
        Ok(Self {
            planner_path: dir.join("planner.json"),
            activities_path: dir.join("activities.json"),
            write_lock: Mutex::new(()),
        })
    }
}

#[async_trait]
impl LogStore for FileLogStore {
    async fn planner_entries(&self) -> anyhow::Result<Vec<PlannerEntry>> {
        Ok(read_json(&self.planner_path).await)
    }

    async fn add_planner_entry(&self, entry: PlannerEntry) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut values = load_for_update(&self.planner_path).await?;
        values.push(serde_json::to_value(&entry).context("serialize planner entry")?);
        write_json(&self.planner_path, &values).await
    }

    async fn remove_planner_entries(&self, entry: &PlannerEntry) -> anyhow::Result<usize> {
        let _guard = self.write_lock.lock().await;
        let mut values = load_for_update(&self.planner_path).await?;
        let before = values.len();
        // Entries that no longer fit the schema are kept as they are.
        values.retain(|v| PlannerEntry::deserialize(v).map_or(true, |e| &e != entry));
        let removed = before - values.len();
        write_json(&self.planner_path, &values).await?;
        Ok(removed)
    }

    async fn activities(&self) -> anyhow::Result<Vec<ActivityEntry>> {
        Ok(read_json(&self.activities_path).await)
    }

    async fn append_activity(&self, activity: ActivityEntry) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut values = load_for_update(&self.activities_path).await?;
        values.push(serde_json::to_value(&activity).context("serialize activity")?);
        write_json(&self.activities_path, &values).await
    }
}

/// Raw array entries, `None` when the file does not exist.
async fn read_values(path: &Path) -> anyhow::Result<Option<Vec<Value>>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
    };
    let values = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse {} as a JSON array", path.display()))?;
    Ok(Some(values))
}

/// Typed view of a log. Entries that do not fit `T` are skipped; an unreadable or
/// corrupt file reads as empty.
async fn read_json<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let values = match read_values(path).await {
        Ok(Some(v)) => v,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %format!("{:#}", e), "unreadable log file; treating as empty");
            return Vec::new();
        }
    };
    values
        .into_iter()
        .enumerate()
        .filter_map(|(i, v)| match T::deserialize(v) {
            Ok(t) => Some(t),
            Err(e) => {
                warn!(error = %e, path = %path.display(), index = i, "skipping malformed log entry");
                None
            }
        })
        .collect()
}

/// Entries to rewrite. A file that is not a JSON array is moved aside before it
/// gets replaced; if it cannot be moved the write is refused.
async fn load_for_update(path: &Path) -> anyhow::Result<Vec<Value>> {
    match read_values(path).await {
        Ok(Some(v)) => Ok(v),
        Ok(None) => Ok(Vec::new()),
        Err(e) => {
            let backup = path.with_extension(format!(
                "json.corrupt-{}",
                OffsetDateTime::now_utc().unix_timestamp_nanos()
            ));
            tokio::fs::rename(path, &backup)
                .await
                .with_context(|| format!("{:#}; could not move it to {}", e, backup.display()))?;
            warn!(
                error = %format!("{:#}", e),
                backup = %backup.display(),
                "corrupt log file moved aside"
            );
            Ok(Vec::new())
        }
    }
}

async fn write_json(path: &Path, data: &[Value]) -> anyhow::Result<()> {
    let body = serde_json::to_vec_pretty(data).context("serialize log")?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &body)
        .await
        .with_context(|| format!("write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    debug!(path = %path.display(), entries = data.len(), "log file written");
    Ok(())
}

/// In-process store used by tests and `AppState::fake`.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryLogStore {
    planner: Mutex<Vec<PlannerEntry>>,
    activities: Mutex<Vec<ActivityEntry>>,
}

#[cfg(test)]
#[async_trait]
impl LogStore for MemoryLogStore {
    async fn planner_entries(&self) -> anyhow::Result<Vec<PlannerEntry>> {
        Ok(self.planner.lock().await.clone())
    }

    async fn add_planner_entry(&self, entry: PlannerEntry) -> anyhow::Result<()> {
        self.planner.lock().await.push(entry);
        Ok(())
    }

    async fn remove_planner_entries(&self, entry: &PlannerEntry) -> anyhow::Result<usize> {
        let mut entries = self.planner.lock().await;
        let before = entries.len();
        entries.retain(|e| e != entry);
        Ok(before - entries.len())
    }

    async fn activities(&self) -> anyhow::Result<Vec<ActivityEntry>> {
        Ok(self.activities.lock().await.clone())
    }

    async fn append_activity(&self, activity: ActivityEntry) -> anyhow::Result<()> {
        self.activities.lock().await.push(activity);
        Ok(())
    }
}
