use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::model::{Guide, Referral};
use crate::store::traits::{GuideStore, ReferralStore, Result, Store, StoreError};

pub const GUIDES_FILE: &str = "guides.json";
pub const REFERRALS_FILE: &str = "sponsor-referrals.json";

/// Flat-file storage: each collection is one JSON array, read in full on
/// every call and rewritten in full on every change.
///
/// Entries that do not parse as a record are skipped on read and written
/// back untouched, so one malformed entry never hides the rest of the file.
#[derive(Debug)]
pub struct JsonFileStore {
    guides_path: PathBuf,
    referrals_path: PathBuf,
    /// Held across load-modify-save so writers in this process never interleave
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    /// Open the store rooted at `data_dir`, creating the directory and empty
    /// collections when missing.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir).map_err(|source| StoreError::Io {
            path: data_dir.to_path_buf(),
            source,
        })?;

        let store = Self {
            guides_path: data_dir.join(GUIDES_FILE),
            referrals_path: data_dir.join(REFERRALS_FILE),
            write_lock: Arc::new(Mutex::new(())),
        };
        ensure_array_file(&store.guides_path)?;
        ensure_array_file(&store.referrals_path)?;

        log::info!("JSON store ready at {}", data_dir.display());
        Ok(store)
    }

    pub fn guides_path(&self) -> &Path {
        &self.guides_path
    }

    pub fn referrals_path(&self) -> &Path {
        &self.referrals_path
    }

    async fn read<T>(&self, path: &Path) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let path = path.to_path_buf();
        blocking(move || load_records(&path)).await
    }

    async fn modify<T, F>(&self, path: &Path, id: &str, f: F) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce(T) -> Result<T> + Send + 'static,
    {
        let path = path.to_path_buf();
        let id = id.to_string();
        let lock = Arc::clone(&self.write_lock);
        blocking(move || {
            let _guard = lock.lock();
            modify_record(&path, &id, f)
        })
        .await
    }

    async fn append<T>(&self, path: &Path, record: T) -> Result<()>
    where
        T: Serialize + Send + 'static,
    {
        let path = path.to_path_buf();
        let lock = Arc::clone(&self.write_lock);
        blocking(move || {
            let _guard = lock.lock();
            let mut entries = load_entries(&path)?;
            entries.push(serde_json::to_value(&record).map_err(StoreError::Serialize)?);
            save_entries(&path, &entries)
        })
        .await
    }
}

/// Run file IO off the async workers.
async fn blocking<R, F>(task: F) -> Result<R>
where
    F: FnOnce() -> Result<R> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(task).await?
}

fn ensure_array_file(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    fs::write(path, "[]").map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// The raw array. Anything other than a JSON array is corrupt.
fn load_entries(path: &Path) -> Result<Vec<Value>> {
    let data = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if data.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&data).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let records = load_entries(path)?
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("skipping entry {} of {}: {}", index, path.display(), e);
                None
            }
        })
        .collect();
    Ok(records)
}

fn modify_record<T, F>(path: &Path, id: &str, f: F) -> Result<Option<T>>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce(T) -> Result<T>,
{
    let mut entries = load_entries(path)?;
    let Some(index) = entries
        .iter()
        .position(|entry| entry.get("id").and_then(Value::as_str) == Some(id))
    else {
        return Ok(None);
    };

    let current: T =
        serde_json::from_value(entries[index].clone()).map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;
    let updated = f(current)?;
    entries[index] = serde_json::to_value(&updated).map_err(StoreError::Serialize)?;
    save_entries(path, &entries)?;
    Ok(Some(updated))
}

/// Write through a sibling temp file so readers never see a half-written array.
fn save_entries(path: &Path, entries: &[Value]) -> Result<()> {
    let json = serde_json::to_string_pretty(entries).map_err(StoreError::Serialize)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)
        .and_then(|_| fs::rename(&tmp, path))
        .map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[async_trait::async_trait]
impl GuideStore for JsonFileStore {
    async fn list_guides(&self) -> Result<Vec<Guide>> {
        self.read(&self.guides_path).await
    }

    async fn get_guide(&self, id: &str) -> Result<Option<Guide>> {
        let guides: Vec<Guide> = self.read(&self.guides_path).await?;
        Ok(guides.into_iter().find(|g| g.id == id))
    }

    async fn insert_guide(&self, guide: Guide) -> Result<()> {
        self.append(&self.guides_path, guide).await
    }

    async fn update_guide<F>(&self, id: &str, f: F) -> Result<Option<Guide>>
    where
        F: FnOnce(Guide) -> Result<Guide> + Send + 'static,
    {
        self.modify(&self.guides_path, id, f).await
    }
}

#[async_trait::async_trait]
impl ReferralStore for JsonFileStore {
    async fn list_referrals(&self) -> Result<Vec<Referral>> {
        self.read(&self.referrals_path).await
    }

    async fn insert_referral(&self, referral: Referral) -> Result<()> {
        self.append(&self.referrals_path, referral).await
    }

    async fn update_referral<F>(&self, id: &str, f: F) -> Result<Option<Referral>>
    where
        F: FnOnce(Referral) -> Result<Referral> + Send + 'static,
    {
        self.modify(&self.referrals_path, id, f).await
    }
}

impl Store for JsonFileStore {}
