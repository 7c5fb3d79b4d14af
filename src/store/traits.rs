use std::path::PathBuf;

use crate::model::{Guide, Referral};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} does not hold a valid record array: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize records: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("invalid update: {0}")]
    InvalidUpdate(String),
    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[async_trait::async_trait]
pub trait GuideStore: Send + Sync {
    async fn list_guides(&self) -> Result<Vec<Guide>>;
    async fn get_guide(&self, id: &str) -> Result<Option<Guide>>;
    async fn insert_guide(&self, guide: Guide) -> Result<()>;
    /// Replace the stored guide with `f(guide)` under the write lock.
    /// Returns `None` when no guide has that id.
    async fn update_guide<F>(&self, id: &str, f: F) -> Result<Option<Guide>>
    where
        F: FnOnce(Guide) -> Result<Guide> + Send + 'static;
}

#[async_trait::async_trait]
pub trait ReferralStore: Send + Sync {
    async fn list_referrals(&self) -> Result<Vec<Referral>>;
    async fn insert_referral(&self, referral: Referral) -> Result<()>;
    /// Replace the stored referral with `f(referral)` under the write lock.
    async fn update_referral<F>(&self, id: &str, f: F) -> Result<Option<Referral>>
    where
        F: FnOnce(Referral) -> Result<Referral> + Send + 'static;
}

pub trait Store: GuideStore + ReferralStore + Send + Sync {}
