use serde::Serialize;
use serde_json::{Map, Value};

use crate::firebase::FirestoreClient;
use crate::model::{Guide, Referral};
use crate::store::{GuideStore, ReferralStore, Result, Store};

pub const GUIDES_COLLECTION: &str = "guides";
pub const REFERRALS_COLLECTION: &str = "sponsorReferrals";

/// Store wrapper that copies every written guide and referral to Firestore.
///
/// The wrapped store stays authoritative: reads never touch Firestore, and a
/// failed copy is logged without failing the write.
pub struct FirestoreMirror<S> {
    inner: S,
    client: FirestoreClient,
}

impl<S> FirestoreMirror<S> {
    pub fn new(inner: S, client: FirestoreClient) -> Self {
        log::info!("mirroring writes to firestore project {}", client.project_id());
        Self { inner, client }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn mirror(&self, collection: &str, id: &str, document: Option<Map<String, Value>>) {
        let Some(document) = document else { return };
        if id.is_empty() {
            log::debug!("not mirroring a {} entry without id", collection);
            return;
        }
        match self.client.set_document(collection, id, &document).await {
            Ok(_) => log::debug!("mirrored {}/{}", collection, id),
            Err(e) => log::error!("failed to mirror {}/{} to firestore: {}", collection, id, e),
        }
    }
}

fn to_document<T: Serialize>(record: &T) -> Option<Map<String, Value>> {
    match serde_json::to_value(record) {
        Ok(Value::Object(fields)) => Some(fields),
        Ok(other) => {
            log::error!("record serialized to a non-object: {}", other);
            None
        }
        Err(e) => {
            log::error!("failed to serialize record for firestore: {}", e);
            None
        }
    }
}

#[async_trait::async_trait]
impl<S: GuideStore> GuideStore for FirestoreMirror<S> {
    async fn list_guides(&self) -> Result<Vec<Guide>> {
        self.inner.list_guides().await
    }

    async fn get_guide(&self, id: &str) -> Result<Option<Guide>> {
        self.inner.get_guide(id).await
    }

    async fn insert_guide(&self, guide: Guide) -> Result<()> {
        let id = guide.id.clone();
        let document = to_document(&guide);
        self.inner.insert_guide(guide).await?;
        self.mirror(GUIDES_COLLECTION, &id, document).await;
        Ok(())
    }

    async fn update_guide<F>(&self, id: &str, f: F) -> Result<Option<Guide>>
    where
        F: FnOnce(Guide) -> Result<Guide> + Send + 'static,
    {
        let updated = self.inner.update_guide(id, f).await?;
        if let Some(guide) = &updated {
            self.mirror(GUIDES_COLLECTION, &guide.id, to_document(guide)).await;
        }
        Ok(updated)
    }
}

#[async_trait::async_trait]
impl<S: ReferralStore> ReferralStore for FirestoreMirror<S> {
    async fn list_referrals(&self) -> Result<Vec<Referral>> {
        self.inner.list_referrals().await
    }

    async fn insert_referral(&self, referral: Referral) -> Result<()> {
        let id = referral.id.clone();
        let document = to_document(&referral);
        self.inner.insert_referral(referral).await?;
        self.mirror(REFERRALS_COLLECTION, &id, document).await;
        Ok(())
    }

    async fn update_referral<F>(&self, id: &str, f: F) -> Result<Option<Referral>>
    where
        F: FnOnce(Referral) -> Result<Referral> + Send + 'static,
    {
        let updated = self.inner.update_referral(id, f).await?;
        if let Some(referral) = &updated {
            self.mirror(REFERRALS_COLLECTION, &referral.id, to_document(referral))
                .await;
        }
        Ok(updated)
    }
}

impl<S: Store> Store for FirestoreMirror<S> {}
