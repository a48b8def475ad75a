//! In-memory store for dry runs and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use xpert_core::{
    Error, Expert, MetaExpert, MetaExpertStore, Result, SpendRecord, SpendRecorder, Tag,
};

#[derive(Default)]
struct State {
    /// Meta-experts per owner key, in insertion order.
    meta_experts: HashMap<String, Vec<MetaExpert>>,
    tags: HashMap<Uuid, Vec<Tag>>,
    experts: Vec<(String, Expert)>,
    spend: Vec<SpendRecord>,
}

/// [`MetaExpertStore`] and [`SpendRecorder`] backed by process memory.
///
/// Cloning shares the underlying state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate an owner's meta-experts.
    pub async fn seed(&self, owner: &str, metas: impl IntoIterator<Item = MetaExpert>) {
        self.state
            .write()
            .await
            .meta_experts
            .entry(owner.to_string())
            .or_default()
            .extend(metas);
    }

    pub async fn meta_experts(&self, owner: &str) -> Vec<MetaExpert> {
        self.state
            .read()
            .await
            .meta_experts
            .get(owner)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn meta_expert(&self, id: Uuid) -> Option<MetaExpert> {
        self.state
            .read()
            .await
            .meta_experts
            .values()
            .flatten()
            .find(|m| m.id == id)
            .cloned()
    }

    /// Most recently stored tag set for a meta-expert.
    pub async fn tags(&self, meta_expert_id: Uuid) -> Vec<Tag> {
        self.state
            .read()
            .await
            .tags
            .get(&meta_expert_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether any tag set was ever stored for the meta-expert.
    pub async fn has_tags(&self, meta_expert_id: Uuid) -> bool {
        self.state.read().await.tags.contains_key(&meta_expert_id)
    }

    pub async fn experts(&self) -> Vec<Expert> {
        self.state
            .read()
            .await
            .experts
            .iter()
            .map(|(_, e)| e.clone())
            .collect()
    }

    pub async fn spend_records(&self) -> Vec<SpendRecord> {
        self.state.read().await.spend.clone()
    }
}

#[async_trait]
impl MetaExpertStore for MemoryStore {
    async fn list_meta_experts(&self, owner: &str) -> Result<Vec<MetaExpert>> {
        Ok(self.meta_experts(owner).await)
    }

    async fn create_meta_expert(&self, owner: &str, meta: &MetaExpert) -> Result<()> {
        let mut state = self.state.write().await;
        let metas = state.meta_experts.entry(owner.to_string()).or_default();
        if metas.iter().any(|m| m.id == meta.id) {
            return Err(Error::Storage(format!("meta-expert {} already exists", meta.id)));
        }
        metas.push(meta.clone());
        debug!(meta_expert_id = %meta.id, owner, "Stored new meta-expert");
        Ok(())
    }

    async fn update_meta_expert(&self, owner: &str, meta: &MetaExpert) -> Result<()> {
        let mut state = self.state.write().await;
        let existing = state
            .meta_experts
            .get_mut(owner)
            .and_then(|metas| metas.iter_mut().find(|m| m.id == meta.id))
            .ok_or_else(|| Error::NotFound(format!("meta-expert {}", meta.id)))?;
        *existing = meta.clone();
        debug!(meta_expert_id = %meta.id, owner, "Updated meta-expert");
        Ok(())
    }

    async fn create_tags(&self, meta_expert_id: Uuid, tags: &[Tag]) -> Result<()> {
        self.state
            .write()
            .await
            .tags
            .insert(meta_expert_id, tags.to_vec());
        Ok(())
    }

    async fn create_expert(&self, owner: &str, expert: &Expert) -> Result<()> {
        self.state
            .write()
            .await
            .experts
            .push((owner.to_string(), expert.clone()));
        Ok(())
    }
}

#[async_trait]
impl SpendRecorder for MemoryStore {
    async fn record_spend(&self, record: &SpendRecord) -> Result<()> {
        self.state.write().await.spend.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_owner_scoping() {
        let store = MemoryStore::new();
        let meta = MetaExpert::from_expert(&Expert::new("Ada"));
        store.create_meta_expert("alice@x.com", &meta).await.unwrap();

        assert_eq!(store.list_meta_experts("alice@x.com").await.unwrap().len(), 1);
        assert!(store.list_meta_experts("bob@x.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_record() {
        let store = MemoryStore::new();
        let mut meta = MetaExpert::from_expert(&Expert::new("Ada"));
        store.seed("o", [meta.clone()]).await;

        meta.profile_link = Some("https://www.linkedin.com/in/ada".into());
        store.update_meta_expert("o", &meta).await.unwrap();

        let stored = store.meta_expert(meta.id).await.unwrap();
        assert_eq!(stored.profile_link, meta.profile_link);
        assert_eq!(store.meta_experts("o").await.len(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_is_not_found() {
        let store = MemoryStore::new();
        let meta = MetaExpert::from_expert(&Expert::new("Ada"));
        let err = store.update_meta_expert("o", &meta).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_create_rejected() {
        let store = MemoryStore::new();
        let meta = MetaExpert::from_expert(&Expert::new("Ada"));
        store.create_meta_expert("o", &meta).await.unwrap();
        assert!(store.create_meta_expert("o", &meta).await.is_err());
    }

    #[tokio::test]
    async fn test_tags_replace_previous_set() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        store.create_tags(id, &[Tag::new("Rust", id)]).await.unwrap();
        store
            .create_tags(id, &[Tag::new("Go", id), Tag::new("SQL", id)])
            .await
            .unwrap();

        let tags: Vec<_> = store.tags(id).await.into_iter().map(|t| t.tag).collect();
        assert_eq!(tags, vec!["Go", "SQL"]);
    }
}
