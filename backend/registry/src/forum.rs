//! Governance forum posts.

use tracing::info;

use crate::errors::{RegistryError, Result};
use crate::records::{new_post_id, now_secs, ForumPost, PostPayload, FORUM_NAMESPACE};
use crate::registry::Registry;
use crate::store::OpaqueStore;

pub struct ForumStore<S> {
    registry: Registry<S>,
}

impl<S: OpaqueStore> ForumStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            registry: Registry::new(store, FORUM_NAMESPACE),
        }
    }

    /// All readable posts, newest first.
    pub async fn list(&self) -> Vec<ForumPost> {
        let mut posts: Vec<ForumPost> = self
            .registry
            .load_records::<PostPayload>()
            .await
            .into_iter()
            .map(|(id, payload)| ForumPost::from_payload(id, payload))
            .collect();
        posts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        posts
    }

    /// Store and list a new post. Blank content is rejected before the store
    /// is touched.
    pub async fn create(&self, author: &str, content: &str) -> Result<String> {
        if content.trim().is_empty() {
            return Err(RegistryError::InvalidInput(
                "post content must not be empty".to_string(),
            ));
        }
        if !self.registry.is_available().await? {
            return Err(RegistryError::Unavailable);
        }

        let id = new_post_id();
        let payload = PostPayload {
            content: content.to_string(),
            timestamp: now_secs(),
            author: author.to_string(),
        };

        self.registry
            .put_record(&id, &serde_json::to_vec(&payload)?)
            .await?;
        self.registry.append_key(&id).await?;

        info!("Forum post {id} by {author}");
        Ok(id)
    }
}
