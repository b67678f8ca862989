use std::collections::BTreeMap;

use tokio::sync::RwLock;
use tracing::debug;

use shared::types::{Post, PostInput};

/// In-memory post storage keyed by id.
///
/// Ids are assigned from 1 upwards and never reused, even after a delete.
#[derive(Debug)]
pub struct PostStore {
    inner: RwLock<Posts>,
}

#[derive(Debug)]
struct Posts {
    next_id: i64,
    by_id: BTreeMap<i64, Post>,
}

impl Default for PostStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PostStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Posts {
                next_id: 1,
                by_id: BTreeMap::new(),
            }),
        }
    }

    /// A store pre-filled with `count` sample posts.
    pub async fn seeded(count: usize) -> Self {
        let store = Self::new();
        for _ in 0..count {
            store
                .create(PostInput {
                    user_id: Some(1),
                    title: Some(
                        "sunt aut facere repellat provident occaecati excepturi optio reprehenderit"
                            .to_string(),
                    ),
                    body: Some(
                        "quia et suscipit\nsuscipit recusandae consequuntur expedita et cum"
                            .to_string(),
                    ),
                })
                .await;
        }
        store
    }

    pub async fn create(&self, input: PostInput) -> Post {
        let mut posts = self.inner.write().await;
        let id = posts.next_id;
        posts.next_id += 1;

        let post = input.into_post(id);
        posts.by_id.insert(id, post.clone());
        debug!("Created post {}", id);
        post
    }

    /// All posts, ordered by id.
    pub async fn list(&self) -> Vec<Post> {
        self.inner.read().await.by_id.values().cloned().collect()
    }

    pub async fn get(&self, id: i64) -> Option<Post> {
        self.inner.read().await.by_id.get(&id).cloned()
    }

    /// Apply `input` to an existing post. Returns the updated post, or `None`
    /// if `id` is unknown.
    pub async fn update(&self, id: i64, input: PostInput) -> Option<Post> {
        let mut posts = self.inner.write().await;
        let post = posts.by_id.get_mut(&id)?;
        input.apply_to(post);
        debug!("Updated post {}", id);
        Some(post.clone())
    }

    pub async fn delete(&self, id: i64) -> Option<Post> {
        let removed = self.inner.write().await.by_id.remove(&id);
        if removed.is_some() {
            debug!("Deleted post {}", id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str) -> PostInput {
        PostInput {
            user_id: Some(7),
            title: Some(title.to_string()),
            body: Some("body".to_string()),
        }
    }

    #[tokio::test]
    async fn ids_increase_and_are_not_reused() {
        let store = PostStore::new();
        let a = store.create(input("a")).await;
        let b = store.create(input("b")).await;
        assert_eq!((a.id, b.id), (1, 2));

        store.delete(b.id).await;
        let c = store.create(input("c")).await;
        assert_eq!(c.id, 3);
    }

    #[tokio::test]
    async fn update_keeps_absent_fields_and_id() {
        let store = PostStore::new();
        let post = store.create(input("before")).await;

        let updated = store
            .update(
                post.id,
                PostInput {
                    title: Some("after".to_string()),
                    ..PostInput::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, post.id);
        assert_eq!(updated.title, "after");
        assert_eq!(updated.body, "body");
        assert_eq!(updated.user_id, 7);
    }

    #[tokio::test]
    async fn missing_ids() {
        let store = PostStore::new();
        assert!(store.get(42).await.is_none());
        assert!(store.update(42, input("x")).await.is_none());
        assert!(store.delete(42).await.is_none());
    }

    #[tokio::test]
    async fn seeded_store_lists_in_id_order() {
        let store = PostStore::seeded(10).await;
        let ids: Vec<i64> = store.list().await.iter().map(|p| p.id).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
        assert_eq!(store.len().await, 10);
    }
}
