use std::collections::BTreeMap;

use crate::error::BlogError;
use crate::model::{NewPost, Post, PostId, Visibility};

/// Persistent home of posts. Single writer; implementations do no locking.
pub trait PostStore {
    fn insert(&mut self, post: NewPost) -> Result<Post, BlogError>;
    fn get(&self, id: PostId) -> Result<Option<Post>, BlogError>;
    fn all(&self) -> Result<Vec<Post>, BlogError>;
    fn find_by_handle(
        &self,
        handle: &str,
        visibility: Visibility,
    ) -> Result<Vec<Post>, BlogError>;
    fn update(&mut self, post: &Post) -> Result<(), BlogError>;
    fn delete(&mut self, id: PostId) -> Result<(), BlogError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryPostStore {
    posts: BTreeMap<PostId, Post>,
    last_id: PostId,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PostStore for MemoryPostStore {
    fn insert(&mut self, post: NewPost) -> Result<Post, BlogError> {
        self.last_id += 1;
        let post = post.into_post(self.last_id);
        self.posts.insert(post.id, post.clone());
        Ok(post)
    }

    fn get(&self, id: PostId) -> Result<Option<Post>, BlogError> {
        Ok(self.posts.get(&id).cloned())
    }

    fn all(&self) -> Result<Vec<Post>, BlogError> {
        Ok(self.posts.values().cloned().collect())
    }

    fn find_by_handle(
        &self,
        handle: &str,
        visibility: Visibility,
    ) -> Result<Vec<Post>, BlogError> {
        Ok(self
            .posts
            .values()
            .filter(|post| post.handle == handle && post.visibility == visibility)
            .cloned()
            .collect())
    }

    fn update(&mut self, post: &Post) -> Result<(), BlogError> {
        match self.posts.get_mut(&post.id) {
            Some(existing) => {
                *existing = post.clone();
                Ok(())
            }
            None => Err(BlogError::PostNotFound(post.id)),
        }
    }

    fn delete(&mut self, id: PostId) -> Result<(), BlogError> {
        self.posts
            .remove(&id)
            .map(|_| ())
            .ok_or(BlogError::PostNotFound(id))
    }
}
