//! Single-record maintenance of stored posts.

use chrono::Utc;
use tracing::info;

use crate::error::BlogError;
use crate::model::{Post, PostId, Visibility};
use crate::store::PostStore;

pub fn load_post(store: &dyn PostStore, id: PostId) -> Result<Post, BlogError> {
    store.get(id)?.ok_or(BlogError::PostNotFound(id))
}

pub fn set_visibility(
    store: &mut dyn PostStore,
    id: PostId,
    visibility: Visibility,
) -> Result<Post, BlogError> {
    let mut post = load_post(&*store, id)?;
    post.visibility = visibility;
    store.update(&post)?;
    info!(id, %visibility, "changed visibility");
    Ok(post)
}

pub fn hide(store: &mut dyn PostStore, id: PostId) -> Result<Post, BlogError> {
    set_visibility(store, id, Visibility::Hidden)
}

pub fn unlist(store: &mut dyn PostStore, id: PostId) -> Result<Post, BlogError> {
    set_visibility(store, id, Visibility::Unlisted)
}

pub fn publish(store: &mut dyn PostStore, id: PostId) -> Result<Post, BlogError> {
    set_visibility(store, id, Visibility::Published)
}

pub fn edit_content(
    store: &mut dyn PostStore,
    id: PostId,
    content: String,
) -> Result<Post, BlogError> {
    let mut post = load_post(&*store, id)?;
    post.content = content;
    post.post_update_ts = Utc::now();
    store.update(&post)?;
    info!(id, "updated content");
    Ok(post)
}

pub fn delete_post(store: &mut dyn PostStore, id: PostId) -> Result<Post, BlogError> {
    let post = load_post(&*store, id)?;
    store.delete(id)?;
    info!(id, handle = %post.handle, "deleted post");
    Ok(post)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewPost;
    use crate::store::MemoryPostStore;
    use chrono::Duration;

    fn seeded() -> (MemoryPostStore, Post) {
        let mut store = MemoryPostStore::new();
        let created = Utc::now() - Duration::hours(1);
        let post = store
            .insert(NewPost {
                title: "Hello".to_string(),
                handle: "hello".to_string(),
                content: "<p>old</p>".to_string(),
                summary: "<p>old</p>".to_string(),
                visibility: Visibility::Hidden,
                post_ts: created,
                post_update_ts: created,
            })
            .expect("insert");
        (store, post)
    }

    #[test]
    fn visibility_transitions_leave_content_alone() {
        let (mut store, original) = seeded();
        let published = publish(&mut store, original.id).expect("publish");
        assert_eq!(published.visibility, Visibility::Published);
        let unlisted = unlist(&mut store, original.id).expect("unlist");
        assert_eq!(unlisted.visibility, Visibility::Unlisted);
        let hidden = hide(&mut store, original.id).expect("hide");
        assert_eq!(hidden.visibility, Visibility::Hidden);

        let stored = load_post(&store, original.id).expect("load");
        assert_eq!(stored.content, original.content);
        assert_eq!(stored.post_update_ts, original.post_update_ts);
    }

    #[test]
    fn edit_replaces_content_and_advances_timestamp() {
        let (mut store, original) = seeded();
        let edited =
            edit_content(&mut store, original.id, "<p>new [[raw]]</p>".to_string()).expect("edit");
        assert_eq!(edited.content, "<p>new [[raw]]</p>");
        assert_eq!(edited.summary, original.summary);
        assert_eq!(edited.post_ts, original.post_ts);
        assert!(edited.post_update_ts > original.post_update_ts);
        assert_eq!(load_post(&store, original.id).expect("load"), edited);
    }

    #[test]
    fn delete_removes_post() {
        let (mut store, original) = seeded();
        delete_post(&mut store, original.id).expect("delete");
        assert!(store.get(original.id).expect("get").is_none());
    }

    #[test]
    fn unknown_id_is_reported() {
        let (mut store, _) = seeded();
        assert!(matches!(publish(&mut store, 99), Err(BlogError::PostNotFound(99))));
        assert!(matches!(
            edit_content(&mut store, 99, String::new()),
            Err(BlogError::PostNotFound(99))
        ));
        assert!(matches!(delete_post(&mut store, 99), Err(BlogError::PostNotFound(99))));
    }
}
