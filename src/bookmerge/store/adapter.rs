use super::{BookmarkBackend, CreateDetails, Destination, UpdateChanges};
use crate::error::Result;
use crate::model::{BookmarkNode, DEFAULT_GROUP_ID};
use tracing::debug;

/// Thin async facade over a host bookmark store.
///
/// Parent ids default to the configured default group, absent indexes mean
/// "append". Errors come back exactly as the backend raised them.
pub struct BookmarksAdapter<B: BookmarkBackend> {
    backend: B,
    default_group_id: String,
}

impl<B: BookmarkBackend> BookmarksAdapter<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            default_group_id: DEFAULT_GROUP_ID.to_string(),
        }
    }

    pub fn with_default_group(mut self, id: impl Into<String>) -> Self {
        self.default_group_id = id.into();
        self
    }

    pub fn default_group_id(&self) -> &str {
        &self.default_group_id
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn get_tree(&self) -> Result<Vec<BookmarkNode>> {
        debug!("get_tree");
        self.backend.get_tree().await
    }

    pub async fn get_children_by_parent(
        &self,
        parent_id: Option<&str>,
    ) -> Result<Vec<BookmarkNode>> {
        let parent_id = parent_id.unwrap_or(&self.default_group_id);
        debug!(parent_id, "get_children");
        self.backend.get_children(parent_id).await
    }

    pub async fn get_subtree(&self, id: Option<&str>) -> Result<Vec<BookmarkNode>> {
        let id = id.unwrap_or(&self.default_group_id);
        debug!(id, "get_subtree");
        self.backend.get_subtree(id).await
    }

    pub async fn get_recently_added(&self, count: usize) -> Result<Vec<BookmarkNode>> {
        debug!(count, "get_recent");
        self.backend.get_recent(count).await
    }

    pub async fn create_bookmark(
        &self,
        title: &str,
        url: &str,
        parent_id: Option<&str>,
        index: Option<usize>,
    ) -> Result<BookmarkNode> {
        let parent_id = parent_id.unwrap_or(&self.default_group_id);
        debug!(parent_id, title, url, ?index, "create bookmark");
        self.backend
            .create(CreateDetails {
                parent_id: parent_id.to_string(),
                title: title.to_string(),
                url: Some(url.to_string()),
                index,
            })
            .await
    }

    pub async fn create_group(
        &self,
        title: &str,
        parent_id: Option<&str>,
        index: Option<usize>,
    ) -> Result<BookmarkNode> {
        let parent_id = parent_id.unwrap_or(&self.default_group_id);
        debug!(parent_id, title, ?index, "create group");
        self.backend
            .create(CreateDetails {
                parent_id: parent_id.to_string(),
                title: title.to_string(),
                url: None,
                index,
            })
            .await
    }

    pub async fn update_bookmark(
        &self,
        id: &str,
        title: Option<&str>,
        url: Option<&str>,
    ) -> Result<BookmarkNode> {
        debug!(id, ?title, ?url, "update");
        self.backend
            .update(
                id,
                UpdateChanges {
                    title: title.map(str::to_string),
                    url: url.map(str::to_string),
                },
            )
            .await
    }

    pub async fn move_bookmark(
        &self,
        id: &str,
        parent_id: Option<&str>,
        index: Option<usize>,
    ) -> Result<BookmarkNode> {
        let parent_id = parent_id.unwrap_or(&self.default_group_id);
        debug!(id, parent_id, ?index, "move");
        self.backend
            .move_node(
                id,
                Destination {
                    parent_id: parent_id.to_string(),
                    index,
                },
            )
            .await
    }

    /// Removes a leaf or an empty group.
    pub async fn delete_node(&self, id: &str) -> Result<()> {
        debug!(id, "remove");
        self.backend.remove(id).await
    }

    /// Removes a group and all of its descendants.
    pub async fn delete_subtree(&self, id: &str) -> Result<()> {
        debug!(id, "remove_tree");
        self.backend.remove_tree(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BookmarkError;
    use crate::store::mem_backend::MemBackend;

    fn adapter() -> BookmarksAdapter<MemBackend> {
        BookmarksAdapter::new(MemBackend::new())
    }

    #[tokio::test]
    async fn test_create_defaults_to_default_group() {
        let adapter = adapter();
        let created = adapter
            .create_bookmark("Rust", "https://rust-lang.org/", None, None)
            .await
            .unwrap();
        assert_eq!(created.parent_id.as_deref(), Some(DEFAULT_GROUP_ID));
        let children = adapter.get_children_by_parent(None).await.unwrap();
        assert_eq!(children[0].id, created.id);
    }

    #[tokio::test]
    async fn test_configured_default_group() {
        let adapter = BookmarksAdapter::new(MemBackend::new()).with_default_group("2");
        let group = adapter.create_group("Reading", None, None).await.unwrap();
        assert_eq!(group.parent_id.as_deref(), Some("2"));
        assert!(group.is_group());
    }

    #[tokio::test]
    async fn test_move_and_update() {
        let adapter = adapter();
        let group = adapter.create_group("Work", Some("2"), None).await.unwrap();
        let bookmark = adapter
            .create_bookmark("Site", "https://a.test/", None, None)
            .await
            .unwrap();
        let moved = adapter
            .move_bookmark(&bookmark.id, Some(&group.id), Some(0))
            .await
            .unwrap();
        assert_eq!(moved.parent_id, Some(group.id.clone()));

        let updated = adapter
            .update_bookmark(&bookmark.id, Some("Site 2"), None)
            .await
            .unwrap();
        assert_eq!(updated.title, "Site 2");
        assert_eq!(updated.url.as_deref(), Some("https://a.test/"));

        let subtree = adapter.get_subtree(Some(&group.id)).await.unwrap();
        assert_eq!(subtree[0].children().len(), 1);
    }

    #[tokio::test]
    async fn test_errors_pass_through_unchanged() {
        let adapter = adapter();
        let group = adapter.create_group("Work", None, None).await.unwrap();
        adapter
            .create_bookmark("Site", "https://a.test/", Some(&group.id), None)
            .await
            .unwrap();

        let err = adapter.delete_node(&group.id).await.unwrap_err();
        assert!(matches!(err, BookmarkError::NonEmptyGroup(id) if id == group.id));

        adapter.delete_subtree(&group.id).await.unwrap();
        let err = adapter.delete_node(&group.id).await.unwrap_err();
        assert!(matches!(err, BookmarkError::NodeNotFound(_)));
    }

    #[tokio::test]
    async fn test_recently_added() {
        let adapter = adapter();
        for i in 0..3 {
            adapter
                .create_bookmark(&format!("b{}", i), &format!("https://{}.test/", i), None, None)
                .await
                .unwrap();
        }
        let recent = adapter.get_recently_added(2).await.unwrap();
        let titles: Vec<&str> = recent.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["b2", "b1"]);
    }
}
