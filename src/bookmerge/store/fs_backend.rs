use super::tree::BookmarkTree;
use super::{BookmarkBackend, CreateDetails, Destination, UpdateChanges};
use crate::error::Result;
use crate::model::{BookmarkNode, DEFAULT_ROOT_TITLES};
use std::path::{Path, PathBuf};
use tokio::fs;

/// JSON-file bookmark host.
///
/// The whole tree lives in one file. Reads load it, mutations load, apply and
/// write it back through a temp file + rename so a crash never leaves a
/// half-written store. A missing file reads as a fresh tree with the root groups.
pub struct FsBackend {
    path: PathBuf,
    root_titles: Vec<String>,
}

impl FsBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            root_titles: DEFAULT_ROOT_TITLES.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Titles for the root groups of a store that doesn't exist yet.
    pub fn with_root_titles(mut self, titles: Vec<String>) -> Self {
        self.root_titles = titles;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BookmarkTree> {
        if !fs::try_exists(&self.path).await? {
            return Ok(BookmarkTree::with_root_titles(&self.root_titles));
        }
        let content = fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    async fn save(&self, tree: &BookmarkTree) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).await?;
            }
        }
        let content = serde_json::to_string_pretty(tree)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn mutate<T>(&self, op: impl FnOnce(&mut BookmarkTree) -> Result<T>) -> Result<T> {
        let mut tree = self.load().await?;
        let value = op(&mut tree)?;
        self.save(&tree).await?;
        Ok(value)
    }
}

impl BookmarkBackend for FsBackend {
    async fn get_tree(&self) -> Result<Vec<BookmarkNode>> {
        self.load().await?.tree()
    }

    async fn get_children(&self, parent_id: &str) -> Result<Vec<BookmarkNode>> {
        self.load().await?.children(parent_id)
    }

    async fn get_subtree(&self, id: &str) -> Result<Vec<BookmarkNode>> {
        self.load().await?.subtree(id)
    }

    async fn get_recent(&self, count: usize) -> Result<Vec<BookmarkNode>> {
        self.load().await?.recent(count)
    }

    async fn create(&self, details: CreateDetails) -> Result<BookmarkNode> {
        self.mutate(|tree| {
            tree.create(
                &details.parent_id,
                &details.title,
                details.url.as_deref(),
                details.index,
            )
        })
        .await
    }

    async fn update(&self, id: &str, changes: UpdateChanges) -> Result<BookmarkNode> {
        self.mutate(|tree| tree.update(id, changes.title.as_deref(), changes.url.as_deref()))
            .await
    }

    async fn move_node(&self, id: &str, destination: Destination) -> Result<BookmarkNode> {
        self.mutate(|tree| tree.move_node(id, &destination.parent_id, destination.index))
            .await
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.mutate(|tree| tree.remove(id)).await
    }

    async fn remove_tree(&self, id: &str) -> Result<()> {
        self.mutate(|tree| tree.remove_tree(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BookmarkError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_reads_as_fresh_tree() {
        let temp = TempDir::new().unwrap();
        let backend = FsBackend::new(temp.path().join("bookmarks.json"));
        let tree = backend.get_tree().await.unwrap();
        assert_eq!(tree[0].children().len(), 3);
        assert!(!backend.path().exists());
    }

    #[tokio::test]
    async fn test_mutations_persist() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("bookmarks.json");
        let backend = FsBackend::new(&path);
        let created = backend
            .create(CreateDetails {
                parent_id: "2".to_string(),
                title: "Rust".to_string(),
                url: Some("https://rust-lang.org/".to_string()),
                index: None,
            })
            .await
            .unwrap();
        assert!(path.exists());

        let reopened = FsBackend::new(&path);
        let children = reopened.get_children("2").await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, created.id);
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_file_untouched() {
        let temp = TempDir::new().unwrap();
        let backend = FsBackend::new(temp.path().join("bookmarks.json"));
        let err = backend.remove("1").await.unwrap_err();
        assert!(matches!(err, BookmarkError::RootGroup(_)));
        assert!(!backend.path().exists());
    }

    #[tokio::test]
    async fn test_custom_root_titles() {
        let temp = TempDir::new().unwrap();
        let backend = FsBackend::new(temp.path().join("bookmarks.json"))
            .with_root_titles(vec!["书签栏".to_string(), "其他书签".to_string()]);
        let tree = backend.get_tree().await.unwrap();
        let titles: Vec<&str> = tree[0].children().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["书签栏", "其他书签"]);
    }
}
