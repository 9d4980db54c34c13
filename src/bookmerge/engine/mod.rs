//! # Bookmark Engine
//!
//! Owns the in-memory model of the store (tree, flattened list, duplicate
//! index, counts) and runs the bulk pipelines against it:
//!
//! - [`import`](BookmarkEngine::import_bookmarks): merge an exported bookmark
//!   file into the store without duplicating groups,
//! - [`clear`](BookmarkEngine::clear_bookmarks): delete everything except the
//!   root groups,
//! - [`dedup`](BookmarkEngine::delete_repeat_bookmarks): delete repeated
//!   bookmarks, keeping the first copy of every (URL, title) pair.
//!
//! ## Model lifecycle
//!
//! The model is a full snapshot, rebuilt from scratch by [`init`](BookmarkEngine::init)
//! after construction and as the last step of every successful pipeline. There
//! are no incremental updates.
//!
//! If a pipeline fails half-way, the steps already issued stay committed in the
//! store and the model is flagged stale; the next pipeline refreshes it before
//! doing anything else.
//!
//! Pipelines take `&mut self`, so a second pipeline can't start on the same
//! engine while one is in flight. For the same reason progress is reported
//! through the observer passed to each pipeline, every event carrying its own
//! ratio.

use crate::error::Result;
use crate::index::{flatten, DuplicateIndex};
use crate::model::{BookmarkNode, ROOT_ID};
use crate::progress::Counter;
use crate::roots::RootGroups;
use crate::store::adapter::BookmarksAdapter;
use crate::store::BookmarkBackend;
use tracing::{debug, warn};

pub mod clear;
pub mod dedup;
pub mod import;

pub use clear::ClearReport;
pub use dedup::DedupReport;
pub use import::ImportReport;

pub struct BookmarkEngine<B: BookmarkBackend> {
    adapter: BookmarksAdapter<B>,
    roots: RootGroups,

    tree: Vec<BookmarkNode>,
    list: Vec<BookmarkNode>,
    duplicates: DuplicateIndex,

    bookmark_count: usize,
    group_count: usize,
    duplicate_count: usize,

    import_progress: Counter,
    clear_progress: Counter,
    dedup_progress: Counter,

    stale: bool,
}

impl<B: BookmarkBackend> BookmarkEngine<B> {
    /// Builds an engine and loads the initial model from the store.
    pub async fn new(adapter: BookmarksAdapter<B>, roots: RootGroups) -> Result<Self> {
        let mut engine = Self {
            adapter,
            roots,
            tree: Vec::new(),
            list: Vec::new(),
            duplicates: DuplicateIndex::default(),
            bookmark_count: 0,
            group_count: 0,
            duplicate_count: 0,
            import_progress: Counter::default(),
            clear_progress: Counter::default(),
            dedup_progress: Counter::default(),
            stale: true,
        };
        engine.init().await?;
        Ok(engine)
    }

    /// Rebuilds the whole model from the store and resets pipeline state.
    pub async fn init(&mut self) -> Result<()> {
        let tree = self.adapter.get_tree().await?;
        let list = flatten(&tree);
        let duplicates = DuplicateIndex::from_list(&list);

        self.bookmark_count = list.iter().filter(|n| !n.is_group()).count();
        self.group_count = list.len() - self.bookmark_count;
        self.duplicate_count = duplicates.duplicate_count();

        self.tree = tree;
        self.list = list;
        self.duplicates = duplicates;

        self.import_progress = Counter::default();
        self.clear_progress = Counter::default();
        self.dedup_progress = Counter::default();
        self.stale = false;

        debug!(
            bookmarks = self.bookmark_count,
            groups = self.group_count,
            duplicates = self.duplicate_count,
            "model loaded"
        );
        Ok(())
    }

    pub fn tree(&self) -> &[BookmarkNode] {
        &self.tree
    }

    /// Every node in depth-first pre-order.
    pub fn list(&self) -> &[BookmarkNode] {
        &self.list
    }

    pub fn duplicates(&self) -> &DuplicateIndex {
        &self.duplicates
    }

    /// Number of leaf bookmarks.
    pub fn bookmark_count(&self) -> usize {
        self.bookmark_count
    }

    /// Number of groups, root groups and the super-root included.
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    /// Bookmarks beyond the first for every URL.
    pub fn duplicate_count(&self) -> usize {
        self.duplicate_count
    }

    // Live progress travels on `ProgressEvent::ratio()`. These getters only
    // hold a value between a failed pipeline and the next reload; a finished
    // pipeline resets them through `init`.

    /// Import progress left by an aborted import, NaN otherwise.
    pub fn import_ratio(&self) -> f64 {
        self.import_progress.ratio()
    }

    /// Clear progress left by an aborted clear, NaN otherwise.
    pub fn clear_ratio(&self) -> f64 {
        self.clear_progress.ratio()
    }

    /// Dedup progress left by an aborted dedup, NaN otherwise.
    pub fn dedup_ratio(&self) -> f64 {
        self.dedup_progress.ratio()
    }

    /// True after a failed pipeline, until the model is reloaded.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn adapter(&self) -> &BookmarksAdapter<B> {
        &self.adapter
    }

    pub fn roots(&self) -> &RootGroups {
        &self.roots
    }

    pub fn is_group(&self, node: &BookmarkNode) -> bool {
        node.is_group()
    }

    pub fn is_root_group(&self, node: &BookmarkNode) -> bool {
        self.roots.is_root_group(node)
    }

    /// Reloads the model if a previous pipeline left it out of date.
    async fn ensure_fresh(&mut self) -> Result<()> {
        if self.stale {
            warn!("model is stale after a failed operation, reloading");
            self.init().await?;
        }
        Ok(())
    }

    /// Terminal step of every pipeline: reload on success, flag stale on failure.
    async fn finish<T>(&mut self, outcome: Result<T>) -> Result<T> {
        match outcome {
            Ok(report) => {
                self.init().await?;
                Ok(report)
            }
            Err(err) => {
                warn!(error = %err, "operation aborted, store may be partially updated");
                self.stale = true;
                Err(err)
            }
        }
    }

    /// First non-root group in the snapshot with exactly this title.
    fn find_group_by_title(&self, title: &str) -> Option<&BookmarkNode> {
        self.list
            .iter()
            .find(|n| n.is_group() && !self.roots.is_root_group(n) && n.title == title)
    }

    /// First leaf in the snapshot with exactly this URL.
    fn find_bookmark_by_url(&self, url: &str) -> Option<&BookmarkNode> {
        self.list
            .iter()
            .find(|n| !n.is_group() && n.url.as_deref() == Some(url))
    }

    /// Existing root group whose title matches, ignoring ASCII case.
    fn find_root_group_by_title(&self, title: &str) -> Option<&BookmarkNode> {
        let title = title.trim();
        self.list.iter().find(|n| {
            n.id != ROOT_ID
                && self.roots.is_root_group(n)
                && n.title.eq_ignore_ascii_case(title)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;
    use crate::store::tree::BookmarkTree;

    pub(crate) async fn engine_with(tree: BookmarkTree) -> BookmarkEngine<MemBackend> {
        BookmarkEngine::new(
            BookmarksAdapter::new(MemBackend::with_tree(tree)),
            RootGroups::default(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_init_counts() {
        let mut tree = BookmarkTree::new();
        let work = tree.create("1", "Work", None, None).unwrap();
        tree.create(&work.id, "a", Some("https://a.test/"), None).unwrap();
        tree.create(&work.id, "a again", Some("https://a.test/"), None).unwrap();
        tree.create("2", "b", Some("https://b.test/"), None).unwrap();

        let engine = engine_with(tree).await;
        assert_eq!(engine.bookmark_count(), 3);
        // super-root, three roots, Work
        assert_eq!(engine.group_count(), 5);
        assert_eq!(engine.duplicate_count(), 1);
        assert_eq!(engine.list().len(), 8);
        assert_eq!(engine.duplicates().buckets()[0].url, "https://a.test/");
        assert!(!engine.is_stale());
    }

    #[tokio::test]
    async fn test_ratios_are_nan_when_idle() {
        let engine = engine_with(BookmarkTree::new()).await;
        assert!(engine.import_ratio().is_nan());
        assert!(engine.clear_ratio().is_nan());
        assert!(engine.dedup_ratio().is_nan());
    }

    #[tokio::test]
    async fn test_classification() {
        let mut tree = BookmarkTree::new();
        tree.create("1", "Work", None, None).unwrap();
        let engine = engine_with(tree).await;
        let roots: Vec<&str> = engine
            .list()
            .iter()
            .filter(|n| engine.is_root_group(n))
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(roots, vec!["0", "1", "2", "3"]);
        let work = engine.list().iter().find(|n| n.title == "Work").unwrap();
        assert!(engine.is_group(work));
        assert!(!engine.is_root_group(work));
    }

    #[tokio::test]
    async fn test_lookups_skip_super_root_and_leaves() {
        let mut tree = BookmarkTree::new();
        tree.create("1", "Work", Some("https://work.test/"), None).unwrap();
        let engine = engine_with(tree).await;
        assert!(engine.find_group_by_title("").is_none());
        assert!(engine.find_group_by_title("Work").is_none());
        assert!(engine.find_group_by_title("Other Bookmarks").is_none());
        assert!(engine.find_bookmark_by_url("https://work.test/").is_some());
        assert_eq!(engine.find_root_group_by_title("other bookmarks").unwrap().id, "2");
    }
}
