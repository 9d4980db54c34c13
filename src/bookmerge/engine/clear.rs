//! Clear pipeline: delete every node except the root groups.

use super::BookmarkEngine;
use crate::error::Result;
use crate::index::flatten;
use crate::progress::{Counter, ProgressEvent, ProgressKind, ProgressObserver};
use crate::store::BookmarkBackend;
use std::collections::HashSet;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearReport {
    /// Groups removed together with their whole subtree.
    pub groups_deleted: usize,
    /// Leaves removed one by one.
    pub bookmarks_deleted: usize,
    /// Root groups left in place.
    pub roots_kept: usize,
    /// Nodes already gone with an ancestor's subtree when their turn came.
    pub already_removed: usize,
}

impl<B: BookmarkBackend> BookmarkEngine<B> {
    /// Deletes everything below the root groups, walking the list in pre-order.
    ///
    /// Every list entry counts as one unit of progress, including the ones
    /// skipped because they are root groups or were removed with an ancestor.
    pub async fn clear_bookmarks<O: ProgressObserver>(
        &mut self,
        observer: &mut O,
    ) -> Result<ClearReport> {
        self.ensure_fresh().await?;
        let list = self.list.clone();
        info!(nodes = list.len(), "clearing bookmarks");
        self.clear_progress = Counter::new(list.len());

        let mut report = ClearReport::default();
        let mut removed: HashSet<String> = HashSet::new();
        let mut outcome = Ok(());

        for node in &list {
            self.clear_progress.step();
            observer.notify(ProgressEvent::new(ProgressKind::Clear, self.clear_progress));

            if removed.contains(&node.id) {
                report.already_removed += 1;
                continue;
            }
            if self.roots.is_root_group(node) {
                report.roots_kept += 1;
                continue;
            }

            let step = if node.is_group() {
                self.adapter.delete_subtree(&node.id).await
            } else {
                self.adapter.delete_node(&node.id).await
            };
            if let Err(err) = step {
                outcome = Err(err);
                break;
            }

            if node.is_group() {
                debug!(id = %node.id, title = %node.title, "group removed");
                removed.extend(flatten(node.children()).into_iter().map(|n| n.id));
                report.groups_deleted += 1;
            } else {
                report.bookmarks_deleted += 1;
            }
        }

        let report = self.finish(outcome.map(|_| report)).await?;
        info!(?report, "clear finished");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::engine_with;
    use super::*;
    use crate::progress::NoProgress;
    use crate::store::tree::BookmarkTree;

    #[tokio::test]
    async fn test_root_group_with_one_leaf() {
        let mut tree = BookmarkTree::new();
        tree.create("1", "Site", Some("https://a.test/"), None).unwrap();
        let mut engine = engine_with(tree).await;

        let mut events = Vec::new();
        let report = engine
            .clear_bookmarks(&mut |event: ProgressEvent| events.push(event))
            .await
            .unwrap();

        assert_eq!(report.bookmarks_deleted, 1);
        assert_eq!(report.roots_kept, 4);
        assert_eq!(engine.bookmark_count(), 0);
        assert_eq!(engine.list().len(), 4);
        // super-root, bar, Site, other, mobile
        assert_eq!(events.len(), 5);
        assert_eq!(events.last().unwrap().ratio(), 1.0);
        // counters reset by the reload
        assert!(engine.clear_ratio().is_nan());
    }

    #[tokio::test]
    async fn test_group_subtree_removed_once() {
        let mut tree = BookmarkTree::new();
        let work = tree.create("2", "Work", None, None).unwrap();
        let inner = tree.create(&work.id, "Inner", None, None).unwrap();
        tree.create(&inner.id, "deep", Some("https://deep.test/"), None).unwrap();
        tree.create(&work.id, "shallow", Some("https://shallow.test/"), None).unwrap();
        let mut engine = engine_with(tree).await;

        let report = engine.clear_bookmarks(&mut NoProgress).await.unwrap();
        assert_eq!(report.groups_deleted, 1);
        assert_eq!(report.bookmarks_deleted, 0);
        assert_eq!(report.already_removed, 3);
        assert_eq!(engine.adapter().backend().mutation_count(), 1);
        assert_eq!(engine.group_count(), 4);
    }

    #[tokio::test]
    async fn test_empty_store_only_visits_roots() {
        let mut engine = engine_with(BookmarkTree::new()).await;
        let report = engine.clear_bookmarks(&mut NoProgress).await.unwrap();
        assert_eq!(report, ClearReport { roots_kept: 4, ..Default::default() });
        assert_eq!(engine.adapter().backend().mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_keeps_earlier_deletions() {
        let mut tree = BookmarkTree::new();
        tree.create("1", "a", Some("https://a.test/"), None).unwrap();
        tree.create("1", "b", Some("https://b.test/"), None).unwrap();
        let mut engine = engine_with(tree).await;
        engine.adapter().backend().fail_mutations_after(Some(1));

        let err = engine.clear_bookmarks(&mut NoProgress).await.unwrap_err();
        assert!(err.is_store_error());
        assert!(engine.is_stale());

        engine.adapter().backend().fail_mutations_after(None);
        engine.init().await.unwrap();
        assert_eq!(engine.bookmark_count(), 1);
        assert_eq!(engine.list().iter().find(|n| n.url.is_some()).unwrap().title, "b");
    }
}
