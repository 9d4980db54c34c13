//! Dedup pipeline: delete repeated bookmarks.
//!
//! Two leaves are repeats when both URL and title are equal. Within each such
//! set the copy that comes first in the list survives; a same-URL bookmark with
//! a different title is never touched.

use super::BookmarkEngine;
use crate::error::Result;
use crate::progress::{Counter, ProgressEvent, ProgressKind, ProgressObserver};
use crate::store::BookmarkBackend;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupReport {
    /// Ids removed, in deletion order.
    pub deleted: Vec<String>,
}

impl DedupReport {
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }
}

impl<B: BookmarkBackend> BookmarkEngine<B> {
    /// Ids the dedup pipeline would delete against the current model.
    pub fn plan_dedup(&self) -> Vec<String> {
        let mut queue = Vec::new();
        for bucket in self.duplicates.duplicated() {
            let mut by_title: Vec<(&str, Vec<&str>)> = Vec::new();
            for bookmark in &bucket.bookmarks {
                let (title, id) = (bookmark.title.as_str(), bookmark.id.as_str());
                match by_title.iter_mut().find(|(seen, _)| *seen == title) {
                    Some((_, ids)) => ids.push(id),
                    None => by_title.push((title, vec![id])),
                }
            }
            for (_, ids) in by_title {
                queue.extend(ids.into_iter().skip(1).map(str::to_string));
            }
        }
        queue
    }

    /// Deletes every repeat found by [`plan_dedup`](Self::plan_dedup), one at a
    /// time and in plan order.
    pub async fn delete_repeat_bookmarks<O: ProgressObserver>(
        &mut self,
        observer: &mut O,
    ) -> Result<DedupReport> {
        self.ensure_fresh().await?;
        let queue = self.plan_dedup();
        info!(marked = queue.len(), "deleting repeated bookmarks");
        self.dedup_progress = Counter::new(queue.len());

        let mut report = DedupReport::default();
        let mut outcome = Ok(());
        for id in queue {
            self.dedup_progress.step();
            observer.notify(ProgressEvent::new(ProgressKind::Dedup, self.dedup_progress));
            if let Err(err) = self.adapter.delete_node(&id).await {
                outcome = Err(err);
                break;
            }
            report.deleted.push(id);
        }

        let report = self.finish(outcome.map(|_| report)).await?;
        info!(deleted = report.deleted_count(), "dedup finished");
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
    async fn test_keeps_first_of_each_title() {
        let mut tree = BookmarkTree::new();
        let first = tree.create("1", "A", Some("https://u2.test/"), None).unwrap();
        let second = tree.create("1", "A", Some("https://u2.test/"), None).unwrap();
        let other = tree.create("2", "B", Some("https://u2.test/"), None).unwrap();
        let mut engine = engine_with(tree).await;

        assert_eq!(engine.plan_dedup(), vec![second.id.clone()]);

        let mut events = Vec::new();
        let report = engine
            .delete_repeat_bookmarks(&mut |event: ProgressEvent| events.push(event))
            .await
            .unwrap();
        assert_eq!(report.deleted, vec![second.id]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, ProgressKind::Dedup);
        assert_eq!(engine.adapter().backend().mutation_count(), 1);

        let left: Vec<&str> = engine
            .list()
            .iter()
            .filter(|n| n.is_bookmark())
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(left, vec![first.id.as_str(), other.id.as_str()]);
    }

    #[tokio::test]
    async fn test_first_in_preorder_survives_across_groups() {
        let mut tree = BookmarkTree::new();
        let work = tree.create("1", "Work", None, None).unwrap();
        let nested = tree.create(&work.id, "Rust", Some("https://rust.test/"), None).unwrap();
        tree.create("1", "Rust", Some("https://rust.test/"), None).unwrap();
        tree.create("3", "Rust", Some("https://rust.test/"), None).unwrap();
        let mut engine = engine_with(tree).await;

        let report = engine.delete_repeat_bookmarks(&mut NoProgress).await.unwrap();
        assert_eq!(report.deleted_count(), 2);
        let survivors: Vec<&str> = engine
            .list()
            .iter()
            .filter(|n| n.is_bookmark())
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(survivors, vec![nested.id.as_str()]);
    }

    #[tokio::test]
    async fn test_second_run_deletes_nothing() {
        let mut tree = BookmarkTree::new();
        for _ in 0..3 {
            tree.create("1", "x", Some("https://x.test/"), None).unwrap();
            tree.create("2", "y", Some("https://y.test/"), None).unwrap();
        }
        let mut engine = engine_with(tree).await;

        let first = engine.delete_repeat_bookmarks(&mut NoProgress).await.unwrap();
        assert_eq!(first.deleted_count(), 4);
        assert!(engine.plan_dedup().is_empty());

        let second = engine.delete_repeat_bookmarks(&mut NoProgress).await.unwrap();
        assert!(second.deleted.is_empty());
        assert_eq!(engine.duplicate_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_marks_stale() {
        let mut tree = BookmarkTree::new();
        for _ in 0..3 {
            tree.create("1", "x", Some("https://x.test/"), None).unwrap();
        }
        let mut engine = engine_with(tree).await;
        engine.adapter().backend().fail_mutations_after(Some(1));

        let err = engine.delete_repeat_bookmarks(&mut NoProgress).await.unwrap_err();
        assert!(err.is_store_error());
        assert!(engine.is_stale());

        engine.adapter().backend().fail_mutations_after(None);
        let report = engine.delete_repeat_bookmarks(&mut NoProgress).await.unwrap();
        assert_eq!(report.deleted_count(), 1);
        assert_eq!(engine.bookmark_count(), 1);
    }
}
