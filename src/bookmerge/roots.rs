//! Root-group classification.
//!
//! Root groups are the structural anchors the store provides (bookmarks bar,
//! other bookmarks, mobile bookmarks, plus the super-root above them). They are
//! never created, renamed or deleted by the engine.
//!
//! Stored nodes can be classified by position alone: anything directly under
//! the super-root is a root group. [`RootMatch::Title`] additionally requires
//! the title to be one of the configured names, which reproduces the behaviour
//! of title-matching hosts but breaks as soon as the browser locale changes.
//!
//! Imported nodes carry no ids, so they are always classified by title.

use crate::model::{BookmarkNode, ImportNode, DEFAULT_ROOT_TITLES, ROOT_ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RootMatch {
    /// Any group whose parent is the super-root.
    #[default]
    Structural,
    /// A group under the super-root whose title is one of the configured names.
    Title,
}

impl std::str::FromStr for RootMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "structural" => Ok(RootMatch::Structural),
            "title" => Ok(RootMatch::Title),
            other => Err(format!("unknown root match mode '{}'", other)),
        }
    }
}

impl std::fmt::Display for RootMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RootMatch::Structural => write!(f, "structural"),
            RootMatch::Title => write!(f, "title"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootGroups {
    titles: Vec<String>,
    matching: RootMatch,
}

impl Default for RootGroups {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_TITLES.iter().map(|t| t.to_string()).collect(), RootMatch::default())
    }
}

impl RootGroups {
    pub fn new(titles: Vec<String>, matching: RootMatch) -> Self {
        Self { titles, matching }
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn matching(&self) -> RootMatch {
        self.matching
    }

    /// Whether a stored node is one of the store's root groups.
    pub fn is_root_group(&self, node: &BookmarkNode) -> bool {
        if !node.is_group() {
            return false;
        }
        if node.id == ROOT_ID {
            return true;
        }
        if node.parent_id.as_deref() != Some(ROOT_ID) {
            return false;
        }
        match self.matching {
            RootMatch::Structural => true,
            RootMatch::Title => self.titles.iter().any(|t| *t == node.title),
        }
    }

    /// Whether a top-level imported group stands for one of the root groups.
    pub fn is_import_root(&self, node: &ImportNode) -> bool {
        node.is_group() && self.matches_title(&node.title)
    }

    pub fn matches_title(&self, title: &str) -> bool {
        let title = title.trim();
        self.titles.iter().any(|t| t.eq_ignore_ascii_case(title))
    }
}
