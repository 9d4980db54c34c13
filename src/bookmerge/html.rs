//! Parser for browser-exported bookmark files (the Netscape bookmark format).
//!
//! ```text
//! <DL><p>
//!     <DT><H3>Work</H3>
//!     <DL><p>
//!         <DT><A HREF="https://example.com/">Example</A>
//!     </DL><p>
//!     <DT><A HREF="https://rust-lang.org/">Rust</A>
//! </DL><p>
//! ```
//!
//! The markup is not well-formed XML (`<DT>` and `<p>` are never closed), so it
//! goes through a real HTML5 parser and the resulting DOM is walked. Only the
//! first `<DL>` directly under the document body is read.

use crate::error::{BookmarkError, Result};
use crate::model::ImportNode;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use tracing::debug;

/// Parses an exported bookmarks document into a plain nested tree.
///
/// Fails before anything else happens if the document has no top-level list or
/// an entry has neither a group heading nor a link.
pub fn parse_bookmarks_html(contents: &str) -> Result<Vec<ImportNode>> {
    let dom = parse_document(RcDom::default(), Default::default()).one(contents);
    let list = top_level_list(&dom.document).ok_or_else(|| {
        BookmarkError::Parse("no top-level <DL> bookmark list found".to_string())
    })?;
    let tree = read_list(&list)?;
    debug!(entries = tree.len(), "parsed bookmark file");
    Ok(tree)
}

fn read_list(dl: &Handle) -> Result<Vec<ImportNode>> {
    let entries = element_children(dl);
    let mut nodes = Vec::new();
    let mut position = 0;
    for (i, dt) in entries.iter().enumerate() {
        if !is_element(dt, "dt") {
            continue;
        }
        position += 1;
        if let Some(heading) = find_descendant(dt, "h3") {
            let sub_list = find_descendant(dt, "dl")
                .or_else(|| entries.get(i + 1).and_then(following_list));
            let children = match sub_list {
                Some(sub_list) => read_list(&sub_list)?,
                None => Vec::new(),
            };
            nodes.push(ImportNode::group(text_content(&heading), children));
        } else if let Some(link) = find_descendant(dt, "a") {
            let href = attribute(&link, "href").unwrap_or_default();
            nodes.push(ImportNode::bookmark(text_content(&link), normalize_url(&href)));
        } else {
            return Err(BookmarkError::Parse(format!(
                "entry {} has neither a group title nor a link",
                position
            )));
        }
    }
    Ok(nodes)
}

/// A group's list when the parser closed the `<DT>` early: either a sibling
/// `<DL>` or one nested in a `<DD>` description (Firefox exports).
fn following_list(next: &Handle) -> Option<Handle> {
    if is_element(next, "dl") {
        Some(next.clone())
    } else if is_element(next, "dd") {
        find_descendant(next, "dl")
    } else {
        None
    }
}

/// `a.href` semantics: absolute URLs come back normalized, anything the URL
/// parser rejects is kept verbatim.
fn normalize_url(href: &str) -> String {
    let href = href.trim();
    match url::Url::parse(href) {
        Ok(parsed) => parsed.to_string(),
        Err(_) => href.to_string(),
    }
}

fn top_level_list(document: &Handle) -> Option<Handle> {
    let html = child_elements(document, "html").into_iter().next()?;
    let body = child_elements(&html, "body").into_iter().next()?;
    child_elements(&body, "dl").into_iter().next()
}

fn is_element(handle: &Handle, tag: &str) -> bool {
    match &handle.data {
        NodeData::Element { name, .. } => &*name.local == tag,
        _ => false,
    }
}

fn element_children(parent: &Handle) -> Vec<Handle> {
    parent
        .children
        .borrow()
        .iter()
        .filter(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
        .collect()
}

fn child_elements(parent: &Handle, tag: &str) -> Vec<Handle> {
    parent
        .children
        .borrow()
        .iter()
        .filter(|child| is_element(child, tag))
        .cloned()
        .collect()
}

/// First descendant with the given tag, in document order.
fn find_descendant(parent: &Handle, tag: &str) -> Option<Handle> {
    for child in parent.children.borrow().iter() {
        if is_element(child, tag) {
            return Some(child.clone());
        }
        if let Some(found) = find_descendant(child, tag) {
            return Some(found);
        }
    }
    None
}

fn attribute(handle: &Handle, name: &str) -> Option<String> {
    match &handle.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

fn text_content(handle: &Handle) -> String {
    let mut text = String::new();
    collect_text(handle, &mut text);
    text.trim().to_string()
}

fn collect_text(handle: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &handle.data {
        out.push_str(&contents.borrow());
    }
    for child in handle.children.borrow().iter() {
        collect_text(child, out);
    }
}
