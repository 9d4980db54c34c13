use bookmerge::config::{BookmergeConfig, CONFIG_KEYS};
use bookmerge::index::DuplicateIndex;
use bookmerge::model::{BookmarkNode, ROOT_ID};
use bookmerge::progress::{ProgressEvent, ProgressObserver};
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::io::{IsTerminal, Write};
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const ID_WIDTH: usize = 6;
const TIME_WIDTH: usize = 14;
const BAR_WIDTH: usize = 30;
const GROUP_MARKER: &str = "▸";

pub(super) fn print_success(message: &str) {
    println!("{}", message.green());
}

pub(super) fn print_info(message: &str) {
    println!("{}", message.dimmed());
}

pub(super) fn print_stats(bookmarks: usize, groups: usize, duplicates: usize, store: &str) {
    println!("{:<12}{}", "Bookmarks", bookmarks.to_string().bold());
    println!("{:<12}{}", "Groups", groups.to_string().bold());
    let duplicates = if duplicates > 0 {
        duplicates.to_string().yellow()
    } else {
        duplicates.to_string().normal()
    };
    println!("{:<12}{}", "Duplicates", duplicates);
    println!("{:<12}{}", "Store", store.dimmed());
}

/// Prints nodes as an indented tree. The unnamed super-root is skipped and its
/// children printed at the top level.
pub(super) fn print_tree(nodes: &[BookmarkNode]) {
    for node in nodes {
        if node.id == ROOT_ID {
            print_tree_level(node.children(), 0);
        } else {
            print_tree_level(std::slice::from_ref(node), 0);
        }
    }
}

fn print_tree_level(nodes: &[BookmarkNode], depth: usize) {
    let indent = "  ".repeat(depth);
    for node in nodes {
        let id = format!("[{}]", node.id).dimmed();
        if node.is_group() {
            println!("{}{} {} {}", indent, GROUP_MARKER, node.title.bold(), id);
            print_tree_level(node.children(), depth + 1);
        } else {
            println!("{}  {} {} {}", indent, node.title, node.url_str().cyan(), id);
        }
    }
}

/// One line per node: id, title (plus URL), age.
pub(super) fn print_nodes(nodes: &[BookmarkNode]) {
    if nodes.is_empty() {
        println!("No bookmarks found.");
        return;
    }

    for node in nodes {
        let id = format!("{:>width$} ", node.id, width = ID_WIDTH - 1);
        let text = if node.is_group() {
            format!("{} {}", GROUP_MARKER, node.title)
        } else {
            format!("{} {}", node.title, node.url_str())
        };
        let available = LINE_WIDTH.saturating_sub(ID_WIDTH + TIME_WIDTH + 1);
        let text = truncate_to_width(&text, available);
        let padding = available.saturating_sub(text.width());

        let age = DateTime::from_timestamp_millis(node.date_added)
            .map(format_time_ago)
            .unwrap_or_default();

        let text = if node.is_group() {
            text.bold()
        } else {
            text.normal()
        };
        println!(
            "{}{}{} {}",
            id.yellow(),
            text,
            " ".repeat(padding),
            age.dimmed()
        );
    }
}

pub(super) fn print_duplicates(index: &DuplicateIndex) {
    let mut any = false;
    for bucket in index.duplicated() {
        any = true;
        println!("{} {}", format!("{}x", bucket.len()).yellow(), bucket.url.cyan());
        for bookmark in &bucket.bookmarks {
            println!("    {} {}", format!("[{}]", bookmark.id).dimmed(), bookmark.title);
        }
    }
    if !any {
        println!("No duplicates found.");
    }
}

pub(super) fn print_config(config: &BookmergeConfig) {
    for key in CONFIG_KEYS {
        if let Some(value) = config.get(key) {
            println!("{} = {}", key, value);
        }
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

/// Renders progress events as a bar on stderr.
///
/// On a terminal the bar is redrawn in place; otherwise only the final line is
/// written so logs stay readable.
pub(super) struct ProgressBar {
    label: &'static str,
    interactive: bool,
}

impl ProgressBar {
    pub(super) fn new(label: &'static str) -> Self {
        Self {
            label,
            interactive: std::io::stderr().is_terminal(),
        }
    }
}

impl ProgressObserver for ProgressBar {
    fn notify(&mut self, event: ProgressEvent) {
        let done = event.processed >= event.total;
        if !self.interactive && !done {
            return;
        }
        let filled = ((event.ratio() * BAR_WIDTH as f64) as usize).min(BAR_WIDTH);
        let bar = format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled));
        let mut stderr = std::io::stderr();
        let _ = write!(
            stderr,
            "\r{:<8} [{}] {}/{}",
            self.label,
            bar,
            event.processed,
            event.total
        );
        if done {
            let _ = writeln!(stderr);
        }
        let _ = stderr.flush();
    }
}
