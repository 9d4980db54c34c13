use bookmerge::error::{BookmarkError, Result};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.2" for releases, "0.3.2@abc1234 2024-01-15 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "bookmerge", bin_name = "bookmerge", version = get_version())]
#[command(about = "Import, clear and deduplicate bookmark collections", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory holding bookmarks.json, config.json and backup.json
    /// [env: BOOKMERGE_HOME]
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// Verbose output (debug logs on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show bookmark, group and duplicate counts (default)
    Stats,

    /// Print the bookmark tree, or the subtree of one group
    Tree { id: Option<String> },

    /// List the direct children of a group (default group when omitted)
    Ls { parent: Option<String> },

    /// List the most recently added bookmarks
    Recent {
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
    },

    /// Add a bookmark
    Add {
        title: String,
        url: String,
        /// Parent group id (default group when omitted)
        #[arg(short, long)]
        parent: Option<String>,
        /// Position inside the parent (appends when omitted)
        #[arg(short, long)]
        index: Option<usize>,
    },

    /// Create an empty group
    Mkdir {
        title: String,
        #[arg(short, long)]
        parent: Option<String>,
        #[arg(short, long)]
        index: Option<usize>,
    },

    /// Change the title and/or URL of a node
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        url: Option<String>,
    },

    /// Move a node into a group
    Mv {
        id: String,
        parent: String,
        #[arg(short, long)]
        index: Option<usize>,
    },

    /// Remove a bookmark or an empty group
    Rm {
        id: String,
        /// Remove a group with everything in it
        #[arg(short, long)]
        recursive: bool,
    },

    /// List URLs bookmarked more than once
    Dupes,

    /// Merge an exported bookmarks file (Netscape HTML format) into the store
    Import { file: PathBuf },

    /// Delete everything except the root groups
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete repeated bookmarks (same URL and title), keeping the first copy
    Dedup {
        /// Only list what would be deleted
        #[arg(long)]
        dry_run: bool,
    },

    /// Show or change configuration
    Config {
        key: Option<String>,
        value: Option<String>,
    },
}

/// Installs the stderr log subscriber.
///
/// `BOOKMERGE_LOG` takes an `EnvFilter` directive and wins over `--verbose`.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose { "bookmerge=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("BOOKMERGE_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// `--data-dir`, then `BOOKMERGE_HOME`, then the platform data directory.
pub fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    if let Some(dir) = std::env::var_os("BOOKMERGE_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("", "", "bookmerge")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| BookmarkError::Config("could not determine a data directory".to_string()))
}
