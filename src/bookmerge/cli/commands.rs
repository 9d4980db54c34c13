//! # CLI Layer
//!
//! The only place that knows about stdout, stderr, prompts and exit codes. It
//! parses arguments, builds the engine over the file store in the data
//! directory, dispatches, and renders results.
//!
//! Destructive commands take the backup and ask for confirmation here; the
//! engine itself never does either.

use super::print::{
    print_config, print_duplicates, print_info, print_nodes, print_stats, print_success,
    print_tree, ProgressBar,
};
use super::setup::{init_logging, resolve_data_dir, Cli, Commands};
use bookmerge::backup::write_backup;
use bookmerge::config::{BookmergeConfig, BACKUP_FILENAME, STORE_FILENAME};
use bookmerge::engine::BookmarkEngine;
use bookmerge::error::{BookmarkError, Result};
use bookmerge::store::adapter::BookmarksAdapter;
use bookmerge::store::fs_backend::FsBackend;
use clap::Parser;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

struct AppContext {
    engine: BookmarkEngine<FsBackend>,
    config: BookmergeConfig,
    data_dir: PathBuf,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let data_dir = resolve_data_dir(cli.data_dir)?;

    // config never needs the store
    if let Some(Commands::Config { key, value }) = cli.command {
        return handle_config(&data_dir, key, value);
    }

    let mut ctx = init_context(data_dir).await?;

    match cli.command.unwrap_or(Commands::Stats) {
        Commands::Stats => handle_stats(&ctx),
        Commands::Tree { id } => handle_tree(&ctx, id).await,
        Commands::Ls { parent } => handle_ls(&ctx, parent).await,
        Commands::Recent { count } => handle_recent(&ctx, count).await,
        Commands::Add {
            title,
            url,
            parent,
            index,
        } => handle_add(&ctx, title, url, parent, index).await,
        Commands::Mkdir {
            title,
            parent,
            index,
        } => handle_mkdir(&ctx, title, parent, index).await,
        Commands::Edit { id, title, url } => handle_edit(&ctx, id, title, url).await,
        Commands::Mv { id, parent, index } => handle_move(&ctx, id, parent, index).await,
        Commands::Rm { id, recursive } => handle_remove(&ctx, id, recursive).await,
        Commands::Dupes => handle_dupes(&ctx),
        Commands::Import { file } => handle_import(&mut ctx, file).await,
        Commands::Clear { yes } => handle_clear(&mut ctx, yes).await,
        Commands::Dedup { dry_run } => handle_dedup(&mut ctx, dry_run).await,
        Commands::Config { key, value } => handle_config(&ctx.data_dir, key, value),
    }
}

async fn init_context(data_dir: PathBuf) -> Result<AppContext> {
    let config = BookmergeConfig::load(&data_dir)?;
    let backend =
        FsBackend::new(data_dir.join(STORE_FILENAME)).with_root_titles(config.root_titles.clone());
    let adapter =
        BookmarksAdapter::new(backend).with_default_group(config.default_group_id.clone());
    let engine = BookmarkEngine::new(adapter, config.root_groups()).await?;

    Ok(AppContext {
        engine,
        config,
        data_dir,
    })
}

fn handle_stats(ctx: &AppContext) -> Result<()> {
    let engine = &ctx.engine;
    print_stats(
        engine.bookmark_count(),
        engine.group_count(),
        engine.duplicate_count(),
        &engine.adapter().backend().path().display().to_string(),
    );
    Ok(())
}

async fn handle_tree(ctx: &AppContext, id: Option<String>) -> Result<()> {
    match id {
        Some(id) => {
            let subtree = ctx.engine.adapter().get_subtree(Some(&id)).await?;
            print_tree(&subtree);
        }
        None => print_tree(ctx.engine.tree()),
    }
    Ok(())
}

async fn handle_ls(ctx: &AppContext, parent: Option<String>) -> Result<()> {
    let children = ctx
        .engine
        .adapter()
        .get_children_by_parent(parent.as_deref())
        .await?;
    print_nodes(&children);
    Ok(())
}

async fn handle_recent(ctx: &AppContext, count: usize) -> Result<()> {
    let recent = ctx.engine.adapter().get_recently_added(count).await?;
    print_nodes(&recent);
    Ok(())
}

async fn handle_add(
    ctx: &AppContext,
    title: String,
    url: String,
    parent: Option<String>,
    index: Option<usize>,
) -> Result<()> {
    let created = ctx
        .engine
        .adapter()
        .create_bookmark(&title, &url, parent.as_deref(), index)
        .await?;
    print_success(&format!("Added bookmark {} ({})", created.id, created.title));
    Ok(())
}

async fn handle_mkdir(
    ctx: &AppContext,
    title: String,
    parent: Option<String>,
    index: Option<usize>,
) -> Result<()> {
    let created = ctx
        .engine
        .adapter()
        .create_group(&title, parent.as_deref(), index)
        .await?;
    print_success(&format!("Created group {} ({})", created.id, created.title));
    Ok(())
}

async fn handle_edit(
    ctx: &AppContext,
    id: String,
    title: Option<String>,
    url: Option<String>,
) -> Result<()> {
    if title.is_none() && url.is_none() {
        print_info("Nothing to change, pass --title and/or --url.");
        return Ok(());
    }
    let updated = ctx
        .engine
        .adapter()
        .update_bookmark(&id, title.as_deref(), url.as_deref())
        .await?;
    print_success(&format!("Updated {} ({})", updated.id, updated.title));
    Ok(())
}

async fn handle_move(
    ctx: &AppContext,
    id: String,
    parent: String,
    index: Option<usize>,
) -> Result<()> {
    let moved = ctx
        .engine
        .adapter()
        .move_bookmark(&id, Some(&parent), index)
        .await?;
    print_success(&format!(
        "Moved {} to group {} at position {}",
        moved.id, parent, moved.index
    ));
    Ok(())
}

async fn handle_remove(ctx: &AppContext, id: String, recursive: bool) -> Result<()> {
    let adapter = ctx.engine.adapter();
    if recursive {
        adapter.delete_subtree(&id).await?;
    } else {
        adapter.delete_node(&id).await?;
    }
    print_success(&format!("Removed {}", id));
    Ok(())
}

fn handle_dupes(ctx: &AppContext) -> Result<()> {
    print_duplicates(ctx.engine.duplicates());
    Ok(())
}

async fn handle_import(ctx: &mut AppContext, file: PathBuf) -> Result<()> {
    let contents = tokio::fs::read_to_string(&file).await?;
    let report = ctx
        .engine
        .import_bookmarks(&contents, &mut ProgressBar::new("import"))
        .await?;
    print_success(&format!(
        "Imported {}: {} bookmarks added, {} placed next to an existing copy, \
         {} groups created, {} merged.",
        file.display(),
        report.bookmarks_created,
        report.bookmarks_placed_with_duplicate,
        report.groups_created,
        report.groups_merged
    ));
    Ok(())
}

async fn handle_clear(ctx: &mut AppContext, yes: bool) -> Result<()> {
    let bookmarks = ctx.engine.bookmark_count();
    if !yes {
        println!(
            "This will permanently delete {} bookmarks and every group below the root groups.",
            bookmarks
        );
    }
    if !yes && !confirm("[Y] To delete:")? {
        print_info("Operation cancelled.");
        return Ok(());
    }

    if ctx.config.backup_before_clear {
        let path = backup_path(&ctx.data_dir);
        let backup = write_backup(&path, ctx.engine.list())?;
        print_info(&format!(
            "Backed up {} nodes to {}",
            backup.nodes.len(),
            path.display()
        ));
    }

    let report = ctx
        .engine
        .clear_bookmarks(&mut ProgressBar::new("clear"))
        .await?;
    print_success(&format!(
        "Cleared {} bookmarks and {} groups.",
        report.bookmarks_deleted, report.groups_deleted
    ));
    Ok(())
}

async fn handle_dedup(ctx: &mut AppContext, dry_run: bool) -> Result<()> {
    if dry_run {
        let planned = ctx.engine.plan_dedup();
        let nodes: Vec<_> = ctx
            .engine
            .list()
            .iter()
            .filter(|n| planned.contains(&n.id))
            .cloned()
            .collect();
        if nodes.is_empty() {
            print_info("No repeated bookmarks.");
        } else {
            print_nodes(&nodes);
            print_info(&format!("{} bookmarks would be deleted.", nodes.len()));
        }
        return Ok(());
    }

    let report = ctx
        .engine
        .delete_repeat_bookmarks(&mut ProgressBar::new("dedup"))
        .await?;
    print_success(&format!(
        "Deleted {} repeated bookmarks.",
        report.deleted_count()
    ));
    Ok(())
}

fn handle_config(data_dir: &Path, key: Option<String>, value: Option<String>) -> Result<()> {
    let mut config = BookmergeConfig::load(data_dir)?;
    match (key, value) {
        (None, _) => print_config(&config),
        (Some(key), None) => match config.get(&key) {
            Some(value) => println!("{}", value),
            None => return Err(BookmarkError::Config(format!("Unknown config key: {}", key))),
        },
        (Some(key), Some(value)) => {
            config.set(&key, &value)?;
            config.save(data_dir)?;
            let shown = config.get(&key).unwrap_or(value);
            print_success(&format!("{} set to {}", key, shown));
        }
    }
    Ok(())
}

fn backup_path(data_dir: &Path) -> PathBuf {
    data_dir.join(BACKUP_FILENAME)
}

/// Asks on stdout, reads one line from stdin. Only an exact "Y" confirms.
fn confirm(prompt: &str) -> Result<bool> {
    print!("{} ", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim() == "Y")
}
