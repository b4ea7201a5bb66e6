//! CLI views: single-entry inspection and the site-map tree.

use anyhow::Result;

use crate::config::Config;
use crate::db;
use crate::models::SiteMapNode;
use crate::navigator;

/// `waypost get <id>` — prints one entry with its breadcrumb trail,
/// sibling navigation, and categorized children.
pub async fn run_get(config: &Config, id: i64, json: bool) -> Result<()> {
    let pool = db::connect(config).await?;

    let Some(entry) = navigator::entry_by_id(&pool, id).await else {
        pool.close().await;
        eprintln!("Error: entry not found: {}", id);
        std::process::exit(1);
    };

    let (crumbs, base_path) = navigator::breadcrumbs(&pool, id).await;
    let siblings = navigator::sibling_navigation(&pool, id).await;
    let details = navigator::entry_details(&pool, id).await;
    pool.close().await;

    if json {
        let value = serde_json::json!({
            "entry": entry,
            "breadcrumbs": crumbs,
            "base_path": base_path,
            "previous": siblings.previous,
            "next": siblings.next,
            "folder": details.folder,
            "entries": details.entries,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("--- Entry ---");
    println!("id:        {}", entry.id);
    println!("filename:  {}", entry.filename);
    match entry.parent_id {
        Some(parent) => println!("parent_id: {}", parent),
        None => println!("parent_id: (top-level)"),
    }
    println!("path:      /{}", base_path);
    println!();

    println!("--- Breadcrumbs ---");
    for crumb in &crumbs {
        println!("{}[{}] {}", "  ".repeat(crumb.level as usize), crumb.id, crumb.filename);
    }
    println!();

    if let Some(prev) = &siblings.previous {
        println!("previous: [{}] {}", prev.id, prev.label);
    }
    if let Some(next) = &siblings.next {
        println!("next:     [{}] {}", next.id, next.label);
    }

    if let Some(folder) = &details.folder {
        if let Some(content) = &folder.content {
            println!();
            println!("--- Content ---");
            println!("{}", content.trim());
        }
        let e = &details.entries;
        println!();
        println!(
            "--- Children: {} folders, {} images, {} audio, {} videos, {} text, {} other ---",
            e.folders.len(),
            e.images.len(),
            e.audio.len(),
            e.videos.len(),
            e.text.len(),
            e.other.len()
        );
        for child in e
            .folders
            .iter()
            .chain(&e.images)
            .chain(&e.audio)
            .chain(&e.videos)
            .chain(&e.text)
            .chain(&e.other)
        {
            println!(
                "  [{}] {} ({})",
                child.id,
                child.filename,
                child.entry_type.as_str()
            );
        }
    }

    Ok(())
}

/// `waypost tree` — prints the full site map as an indented tree.
pub async fn run_tree(config: &Config, json: bool) -> Result<()> {
    let pool = db::connect(config).await?;
    let forest = navigator::site_map(&pool).await;
    pool.close().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&forest)?);
        return Ok(());
    }

    if forest.is_empty() {
        println!("(empty site map)");
        return Ok(());
    }

    for root in &forest {
        print_node(root, 0);
    }
    Ok(())
}

fn print_node(node: &SiteMapNode, indent: usize) {
    println!("{}[{}] {}", "  ".repeat(indent), node.id, node.display_name);
    for child in &node.children {
        print_node(child, indent + 1);
    }
}

/// `waypost set <id> <content>` — the edit path: overwrites one entry's
/// content. Last writer wins.
pub async fn run_set(config: &Config, id: i64, content: &str) -> Result<()> {
    let pool = db::connect(config).await?;
    let updated = navigator::update_content(&pool, id, content).await?;
    pool.close().await;

    if !updated {
        eprintln!("Error: entry not found: {}", id);
        std::process::exit(1);
    }
    println!("updated entry {}", id);
    Ok(())
}
