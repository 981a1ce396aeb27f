use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use sitedit_editor::{compute_path, editable_root, NodePath};
use sitedit_markup::parse;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct PathsArgs {
    /// Page to inspect
    pub page: PathBuf,
}

pub fn paths(args: PathsArgs) -> Result<()> {
    let markup = fs::read_to_string(&args.page)
        .with_context(|| format!("Cannot read {}", args.page.display()))?;
    let paths = element_paths(&markup)?;

    println!(
        "{} {}",
        "🧭 Node paths in".bright_blue().bold(),
        args.page.display()
    );
    for (path, tag) in &paths {
        println!("  {:<8} {}", format!("<{tag}>").dimmed(), path);
    }
    println!();
    println!("{} {} elements", "✓".green(), paths.len());
    Ok(())
}

/// Path and tag of every element under the editable root, in document order.
pub fn element_paths(markup: &str) -> Result<Vec<(NodePath, String)>> {
    let doc = parse(markup)?;
    let root = editable_root(&doc);

    doc.descendants(root)
        .filter(|&node| node != root)
        .filter_map(|node| doc.tag(node).map(|tag| (node, tag.to_string())))
        .map(|(node, tag)| Ok((compute_path(&doc, node)?, tag)))
        .collect()
}
