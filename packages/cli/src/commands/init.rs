use anyhow::Result;
use clap::Args;
use colored::Colorize;
use sitedit_editor::{EditorConfig, ModelTier, DEFAULT_CONFIG_NAME};
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Rewrite endpoint (e.g. http://localhost:3000/api/rewrite)
    #[arg(long)]
    pub rewrite_url: Option<String>,

    /// Save endpoint
    #[arg(long)]
    pub save_url: Option<String>,

    /// Image upload endpoint
    #[arg(long)]
    pub asset_url: Option<String>,

    /// Use the advanced model tier for rewrites
    #[arg(long)]
    pub advanced: bool,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Writing editor config...".bright_blue().bold());

    let mut config = EditorConfig::default();
    config.services.rewrite_url = args.rewrite_url;
    config.services.save_url = args.save_url;
    config.services.asset_url = args.asset_url;
    if args.advanced {
        config.rewrite.model_tier = ModelTier::Advanced;
    }

    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    for (name, url) in [
        ("rewrite", &config.services.rewrite_url),
        ("save", &config.services.save_url),
        ("asset", &config.services.asset_url),
    ] {
        if url.is_none() {
            println!("  {} No {name} endpoint set", "·".dimmed());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> InitArgs {
        InitArgs {
            rewrite_url: Some("http://localhost:3000/api/rewrite".into()),
            save_url: None,
            asset_url: None,
            advanced: true,
            force: false,
        }
    }

    #[test]
    fn test_init_writes_a_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        init(args(), dir.path()).unwrap();

        let config = EditorConfig::load(dir.path()).unwrap();
        assert_eq!(config.rewrite.model_tier, ModelTier::Advanced);
        assert_eq!(
            config.services.rewrite_url.as_deref(),
            Some("http://localhost:3000/api/rewrite")
        );
        assert_eq!(config.history_limit, 100);
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_NAME), r#"{ "historyLimit": 7 }"#).unwrap();

        init(args(), dir.path()).unwrap();
        assert_eq!(EditorConfig::load(dir.path()).unwrap().history_limit, 7);
    }
}
