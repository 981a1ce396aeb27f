use super::script::{Script, Step};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use sitedit_editor::{
    Editor, EditorConfig, Effect, FocusTarget, NodeId, NodePath, NotificationLevel, PageId,
    PersistenceService, Point, RewriteResponse, TextRange,
};
use sitedit_services::Services;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Page to edit
    pub page: PathBuf,

    /// Replay script (JSON)
    #[arg(short, long)]
    pub script: PathBuf,

    /// Write the final page here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Send queued saves to the configured save endpoint
    #[arg(long)]
    pub persist: bool,
}

pub async fn replay(args: ReplayArgs, cwd: &Path) -> Result<()> {
    let config = EditorConfig::load(cwd)?;
    let services = Services::from_config(&config.services)?;

    let markup = fs::read_to_string(&args.page)
        .with_context(|| format!("Cannot read {}", args.page.display()))?;
    let script_source = fs::read_to_string(&args.script)
        .with_context(|| format!("Cannot read {}", args.script.display()))?;
    let script = Script::from_json(&script_source)
        .with_context(|| format!("Invalid script {}", args.script.display()))?;

    let mut editor = Editor::new(page_id(&args.page), &markup, config)?;
    let base_dir = args.script.parent().unwrap_or(Path::new("."));

    eprintln!(
        "{} {} ({} steps)",
        "▶ Replaying".bright_blue().bold(),
        args.script.display(),
        script.steps.len()
    );

    let mut effects = Vec::new();
    for (index, step) in script.steps.iter().enumerate() {
        let summary = run_step(&mut editor, step, &services, base_dir)
            .await
            .with_context(|| format!("Step {} failed", index + 1))?;
        eprintln!("  {} {:>3}. {}", "✓".green(), index + 1, summary);
        effects.extend(editor.take_effects());
    }

    if args.persist {
        let saver = services.persistence()?;
        for effect in &effects {
            if let Effect::Save(request) = effect {
                let result = saver.save(request).await;
                editor.report_save(request.version, result);
            }
        }
        effects.extend(editor.take_effects());
    }

    if !effects.is_empty() {
        eprintln!();
        for effect in &effects {
            eprintln!("  {}", describe(effect));
        }
    }

    match &args.out {
        Some(out) => {
            fs::write(out, editor.document())
                .with_context(|| format!("Cannot write {}", out.display()))?;
            eprintln!();
            eprintln!(
                "{} Wrote {} ({} history entries)",
                "✅".green(),
                out.display(),
                editor.history().len()
            );
        }
        None => println!("{}", editor.document()),
    }
    Ok(())
}

fn page_id(page: &Path) -> PageId {
    let stem = page
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string());
    PageId::new(stem)
}

fn node(editor: &Editor, target: &str) -> Result<(NodePath, NodeId)> {
    let path: NodePath = target.parse()?;
    let node = editor.surface().resolve(&path)?;
    Ok((path, node))
}

/// Run one step and describe what happened.
pub async fn run_step(
    editor: &mut Editor,
    step: &Step,
    services: &Services,
    base_dir: &Path,
) -> Result<String> {
    debug!(?step, "Running step");
    let summary = match step {
        Step::TogglePick => format!("mode → {}", editor.toggle_pick()),
        Step::ToggleDirectEdit => format!("mode → {}", editor.toggle_direct_edit()),
        Step::ExitMode => {
            editor.exit_mode();
            format!("mode → {}", editor.mode())
        }
        Step::Hover { target, x, y } => {
            let (path, node) = node(editor, target)?;
            let hovered = editor.on_pointer_over(node, Point::new(*x, *y));
            format!("hover {path}: {}", if hovered { "tracked" } else { "ignored" })
        }
        Step::PointerOut { target } => {
            let (path, node) = node(editor, target)?;
            editor.on_pointer_out(node);
            format!("pointer left {path}")
        }
        Step::Click { target, x, y } => {
            let (path, node) = node(editor, target)?;
            let outcome = editor.on_click(node, Point::new(*x, *y));
            format!("click {path}: {outcome:?}")
        }
        Step::SelectText { start, end } => {
            editor.select_text(TextRange::new(*start, *end))?;
            let formats = editor
                .session()
                .map(|session| session.current_formats().clone())
                .unwrap_or_default();
            format!("select {start}..{end} ({formats:?})")
        }
        Step::Type { text } => {
            let caret = editor.input_text(text)?;
            format!("type {text:?}, caret at {}", caret.end)
        }
        Step::Format { format } => {
            let outcome = editor.apply_format(format.clone())?;
            format!("{} ({outcome:?})", format.label())
        }
        Step::FocusToolbar => format!("{:?}", editor.focus_changed(FocusTarget::Toolbar)),
        Step::Blur => format!("blur: {:?}", editor.blur()),
        Step::Key { key } => format!("key {:?}: {:?}", key.key, editor.on_key(key)),
        Step::Undo => format!("undo: {}", editor.undo()),
        Step::Redo => format!("redo: {}", editor.redo()),
        Step::Escape => format!("escape: {}", editor.escape()),
        Step::Mutate { target, mutation } => {
            let path: NodePath = target.parse()?;
            let changed = editor.apply_mutation(&path, mutation)?;
            format!("{} on {path}: changed={changed}", mutation.label())
        }
        Step::ImageSource { url } => {
            format!("image src → {url}: changed={}", editor.set_image_source(url)?)
        }
        Step::LinkImage { href } => {
            format!("image link → {href}: changed={}", editor.link_image(href)?)
        }
        Step::CloseImageActions => {
            editor.close_image_actions();
            "image actions closed".to_string()
        }
        Step::Upload { file, content_type } => {
            let path = base_dir.join(file);
            let bytes =
                fs::read(&path).with_context(|| format!("Cannot read {}", path.display()))?;
            let changed = editor
                .upload_image(services.assets()?, bytes, content_type)
                .await?;
            format!("upload {}: changed={changed}", file.display())
        }
        Step::Rewrite {
            instruction,
            response: Some(response),
        } => {
            let pending = editor.begin_rewrite(instruction)?;
            let outcome = editor.finish_rewrite(
                pending,
                Ok(RewriteResponse {
                    updated_element_markup: Some(response.clone()),
                }),
            );
            format!("rewrite {instruction:?}: {outcome:?}")
        }
        Step::Rewrite {
            instruction,
            response: None,
        } => {
            let outcome = editor
                .request_rewrite(services.rewrite()?, instruction)
                .await?;
            format!("rewrite {instruction:?}: {outcome:?}")
        }
        Step::UndoRewrite => format!("undo rewrite: {}", editor.undo_rewrite()),
        Step::ZoomIn => format!("zoom {}%", editor.zoom_in()),
        Step::ZoomOut => format!("zoom {}%", editor.zoom_out()),
        Step::Save => {
            let request = editor.save();
            format!("save v{}", request.version)
        }
        Step::ChangePage { page, file } => {
            let path = base_dir.join(file);
            let markup = fs::read_to_string(&path)
                .with_context(|| format!("Cannot read {}", path.display()))?;
            editor.change_page(page.as_str(), &markup)?;
            format!("page → {page}")
        }
    };
    Ok(summary)
}

fn describe(effect: &Effect) -> String {
    match effect {
        Effect::Save(request) => format!(
            "{} {} v{} ({} bytes)",
            "save".cyan(),
            request.page_id,
            request.version,
            request.content.len()
        ),
        Effect::Notify(notification) => {
            let level = match notification.level {
                NotificationLevel::Info => "info".normal(),
                NotificationLevel::Warning => "warning".yellow(),
                NotificationLevel::Error => "error".red(),
            };
            format!("{level} {notification}")
        }
    }
}
