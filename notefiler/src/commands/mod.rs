use anyhow::{Context, Result};
use console::style;
use dialoguer::Editor;
use notefiler_core::config::Config;
use notefiler_core::relocate::{Mode, Relocation};
use notefiler_core::storage::{list_folders, Note};
use notefiler_core::tags::TagSet;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::cli::{FoldersArgs, InitArgs, NewArgs, NoteArgs, TagArgs};
use crate::AppContext;

// --- Handler Functions ---

pub async fn handle_save(args: NoteArgs, cx: &AppContext) -> Result<()> {
    file_note(args, Mode::Create, cx).await
}

pub async fn handle_reclassify(args: NoteArgs, cx: &AppContext) -> Result<()> {
    file_note(args, Mode::Reclassify, cx).await
}

async fn file_note(args: NoteArgs, mode: Mode, cx: &AppContext) -> Result<()> {
    let organizer = cx.organizer()?;
    let note = Note::load(&args.path).await?;
    let relocation = organizer.run(note, mode).await?;
    report(&relocation, cx);
    Ok(())
}

/// Opens a draft in the user's editor and files it once it has been saved.
///
/// Closing the editor without saving abandons the draft.
pub async fn handle_new(args: NewArgs, cx: &AppContext) -> Result<()> {
    let organizer = cx.organizer()?;
    let (saved_tx, saved_rx) = oneshot::channel();

    let template = args.template.unwrap_or_default();
    let editing = tokio::spawn(async move {
        let edited = tokio::task::spawn_blocking(move || {
            Editor::new().extension(".md").edit(&template)
        }).await;
        match edited {
            Ok(Ok(Some(text))) if !text.trim().is_empty() => {
                debug!(len = text.len(), "Draft saved");
                let _ = saved_tx.send(Note::unsaved(text));
                Ok(())
            }
            Ok(Ok(_)) => {
                debug!("Draft abandoned");
                Ok(())
            }
            Ok(Err(e)) => Err(anyhow::Error::new(e).context("Editor failed")),
            Err(e) => Err(anyhow::Error::new(e).context("Editor task failed")),
        }
    });

    let result = organizer.run_after_save(saved_rx, Mode::Create).await;
    // Report an editor failure instead of the cancel it causes
    editing.await.context("Editor task failed")??;
    let relocation = result?;
    report(&relocation, cx);
    Ok(())
}

pub async fn handle_suggest(args: NoteArgs, cx: &AppContext) -> Result<()> {
    let organizer = cx.organizer()?;
    let note = Note::load(&args.path).await?;
    let proposal = organizer.propose(&note).await?;
    let suggestion = &proposal.suggestion;

    println!("{:>10} {}", style("Tags").bold(), suggestion.tags);
    println!("{:>10} {}", style("Folder").bold(), display_folder(&suggestion.folder.to_string()));
    println!("{:>10} {}", style("File name").bold(), suggestion.file_name);
    if !proposal.similar.is_empty() {
        println!();
        println!("{}", style("Similar folders").bold());
        for scored in &proposal.similar {
            println!("  {:>3}  {}", scored.score, scored.folder);
        }
    }
    Ok(())
}

pub async fn handle_folders(args: FoldersArgs, cx: &AppContext) -> Result<()> {
    let depth = args.depth.unwrap_or(cx.config.max_depth);
    let folders = list_folders(&cx.root, depth).await;
    if folders.is_empty() {
        cx.say(style("No folders yet.").dim());
    }
    for folder in folders {
        println!("{}", folder);
    }
    Ok(())
}

pub async fn handle_tag(args: TagArgs, cx: &AppContext) -> Result<()> {
    let mut note = Note::load(&args.path).await?;
    let store = cx.config.tag_store;

    let mut tags = if args.append { store.read(note.content()) } else { TagSet::new() };
    for list in &args.tags {
        for tag in TagSet::parse(list).iter() {
            tags.insert(tag.clone());
        }
    }
    let content = store.apply(note.content(), &tags);
    if content == note.content() {
        cx.say("Tags unchanged.");
        return Ok(());
    }
    note.set_content(content);
    note.save().await?;
    info!(tags = %tags, "Tags written");
    cx.say(format!("Tagged {} with [{}]", args.path.display(), tags));
    Ok(())
}

pub async fn handle_init(args: InitArgs, cx: &AppContext) -> Result<()> {
    let path = Config::default().save(&cx.root, args.force).await?;
    cx.say(format!("Wrote {}", path.display()));
    Ok(())
}

fn report(relocation: &Relocation, cx: &AppContext) {
    let shown = relocation.path.strip_prefix(&cx.root).unwrap_or(&relocation.path);
    cx.say(format!("{} {}", style("Filed").green().bold(), shown.display()));
    if relocation.reopen {
        cx.say(style("The original file was moved; reopen the note from its new location.").dim());
    }
}

fn display_folder(folder: &str) -> &str {
    if folder.is_empty() { "(root)" } else { folder }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    async fn context(quiet: bool) -> (tempfile::TempDir, AppContext) {
        let dir = tempdir().unwrap();
        let cx = AppContext::resolve(Some(dir.path().to_path_buf()), None, quiet).await.unwrap();
        (dir, cx)
    }

    fn tag_args(path: PathBuf, tags: &[&str], append: bool) -> TagArgs {
        TagArgs { path, tags: tags.iter().map(|t| t.to_string()).collect(), append }
    }

    #[tokio::test]
    async fn tag_replaces_or_appends() {
        let (_dir, cx) = context(true).await;
        let path = cx.root.join("n.md");
        tokio::fs::write(&path, "# N\n").await.unwrap();

        handle_tag(tag_args(path.clone(), &["A, b"], false), &cx).await.unwrap();
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "---\ntags: [a, b]\n---\n# N\n");

        handle_tag(tag_args(path.clone(), &["c", "a"], true), &cx).await.unwrap();
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "---\ntags: [a, b, c]\n---\n# N\n");

        handle_tag(tag_args(path.clone(), &["z"], false), &cx).await.unwrap();
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "---\ntags: [z]\n---\n# N\n");
    }

    #[tokio::test]
    async fn init_refuses_to_overwrite_without_force() {
        let (_dir, cx) = context(true).await;
        handle_init(InitArgs { force: false }, &cx).await.unwrap();
        assert!(Config::path(&cx.root).exists());
        assert!(handle_init(InitArgs { force: false }, &cx).await.is_err());
        handle_init(InitArgs { force: true }, &cx).await.unwrap();
    }

    #[tokio::test]
    async fn filing_commands_need_an_api_key() {
        let (_dir, cx) = context(true).await;
        let path = cx.root.join("n.md");
        tokio::fs::write(&path, "# N\n").await.unwrap();

        let err = handle_save(NoteArgs { path: path.clone() }, &cx).await.unwrap_err();
        assert!(err.to_string().contains("Required setting is missing"));
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "# N\n");
    }

    #[test]
    fn root_folder_has_a_name() {
        assert_eq!(display_folder(""), "(root)");
        assert_eq!(display_folder("a/b"), "a/b");
    }
}
