use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// notefiler: file Markdown notes into folders with AI-suggested tags, folder and name.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Notes root. Defaults to the nearest parent containing `.notefiler/`, else the
    /// current directory.
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Increase verbosity (use multiple times for more).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Tag and file an existing note.
    Save(NoteArgs),
    /// Write a new note in $EDITOR, then file it.
    New(NewArgs),
    /// Re-tag and possibly move a note that was filed before.
    Reclassify(NoteArgs),
    /// Print the suggestion for a note without changing anything.
    Suggest(NoteArgs),
    /// List the folders a note could be filed into.
    Folders(FoldersArgs),
    /// Write tags into a note directly, without asking the model.
    Tag(TagArgs),
    /// Create a default configuration file in the notes root.
    Init(InitArgs),
}

#[derive(Args, Debug)]
pub struct NoteArgs {
    /// Path of the note.
    pub path: PathBuf,
}

#[derive(Args, Debug)]
pub struct NewArgs {
    /// Text the draft starts with.
    #[arg(long, short)]
    pub template: Option<String>,
}

#[derive(Args, Debug)]
pub struct FoldersArgs {
    /// Maximum folder depth (at most 3). Defaults to the configured depth.
    #[arg(long, short)]
    pub depth: Option<usize>,
}

#[derive(Args, Debug)]
pub struct TagArgs {
    /// Path of the note.
    pub path: PathBuf,

    /// Tags to write; each argument may hold a comma separated list.
    #[arg(required = true)]
    pub tags: Vec<String>,

    /// Add to the tags already in the note instead of replacing them.
    #[arg(long, short)]
    pub append: bool,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Replace an existing configuration file.
    #[arg(long, short)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["notefiler", "save", "a.md", "-vv", "--root", "/notes"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.root, Some(PathBuf::from("/notes")));
        match cli.command {
            Commands::Save(args) => assert_eq!(args.path, PathBuf::from("a.md")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn tag_requires_tags() {
        assert!(Cli::try_parse_from(["notefiler", "tag", "a.md"]).is_err());
        let cli = Cli::try_parse_from(["notefiler", "tag", "a.md", "x,y", "z", "--append"]).unwrap();
        match cli.command {
            Commands::Tag(args) => {
                assert_eq!(args.tags, ["x,y", "z"]);
                assert!(args.append);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        assert!(Cli::try_parse_from(["notefiler", "folders", "-q", "-v"]).is_err());
    }
}
