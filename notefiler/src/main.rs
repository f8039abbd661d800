use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use console::style;
use notefiler::cli::{Cli, Commands};
use notefiler::{commands, AppContext};
use notefiler_core::organize::OrganizeError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_cancel(&e) => {
            println!("Cancelled.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} {:#}", style("error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let cx = AppContext::resolve(cli.root, cli.api_key, cli.quiet).await?;
    tracing::debug!(root = %cx.root.display(), "Resolved notes root");

    match cli.command {
        Commands::Save(args) => commands::handle_save(args, &cx).await,
        Commands::New(args) => commands::handle_new(args, &cx).await,
        Commands::Reclassify(args) => commands::handle_reclassify(args, &cx).await,
        Commands::Suggest(args) => commands::handle_suggest(args, &cx).await,
        Commands::Folders(args) => commands::handle_folders(args, &cx).await,
        Commands::Tag(args) => commands::handle_tag(args, &cx).await,
        Commands::Init(args) => commands::handle_init(args, &cx).await,
    }
}

/// `RUST_LOG` wins; otherwise warnings by default, more with each `-v`, errors only with `-q`.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn is_cancel(e: &anyhow::Error) -> bool {
    matches!(e.downcast_ref::<OrganizeError>(), Some(OrganizeError::UserCancelled))
}
