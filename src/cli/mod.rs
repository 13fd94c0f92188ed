mod commands;
pub mod error;
mod utils;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::locale::{Language, Messages};
use crate::sync::DEFAULT_EXPORT_DIR;
use error::{CliError, CliResult};

#[derive(Parser)]
#[command(name = "d1-sync")]
#[command(author, version, about = "Sync a remote Cloudflare D1 database to local", long_about = None)]
pub struct Cli {
    /// Path to the wrangler config
    #[arg(long, global = true, default_value = "wrangler.toml")]
    pub config: PathBuf,

    /// Display language: en, zh-CN, zh-TW or ja (default: D1_SYNC_LANG or the system locale)
    #[arg(long, global = true)]
    pub lang: Option<Language>,

    #[command(flatten)]
    pub sync: SyncArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options of the default sync command.
#[derive(Args, Debug, Clone)]
pub struct SyncArgs {
    /// Source target to sync from (`local` or an environment name); prompts when omitted
    #[arg(long)]
    pub source: Option<String>,

    /// Replace local data without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Directory for the exported dumps
    #[arg(long, default_value = DEFAULT_EXPORT_DIR)]
    pub export_dir: PathBuf,

    /// Keep the raw and repaired dumps after importing
    #[arg(long)]
    pub keep_exports: bool,

    /// Skip counting the local tables after importing
    #[arg(long)]
    pub skip_validate: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Repair an exported dump without syncing
    Repair {
        /// Dump produced by `wrangler d1 export`
        input: PathBuf,
        /// Where to write the repaired dump (default: <input>_fixed.sql)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the D1 targets in the wrangler config
    List,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "d1_sync=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub fn run() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let language = cli.lang.unwrap_or_else(Language::from_env);
    tracing::debug!(%language, "resolved display language");

    let messages = language.messages();
    dispatch(cli, messages).map_err(|err| localize(err, messages))
}

fn dispatch(cli: Cli, messages: &'static Messages) -> CliResult<()> {
    match cli.command {
        Some(Commands::Repair { input, output }) => {
            let summary = commands::repair::repair(&input, output.as_deref())?;
            println!("{}", summary);
        }
        Some(Commands::List) => {
            println!("{}", commands::list::list_targets(&cli.config)?);
        }
        None => commands::sync::sync(&cli.config, &cli.sync, messages)?,
    }

    Ok(())
}

/// Turn a failure into a report, prefixed with the translated error label
/// when the display language has its own wording for it.
fn localize(err: CliError, messages: &Messages) -> miette::Report {
    let translated = err
        .config_error()
        .and_then(|config| messages.config_error(config))
        .filter(|text| *text != err.to_string());

    let report = miette::Report::new(err);
    match translated {
        Some(text) => report.wrap_err(format!("{}{}", messages.error, text)),
        None => report,
    }
}
