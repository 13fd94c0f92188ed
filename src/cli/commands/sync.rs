//! Sync command implementation.

use std::path::Path;

use crate::cli::SyncArgs;
use crate::cli::error::CliResult;
use crate::locale::Messages;
use crate::sync::{
    NpxWrangler, SyncOptions, SyncRunner, TerminalPrompter, WRANGLER_STATE_DIR,
};

/// Directory holding the wrangler config. Wrangler runs from here.
pub fn project_dir(config: &Path) -> &Path {
    match config.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Turn CLI flags into runner options rooted at `project_dir`.
pub fn sync_options(args: &SyncArgs, project_dir: &Path) -> SyncOptions {
    SyncOptions {
        source: args.source.clone(),
        assume_yes: args.yes,
        keep_exports: args.keep_exports,
        validate: !args.skip_validate,
        export_dir: project_dir.join(&args.export_dir),
        state_dir: project_dir.join(WRANGLER_STATE_DIR),
    }
}

/// Run an interactive sync against the wrangler project at `config`.
///
/// Paths handed to wrangler are absolute since it runs from the project dir.
pub fn sync(config: &Path, args: &SyncArgs, messages: &'static Messages) -> CliResult<()> {
    let project_dir = std::path::absolute(project_dir(config))?;
    let wrangler = NpxWrangler::new().with_working_dir(&project_dir);
    let runner = SyncRunner::new(wrangler, TerminalPrompter::new(), messages)
        .with_options(sync_options(args, &project_dir));

    let mut stdout = std::io::stdout().lock();
    runner.run(config, &mut stdout)?;
    Ok(())
}
