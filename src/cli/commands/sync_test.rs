use crate::cli::SyncArgs;
use crate::cli::commands::sync::*;
use std::path::{Path, PathBuf};

fn args() -> SyncArgs {
    SyncArgs {
        source: Some("production".to_string()),
        yes: true,
        export_dir: PathBuf::from(".d1-sync-exports"),
        keep_exports: false,
        skip_validate: true,
    }
}

#[test]
fn test_project_dir_of_bare_file_name() {
    assert_eq!(project_dir(Path::new("wrangler.toml")), Path::new("."));
}

#[test]
fn test_project_dir_of_nested_config() {
    assert_eq!(
        project_dir(Path::new("apps/api/wrangler.toml")),
        Path::new("apps/api")
    );
}

#[test]
fn test_sync_options_are_rooted_at_project() {
    let options = sync_options(&args(), Path::new("apps/api"));

    assert_eq!(options.source.as_deref(), Some("production"));
    assert!(options.assume_yes);
    assert!(!options.keep_exports);
    assert!(!options.validate);
    assert_eq!(
        options.export_dir,
        PathBuf::from("apps/api/.d1-sync-exports")
    );
    assert_eq!(options.state_dir, PathBuf::from("apps/api/.wrangler"));
}

#[test]
fn test_absolute_export_dir_is_kept() {
    let mut args = args();
    args.export_dir = PathBuf::from("/tmp/dumps");

    let options = sync_options(&args, Path::new("apps/api"));
    assert_eq!(options.export_dir, PathBuf::from("/tmp/dumps"));
}
