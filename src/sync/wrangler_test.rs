use crate::config::DatabaseTarget;
use crate::sync::wrangler::*;
use mockall::predicate::*;
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::{ExitStatus, Output};

/// Helper to create a mock Output
fn mock_output(code: i32, stdout: &str, stderr: &str) -> Output {
    Output {
        status: ExitStatus::from_raw(code),
        stdout: stdout.as_bytes().to_vec(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

fn target(env: Option<&str>) -> DatabaseTarget {
    DatabaseTarget {
        key: env.unwrap_or("local").to_string(),
        display_name: "Production".to_string(),
        binding: "DB".to_string(),
        database_name: "app-prod".to_string(),
        database_id: None,
        env: env.map(str::to_string),
    }
}

#[test]
fn test_export_args_default_env() {
    let args = export_args(&target(None), Path::new("/tmp/export.sql"));
    assert_eq!(
        args,
        vec![
            "d1",
            "export",
            "app-prod",
            "--remote",
            "--output=/tmp/export.sql"
        ]
    );
}

#[test]
fn test_export_args_with_env() {
    let args = export_args(&target(Some("production")), Path::new("out.sql"));
    assert_eq!(
        args,
        vec![
            "d1",
            "export",
            "app-prod",
            "--env",
            "production",
            "--remote",
            "--output=out.sql"
        ]
    );
}

#[test]
fn test_execute_file_args() {
    let args = execute_file_args("app-dev", Path::new("fixed.sql"));
    assert_eq!(
        args,
        vec!["d1", "execute", "app-dev", "--local", "--file=fixed.sql"]
    );
}

#[test]
fn test_execute_command_args_keep_sql_as_one_argument() {
    let args = execute_command_args("app-dev", "SELECT COUNT(*) AS count FROM \"users\"");
    assert_eq!(args.len(), 6);
    assert_eq!(args[4], "--json");
    assert_eq!(args[5], "--command=SELECT COUNT(*) AS count FROM \"users\"");
}

#[test]
fn test_missing_program_is_reported() {
    let wrangler = NpxWrangler::new().with_program("d1-sync-test-no-such-program");
    let result = wrangler.execute_command("app-dev", "SELECT 1");
    assert!(matches!(result, Err(WranglerError::NpxNotFound)));
}

#[test]
fn test_non_zero_exit_is_reported() {
    let wrangler = NpxWrangler::new().with_program("false");
    let result = wrangler.execute_file("app-dev", Path::new("fixed.sql"));
    assert!(matches!(
        result,
        Err(WranglerError::NonZeroExit { code: 1, .. })
    ));
}

#[test]
fn test_successful_exit_returns_output() {
    let wrangler = NpxWrangler::new().with_program("true");
    let output = wrangler
        .export(&target(None), Path::new("export.sql"))
        .unwrap();
    assert!(output.status.success());
}

#[test]
fn test_mock_export_success() {
    let mut mock = MockWranglerOps::new();
    let prod = target(Some("production"));

    mock.expect_export()
        .with(eq(prod.clone()), eq(Path::new("/tmp/export.sql")))
        .times(1)
        .returning(|_, _| Ok(mock_output(0, "🌀 Downloading SQL to /tmp/export.sql\n", "")));

    let result = mock.export(&prod, Path::new("/tmp/export.sql"));
    assert!(result.is_ok());
}

#[test]
fn test_mock_execute_file_failure() {
    let mut mock = MockWranglerOps::new();

    mock.expect_execute_file()
        .with(eq("app-dev"), eq(Path::new("fixed.sql")))
        .times(1)
        .returning(|_, _| {
            Err(WranglerError::NonZeroExit {
                code: 1,
                output: "table users already exists".to_string(),
            })
        });

    let result = mock.execute_file("app-dev", Path::new("fixed.sql"));
    match result {
        Err(WranglerError::NonZeroExit { code, output }) => {
            assert_eq!(code, 1);
            assert!(output.contains("already exists"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
