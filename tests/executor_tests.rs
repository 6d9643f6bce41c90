use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use mysh::error::ShellError;
use mysh::process::executor::{Executor, Launch, resolve};
use mysh::process::jobs::JobTable;
use tempfile::tempdir;

const SYSTEM_PATH: &str = "/usr/local/bin:/usr/bin:/bin";

fn make_file(dir: &Path, name: &str, mode: u32) {
    write_file(dir, name, "#!/bin/sh\nexit 0\n", mode);
}

fn write_file(dir: &Path, name: &str, contents: &str, mode: u32) {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
}

fn args(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

#[test]
fn test_resolve_takes_first_match() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    make_file(first.path(), "tool", 0o755);
    make_file(second.path(), "tool", 0o755);

    let search = format!("{}:{}", first.path().display(), second.path().display());
    assert_eq!(resolve("tool", &search), Some(first.path().join("tool")));
}

#[test]
fn test_resolve_skips_non_executables_and_empty_components() {
    let plain = tempdir().unwrap();
    let bin = tempdir().unwrap();
    make_file(plain.path(), "tool", 0o644);
    make_file(bin.path(), "tool", 0o700);

    let search = format!("::{}::{}:", plain.path().display(), bin.path().display());
    assert_eq!(resolve("tool", &search), Some(bin.path().join("tool")));
}

#[test]
fn test_resolve_misses() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("tool")).unwrap();
    let search = dir.path().display().to_string();
    assert_eq!(resolve("tool", &search), None);
    assert_eq!(resolve("tool", ""), None);
}

#[test]
fn test_launch_unknown_command() {
    let executor = Executor::new(SYSTEM_PATH);
    let mut jobs = JobTable::new();
    let err = executor
        .launch(&args(&["definitely-not-a-command-mysh"]), false, &mut jobs)
        .unwrap_err();
    assert!(matches!(err, ShellError::CommandNotFound(ref cmd) if cmd == "definitely-not-a-command-mysh"));
    assert!(!err.is_fatal());
}

#[test]
fn test_launch_foreground_waits() {
    let executor = Executor::new(SYSTEM_PATH);
    let mut jobs = JobTable::new();
    match executor.launch(&args(&["true"]), false, &mut jobs).unwrap() {
        Launch::Finished(status) => assert!(status.success()),
        other => panic!("expected foreground run, got {other:?}"),
    }
    match executor.launch(&args(&["false"]), false, &mut jobs).unwrap() {
        Launch::Finished(status) => assert!(!status.success()),
        other => panic!("expected foreground run, got {other:?}"),
    }
    assert!(jobs.is_empty());
}

#[test]
fn test_launch_background_registers_job() {
    let executor = Executor::new(SYSTEM_PATH);
    let mut jobs = JobTable::new();
    let launch = executor
        .launch(&args(&["sleep", "30"]), true, &mut jobs)
        .unwrap();
    let Launch::Background { pid, job_number } = launch else {
        panic!("expected background launch, got {launch:?}");
    };
    assert_eq!(job_number, 1);
    assert!(jobs.contains(pid));
    assert_eq!(jobs.list().next().map(|job| job.command.as_str()), Some("sleep 30"));
    jobs.kill_all();
}

#[test]
fn test_launch_unrunnable_file_is_not_fatal() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "notabinary", "echo hi\n", 0o755);
    let executor = Executor::new(dir.path().display().to_string());
    let mut jobs = JobTable::new();

    for background in [false, true] {
        let err = executor
            .launch(&args(&["notabinary"]), background, &mut jobs)
            .unwrap_err();
        assert!(matches!(err, ShellError::ExecFailure { ref cmd, .. } if cmd == "notabinary"));
        assert!(!err.is_fatal());
    }
    assert!(jobs.is_empty());
}

#[test]
fn test_spawn_errors_classified() {
    let again = ShellError::from_spawn("ls", io::Error::from(io::ErrorKind::WouldBlock));
    assert!(matches!(again, ShellError::ForkFailure(_)));
    assert!(again.is_fatal());

    let oom = ShellError::from_spawn("ls", io::Error::from(io::ErrorKind::OutOfMemory));
    assert!(oom.is_fatal());

    let denied = ShellError::from_spawn("ls", io::Error::from(io::ErrorKind::PermissionDenied));
    assert!(matches!(denied, ShellError::ExecFailure { ref cmd, .. } if cmd == "ls"));
    assert!(!denied.is_fatal());
}
