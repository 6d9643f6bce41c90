use std::process::{Child, Command};
use std::thread;
use std::time::{Duration, Instant};

use mysh::process::jobs::JobTable;
use pretty_assertions::assert_eq;

fn sleeper() -> Child {
    Command::new("sleep").arg("30").spawn().unwrap()
}

fn pids(table: &JobTable) -> Vec<u32> {
    table.list().map(|job| job.pid).collect()
}

#[test]
fn test_append_and_list_in_launch_order() {
    let mut table = JobTable::new();
    let a = table.append(sleeper(), "sleep 30".to_string());
    let b = table.append(sleeper(), "sleep 30".to_string());
    assert_eq!(pids(&table), vec![a, b]);
    assert!(table.contains(a));
    assert_eq!(table.list().next().map(|job| job.command.as_str()), Some("sleep 30"));
    table.kill_all();
    assert!(table.is_empty());
}

#[test]
fn test_remove_keeps_remaining_order() {
    let mut table = JobTable::new();
    let a = table.append(sleeper(), "a".to_string());
    let b = table.append(sleeper(), "b".to_string());
    let c = table.append(sleeper(), "c".to_string());

    let mut removed = table.remove(b).unwrap();
    assert_eq!(removed.command, "b");
    assert_eq!(pids(&table), vec![a, c]);
    assert!(table.remove(b).is_none());

    removed.kill().unwrap();
    table.kill_all();
}

#[test]
fn test_kill_removes_job() {
    let mut table = JobTable::new();
    let a = table.append(sleeper(), "sleep 30".to_string());
    let b = table.append(sleeper(), "sleep 30".to_string());

    let killed = table.kill(a).unwrap();
    assert_eq!(killed.map(|job| job.pid), Some(a));
    assert_eq!(pids(&table), vec![b]);
    assert!(table.kill(a).unwrap().is_none());
    table.kill_all();
}

#[test]
fn test_reap_drops_finished_jobs() {
    let mut table = JobTable::new();
    let done = table.append(Command::new("true").spawn().unwrap(), "true".to_string());
    let running = table.append(sleeper(), "sleep 30".to_string());

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut reaped = Vec::new();
    while reaped.is_empty() && Instant::now() < deadline {
        reaped = table.reap();
        thread::sleep(Duration::from_millis(20));
    }
    assert_eq!(reaped, vec![done]);
    assert_eq!(pids(&table), vec![running]);
    table.kill_all();
}
