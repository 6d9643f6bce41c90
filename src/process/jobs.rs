use std::io;
use std::process::Child;

use tracing::{debug, warn};

/// A process launched in the background.
#[derive(Debug)]
pub struct Job {
    pub pid: u32,
    /// Command line as typed, without the trailing `&`.
    pub command: String,
    child: Child,
}

impl Job {
    /// SIGKILL the process and wait for it so it does not linger as a zombie.
    pub fn kill(&mut self) -> io::Result<()> {
        self.child.kill()?;
        if let Err(err) = self.child.wait() {
            warn!(pid = self.pid, error = %err, "failed to wait for killed job");
        }
        Ok(())
    }
}

/// Background processes in launch order.
///
/// Removing a job shifts the later ones down, so the remaining jobs keep
/// their relative order.
#[derive(Debug, Default)]
pub struct JobTable {
    jobs: Vec<Job>,
}

impl JobTable {
    /// Create an empty JobTable.
    pub fn new() -> Self {
        JobTable { jobs: Vec::new() }
    }

    /// Number of jobs still tracked.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Register a launched child. Returns its pid.
    pub fn append(&mut self, child: Child, command: String) -> u32 {
        let pid = child.id();
        debug!(pid, command = %command, "job started");
        self.jobs.push(Job {
            pid,
            command,
            child,
        });
        pid
    }

    /// Forget the job with `pid`. Returns it if it was known.
    pub fn remove(&mut self, pid: u32) -> Option<Job> {
        let pos = self.jobs.iter().position(|job| job.pid == pid)?;
        Some(self.jobs.remove(pos))
    }

    /// Jobs in launch order.
    pub fn list(&self) -> impl Iterator<Item = &Job> + '_ {
        self.jobs.iter()
    }

    /// Whether `pid` belongs to a tracked job.
    pub fn contains(&self, pid: u32) -> bool {
        self.jobs.iter().any(|job| job.pid == pid)
    }

    /// Drop every job whose process has exited, without blocking.
    /// Returns the pids that were removed.
    pub fn reap(&mut self) -> Vec<u32> {
        let mut finished = Vec::new();
        self.jobs.retain_mut(|job| match job.child.try_wait() {
            Ok(Some(status)) => {
                debug!(pid = job.pid, %status, "job finished");
                finished.push(job.pid);
                false
            }
            Ok(None) => true,
            Err(err) => {
                warn!(pid = job.pid, error = %err, "could not poll job, dropping it");
                finished.push(job.pid);
                false
            }
        });
        finished
    }

    /// SIGKILL the job with `pid` and remove it from the table.
    ///
    /// Returns `Ok(None)` when no such job exists.
    pub fn kill(&mut self, pid: u32) -> io::Result<Option<Job>> {
        let Some(pos) = self.jobs.iter().position(|job| job.pid == pid) else {
            return Ok(None);
        };
        self.jobs[pos].kill()?;
        debug!(pid, "job killed");
        Ok(Some(self.jobs.remove(pos)))
    }

    /// Kill every remaining job. Used on shell exit.
    pub fn kill_all(&mut self) {
        for mut job in self.jobs.drain(..) {
            if let Err(err) = job.kill() {
                warn!(pid = job.pid, error = %err, "failed to kill job on exit");
            }
        }
    }
}
