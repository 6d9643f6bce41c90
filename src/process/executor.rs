use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use tracing::debug;

use crate::error::ShellError;
use crate::process::jobs::JobTable;

/// How a launched command ended up running.
#[derive(Debug)]
pub enum Launch {
    /// Ran in the foreground until it exited.
    Finished(ExitStatus),
    /// Left running in the background.
    Background { pid: u32, job_number: usize },
}

/// Find `cmd` in the colon-separated `search_path`.
///
/// Returns the first `<dir>/<cmd>` that is an executable regular file.
/// Empty components are skipped.
pub fn resolve(cmd: &str, search_path: &str) -> Option<PathBuf> {
    search_path
        .split(':')
        .filter(|dir| !dir.is_empty())
        .map(|dir| Path::new(dir).join(cmd))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

/// Launches external programs found on a search path.
#[derive(Debug, Clone)]
pub struct Executor {
    search_path: String,
}

impl Executor {
    /// Create an Executor that searches the colon-separated `search_path`.
    pub fn new(search_path: impl Into<String>) -> Self {
        Executor {
            search_path: search_path.into(),
        }
    }

    pub fn search_path(&self) -> &str {
        &self.search_path
    }

    /// Run `args[0]` with the remaining arguments.
    ///
    /// Foreground commands are waited for. Background commands get their own
    /// process group and are recorded in `jobs`.
    pub fn launch(&self, args: &[String], background: bool, jobs: &mut JobTable) -> Result<Launch, ShellError> {
        let Some(cmd) = args.first() else {
            return Err(ShellError::CommandNotFound(String::new()));
        };
        let program = resolve(cmd, &self.search_path)
            .ok_or_else(|| ShellError::CommandNotFound(cmd.clone()))?;

        let mut command = Command::new(&program);
        command.arg0(cmd).args(&args[1..]);
        debug!(program = %program.display(), background, "launching command");

        if background {
            command.process_group(0);
            let child = command
                .spawn()
                .map_err(|err| ShellError::from_spawn(cmd, err))?;
            let pid = jobs.append(child, args.join(" "));
            return Ok(Launch::Background {
                pid,
                job_number: jobs.len(),
            });
        }

        let status = command
            .status()
            .map_err(|err| ShellError::from_spawn(cmd, err))?;
        debug!(%status, "command finished");
        Ok(Launch::Finished(status))
    }
}
