use tracing::debug;

use crate::cli::builtins::{self, Builtin};
use crate::cli::tokenizer::tokenize;
use crate::error::ShellError;
use crate::history::manager::{Dispatcher, HistoryManager};
use crate::process::executor::{Executor, Launch};
use crate::process::jobs::JobTable;

/// What the interactive loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Turns a command line into a builtin call or a launched process.
///
/// Lines typed at the prompt and lines recalled with `h <i>` both come
/// through [`Dispatcher::dispatch`].
pub struct CommandDispatcher {
    pub(crate) executor: Executor,
    pub(crate) jobs: JobTable,
    pub(crate) recall_depth: usize,
}

impl CommandDispatcher {
    /// Create a dispatcher launching through `executor`, with an empty job table.
    pub fn new(executor: Executor) -> Self {
        CommandDispatcher {
            executor,
            jobs: JobTable::new(),
            recall_depth: 0,
        }
    }

    /// Background jobs started so far.
    pub fn jobs(&self) -> &JobTable {
        &self.jobs
    }

    pub fn jobs_mut(&mut self) -> &mut JobTable {
        &mut self.jobs
    }
}

impl Dispatcher for CommandDispatcher {
    type Output = Result<Flow, ShellError>;

    fn dispatch(&mut self, history: &mut HistoryManager, line: &str) -> Self::Output {
        let tokens = tokenize(line);
        let Some(cmd) = tokens.command() else {
            return Ok(Flow::Continue);
        };

        if let Some(builtin) = Builtin::from_name(cmd) {
            debug!(builtin = builtin.name(), "running builtin");
            return builtins::run(builtin, &tokens.args, self, history);
        }

        match self.executor.launch(&tokens.args, tokens.background, &mut self.jobs)? {
            Launch::Background { pid, job_number } => println!("[{job_number}] {pid}"),
            Launch::Finished(_) => {}
        }
        Ok(Flow::Continue)
    }
}
