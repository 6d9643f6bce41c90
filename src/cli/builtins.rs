use std::fmt::Write as _;

use crate::cli::dispatcher::{CommandDispatcher, Flow};
use crate::config::MAX_RECALL_DEPTH;
use crate::error::ShellError;
use crate::history::manager::HistoryManager;
use crate::process::jobs::JobTable;

const QUIT_USAGE: &str = "usage: quit\n";
const TYPE_USAGE: &str = "usage: type <cmd>\n \tcmd: command\n";
const HISTORY_USAGE: &str = "usage: h [-d <i>] <i>\n \t-d i: Delete history input 'i'\n \ti: Run history input i\n";
const JOBS_USAGE: &str = "usage: jobs\n";
const KILL_USAGE: &str = "usage: kill <i>\n \ti: pid of job to kill\n";

/// Commands the shell handles itself instead of launching a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Quit,
    Type,
    History,
    Jobs,
    Kill,
}

impl Builtin {
    pub const ALL: [Builtin; 5] = [
        Builtin::Quit,
        Builtin::Type,
        Builtin::History,
        Builtin::Jobs,
        Builtin::Kill,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Quit => "quit",
            Builtin::Type => "type",
            Builtin::History => "h",
            Builtin::Jobs => "jobs",
            Builtin::Kill => "kill",
        }
    }

    pub fn from_name(name: &str) -> Option<Builtin> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }
}

/// Run `builtin` with `args` (`args[0]` is the builtin's own name).
pub fn run(
    builtin: Builtin,
    args: &[String],
    dispatcher: &mut CommandDispatcher,
    history: &mut HistoryManager,
) -> Result<Flow, ShellError> {
    match builtin {
        Builtin::Quit => quit(args),
        Builtin::Type => type_of(args),
        Builtin::History => history_command(args, dispatcher, history),
        Builtin::Jobs => jobs(args, &dispatcher.jobs),
        Builtin::Kill => kill(args, &mut dispatcher.jobs),
    }
}

fn quit(args: &[String]) -> Result<Flow, ShellError> {
    if args.len() != 1 {
        return Err(ShellError::Usage(QUIT_USAGE));
    }
    Ok(Flow::Quit)
}

fn type_of(args: &[String]) -> Result<Flow, ShellError> {
    let [_, name] = args else {
        return Err(ShellError::Usage(TYPE_USAGE));
    };
    if Builtin::from_name(name).is_none() {
        return Err(ShellError::NotABuiltin(name.clone()));
    }
    println!("{name} is a shell builtin");
    Ok(Flow::Continue)
}

fn history_command(
    args: &[String],
    dispatcher: &mut CommandDispatcher,
    history: &mut HistoryManager,
) -> Result<Flow, ShellError> {
    match args {
        [_] => {
            print!("{}", format_history(history));
            Ok(Flow::Continue)
        }
        [_, flag, index] if flag == "-d" => {
            let index = parse_index(index)?;
            history.delete_at(index)?;
            Ok(Flow::Continue)
        }
        [_, index] => {
            let index = parse_index(index)?;
            if dispatcher.recall_depth >= MAX_RECALL_DEPTH {
                return Err(ShellError::RecallTooDeep(MAX_RECALL_DEPTH));
            }
            dispatcher.recall_depth += 1;
            let result = history.run_at(index, dispatcher);
            dispatcher.recall_depth -= 1;
            result?
        }
        _ => Err(ShellError::Usage(HISTORY_USAGE)),
    }
}

fn parse_index(raw: &str) -> Result<usize, ShellError> {
    raw.parse().map_err(|_| ShellError::Usage(HISTORY_USAGE))
}

fn jobs(args: &[String], table: &JobTable) -> Result<Flow, ShellError> {
    if args.len() != 1 {
        return Err(ShellError::Usage(JOBS_USAGE));
    }
    print!("{}", format_jobs(table));
    Ok(Flow::Continue)
}

fn kill(args: &[String], table: &mut JobTable) -> Result<Flow, ShellError> {
    let [_, raw] = args else {
        return Err(ShellError::Usage(KILL_USAGE));
    };
    let pid: u32 = raw.parse().map_err(|_| ShellError::Usage(KILL_USAGE))?;
    match table.kill(pid) {
        Ok(Some(_)) => Ok(Flow::Continue),
        Ok(None) => Err(ShellError::ProcessNotFound(pid)),
        Err(source) => Err(ShellError::KillFailure { pid, source }),
    }
}

/// History listing as printed by `h`, oldest entry first.
pub fn format_history(history: &HistoryManager) -> String {
    let mut out = format!("\nHistory list of the last {} commands:\n", history.len());
    for line in history.list() {
        let _ = writeln!(out, "{:3}: {}", line.index, line.text);
    }
    out
}

/// Job listing as printed by `jobs`.
pub fn format_jobs(table: &JobTable) -> String {
    let mut out = String::new();
    for job in table.list() {
        let _ = write!(out, "\nPid          = {}\nCommand line = {}\n", job.pid, job.command);
    }
    out
}
