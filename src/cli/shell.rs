use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use rustyline::{Editor, error::ReadlineError};
use tracing::{debug, info};

use crate::cli::dispatcher::{CommandDispatcher, Flow};
use crate::cli::tokenizer::ARGS_DELIM;
use crate::config::{ShellConfig, clamp_input};
use crate::error::ShellError;
use crate::history::manager::{Dispatcher, HistoryManager, SaveOutcome};
use crate::process::executor::Executor;

/// One interactive session: the history store, the job table and the prompt state.
pub struct Shell {
    config: ShellConfig,
    history: HistoryManager,
    dispatcher: CommandDispatcher,
    interrupted: Arc<AtomicBool>,
    prompt_counter: usize,
}

impl Shell {
    /// Create a session with empty history and no jobs.
    pub fn new(config: ShellConfig) -> Self {
        let executor = Executor::new(config.path.clone());
        Shell {
            config,
            history: HistoryManager::new(),
            dispatcher: CommandDispatcher::new(executor),
            interrupted: Arc::new(AtomicBool::new(false)),
            prompt_counter: 0,
        }
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.dispatcher
    }

    /// Flag raised by the SIGINT handler and checked once per prompt.
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupted)
    }

    /// Prompt for the next line, numbered by the non-blank lines read so far.
    pub fn prompt(&self) -> String {
        self.config.prompt(self.prompt_counter)
    }

    /// Save `line` to history, then run it.
    ///
    /// Non-fatal errors are printed and turned into `Flow::Continue`; only a
    /// fatal error is returned.
    pub fn execute_line(&mut self, line: &str) -> Result<Flow, ShellError> {
        let line = clamp_input(line);
        match self.history.save(line) {
            Ok(SaveOutcome::Saved { evicted, .. }) if evicted > 0 => {
                debug!(evicted, "history full, oldest entries evicted");
            }
            Ok(_) => {}
            Err(err) => report(&ShellError::from(err)),
        }

        if !line.trim_matches(ARGS_DELIM).is_empty() {
            self.prompt_counter += 1;
        }

        match self.dispatcher.dispatch(&mut self.history, line) {
            Ok(flow) => Ok(flow),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                report(&err);
                Ok(Flow::Continue)
            }
        }
    }

    /// Read and run lines until `quit`, end of input, an interrupt or a fatal error.
    /// Background jobs are killed and the history released on the way out.
    pub fn run(mut self) -> Result<()> {
        let result = self.read_loop();

        self.dispatcher.jobs_mut().kill_all();
        let dropped = self.history.shutdown();
        info!(history_entries = dropped, "mysh exiting");
        result
    }

    fn read_loop(&mut self) -> Result<()> {
        let mut editor = Editor::<()>::new().context("initializing line editor")?;
        loop {
            self.dispatcher.jobs_mut().reap();

            if self.interrupted.load(Ordering::SeqCst) {
                println!("\nCaught signal, exiting mysh..");
                return Ok(());
            }

            match editor.readline(&self.prompt()) {
                Ok(line) => match self.execute_line(&line)? {
                    Flow::Continue => {}
                    Flow::Quit => return Ok(()),
                },
                Err(ReadlineError::Interrupted) => {
                    println!("\nCaught signal, exiting mysh..");
                    return Ok(());
                }
                Err(ReadlineError::Eof) => {
                    println!("\nCTRL-D caught, exiting mysh..");
                    return Ok(());
                }
                Err(err) => return Err(err).context("reading input"),
            }
        }
    }
}

/// Print a non-fatal error the way the interactive layer shows it.
pub fn report(err: &ShellError) {
    match err {
        ShellError::Usage(usage) => print!("{usage}"),
        other => eprintln!("mysh: {other}"),
    }
}

/// Start an interactive session with `config`.
pub fn run_shell(config: ShellConfig) -> Result<()> {
    let shell = Shell::new(config);
    signal_hook::flag::register(signal_hook::consts::SIGINT, shell.interrupt_flag())
        .context("installing SIGINT handler")?;
    shell.run()
}
