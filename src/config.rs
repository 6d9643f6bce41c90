use std::env;

/// Size of one history block in bytes.
pub const BLOCK_SIZE: usize = 8;
/// Number of blocks in the history arena.
pub const MAX_BLOCKS: usize = 64;
/// Bytes needed to hold one allocation bit per block.
pub const BITMAP_BYTES: usize = MAX_BLOCKS / 8;
/// Longest line the shell accepts, in bytes.
pub const INPUT_BUFSIZE: usize = 120;
/// Most blocks a single history entry can reference.
pub const MAX_ENTRY_BLOCKS: usize = INPUT_BUFSIZE / BLOCK_SIZE;
/// Argument slots per command line, including the trailing terminator slot.
pub const PARAMS_BUFSIZE: usize = 21;
/// How deep `h <i>` may recall a line that itself recalls another.
pub const MAX_RECALL_DEPTH: usize = 8;

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV: &str = "MYSH_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

/// Runtime settings the shell picks up from its environment.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Name shown in the prompt.
    pub user: String,
    /// Colon-separated directories searched for executables.
    pub path: String,
    pub log_filter: String,
}

impl ShellConfig {
    pub fn from_env() -> Self {
        ShellConfig {
            user: env::var("USER").unwrap_or_default(),
            path: env::var("PATH").unwrap_or_default(),
            log_filter: env::var(LOG_ENV).unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
        }
    }

    pub fn prompt(&self, counter: usize) -> String {
        format!("{}@mysh {}> ", self.user, counter)
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        ShellConfig {
            user: String::new(),
            path: String::new(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// Cut `line` down to the input buffer size without splitting a character.
pub fn clamp_input(line: &str) -> &str {
    if line.len() <= INPUT_BUFSIZE {
        return line;
    }
    let mut end = INPUT_BUFSIZE;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}
