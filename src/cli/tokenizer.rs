use tracing::warn;

use crate::config::PARAMS_BUFSIZE;

/// Characters that separate arguments.
pub const ARGS_DELIM: &[char] = &[' ', '\t', '\r', '\n', '\x07', '\x0c', '\x0b', '\x08', '\0'];

/// Marks a command line to run in the background when it is the last token.
pub const BG_SIGN: &str = "&";

/// A command line split into arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    pub args: Vec<String>,
    /// The line ended in `&`; the marker is not part of `args`.
    pub background: bool,
}

impl Tokens {
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn command(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

/// Split `line` into at most `PARAMS_BUFSIZE - 1` arguments.
pub fn tokenize(line: &str) -> Tokens {
    let mut args: Vec<String> = line
        .split(ARGS_DELIM)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect();

    let limit = PARAMS_BUFSIZE - 1;
    if args.len() > limit {
        warn!(count = args.len(), limit, "too many arguments, extra ones dropped");
        args.truncate(limit);
    }

    let background = args.last().is_some_and(|last| last == BG_SIGN);
    if background {
        args.pop();
    }
    Tokens { args, background }
}
