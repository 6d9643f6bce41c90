pub mod config;
pub mod error;
pub mod logging;

pub mod history {
    pub mod arena;
    pub mod error;
    pub mod list;
    pub mod manager;
}

pub mod process {
    pub mod executor;
    pub mod jobs;
}

pub mod cli {
    pub mod builtins;
    pub mod dispatcher;
    pub mod shell;
    pub mod tokenizer;
}
