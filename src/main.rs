use mysh::{cli::shell::run_shell, config::ShellConfig, logging};

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        eprintln!("Usage: {}", args[0]);
        std::process::exit(1);
    }
    let config = ShellConfig::from_env();
    logging::init(&config.log_filter);
    run_shell(config)
}
