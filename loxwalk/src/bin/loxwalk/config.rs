use crate::cli::Args;
use std::path::PathBuf;

pub enum Mode {
    Prompt,
    Script(PathBuf),
}

pub struct Config {
    pub mode: Mode,
    pub print_ast: bool,
    pub log_filter: String,
}

impl Config {
    pub fn from_args(args: Args) -> Self {
        let mode = match args.script {
            Some(path) => Mode::Script(path),
            None => Mode::Prompt,
        };

        // RUST_LOG wins over the verbosity flag when it's set.
        let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
            if args.verbose { "loxwalk=debug".to_string() } else { "warn".to_string() }
        });

        Config {
            mode,
            print_ast: args.print_ast,
            log_filter,
        }
    }
}
