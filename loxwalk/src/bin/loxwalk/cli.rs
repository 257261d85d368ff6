use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "loxwalk")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tree-walking interpreter for Lox", long_about = None)]
pub struct Args {
    /// Script to run. Starts an interactive prompt when omitted.
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,

    /// Parse the input as a single expression and print its syntax tree
    /// instead of running it.
    #[arg(long = "print-ast")]
    pub print_ast: bool,

    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}
