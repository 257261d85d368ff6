mod cli;
mod config;

use clap::Parser as _;
use loxwalk::{
    parser::Parser,
    printer,
    Diagnostics,
    Interpreter,
};
use std::{
    io::{self, BufRead, Write},
    path::Path,
    process::ExitCode,
};

use crate::config::{Config, Mode};

const EX_USAGE: u8 = 64;
const EX_DATAERR: u8 = 65;
const EX_SOFTWARE: u8 = 70;
const EX_IOERR: u8 = 74;

fn main() -> ExitCode {
    let args = match cli::Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() { ExitCode::from(EX_USAGE) } else { ExitCode::SUCCESS };
        },
    };
    let config = Config::from_args(args);
    init_tracing(&config.log_filter);

    let result = match &config.mode {
        Mode::Script(path) => run_file(path, &config),
        Mode::Prompt => run_prompt(&config),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(EX_IOERR)
        },
    }
}

fn init_tracing(filter: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(EnvFilter::new(filter))
        .init();
}

fn run_file(path: &Path, config: &Config) -> io::Result<ExitCode> {
    tracing::debug!(path = %path.display(), "running script");
    let contents = std::fs::read_to_string(path)?;

    let mut lox = Lox::new(io::stdout(), io::stderr());
    lox.run(contents.as_str(), config)?;

    Ok(if lox.diagnostics.had_io_error() {
        ExitCode::from(EX_IOERR)
    } else if lox.diagnostics.had_error() {
        ExitCode::from(EX_DATAERR)
    } else if lox.diagnostics.had_runtime_error() {
        ExitCode::from(EX_SOFTWARE)
    } else {
        ExitCode::SUCCESS
    })
}

fn run_prompt(config: &Config) -> io::Result<ExitCode> {
    let mut buffer = String::new();
    let stdin = io::stdin();
    let mut out = io::stdout();

    let mut lox = Lox::new(io::stdout(), io::stderr());

    loop {
        write!(out, "> ")?;
        out.flush()?;

        buffer.clear();

        let num_bytes = stdin.lock().read_line(&mut buffer)?;
        if num_bytes == 0 { break };

        lox.run(buffer.as_str(), config)?;
        // A mistake on one line shouldn't poison the rest of the session.
        lox.diagnostics.clear();
    }

    Ok(ExitCode::SUCCESS)
}

struct Lox<Out, ErrOut> {
    interpreter: Interpreter<Out>,
    diagnostics: Diagnostics,
    err_out: ErrOut,
}

impl <Out: Write, ErrOut: Write> Lox<Out, ErrOut> {
    fn new(out: Out, err_out: ErrOut) -> Self {
        Self {
            interpreter: Interpreter::new(out),
            diagnostics: Diagnostics::new(),
            err_out,
        }
    }

    fn run(&mut self, source: &str, config: &Config) -> io::Result<()> {
        let already_reported = self.diagnostics.len();

        if config.print_ast {
            self.print_ast(source)?;
        } else {
            loxwalk::run(source, &mut self.interpreter, &mut self.diagnostics);
        }

        for e in self.diagnostics.errors().skip(already_reported) {
            writeln!(self.err_out, "{}", e)?;
        }
        Ok(())
    }

    fn print_ast(&mut self, source: &str) -> io::Result<()> {
        let tokens = loxwalk::scan(source, &mut self.diagnostics);
        if self.diagnostics.had_error() {
            return Ok(())
        }

        match Parser::new(tokens.into_iter()).parse_expression() {
            Ok(expr) => writeln!(io::stdout(), "{}", printer::print(&expr)),
            Err(e) => {
                self.diagnostics.report(e);
                Ok(())
            },
        }
    }
}
