use std::slice;

use crate::error::Error;

/// Collects every error raised while scanning, parsing or running a piece of
/// source. The driver owns one and hands it to each stage, then decides the
/// exit status from what was recorded.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<Error>,
    had_error: bool,
    had_runtime_error: bool,
    had_io_error: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, error: Error) {
        match &error {
            Error::Lexical { .. } | Error::Syntactic { .. } => {
                tracing::debug!(line = ?error.line(), "static error reported");
                self.had_error = true;
            },
            Error::Runtime { .. } => {
                tracing::debug!(line = ?error.line(), "runtime error reported");
                self.had_runtime_error = true;
            },
            Error::Io(e) => {
                tracing::debug!(error = %e, "io error reported");
                self.had_io_error = true;
            },
        }
        self.errors.push(error);
    }

    /// Whether a lexical or syntax error was recorded.
    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// Whether writing program output or reading its input failed.
    pub fn had_io_error(&self) -> bool {
        self.had_io_error
    }

    pub fn errors(&self) -> slice::Iter<'_, Error> {
        self.errors.iter()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn clear(&mut self) {
        self.errors.clear();
        self.had_error = false;
        self.had_runtime_error = false;
        self.had_io_error = false;
    }
}

impl Extend<Error> for Diagnostics {
    fn extend<I: IntoIterator<Item = Error>>(&mut self, iter: I) {
        for e in iter {
            self.report(e);
        }
    }
}
