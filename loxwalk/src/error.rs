use std::result;

use crate::token::Token;

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("[line {line}] Error: {message}")]
    Lexical { line: usize, message: String },
    #[error("[line {}] Error{}: {}", .token.line, location(.token), .message)]
    Syntactic { token: Token, message: String },
    #[error("{}\n[line {}]", .message, .token.line)]
    Runtime { token: Token, message: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn lexical<S: Into<String>>(line: usize, message: S) -> Error {
        Error::Lexical { line, message: message.into() }
    }

    pub fn syntactic<S: Into<String>>(token: Token, message: S) -> Error {
        Error::Syntactic { token, message: message.into() }
    }

    pub fn runtime<S: Into<String>>(token: Token, message: S) -> Error {
        Error::Runtime { token, message: message.into() }
    }

    pub fn is_runtime_error(&self) -> bool {
        matches!(self, Error::Runtime { .. })
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Lexical { line, .. } => Some(*line),
            Error::Syntactic { token, .. } | Error::Runtime { token, .. } => Some(token.line),
            Error::Io(_) => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Error::Lexical { message, .. }
            | Error::Syntactic { message, .. }
            | Error::Runtime { message, .. } => message.clone(),
            Error::Io(e) => e.to_string(),
        }
    }
}

fn location(token: &Token) -> String {
    if token.is_eof() {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}
