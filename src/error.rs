//! Centralised error hierarchy for the **Luca interpreter**.
//!
//! Every phase (scanner, parser, resolver, runtime, CLI) converts its failure
//! modes into one of the variants defined here.  The `Display` output of each
//! variant is the exact diagnostic line printed to the error stream.
//!
//! The module **does not** print diagnostics itself.

use std::io;
use thiserror::Error;

use log::info;

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LucaError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.  `location` is empty, `" at end"` or
    /// `" at '<lexeme>'"`.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        location: String,
        line: usize,
    },

    /// Static‑analysis failure found by the resolver.
    #[error("[line {line}] Error{location}: {message}")]
    Resolve {
        message: String,
        location: String,
        line: usize,
    },

    /// Runtime evaluation error.  Aborts the running program.
    #[error("{message}\n[line {line}]")]
    Runtime { message: String, line: usize },

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl LucaError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LucaError::Lex { message, line }
    }

    /// Helper constructor for the **parser**, located at `token`.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", token.line, message);

        LucaError::Parse {
            message,
            location: location(token),
            line: token.line,
        }
    }

    /// Helper constructor for the **resolver**, located at `token`.
    pub fn resolve<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Resolve error: line={}, msg={}", token.line, message);

        LucaError::Resolve {
            message,
            location: location(token),
            line: token.line,
        }
    }

    /// Helper constructor for the **interpreter**.
    pub fn runtime<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Runtime error: line={}, msg={}", token.line, message);

        LucaError::Runtime {
            message,
            line: token.line,
        }
    }

    /// Source line the error refers to, when it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            LucaError::Lex { line, .. }
            | LucaError::Parse { line, .. }
            | LucaError::Resolve { line, .. }
            | LucaError::Runtime { line, .. } => Some(*line),
            LucaError::Io(_) | LucaError::Utf8(_) => None,
        }
    }

    /// `true` for errors found before execution starts.
    pub fn is_static(&self) -> bool {
        matches!(
            self,
            LucaError::Lex { .. } | LucaError::Parse { .. } | LucaError::Resolve { .. }
        )
    }
}

fn location(token: &Token) -> String {
    if token.token_type == TokenType::EOF {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LucaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_points_at_lexeme() {
        let token = Token::new(TokenType::IDENTIFIER, "foo", None, 3);
        let err = LucaError::parse(&token, "Expect ';' after value.");

        assert_eq!(
            err.to_string(),
            "[line 3] Error at 'foo': Expect ';' after value."
        );
    }

    #[test]
    fn parse_error_at_end_of_input() {
        let token = Token::new(TokenType::EOF, "", None, 7);
        let err = LucaError::parse(&token, "Expect expression.");

        assert_eq!(err.to_string(), "[line 7] Error at end: Expect expression.");
    }

    #[test]
    fn runtime_error_puts_line_below_message() {
        let token = Token::new(TokenType::MINUS, "-", None, 2);
        let err = LucaError::runtime(&token, "Operand must be a number.");

        assert_eq!(err.to_string(), "Operand must be a number.\n[line 2]");
        assert!(!err.is_static());
    }
}
