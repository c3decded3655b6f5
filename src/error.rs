// src/error.rs
//! Error taxonomy.
//!
//! Two tiers: [`IndexError`] aborts the whole run and is only raised before
//! traversal starts; [`UnitError`] belongs to a single code unit and is
//! recorded in the failure log while the scan carries on.

use std::path::PathBuf;

/// Fatal, run-level errors.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("invalid root {}: {reason}", path.display())]
    InvalidRoot { path: PathBuf, reason: &'static str },

    #[error("module `{name}` not found under search paths [{searched}]")]
    ModuleNotFound { name: String, searched: String },

    #[error("ignore file {}: {message}", path.display())]
    IgnoreFile { path: PathBuf, message: String },

    #[error("config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("thread pool: {0}")]
    ThreadPool(String),
}

/// Why a unit could not be brought into a parsed, reflectable form.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("binary content")]
    Binary,

    #[error("not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("parser: {0}")]
    Parser(String),
}

/// Per-unit failure. Never propagated past the unit boundary.
#[derive(Debug, thiserror::Error)]
pub enum UnitError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("reflection error: {0}")]
    Reflection(String),

    #[error("walk error at {path}: {message}")]
    Walk { path: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_message_carries_position() {
        let e = UnitError::from(LoadError::Syntax {
            line: 3,
            column: 7,
            message: "unexpected token".into(),
        });
        assert_eq!(
            e.to_string(),
            "syntax error at line 3, column 7: unexpected token"
        );
    }

    #[test]
    fn invalid_root_names_path() {
        let e = IndexError::InvalidRoot {
            path: PathBuf::from("/nope"),
            reason: "does not exist",
        };
        assert_eq!(e.to_string(), "invalid root /nope: does not exist");
    }
}
