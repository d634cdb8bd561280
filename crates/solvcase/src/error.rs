//! Error types for testcase reading and writing.
//!
//! [`TestcaseError`] aborts an operation. [`ParseError`] describes a single
//! malformed directive or token; those are collected in [`Diagnostics`] and
//! reading continues.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TestcaseError>;

/// Fatal errors while reading or writing a testcase bundle.
#[derive(Error, Debug)]
pub enum TestcaseError {
    #[error("could not create directory '{}'", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not open '{}'", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("read error on '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("write error on '{}'", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("repo format '{format}': {message}")]
    Format { format: String, message: String },
}

/// A recoverable problem with one line or token of a testcase.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("bad line '{0}'")]
    BadLine(String),

    #[error("unknown job '{0}'")]
    UnknownJob(String),

    #[error("unknown job flag '{0}'")]
    UnknownJobFlag(String),

    #[error("unknown selection flag '{0}'")]
    UnknownSelectionFlag(String),

    #[error("no selection flags")]
    NoSelectionFlags,

    #[error("unknown package '{0}'")]
    UnknownPackage(String),

    #[error("unknown repo '{0}'")]
    UnknownRepo(String),

    #[error("cannot parse dependency '{0}'")]
    BadDependency(String),

    #[error("unknown result flag '{0}'")]
    UnknownResultFlag(String),

    #[error("unknown pool flag '{0}'")]
    UnknownPoolFlag(String),

    #[error("unknown solver flag '{0}'")]
    UnknownSolverFlag(String),

    #[error("unknown repo type '{0}'")]
    UnknownRepoFormat(String),

    #[error("disttype '{0}' not supported")]
    UnsupportedDistType(String),

    #[error("unsupported feature '{0}'")]
    MissingFeature(String),

    #[error("{directive}: {message}")]
    Directive {
        directive: &'static str,
        message: String,
    },

    #[error("cannot parse command '{0}'")]
    UnknownCommand(String),
}

impl ParseError {
    pub(crate) fn directive(directive: &'static str, message: impl Into<String>) -> Self {
        ParseError::Directive {
            directive,
            message: message.into(),
        }
    }
}

/// A [`ParseError`] with the script line it was found on (0 when not tied to a line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub error: ParseError,
}

/// Sink for non-fatal errors.
///
/// Every reported error is logged at warn level and kept for the caller.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    line: usize,
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the line number attached to subsequently reported errors
    pub fn set_line(&mut self, line: usize) {
        self.line = line;
    }

    pub fn report(&mut self, error: ParseError) {
        if self.line > 0 {
            log::warn!("testcase line {}: {}", self.line, error);
        } else {
            log::warn!("testcase: {}", error);
        }
        self.entries.push(Diagnostic {
            line: self.line,
            error,
        });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Take all collected errors, leaving the sink empty
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_record_line() {
        let mut diag = Diagnostics::new();
        diag.report(ParseError::UnknownJob("frobnicate".to_string()));
        diag.set_line(7);
        diag.report(ParseError::NoSelectionFlags);

        assert_eq!(diag.len(), 2);
        assert_eq!(diag.entries()[0].line, 0);
        assert_eq!(diag.entries()[1].line, 7);

        let taken = diag.take();
        assert_eq!(taken.len(), 2);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ParseError::BadLine("job foo".to_string()).to_string(),
            "bad line 'job foo'"
        );
        assert_eq!(
            ParseError::directive("genid", "out of stack").to_string(),
            "genid: out of stack"
        );
    }
}
