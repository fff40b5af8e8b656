//! Shared data model for CRASH
//!
//! Holds the classified form of an input line, the argument vector handed to
//! `exec`, and the error type every crate in the workspace reports through.

use std::ffi::{CStr, CString};
use std::fmt;
use std::path::PathBuf;

/// Where a line came from, for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Typed at the prompt
    Interactive,
    /// Passed with `-c`
    Argument,
    /// Read from a sourced file, 1-based line number
    File { path: PathBuf, line: usize },
}

impl Origin {
    #[must_use]
    pub fn file(path: impl Into<PathBuf>, line: usize) -> Self {
        Self::File {
            path: path.into(),
            line,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interactive => write!(f, "<stdin>"),
            Self::Argument => write!(f, "<-c>"),
            Self::File { path, line } => write!(f, "{}:{line}", path.display()),
        }
    }
}

/// A line after syntax classification.
///
/// Classification follows a fixed precedence: assignment, then background
/// marker, then chaining. Expansion and field splitting happen later, at
/// dispatch time, and only for `Command`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Nothing to run (blank line)
    Empty,
    /// `NAME=VALUE`
    Assign { name: String, value: String },
    /// `a; b; c` - each piece is a full line of its own
    Chain(Vec<String>),
    /// A single command, not yet expanded
    Command { text: String, background: bool },
}

/// Parsed fields of a command line. The first field is the command name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArgVector {
    args: Vec<String>,
}

impl ArgVector {
    #[must_use]
    pub const fn new(args: Vec<String>) -> Self {
        Self { args }
    }

    /// The command name, or `""` for an empty vector
    #[must_use]
    pub fn command(&self) -> &str {
        self.args.first().map_or("", String::as_str)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Convert every field into an owned C string for `exec`.
    ///
    /// # Errors
    ///
    /// Returns `CrashError::InvalidArgument` if a field contains a NUL byte
    pub fn to_exec_args(&self) -> Result<ExecArgs, CrashError> {
        let owned = self
            .args
            .iter()
            .map(|arg| {
                CString::new(arg.as_bytes()).map_err(|_| CrashError::InvalidArgument {
                    argument: arg.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ExecArgs { owned })
    }
}

impl From<Vec<String>> for ArgVector {
    fn from(args: Vec<String>) -> Self {
        Self::new(args)
    }
}

/// Owned C strings backing an `exec` call.
///
/// Must outlive every [`ExecView`] borrowed from it, which the borrow checker
/// enforces through the view's lifetime.
#[derive(Debug)]
pub struct ExecArgs {
    owned: Vec<CString>,
}

impl ExecArgs {
    /// Borrow the arguments as the slice `execv` expects
    #[must_use]
    pub fn view(&self) -> ExecView<'_> {
        ExecView {
            items: self.owned.iter().map(CString::as_c_str).collect(),
        }
    }
}

/// Borrowed view of [`ExecArgs`]; the NULL sentinel is appended by the exec wrapper.
#[derive(Debug)]
pub struct ExecView<'a> {
    items: Vec<&'a CStr>,
}

impl<'a> ExecView<'a> {
    #[must_use]
    pub fn as_slice(&self) -> &[&'a CStr] {
        &self.items
    }
}

/// Error types with origin information
#[derive(thiserror::Error, Debug)]
pub enum CrashError {
    #[error("crash:{origin}: ERR_CD: Cannot cd to {dir}: {reason}")]
    ChangeDirectory {
        dir: String,
        reason: String,
        origin: Origin,
    },

    #[error("crash:{origin}: ERR_SOURCE: cannot read {path}: {reason}")]
    Source {
        path: PathBuf,
        reason: String,
        origin: Origin,
    },

    #[error("crash:{origin}: ERR_ASSIGN: invalid variable assignment {line:?}")]
    Assignment { line: String, origin: Origin },

    #[error("crash:{origin}: ERR_FORK: fork failed: {reason}")]
    Fork { reason: String, origin: Origin },

    #[error("crash:{origin}: ERR_WAIT: waiting for process {pid} failed: {reason}")]
    Wait {
        pid: i32,
        reason: String,
        origin: Origin,
    },

    #[error("crash:{origin}: ERR_DEPTH: nesting deeper than {limit} levels")]
    DepthExceeded { limit: usize, origin: Origin },

    #[error("ERR_ARGS: argument contains a NUL byte: {argument:?}")]
    InvalidArgument { argument: String },
}

impl CrashError {
    /// Where the failing line came from, if known
    #[must_use]
    pub const fn origin(&self) -> Option<&Origin> {
        match self {
            Self::ChangeDirectory { origin, .. }
            | Self::Source { origin, .. }
            | Self::Assignment { origin, .. }
            | Self::Fork { origin, .. }
            | Self::Wait { origin, .. }
            | Self::DepthExceeded { origin, .. } => Some(origin),
            Self::InvalidArgument { .. } => None,
        }
    }
}
