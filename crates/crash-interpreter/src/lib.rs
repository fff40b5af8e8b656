//! CRASH interpreter
//!
//! Dispatches one line at a time: assignments, chained lines, built-ins and
//! external commands run in a forked child.

use crash_ast::{CrashError, Directive, Origin};
use crash_parser::expansion::{ProcessEnv, expand};
use crash_parser::{Parser, split_arguments};
use std::path::Path;
use tracing::debug;

mod builtin;
pub mod distance;
pub mod process;
pub mod resolver;
pub mod signal;

use builtin::Builtin;
use process::WaitMode;
use resolver::Resolver;

/// Nesting limit for chained and sourced lines unless configured otherwise
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// What the caller should do after a line has been dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// `exit` ran; terminate the process with this code
    Exit(i32),
}

pub struct Interpreter {
    resolver: Resolver,
    max_depth: usize,
    depth: usize,
    exit_code: i32,
}

impl Interpreter {
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(Resolver::default(), DEFAULT_MAX_DEPTH)
    }

    #[must_use]
    pub fn with_settings(resolver: Resolver, max_depth: usize) -> Self {
        Self {
            resolver,
            max_depth,
            depth: 0,
            exit_code: 0,
        }
    }

    /// Exit code of the last foreground command
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Execute a line typed at the prompt
    ///
    /// # Errors
    ///
    /// Returns `CrashError` if the line cannot be carried out; the shell
    /// reports it and keeps running
    pub fn execute(&mut self, line: &str) -> Result<Flow, CrashError> {
        self.execute_from(line, &Origin::Interactive)
    }

    /// Execute a line, attributing errors to `origin`
    ///
    /// # Errors
    ///
    /// Returns `CrashError` if the line cannot be carried out
    pub fn execute_from(&mut self, line: &str, origin: &Origin) -> Result<Flow, CrashError> {
        match Parser::new(line).parse() {
            Directive::Empty => Ok(Flow::Continue),
            Directive::Assign { name, value } => {
                assign(&name, &value, line, origin)?;
                Ok(Flow::Continue)
            }
            Directive::Chain(pieces) => self.execute_chain(&pieces, origin),
            Directive::Command { text, background } => {
                self.execute_command(&text, background, origin)
            }
        }
    }

    /// Run every line of `path` through the dispatcher
    ///
    /// # Errors
    ///
    /// Returns `CrashError::Source` if the file cannot be read and
    /// `CrashError::DepthExceeded` if sourcing nests too deeply
    pub fn source_file(&mut self, path: &Path, origin: &Origin) -> Result<Flow, CrashError> {
        let content = std::fs::read(path).map_err(|err| CrashError::Source {
            path: path.to_path_buf(),
            reason: err.to_string(),
            origin: origin.clone(),
        })?;
        debug!(path = %path.display(), "sourcing");

        for (index, raw) in content.split(|byte| *byte == b'\n').enumerate() {
            let Ok(line) = std::str::from_utf8(raw) else {
                debug!(path = %path.display(), line = index + 1, "skipping line that is not UTF-8");
                continue;
            };
            let line_origin = Origin::file(path, index + 1);
            if let Flow::Exit(code) = self.execute_nested(line, &line_origin)? {
                return Ok(Flow::Exit(code));
            }
        }

        Ok(Flow::Continue)
    }

    /// Report an error the way the shell does
    pub fn report(error: &CrashError) {
        eprintln!("{error}");
    }

    fn execute_chain(&mut self, pieces: &[String], origin: &Origin) -> Result<Flow, CrashError> {
        for piece in pieces {
            if let Flow::Exit(code) = self.execute_nested(piece, origin)? {
                return Ok(Flow::Exit(code));
            }
        }
        Ok(Flow::Continue)
    }

    /// Re-enter the dispatcher one level deeper.
    ///
    /// Ordinary failures are reported and swallowed so the next line still
    /// runs; only the depth limit unwinds the whole stack.
    fn execute_nested(&mut self, line: &str, origin: &Origin) -> Result<Flow, CrashError> {
        if self.depth >= self.max_depth {
            return Err(CrashError::DepthExceeded {
                limit: self.max_depth,
                origin: origin.clone(),
            });
        }

        self.depth += 1;
        let result = self.execute_from(line, origin);
        self.depth -= 1;

        match result {
            Err(error @ CrashError::DepthExceeded { .. }) => Err(error),
            Err(error) => {
                Self::report(&error);
                Ok(Flow::Continue)
            }
            flow => flow,
        }
    }

    fn execute_command(
        &mut self,
        text: &str,
        background: bool,
        origin: &Origin,
    ) -> Result<Flow, CrashError> {
        let expanded = expand(text, &ProcessEnv);
        let argv = split_arguments(&expanded);
        if argv.command().is_empty() {
            // Everything expanded away
            return Ok(Flow::Continue);
        }
        debug!(command = argv.command(), args = argv.len(), background, "dispatching");

        match Builtin::lookup(argv.command()) {
            Some(Builtin::Exit) => Ok(Flow::Exit(0)),
            Some(Builtin::Cd) => {
                builtin::change_directory(argv.get(1), origin)?;
                Ok(Flow::Continue)
            }
            Some(Builtin::Source) => match argv.get(1) {
                Some(file) => self.source_file(Path::new(file), origin),
                None => Err(CrashError::Source {
                    path: "".into(),
                    reason: "missing file operand".to_string(),
                    origin: origin.clone(),
                }),
            },
            None => {
                let mode = if background {
                    WaitMode::Background
                } else {
                    WaitMode::Foreground
                };
                if let Some(code) = process::spawn(&argv, &self.resolver, mode, origin)? {
                    self.exit_code = code;
                }
                Ok(Flow::Continue)
            }
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Set a process environment variable, visible to every later child
fn assign(name: &str, value: &str, line: &str, origin: &Origin) -> Result<(), CrashError> {
    if name.is_empty() || name.contains('\0') || value.contains('\0') {
        return Err(CrashError::Assignment {
            line: line.to_string(),
            origin: origin.clone(),
        });
    }
    debug!(name, "assigning");
    // SAFETY: the shell runs on a single thread, nothing reads the
    // environment concurrently
    unsafe { std::env::set_var(name, value) };
    Ok(())
}
