//! Interactive loop: startup file, history, prompt.

use crate::config::CrashConfig;
use anyhow::Context;
use crash_ast::Origin;
use crash_interpreter::{Flow, Interpreter, signal};
use crash_parser::expansion::{ProcessEnv, expand_parameters};
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const GREETING: &str =
    "Hello, welcome to \x1b[38;5;196mCRASH! \x1b[0m(Crashes Randomly And Sometimes Hangs)";

/// `<label>-<user> <cwd>$ ` with colors. User and directory are read fresh
/// on every call.
#[must_use]
pub fn render_prompt(label: &str) -> String {
    let user = std::env::var("USER").unwrap_or_default();
    let cwd = std::env::current_dir()
        .map(|dir| dir.display().to_string())
        .unwrap_or_default();
    format!("\x1b[38;5;196m{label}-\x1b[92m{user} \x1b[0m{cwd}$ ")
}

/// Where the startup file lives after `~` expansion
#[must_use]
pub fn startup_path(config: &CrashConfig) -> PathBuf {
    PathBuf::from(expand_parameters(&config.startup_file, &ProcessEnv))
}

/// Run the startup file if it exists.
///
/// A missing file is normal. Any other failure is reported and the shell
/// still starts.
pub fn run_startup(interpreter: &mut Interpreter, path: &Path) -> Flow {
    if !path.is_file() {
        debug!(path = %path.display(), "no startup file");
        return Flow::Continue;
    }

    match interpreter.source_file(path, &Origin::file(path, 0)) {
        Ok(flow) => flow,
        Err(err) => {
            Interpreter::report(&err);
            Flow::Continue
        }
    }
}

/// Read-execute loop. Returns the process exit code.
///
/// # Errors
///
/// Returns an error if the terminal cannot be set up or reading input fails
pub fn run(interpreter: &mut Interpreter, config: &CrashConfig, load_rc: bool) -> anyhow::Result<i32> {
    let history_path = std::env::current_dir()
        .context("cannot determine working directory")?
        .join(&config.history_file);

    let editor_config = Config::builder()
        .max_history_size(config.history_limit)?
        .history_ignore_dups(false)?
        .auto_add_history(false)
        .build();
    let mut editor = DefaultEditor::with_config(editor_config)?;
    if let Err(err) = editor.load_history(&history_path) {
        debug!(path = %history_path.display(), %err, "no history loaded");
    }

    if load_rc {
        if let Flow::Exit(code) = run_startup(interpreter, &startup_path(config)) {
            return Ok(code);
        }
    }

    signal::install().context("cannot install interrupt handler")?;
    println!("{GREETING}");

    loop {
        match editor.readline(&render_prompt(&config.prompt_label)) {
            Ok(line) => {
                editor.add_history_entry(line.as_str())?;
                if let Err(err) = editor.save_history(&history_path) {
                    warn!(path = %history_path.display(), %err, "cannot write history");
                }

                match interpreter.execute(&line) {
                    Ok(Flow::Exit(code)) => return Ok(code),
                    Ok(Flow::Continue) => {}
                    Err(err) => Interpreter::report(&err),
                }
            }
            // Ctrl-C while editing: drop the line, prompt again
            Err(ReadlineError::Interrupted) => {}
            Err(ReadlineError::Eof) => return Ok(0),
            Err(err) => return Err(err.into()),
        }
    }
}
