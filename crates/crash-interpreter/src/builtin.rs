//! Commands handled inside the shell process

use crash_ast::{CrashError, Origin};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Builtin {
    Exit,
    Cd,
    /// `. FILE`
    Source,
}

impl Builtin {
    pub(crate) fn lookup(name: &str) -> Option<Self> {
        match name {
            "exit" => Some(Self::Exit),
            "cd" => Some(Self::Cd),
            "." => Some(Self::Source),
            _ => None,
        }
    }
}

/// `cd [DIR]`; without an argument, go to `$HOME`
pub(crate) fn change_directory(target: Option<&str>, origin: &Origin) -> Result<(), CrashError> {
    let dir = match target {
        Some(dir) => dir.to_string(),
        None => std::env::var("HOME").unwrap_or_default(),
    };

    std::env::set_current_dir(&dir).map_err(|err| CrashError::ChangeDirectory {
        dir: dir.clone(),
        reason: err.to_string(),
        origin: origin.clone(),
    })?;
    debug!(dir, "changed directory");
    Ok(())
}
