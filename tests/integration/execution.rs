//! Integration tests for parser + interpreter pipeline
//! Tests dispatch, builtins, and sourcing against the real process state

use crash_ast::{CrashError, Origin};
use crash_interpreter::resolver::Resolver;
use crash_interpreter::{Flow, Interpreter};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;

// Working directory and environment are shared by every test in this binary
static PROCESS_STATE: Mutex<()> = Mutex::new(());

fn lock() -> MutexGuard<'static, ()> {
    PROCESS_STATE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[test]
fn test_resolver_prefers_exact_match_across_roots() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    fs::create_dir(first.path().join("nested")).unwrap();
    fs::write(first.path().join("nested").join("grepx"), "").unwrap();
    fs::write(second.path().join("grep"), "").unwrap();

    let search_path = format!("{}:{}", first.path().display(), second.path().display());
    let resolution = Resolver::default().resolve("grep", &search_path);

    assert_eq!(resolution.found, Some(second.path().join("grep")));
}

#[test]
fn test_resolver_suggestion_without_match() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("python3"), "").unwrap();
    fs::write(root.path().join("perl"), "").unwrap();

    let resolution = Resolver::default().resolve("pyhton3", &root.path().display().to_string());

    assert_eq!(resolution.found, None);
    assert_eq!(resolution.closest, "python3");
}

#[test]
fn test_sourced_script_runs_child_processes() {
    let _guard = lock();
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("marker");
    let tool = dir.path().join("touch-marker");
    fs::write(&tool, format!("#!/bin/sh\n: > {}\n", marker.display())).unwrap();
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

    let script = dir.path().join("setup.crash");
    fs::write(
        &script,
        format!("PATH={}\ntouch-marker\n", dir.path().display()),
    )
    .unwrap();

    let saved_path = std::env::var_os("PATH");
    let mut interpreter = Interpreter::new();
    let flow = interpreter.execute(&format!(". {}", script.display()));
    if let Some(saved_path) = saved_path {
        // SAFETY: every test touching the environment holds PROCESS_STATE
        unsafe { std::env::set_var("PATH", saved_path) };
    }

    assert_eq!(flow.unwrap(), Flow::Continue);
    assert!(marker.exists());
    assert_eq!(interpreter.exit_code(), 0);
}

#[test]
fn test_assignment_visible_to_later_expansion() {
    let _guard = lock();
    let dir = TempDir::new().unwrap();
    let original = std::env::current_dir().unwrap();

    let mut interpreter = Interpreter::new();
    interpreter
        .execute(&format!("CRASH_IT_TARGET={}", dir.path().display()))
        .unwrap();
    interpreter.execute("cd $CRASH_IT_TARGET").unwrap();

    let now = std::env::current_dir().unwrap();
    std::env::set_current_dir(&original).unwrap();
    assert_eq!(now.canonicalize().unwrap(), dir.path().canonicalize().unwrap());
}

#[test]
fn test_errors_carry_origin() {
    let _guard = lock();
    let mut interpreter = Interpreter::new();
    let error = interpreter
        .execute_from("cd /definitely/not/here", &Origin::Argument)
        .unwrap_err();

    assert!(matches!(error, CrashError::ChangeDirectory { .. }));
    assert_eq!(error.origin(), Some(&Origin::Argument));
    assert!(error.to_string().starts_with("crash:<-c>: ERR_CD"));
}

#[test]
fn test_depth_limit_applies_to_mutual_sourcing() {
    let _guard = lock();
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.crash");
    let b = dir.path().join("b.crash");
    fs::write(&a, format!(". {}\n", b.display())).unwrap();
    fs::write(&b, format!(". {}\n", a.display())).unwrap();

    let mut interpreter = Interpreter::with_settings(Resolver::default(), 6);
    let error = interpreter.execute(&format!(". {}", a.display())).unwrap_err();

    assert!(matches!(error, CrashError::DepthExceeded { limit: 6, .. }));
}
