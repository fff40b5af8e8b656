//! Interrupt forwarding runs in its own test binary: raising SIGINT here must
//! not reach children spawned by unrelated tests.

use crash_interpreter::process::CHILD;
use crash_interpreter::{Flow, Interpreter, signal};
use nix::sys::signal::{Signal, raise};
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_interrupt_terminates_foreground_child() {
    signal::install().unwrap();

    let runner = thread::spawn(|| {
        let mut interpreter = Interpreter::new();
        let started = Instant::now();
        let flow = interpreter.execute("sleep 30").unwrap();
        (flow, interpreter.exit_code(), started.elapsed())
    });

    // Wait for the child to be recorded before interrupting
    let deadline = Instant::now() + Duration::from_secs(10);
    while CHILD.get().is_none() {
        assert!(Instant::now() < deadline, "child was never spawned");
        thread::sleep(Duration::from_millis(20));
    }
    // Give the child time to exec so SIGTERM hits sleep, not the fork
    thread::sleep(Duration::from_millis(300));
    raise(Signal::SIGINT).unwrap();

    let (flow, code, elapsed) = runner.join().unwrap();
    assert_eq!(flow, Flow::Continue);
    assert_eq!(code, 128 + Signal::SIGTERM as i32);
    assert!(elapsed < Duration::from_secs(20));
    assert!(CHILD.get().is_none());
}

#[test]
fn test_interrupt_without_child_keeps_shell_alive() {
    signal::install().unwrap();
    // Nothing recorded yet in a fresh slot or after the other test reaped its child
    while CHILD.get().is_some() {
        thread::sleep(Duration::from_millis(20));
    }
    raise(Signal::SIGINT).unwrap();
    // Still running
    assert!(CHILD.get().is_none());
}
