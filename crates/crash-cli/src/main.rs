//! CRASH CLI
//!
//! Command-line entry point: one-shot commands, scripts, and the interactive
//! shell.

mod config;
mod repl;

use clap::{Arg, ArgAction, Command};
use crash_ast::{CrashError, Origin};
use crash_interpreter::resolver::Resolver;
use crash_interpreter::{Flow, Interpreter};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

const LOG_TARGETS: &[&str] = &["crash_cli", "crash_parser", "crash_interpreter"];

fn main() {
    let matches = Command::new("crash")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Crashes Randomly And Sometimes Hangs: a small interactive shell")
        .arg(
            Arg::new("command")
                .short('c')
                .long("command")
                .value_name("STRING")
                .help("Execute one command line and exit")
                .num_args(1),
        )
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .help("Script file to execute line by line")
                .index(1),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Configuration file (TOML)")
                .num_args(1),
        )
        .arg(
            Arg::new("no-rc")
                .long("no-rc")
                .help("Skip the startup file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    init_logging(matches.get_flag("debug"));

    let config_path = matches.get_one::<String>("config").map(PathBuf::from);
    let config = match config::load_config(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("crash: {e:#}");
            process::exit(1);
        }
    };

    let mut interpreter = Interpreter::with_settings(
        Resolver::new(config.excluded_prefixes.clone()),
        config.max_depth,
    );

    let result = if let Some(command_str) = matches.get_one::<String>("command") {
        Ok(execute_string(&mut interpreter, command_str))
    } else if let Some(file_path) = matches.get_one::<String>("file") {
        Ok(execute_file(&mut interpreter, Path::new(file_path)))
    } else {
        repl::run(&mut interpreter, &config, !matches.get_flag("no-rc"))
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("crash: {e:#}");
            process::exit(1);
        }
    }
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives: Vec<String> = LOG_TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect();
        EnvFilter::new(directives.join(","))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn execute_string(interpreter: &mut Interpreter, command_str: &str) -> i32 {
    let result = interpreter.execute_from(command_str, &Origin::Argument);
    finish(interpreter, result)
}

fn execute_file(interpreter: &mut Interpreter, file_path: &Path) -> i32 {
    let result = interpreter.source_file(file_path, &Origin::Argument);
    finish(interpreter, result)
}

/// Exit code for a non-interactive run: `exit` wins, then the last child
fn finish(interpreter: &Interpreter, result: Result<Flow, CrashError>) -> i32 {
    match result {
        Ok(Flow::Exit(code)) => code,
        Ok(Flow::Continue) => interpreter.exit_code(),
        Err(err) => {
            Interpreter::report(&err);
            1
        }
    }
}
