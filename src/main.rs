//! Mutex CLI
//!
//! Runs a script file or an inline source string, or starts the REPL
//! when neither is given. Exit codes: 0 on success, 64 for command
//! line misuse, 65 for any source-level error.

use std::io::{BufRead, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mutex_lang::diagnostics::{PrintingSink, EXIT_USAGE};
use mutex_lang::Mutex;

#[derive(Parser)]
#[command(name = "mutex")]
#[command(about = "The Mutex scripting language")]
#[command(version)]
struct Cli {
    /// Execute the source from a command line argument
    #[arg(short = 'c')]
    source: Option<String>,

    /// Output the run result as JSON (value, exitCode)
    #[arg(long = "json")]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Script file to execute
    #[arg()]
    script_files: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if cli.script_files.len() > 1 || (cli.source.is_some() && !cli.script_files.is_empty()) {
        eprintln!("Usage: mutex <filepath>");
        return exit_code(EXIT_USAGE);
    }

    let source = if let Some(source) = cli.source {
        source
    } else if let Some(path) = cli.script_files.first() {
        match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                eprintln!("Error: Cannot read script file: {}: {}", path, e);
                return exit_code(EXIT_USAGE);
            }
        }
    } else {
        return run_repl();
    };

    run_source(&source, cli.json)
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    let subscriber = fmt::layer().with_target(false).with_writer(std::io::stderr);

    // A second init in the same process is harmless here.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init();
}

/// Execute a whole source text in a fresh interpreter.
fn run_source(source: &str, json: bool) -> ExitCode {
    let mut mutex = Mutex::new();
    let mut sink = PrintingSink;

    match mutex.run_to_stdout(source, &mut sink) {
        Ok(value) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "value": value.to_string(),
                        "exitCode": 0,
                    })
                );
            }
            ExitCode::SUCCESS
        }
        Err(diagnostic) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "error": &diagnostic,
                        "exitCode": diagnostic.exit_code,
                    })
                );
            }
            exit_code(diagnostic.exit_code)
        }
    }
}

/// Interactive loop. One interpreter instance lives for the whole
/// session so declarations persist; the error state resets every line.
fn run_repl() -> ExitCode {
    let mut mutex = Mutex::new();
    let mut sink = PrintingSink;

    let stdin = std::io::stdin();
    loop {
        print!(">> ");
        if std::io::stdout().flush().is_err() {
            return ExitCode::SUCCESS;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => return ExitCode::SUCCESS,
            Ok(_) => {}
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "@exit" {
            return ExitCode::SUCCESS;
        }

        // Diagnostics were already printed by the sink; keep going.
        if let Ok(value) = mutex.run_to_stdout(line, &mut sink) {
            println!("{}", value);
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(code as u8)
}
