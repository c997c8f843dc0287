//! brine CLI entry point.
//!
//! Usage:
//!   brine                      # Interactive REPL
//!   brine -c <command>         # Execute one line and exit
//!   brine script.sh            # Run a script file

use std::env;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        None => {
            brine_repl::run()?;
            Ok(ExitCode::SUCCESS)
        }

        Some("--help" | "-h") => {
            print_help();
            Ok(ExitCode::SUCCESS)
        }

        Some("--version" | "-V") => {
            println!("brine {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }

        Some("-c") => {
            let cmd = args.get(2).context("-c requires a command argument")?;
            run_command(cmd)
        }

        Some(path) if !path.starts_with('-') => run_script(path),

        Some(unknown) => {
            eprintln!("Unknown option: {unknown}");
            eprintln!("Run 'brine --help' for usage.");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_help() {
    println!(
        r#"brine v{}

Usage:
  brine                        Interactive REPL
  brine -c <command>           Execute one line and exit
  brine <script>               Run a script file

Options:
  -c <command>                 Execute command string and exit
  -h, --help                   Show this help
  -V, --version                Show version

Examples:
  brine                        # Start interactive shell
  brine -c 'echo hello'        # Run a single command
  brine setup.sh               # Run a script
"#,
        env!("CARGO_PKG_VERSION")
    );
}

/// Execute a single command string in a batch session.
fn run_command(cmd: &str) -> Result<ExitCode> {
    let mut repl = brine_repl::Repl::with_interactive(false)?;
    let code = repl.run_line(cmd);
    repl.print_notices();
    Ok(ExitCode::from(code as u8))
}

/// Run a script file line by line. Blank lines and `#` comments are
/// skipped; execution continues past failed lines, like the REPL.
fn run_script(path: &str) -> Result<ExitCode> {
    let source =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read script: {path}"))?;

    let mut repl = brine_repl::Repl::with_interactive(false)?;

    let mut code = 0;
    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        code = repl.run_line(trimmed);
        if repl.kernel().should_exit() {
            break;
        }
    }
    repl.print_notices();

    Ok(ExitCode::from(code as u8))
}
