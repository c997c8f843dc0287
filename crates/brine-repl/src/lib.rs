//! brine REPL — the interactive front end for the brine kernel.
//!
//! The REPL owns a tokio runtime and a [`Kernel`] and feeds it one line
//! at a time. Between lines it drains the kernel's completion notices so
//! finished background jobs get announced right before the next prompt,
//! never in the middle of typing.
//!
//! Command history goes through rustyline and persists under the user's
//! data directory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tokio::runtime::Runtime;

use brine_kernel::{ExecResult, Kernel};

/// REPL state: the kernel plus the runtime its futures run on.
pub struct Repl {
    kernel: Kernel,
    runtime: Runtime,
}

impl Repl {
    /// Create an interactive REPL session.
    pub fn new() -> Result<Self> {
        Self::with_interactive(true)
    }

    /// Create a session, interactive or batch. Batch sessions give
    /// foreground children a null stdin instead of the terminal.
    pub fn with_interactive(interactive: bool) -> Result<Self> {
        let runtime = Runtime::new().context("Failed to create tokio runtime")?;
        // Kernel::new spawns the reaper, so it needs the runtime context.
        let kernel = {
            let _guard = runtime.enter();
            Kernel::new(interactive)
        };
        Ok(Self { kernel, runtime })
    }

    /// Execute one line, print its result, and return the exit code.
    /// Parse and launch failures count as code 1.
    pub fn run_line(&mut self, line: &str) -> i64 {
        if line.trim().is_empty() {
            return 0;
        }

        match self.runtime.block_on(self.kernel.execute(line)) {
            Ok(result) => {
                print_result(&result);
                result.code
            }
            Err(e) => {
                eprintln!("brine: {e}");
                1
            }
        }
    }

    /// Execute one line and print its result. Returns false once `exit`
    /// has run and the loop should stop.
    pub fn process_line(&mut self, line: &str) -> bool {
        self.run_line(line);
        !self.kernel.should_exit()
    }

    /// Print any background-completion notices that arrived since the
    /// last prompt.
    pub fn print_notices(&mut self) {
        for notice in self.kernel.drain_notices() {
            println!("{notice}");
        }
    }

    pub fn kernel(&mut self) -> &mut Kernel {
        &mut self.kernel
    }
}

/// Print an [`ExecResult`] the way a shell does: stdout as-is, stderr
/// as-is, and a status line only when a foreground command failed.
fn print_result(result: &ExecResult) {
    if !result.out.is_empty() {
        print!("{}", result.out);
    }
    if !result.err.is_empty() {
        eprint!("{}", result.err);
    }
    if !result.ok() {
        eprintln!("exit status {}", result.code);
    }
}

fn prompt() -> String {
    std::env::var("BRINE_PROMPT").unwrap_or_else(|_| "$ ".to_string())
}

fn history_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.data_dir().join("brine").join("history.txt"))
}

fn save_history(rl: &mut Editor<(), DefaultHistory>, history_path: &Option<PathBuf>) {
    if let Some(path) = history_path {
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!("Failed to create history directory: {}", e);
            }
        }
        if let Err(e) = rl.save_history(path) {
            tracing::warn!("Failed to save history: {}", e);
        }
    }
}

/// Run the interactive loop until `exit` or EOF.
pub fn run() -> Result<()> {
    println!("brine v{}", env!("CARGO_PKG_VERSION"));
    println!("Type help for commands, exit to leave.");

    let mut rl: Editor<(), DefaultHistory> = Editor::new().context("Failed to create editor")?;

    let history_path = history_path();
    if let Some(ref path) = history_path {
        if let Err(e) = rl.load_history(path) {
            // Missing history is normal on first run.
            let is_not_found = matches!(&e, ReadlineError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound);
            if !is_not_found {
                tracing::warn!("Failed to load history: {}", e);
            }
        }
    }

    let mut repl = Repl::new()?;
    println!();

    loop {
        repl.print_notices();

        match rl.readline(&prompt()) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                if let Err(e) = rl.add_history_entry(line.as_str()) {
                    tracing::warn!("Failed to add history entry: {}", e);
                }
                if !repl.process_line(&line) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    save_history(&mut rl, &history_path);

    Ok(())
}
