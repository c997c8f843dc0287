//! Integration tests for the brine REPL driver.
//!
//! These exercise the `Repl` the way the binary does: batch mode, one
//! line at a time, checking returned exit codes and the exit flag.

use brine_repl::Repl;

fn batch_repl() -> Repl {
    Repl::with_interactive(false).expect("Failed to create REPL")
}

#[test]
fn run_line_returns_the_command_status() {
    let mut repl = batch_repl();
    assert_eq!(repl.run_line("true"), 0);
    assert_eq!(repl.run_line("false"), 1);
    assert_eq!(repl.run_line("echo hi"), 0);
}

#[test]
fn blank_lines_are_no_ops() {
    let mut repl = batch_repl();
    assert_eq!(repl.run_line(""), 0);
    assert_eq!(repl.run_line("   \t "), 0);
}

#[test]
fn parse_errors_are_reported_not_fatal() {
    let mut repl = batch_repl();
    assert_eq!(repl.run_line("a | | b"), 1);
    // The session keeps working afterwards.
    assert_eq!(repl.run_line("true"), 0);
}

#[test]
fn exit_stops_the_loop() {
    let mut repl = batch_repl();
    assert!(repl.process_line("echo one"));
    assert!(!repl.process_line("exit"));
}

#[test]
fn session_state_spans_lines() {
    let mut repl = batch_repl();
    repl.run_line("alias shout=echo LOUD");
    assert_eq!(repl.run_line("shout"), 0);
    repl.run_line("setenv BRINE_REPL_IT=works");
    assert_eq!(repl.run_line("getenv BRINE_REPL_IT"), 0);
}

#[test]
fn pipelines_run_end_to_end() {
    let mut repl = batch_repl();
    assert_eq!(repl.run_line("printf 'b\\na\\n' | sort | uniq"), 0);
}
