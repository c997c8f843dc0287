//! The shell kernel: one session's worth of state plus the execute path.
//!
//! A [`Kernel`] owns the alias table, the job table, the builtin
//! registry, and the running reaper. The REPL (or a script driver)
//! feeds it one line at a time and prints whatever comes back.
//!
//! Line execution:
//!
//! ```text
//!   raw line
//!      |  expand::expand_line   ($VAR, then first-word alias)
//!      v
//!   builtin?  -- yes -->  BuiltinRegistry dispatch
//!      | no
//!      v
//!   parser::parse  ->  PipelineRunner::run
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::builtin::{BuiltinCtx, BuiltinRegistry};
use crate::error::ShellError;
use crate::expand::{expand_line, AliasTable};
use crate::parser;
use crate::result::ExecResult;
use crate::scheduler::{JobTable, NoticeReceiver, PipelineRunner, Reaper, StdinMode};

pub struct Kernel {
    aliases: AliasTable,
    jobs: Arc<JobTable>,
    runner: PipelineRunner,
    builtins: BuiltinRegistry,
    summaries: Vec<String>,
    notices: NoticeReceiver,
    interactive: bool,
    exit_requested: bool,
}

impl Kernel {
    /// Build a kernel and start its reaper. Must be called from within a
    /// tokio runtime.
    ///
    /// `interactive` controls whether foreground children inherit the
    /// shell's stdin; batch drivers pass `false` so a stray `cat` can
    /// never swallow the script.
    pub fn new(interactive: bool) -> Self {
        let jobs = Arc::new(JobTable::new());
        let (exits, notices) = Reaper::spawn(Arc::clone(&jobs));
        let builtins = BuiltinRegistry::with_defaults();
        let summaries = builtins.summaries();
        Self {
            aliases: AliasTable::new(),
            jobs: Arc::clone(&jobs),
            runner: PipelineRunner::new(jobs, exits),
            builtins,
            summaries,
            notices,
            interactive,
            exit_requested: false,
        }
    }

    /// Run one line of input through expansion, builtin dispatch, and
    /// the scheduler.
    #[tracing::instrument(level = "debug", skip(self, line))]
    pub async fn execute(&mut self, line: &str) -> Result<ExecResult, ShellError> {
        let expanded = expand_line(line, &self.aliases);
        let trimmed = expanded.trim();
        if trimmed.is_empty() {
            return Ok(ExecResult::success(""));
        }

        let (word, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (trimmed, ""),
        };
        if let Some(builtin) = self.builtins.get(word) {
            debug!(builtin = word, "dispatching builtin");
            let mut ctx = BuiltinCtx {
                aliases: &mut self.aliases,
                jobs: &self.jobs,
                summaries: &self.summaries,
                exit_requested: &mut self.exit_requested,
            };
            return builtin.run(rest, &mut ctx).await;
        }

        let (pipeline, mode) = parser::parse(trimmed)?;
        let stdin = if self.interactive {
            StdinMode::Inherit
        } else {
            StdinMode::Null
        };
        self.runner.run(&pipeline, mode, stdin).await
    }

    /// Completion notices accumulated since the last call, oldest first.
    /// The REPL prints these just before each prompt.
    pub fn drain_notices(&mut self) -> Vec<String> {
        self.notices.drain()
    }

    /// True once `exit` has run.
    pub fn should_exit(&self) -> bool {
        self.exit_requested
    }

    pub fn jobs(&self) -> &Arc<JobTable> {
        &self.jobs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_line_is_a_no_op() {
        let mut kernel = Kernel::new(false);
        let result = kernel.execute("   ").await.unwrap();
        assert!(result.ok());
        assert!(result.out.is_empty());
    }

    #[tokio::test]
    async fn test_external_command_output_is_captured() {
        let mut kernel = Kernel::new(false);
        let result = kernel.execute("echo hello kernel").await.unwrap();
        assert_eq!(result.out, "hello kernel\n");
        assert_eq!(result.code, 0);
    }

    #[tokio::test]
    async fn test_alias_expands_before_dispatch() {
        let mut kernel = Kernel::new(false);
        kernel.execute("alias greet=echo hi").await.unwrap();
        let result = kernel.execute("greet there").await.unwrap();
        assert_eq!(result.out, "hi there\n");
    }

    #[tokio::test]
    async fn test_env_expansion_reaches_children() {
        let mut kernel = Kernel::new(false);
        kernel.execute("setenv BRINE_KERNEL_TEST=tide").await.unwrap();
        let result = kernel.execute("echo $BRINE_KERNEL_TEST").await.unwrap();
        assert_eq!(result.out, "tide\n");
    }

    #[tokio::test]
    async fn test_exit_builtin_flags_the_loop() {
        let mut kernel = Kernel::new(false);
        assert!(!kernel.should_exit());
        let result = kernel.execute("exit").await.unwrap();
        assert_eq!(result.out, "Goodbye!\n");
        assert!(kernel.should_exit());
    }

    #[tokio::test]
    async fn test_parse_errors_surface_as_shell_errors() {
        let mut kernel = Kernel::new(false);
        let err = kernel.execute("ls | | wc").await.unwrap_err();
        assert!(matches!(err, ShellError::Parse(_)));
    }

    #[tokio::test]
    async fn test_background_job_lands_in_table_and_notices_drain() {
        let mut kernel = Kernel::new(false);
        let result = kernel.execute("true &").await.unwrap();
        assert!(result.out.starts_with("[1] "));

        // Let the watcher and reaper catch the exit.
        let mut notices = Vec::new();
        for _ in 0..100 {
            notices = kernel.drain_notices();
            if !notices.is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert_eq!(notices.len(), 1);
        assert!(notices[0].contains("done"));
        assert!(kernel.jobs().is_empty().await);
    }
}
