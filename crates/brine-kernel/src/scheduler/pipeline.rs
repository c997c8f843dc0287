//! Pipeline execution.
//!
//! The one and only place that creates stage connectors and launches
//! processes. Every stage of a pipeline is spawned before anything is
//! waited on, with each stage's stdout handed to the next stage's stdin
//! as a real OS pipe. Data streams between stages without buffering in
//! the shell, so output larger than a pipe buffer cannot deadlock.
//!
//! Foreground pipelines block the caller until the final stage exits and
//! report its captured output and exit status. Background pipelines are
//! registered in the job table as a unit and control returns at once; a
//! watcher task per stage feeds the reaper when children exit.

use std::fs::File;
use std::process::Stdio;
use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};

use super::job::JobTable;
use super::reaper::{ExitEvent, ExitSender};
use crate::error::{LaunchError, ShellError};
use crate::parser::{ExecMode, Pipeline, Stage};
use crate::result::{exit_code, ExecResult};

/// What a first stage without explicit `< file` redirection reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdinMode {
    /// The interpreter's own stdin (interactive foreground use).
    Inherit,
    /// Nothing (batch lines and background pipelines).
    Null,
}

impl StdinMode {
    fn to_stdio(self) -> Stdio {
        match self {
            StdinMode::Inherit => Stdio::inherit(),
            StdinMode::Null => Stdio::null(),
        }
    }
}

/// All children of a successfully launched pipeline, plus the capture
/// handle for the final stage's stdout when it was piped.
struct LaunchedPipeline {
    children: Vec<Child>,
    captured: Option<ChildStdout>,
}

/// Runs pipelines against a shared job table.
pub struct PipelineRunner {
    table: Arc<JobTable>,
    exits: ExitSender,
}

impl PipelineRunner {
    pub fn new(table: Arc<JobTable>, exits: ExitSender) -> Self {
        Self { table, exits }
    }

    /// Execute `pipeline` to its completion point: the final exit status
    /// for foreground runs, the registered job for background runs.
    #[tracing::instrument(level = "debug", skip(self, pipeline), fields(stages = pipeline.stages.len(), mode = ?mode))]
    pub async fn run(
        &self,
        pipeline: &Pipeline,
        mode: ExecMode,
        stdin: StdinMode,
    ) -> Result<ExecResult, ShellError> {
        match mode {
            ExecMode::Foreground => Ok(self.run_foreground(pipeline, stdin).await?),
            ExecMode::Background => Ok(self.run_background(pipeline).await?),
        }
    }

    async fn run_foreground(
        &self,
        pipeline: &Pipeline,
        stdin: StdinMode,
    ) -> Result<ExecResult, LaunchError> {
        let launched = launch_all(pipeline, stdin, true)?;

        // Drain the final stage's stdout before waiting so a full pipe
        // cannot wedge the child.
        let mut out_buf = Vec::new();
        let mut children = launched.children;
        if let Some(mut captured) = launched.captured {
            captured
                .read_to_end(&mut out_buf)
                .await
                .map_err(LaunchError::Io)?;
        }

        // Reap every stage; the pipeline's status is the last stage's.
        let mut last = ExecResult::default();
        for child in &mut children {
            let status = child.wait().await.map_err(LaunchError::Io)?;
            last = ExecResult::from_status(status, String::new());
        }
        last.out = String::from_utf8_lossy(&out_buf).into_owned();
        Ok(last)
    }

    async fn run_background(&self, pipeline: &Pipeline) -> Result<ExecResult, LaunchError> {
        // Background stages never read the terminal; their output goes
        // straight to the inherited stdout/stderr.
        let launched = launch_all(pipeline, StdinMode::Null, false)?;

        let pids: Vec<u32> = launched
            .children
            .iter()
            .map(|child| child.id().unwrap_or_default())
            .collect();
        let id = self
            .table
            .insert(pipeline.display.clone(), pids.clone())
            .await;
        tracing::debug!(job = %id, ?pids, "registered background job");

        // One watcher per stage: await the exit future, notify the reaper.
        for (pid, mut child) in pids.into_iter().zip(launched.children) {
            let exits = self.exits.clone();
            tokio::spawn(async move {
                let code = match child.wait().await {
                    Ok(status) => exit_code(status),
                    Err(_) => -1,
                };
                exits.send(ExitEvent { pid, code });
            });
        }

        Ok(ExecResult::success(format!(
            "[{}] {}\n",
            id, pipeline.display
        )))
    }
}

/// Spawn every stage with its streams wired up. On a launch failure the
/// stages already started are handed to [`abandon`] (left to terminate
/// naturally, reaped off-task) and no job state is touched; the pending
/// pipe endpoint is dropped, closing it.
fn launch_all(
    pipeline: &Pipeline,
    stdin: StdinMode,
    capture_last: bool,
) -> Result<LaunchedPipeline, LaunchError> {
    let count = pipeline.stages.len();
    let mut children: Vec<Child> = Vec::with_capacity(count);
    let mut upstream: Option<ChildStdout> = None;
    let mut captured = None;

    for (i, stage) in pipeline.stages.iter().enumerate() {
        let last = i == count - 1;

        let result = launch_stage(stage, upstream.take(), stdin, last, capture_last);
        let mut child = match result {
            Ok(child) => child,
            Err(err) => {
                abandon(children);
                return Err(err);
            }
        };

        if last {
            captured = child.stdout.take();
        } else {
            upstream = child.stdout.take();
        }
        children.push(child);
    }

    Ok(LaunchedPipeline { children, captured })
}

/// Spawn one stage with the given upstream connector.
///
/// Opening a `< file` redirection happens here, before the spawn, so a
/// missing input file surfaces as a [`LaunchError`] rather than a
/// runtime I/O error inside the child. Stderr is always inherited:
/// diagnostics reach the user even when stdout is piped or redirected.
fn launch_stage(
    stage: &Stage,
    upstream: Option<ChildStdout>,
    stdin: StdinMode,
    last: bool,
    capture_last: bool,
) -> Result<Child, LaunchError> {
    let stdin = match (&stage.stdin_file, upstream) {
        (Some(path), _) => {
            let file = File::open(path).map_err(|source| LaunchError::BadRedirect {
                path: path.clone(),
                source,
            })?;
            Stdio::from(file)
        }
        (None, Some(upstream)) => upstream.try_into().map_err(LaunchError::Io)?,
        (None, None) => stdin.to_stdio(),
    };

    let stdout = match &stage.stdout_file {
        Some(path) => {
            // Truncates, creating the file when absent.
            let file = File::create(path).map_err(|source| LaunchError::BadRedirect {
                path: path.clone(),
                source,
            })?;
            Stdio::from(file)
        }
        None if !last || capture_last => Stdio::piped(),
        None => Stdio::inherit(),
    };

    Command::new(&stage.program)
        .args(&stage.args)
        .stdin(stdin)
        .stdout(stdout)
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|err| LaunchError::from_spawn(&stage.program, err))
}

/// Let already-started stages of a torn-down pipeline run to completion
/// and reap them, without blocking the caller.
fn abandon(children: Vec<Child>) {
    if children.is_empty() {
        return;
    }
    tokio::spawn(async move {
        for mut child in children {
            let _ = child.wait().await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::scheduler::Reaper;
    use std::time::Duration;

    fn runner() -> (PipelineRunner, Arc<JobTable>) {
        let table = Arc::new(JobTable::new());
        let (exits, _notices) = Reaper::spawn(table.clone());
        (PipelineRunner::new(table.clone(), exits), table)
    }

    async fn run_fg(runner: &PipelineRunner, line: &str) -> Result<ExecResult, ShellError> {
        let (pipeline, mode) = parse(line).unwrap();
        runner.run(&pipeline, mode, StdinMode::Null).await
    }

    #[tokio::test]
    async fn test_single_stage_captures_output() {
        let (runner, _) = runner();
        let result = run_fg(&runner, "echo hello").await.unwrap();
        assert!(result.ok());
        assert_eq!(result.out, "hello\n");
    }

    #[tokio::test]
    async fn test_pipeline_matches_native_composition() {
        let (runner, _) = runner();
        // Equivalent to `echo -e 'b\na\nb' | sort | uniq` run natively.
        let result = run_fg(&runner, "printf 'b\\na\\nb\\n' | sort | uniq")
            .await
            .unwrap();
        assert!(result.ok());
        assert_eq!(result.out, "a\nb\n");
    }

    #[tokio::test]
    async fn test_exit_status_is_data() {
        let (runner, _) = runner();
        let result = run_fg(&runner, "false").await.unwrap();
        assert_eq!(result.code, 1);
        assert!(result.out.is_empty());
    }

    #[tokio::test]
    async fn test_status_comes_from_last_stage() {
        let (runner, _) = runner();
        let result = run_fg(&runner, "false | true").await.unwrap();
        assert!(result.ok());
        let result = run_fg(&runner, "true | false").await.unwrap();
        assert_eq!(result.code, 1);
    }

    #[tokio::test]
    async fn test_missing_program_is_launch_error() {
        let (runner, _) = runner();
        let err = run_fg(&runner, "brine-no-such-program-zz").await.unwrap_err();
        assert!(matches!(
            err,
            ShellError::Launch(LaunchError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_mid_pipeline_launch_failure_tears_down() {
        let (runner, table) = runner();
        let err = run_fg(&runner, "sleep 5 | brine-no-such-program-zz | cat")
            .await
            .unwrap_err();
        assert!(matches!(err, ShellError::Launch(_)));
        // No partial job may be registered.
        assert!(table.is_empty().await);
    }

    #[tokio::test]
    async fn test_missing_input_redirect_fails_before_spawn() {
        let (runner, _) = runner();
        let err = run_fg(&runner, "cat < /definitely/not/a/file").await.unwrap_err();
        assert!(matches!(
            err,
            ShellError::Launch(LaunchError::BadRedirect { .. })
        ));
    }

    #[tokio::test]
    async fn test_redirect_round_trip_is_byte_exact() {
        let (runner, _) = runner();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let path = path.to_str().unwrap();

        let result = run_fg(&runner, &format!("printf 'one\\ntwo' > {path}"))
            .await
            .unwrap();
        assert!(result.ok());
        // Output reporting is suppressed when redirected.
        assert!(result.out.is_empty());

        let result = run_fg(&runner, &format!("cat < {path}")).await.unwrap();
        assert_eq!(result.out, "one\ntwo");
    }

    #[tokio::test]
    async fn test_redirect_round_trip_zero_length() {
        let (runner, _) = runner();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        let path = path.to_str().unwrap();

        run_fg(&runner, &format!("true > {path}")).await.unwrap();
        let result = run_fg(&runner, &format!("cat < {path}")).await.unwrap();
        assert!(result.ok());
        assert_eq!(result.out, "");
    }

    #[tokio::test]
    async fn test_output_redirect_truncates() {
        let (runner, _) = runner();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trunc.txt");
        let path = path.to_str().unwrap();

        run_fg(&runner, &format!("echo long-old-contents > {path}"))
            .await
            .unwrap();
        run_fg(&runner, &format!("echo hi > {path}")).await.unwrap();
        let result = run_fg(&runner, &format!("cat < {path}")).await.unwrap();
        assert_eq!(result.out, "hi\n");
    }

    #[tokio::test]
    async fn test_background_registers_one_running_job() {
        let (runner, table) = runner();
        let (pipeline, mode) = parse("sleep 5 &").unwrap();
        let result = runner
            .run(&pipeline, mode, StdinMode::Null)
            .await
            .unwrap();
        assert!(result.ok());
        assert!(result.out.starts_with("[1]"));

        let listing = table.list().await;
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].command, "sleep 5");
    }

    #[tokio::test]
    async fn test_background_job_is_reaped_after_exit() {
        let (runner, table) = runner();
        let (pipeline, mode) = parse("true &").unwrap();
        runner.run(&pipeline, mode, StdinMode::Null).await.unwrap();

        for _ in 0..200 {
            if table.is_empty().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(table.is_empty().await);
    }

    #[tokio::test]
    async fn test_background_launch_failure_registers_nothing() {
        let (runner, table) = runner();
        let (pipeline, mode) = parse("brine-no-such-program-zz &").unwrap();
        let err = runner
            .run(&pipeline, mode, StdinMode::Null)
            .await
            .unwrap_err();
        assert!(matches!(err, ShellError::Launch(_)));
        assert!(table.is_empty().await);
    }
}
