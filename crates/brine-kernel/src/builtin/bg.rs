//! bg — list background jobs, or resume one.

use async_trait::async_trait;

use super::{Builtin, BuiltinCtx};
use crate::error::{NotFoundError, ShellError};
use crate::result::ExecResult;
use crate::scheduler::JobId;

/// With no argument, lists Running jobs as `[id] command`. With a job
/// id, validates it against the table and resumes the pipeline's
/// children with SIGCONT.
pub struct Bg;

#[async_trait]
impl Builtin for Bg {
    fn name(&self) -> &str {
        "bg"
    }

    fn summary(&self) -> &str {
        "bg [job_id]           list background jobs, or resume one"
    }

    async fn run(&self, arg: &str, ctx: &mut BuiltinCtx<'_>) -> Result<ExecResult, ShellError> {
        if arg.is_empty() {
            let jobs = ctx.jobs.list().await;
            if jobs.is_empty() {
                return Ok(ExecResult::success("(no jobs)\n"));
            }
            let mut out = String::new();
            for job in jobs {
                out.push_str(&format!("[{}] {}\n", job.id, job.command));
            }
            return Ok(ExecResult::success(out));
        }

        let id = match arg.parse::<u64>() {
            Ok(id) => JobId(id),
            Err(_) => {
                return Ok(ExecResult::failure(
                    1,
                    format!("bg: invalid job id: {arg}\n"),
                ))
            }
        };

        // Validation must not mutate the table.
        let pids = match ctx.jobs.pids(id).await {
            Some(pids) => pids,
            None => return Err(NotFoundError::Job(id.0).into()),
        };

        resume(&pids)?;
        Ok(ExecResult::success(format!("[{id}] resumed\n")))
    }
}

#[cfg(unix)]
fn resume(pids: &[u32]) -> Result<(), ShellError> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    for pid in pids {
        // A stage that already exited is gone from the process table;
        // ESRCH here is not worth failing the whole resume over.
        let _ = kill(Pid::from_raw(*pid as i32), Signal::SIGCONT);
    }
    Ok(())
}

#[cfg(not(unix))]
fn resume(_pids: &[u32]) -> Result<(), ShellError> {
    Ok(())
}
