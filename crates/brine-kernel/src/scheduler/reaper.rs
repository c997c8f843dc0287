//! The reaper: reconciles exited children with the job table.
//!
//! Stage watchers await each child's exit future and send an
//! [`ExitEvent`] over an unbounded channel. The reaper is a dedicated
//! task on the receiving end, the async stand-in for a SIGCHLD handler,
//! but free to take the table lock because it runs in ordinary task
//! context. On every wakeup it drains *all* pending events before
//! sleeping again: several children can terminate between wakeups and
//! wakeups do not queue one-to-one with exits.
//!
//! Completion notices travel over a second channel, drained by the
//! prompt loop, so the reaper never writes to the terminal mid-edit.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::job::JobTable;

/// A child-exit notification from a stage watcher.
#[derive(Debug, Clone, Copy)]
pub struct ExitEvent {
    pub pid: u32,
    pub code: i64,
}

/// Cloneable sender handed to every stage watcher.
#[derive(Debug, Clone)]
pub struct ExitSender {
    tx: mpsc::UnboundedSender<ExitEvent>,
}

impl ExitSender {
    /// Non-blocking. If the reaper is gone the event is dropped, same as
    /// a signal nobody is listening for.
    pub fn send(&self, event: ExitEvent) {
        let _ = self.tx.send(event);
    }
}

/// Receiving end of the completion notices, owned by the prompt loop.
#[derive(Debug)]
pub struct NoticeReceiver {
    rx: mpsc::UnboundedReceiver<String>,
}

impl NoticeReceiver {
    /// Collect all pending notices. Non-blocking.
    pub fn drain(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(notice) = self.rx.try_recv() {
            out.push(notice);
        }
        out
    }
}

/// The reaper task.
pub struct Reaper;

impl Reaper {
    /// Spawn the reaper for `table`. Returns the event sender for stage
    /// watchers and the notice receiver for the prompt loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(table: Arc<JobTable>) -> (ExitSender, NoticeReceiver) {
        let (tx, mut rx) = mpsc::unbounded_channel::<ExitEvent>();
        let (notice_tx, notice_rx) = mpsc::unbounded_channel::<String>();

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                Self::reap(&table, event, &notice_tx).await;
                // Drain everything that already terminated before
                // blocking again.
                while let Ok(event) = rx.try_recv() {
                    Self::reap(&table, event, &notice_tx).await;
                }
            }
        });

        (ExitSender { tx }, NoticeReceiver { rx: notice_rx })
    }

    async fn reap(
        table: &JobTable,
        event: ExitEvent,
        notices: &mpsc::UnboundedSender<String>,
    ) {
        // Untracked pids (foreground children, stages of a job already
        // finished) resolve to nothing and are dropped silently.
        if let Some(job) = table.finish_pid(event.pid, event.code).await {
            tracing::debug!(job = %job.id, pid = event.pid, code = event.code, "background job finished");
            let _ = notices.send(format!("[{}] done ({}) {}", job.id, event.code, job.command));
        }
    }
}
