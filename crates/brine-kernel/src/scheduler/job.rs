//! The job table: backgrounded pipelines tracked as a unit.
//!
//! Each background pipeline becomes one [`Job`], owned exclusively by the
//! [`JobTable`]. The table is the only structure shared between the
//! command loop and the reaper, so every access goes through one mutex.
//! Jobs move `Running → Finished(code) → removed`; a finished job is
//! removed immediately and its id is never reused.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;

/// Unique identifier for a background job. Strictly increasing for the
/// lifetime of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of a background job. The only valid transition is
/// `Running → Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Running,
    /// Exit code of the pipeline's final stage.
    Finished(i64),
}

/// One backgrounded pipeline.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    /// Original command text, for listings and completion notices.
    pub command: String,
    /// Child pids in launch order.
    pub pids: Vec<u32>,
    /// The pipeline's status is the exit status of this child.
    pub last_pid: u32,
    pub state: JobState,
}

/// Listing row: `(job id, display command)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInfo {
    pub id: JobId,
    pub command: String,
}

#[derive(Debug, Default)]
struct Inner {
    /// Keyed by id; ids are monotonic so iteration order is insertion
    /// order.
    jobs: BTreeMap<JobId, Job>,
    /// Reaper resolution index: which job owns a given child.
    by_pid: HashMap<u32, JobId>,
}

/// Thread-safe registry of running background jobs.
#[derive(Debug)]
pub struct JobTable {
    next_id: AtomicU64,
    inner: Mutex<Inner>,
}

impl JobTable {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Register a freshly launched pipeline as one Running job and assign
    /// the next id. `pids` must be in launch order; the last entry is the
    /// stage whose exit status becomes the job's status.
    pub async fn insert(&self, command: String, pids: Vec<u32>) -> JobId {
        let id = JobId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let last_pid = pids.last().copied().unwrap_or_default();
        let mut inner = self.inner.lock().await;
        for pid in &pids {
            inner.by_pid.insert(*pid, id);
        }
        inner.jobs.insert(
            id,
            Job {
                id,
                command,
                pids,
                last_pid,
                state: JobState::Running,
            },
        );
        id
    }

    /// Currently Running jobs, in insertion order.
    pub async fn list(&self) -> Vec<JobInfo> {
        let inner = self.inner.lock().await;
        inner
            .jobs
            .values()
            .filter(|job| job.state == JobState::Running)
            .map(|job| JobInfo {
                id: job.id,
                command: job.command.clone(),
            })
            .collect()
    }

    pub async fn contains(&self, id: JobId) -> bool {
        let inner = self.inner.lock().await;
        inner.jobs.contains_key(&id)
    }

    /// Child pids of a tracked job, for the resume action.
    pub async fn pids(&self, id: JobId) -> Option<Vec<u32>> {
        let inner = self.inner.lock().await;
        inner.jobs.get(&id).map(|job| job.pids.clone())
    }

    /// Record that child `pid` exited with `code`.
    ///
    /// Resolution is by pid, never by command text. An untracked pid (a
    /// foreground child, or a stage of an already-finished job) returns
    /// None and mutates nothing. When the exited child is the job's final
    /// stage, the job transitions to `Finished(code)`, is removed along
    /// with its remaining pid index entries, and is returned for
    /// reporting. Idempotent: a second event for the same pid is a miss.
    pub async fn finish_pid(&self, pid: u32, code: i64) -> Option<Job> {
        let mut inner = self.inner.lock().await;
        let id = inner.by_pid.remove(&pid)?;
        let job = inner.jobs.get_mut(&id)?;
        if pid != job.last_pid {
            // An upstream stage finished early; the job keeps running.
            return None;
        }
        job.state = JobState::Finished(code);
        let job = inner.jobs.remove(&id)?;
        for stale in &job.pids {
            inner.by_pid.remove(stale);
        }
        Some(job)
    }

    pub async fn len(&self) -> usize {
        let inner = self.inner.lock().await;
        inner.jobs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new()
    }
}
