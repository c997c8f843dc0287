//! Scheduler module — pipelines and background jobs.
//!
//! This module provides:
//! - **Pipeline execution**: Spawn all stages of a pipeline concurrently,
//!   connected by real OS pipes, and either wait (foreground) or detach
//!   (background).
//! - **Job table**: Backgrounded pipelines tracked as a unit, keyed by a
//!   monotonically increasing job id and indexed by child pid.
//! - **Reaper**: A dedicated task that drains child-exit events, resolves
//!   them to jobs by pid, and removes finished jobs from the table.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       PipelineRunner                         │
//! │  ┌─────────┐  OS pipe   ┌─────────┐  OS pipe   ┌─────────┐   │
//! │  │ stage 1 │───────────▶│ stage 2 │───────────▶│ stage 3 │   │
//! │  │ (spawn) │   stdout   │ (spawn) │   stdout   │ (spawn) │   │
//! │  └─────────┘            └─────────┘            └─────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//!
//!   stage watchers ──ExitEvent──▶ Reaper task ──▶ JobTable.finish_pid()
//!                                      │
//!                                      └──notice──▶ prompt loop
//! ```

mod job;
mod pipeline;
mod reaper;

pub use job::{Job, JobId, JobInfo, JobState, JobTable};
pub use pipeline::{PipelineRunner, StdinMode};
pub use reaper::{ExitEvent, ExitSender, NoticeReceiver, Reaper};
