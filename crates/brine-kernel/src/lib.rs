//! brine-kernel: the engine of the brine shell.
//!
//! This crate provides:
//!
//! - **Lexer**: Tokenizes command lines using logos, with shell-style quoting
//! - **Parser**: Splits tokens into pipeline stages and detects redirection
//!   and the trailing background marker
//! - **Expand**: Environment-variable and alias substitution ahead of parsing
//! - **Scheduler**: Pipeline execution, the job table, and the reaper task
//! - **Builtins**: The handful of commands that must run inside the shell
//!   process (alias, cd, bg, ...)
//! - **Kernel**: The session object that ties the pieces together

pub mod builtin;
pub mod error;
pub mod expand;
pub mod kernel;
pub mod lexer;
pub mod parser;
pub mod result;
pub mod scheduler;

pub use error::{LaunchError, NotFoundError, ParseError, ShellError};
pub use expand::AliasTable;
pub use kernel::Kernel;
pub use parser::{ExecMode, Pipeline, Stage};
pub use result::ExecResult;
pub use scheduler::{JobId, JobInfo, JobTable};
