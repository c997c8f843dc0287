//! Builtin commands.
//!
//! The few commands that must run inside the shell process because they
//! mutate session state (the alias table, the working directory, the
//! environment) or read the job table. Everything else is a real OS
//! process and goes through the scheduler.
//!
//! Builtins are dispatched on the first word of the preprocessed line;
//! the rest of the line is handed over as a raw argument string, the way
//! classic command-loop shells do it.

mod alias;
mod bg;
mod cd;
mod env;
mod help;

pub use alias::{Alias, Unalias};
pub use bg::Bg;
pub use cd::{Cd, Pwd};
pub use env::{Getenv, Setenv};
pub use help::{Exit, Help};

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ShellError;
use crate::expand::AliasTable;
use crate::result::ExecResult;
use crate::scheduler::JobTable;

/// Mutable slice of session state a builtin may touch.
pub struct BuiltinCtx<'a> {
    pub aliases: &'a mut AliasTable,
    pub jobs: &'a Arc<JobTable>,
    /// One summary line per registered builtin, for `help`.
    pub summaries: &'a [String],
    /// Set by `exit`; the command loop checks it after each line.
    pub exit_requested: &'a mut bool,
}

/// One builtin command.
#[async_trait]
pub trait Builtin: Send + Sync {
    fn name(&self) -> &str;

    /// One-line summary for `help`.
    fn summary(&self) -> &str;

    /// Run with the raw argument text (everything after the command
    /// word, trimmed).
    async fn run(&self, arg: &str, ctx: &mut BuiltinCtx<'_>) -> Result<ExecResult, ShellError>;
}

/// Name → builtin lookup.
pub struct BuiltinRegistry {
    builtins: Vec<Box<dyn Builtin>>,
}

impl BuiltinRegistry {
    /// The default builtin set.
    pub fn with_defaults() -> Self {
        Self {
            builtins: vec![
                Box::new(Alias),
                Box::new(Unalias),
                Box::new(Bg),
                Box::new(Cd),
                Box::new(Pwd),
                Box::new(Setenv),
                Box::new(Getenv),
                Box::new(Help),
                Box::new(Exit),
            ],
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Builtin> {
        self.builtins
            .iter()
            .find(|b| b.name() == name)
            .map(Box::as_ref)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Builtin> {
        self.builtins.iter().map(Box::as_ref)
    }

    pub fn summaries(&self) -> Vec<String> {
        self.builtins.iter().map(|b| b.summary().to_string()).collect()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let registry = BuiltinRegistry::with_defaults();
        assert!(registry.get("alias").is_some());
        assert!(registry.get("bg").is_some());
        assert!(registry.get("ls").is_none());
    }

    #[test]
    fn test_names_are_unique() {
        let registry = BuiltinRegistry::with_defaults();
        let mut names: Vec<_> = registry.iter().map(|b| b.name().to_string()).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
