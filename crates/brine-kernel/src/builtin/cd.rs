//! Working-directory builtins: `cd` and `pwd`.

use std::env;
use std::path::PathBuf;

use async_trait::async_trait;

use super::{Builtin, BuiltinCtx};
use crate::error::ShellError;
use crate::result::ExecResult;

/// `cd [dir]`: change the shell's working directory. With no argument
/// it goes to $HOME, like every other shell.
pub struct Cd;

#[async_trait]
impl Builtin for Cd {
    fn name(&self) -> &str {
        "cd"
    }

    fn summary(&self) -> &str {
        "cd [dir]              change working directory (default $HOME)"
    }

    async fn run(&self, arg: &str, _ctx: &mut BuiltinCtx<'_>) -> Result<ExecResult, ShellError> {
        let target = if arg.is_empty() {
            match env::var_os("HOME") {
                Some(home) => PathBuf::from(home),
                None => return Ok(ExecResult::failure(1, "cd: HOME not set\n")),
            }
        } else {
            PathBuf::from(arg)
        };

        match env::set_current_dir(&target) {
            Ok(()) => Ok(ExecResult::success("")),
            Err(e) => Ok(ExecResult::failure(
                1,
                format!("cd: {}: {e}\n", target.display()),
            )),
        }
    }
}

/// `pwd`: print the current working directory.
pub struct Pwd;

#[async_trait]
impl Builtin for Pwd {
    fn name(&self) -> &str {
        "pwd"
    }

    fn summary(&self) -> &str {
        "pwd                   print working directory"
    }

    async fn run(&self, _arg: &str, _ctx: &mut BuiltinCtx<'_>) -> Result<ExecResult, ShellError> {
        match env::current_dir() {
            Ok(dir) => Ok(ExecResult::success(format!("{}\n", dir.display()))),
            Err(e) => Ok(ExecResult::failure(1, format!("pwd: {e}\n"))),
        }
    }
}
