//! `help` and `exit`.

use async_trait::async_trait;

use super::{Builtin, BuiltinCtx};
use crate::error::ShellError;
use crate::result::ExecResult;

pub struct Help;

#[async_trait]
impl Builtin for Help {
    fn name(&self) -> &str {
        "help"
    }

    fn summary(&self) -> &str {
        "help                  show this message"
    }

    async fn run(&self, _arg: &str, ctx: &mut BuiltinCtx<'_>) -> Result<ExecResult, ShellError> {
        let mut out = String::from("brine builtins:\n");
        for summary in ctx.summaries {
            out.push_str("  ");
            out.push_str(summary);
            out.push('\n');
        }
        out.push_str(
            "\nAnything else runs as an external command. Pipelines with `|`,\n\
             redirects with `<` and `>`, background with a trailing `&`.\n",
        );
        Ok(ExecResult::success(out))
    }
}

pub struct Exit;

#[async_trait]
impl Builtin for Exit {
    fn name(&self) -> &str {
        "exit"
    }

    fn summary(&self) -> &str {
        "exit                  leave the shell"
    }

    async fn run(&self, _arg: &str, ctx: &mut BuiltinCtx<'_>) -> Result<ExecResult, ShellError> {
        *ctx.exit_requested = true;
        Ok(ExecResult::success("Goodbye!\n"))
    }
}
