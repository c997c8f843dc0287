//! alias / unalias — edit the alias table.

use async_trait::async_trait;

use super::{Builtin, BuiltinCtx};
use crate::error::{NotFoundError, ShellError};
use crate::result::ExecResult;

/// `alias`: list aliases, or define one as `alias name=command`.
pub struct Alias;

#[async_trait]
impl Builtin for Alias {
    fn name(&self) -> &str {
        "alias"
    }

    fn summary(&self) -> &str {
        "alias [name=command]  define a command alias, or list them"
    }

    async fn run(&self, arg: &str, ctx: &mut BuiltinCtx<'_>) -> Result<ExecResult, ShellError> {
        if arg.is_empty() {
            if ctx.aliases.is_empty() {
                return Ok(ExecResult::success("(no aliases)\n"));
            }
            let mut out = String::new();
            for (name, command) in ctx.aliases.entries() {
                out.push_str(&format!("{name}={command}\n"));
            }
            return Ok(ExecResult::success(out));
        }

        match arg.split_once('=') {
            Some((name, command)) if !name.trim().is_empty() => {
                ctx.aliases.set(name.trim(), command.trim());
                Ok(ExecResult::success(""))
            }
            _ => Ok(ExecResult::failure(1, "usage: alias name=command\n")),
        }
    }
}

/// `unalias name`: remove an alias.
pub struct Unalias;

#[async_trait]
impl Builtin for Unalias {
    fn name(&self) -> &str {
        "unalias"
    }

    fn summary(&self) -> &str {
        "unalias <name>        remove a command alias"
    }

    async fn run(&self, arg: &str, ctx: &mut BuiltinCtx<'_>) -> Result<ExecResult, ShellError> {
        if arg.is_empty() {
            return Ok(ExecResult::failure(1, "usage: unalias <name>\n"));
        }
        if ctx.aliases.remove(arg) {
            Ok(ExecResult::success(""))
        } else {
            Err(NotFoundError::Alias(arg.to_string()).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::testing::TestCtx;

    #[tokio::test]
    async fn test_define_and_list() {
        let mut state = TestCtx::new();
        Alias
            .run("ll=ls -la", &mut state.ctx())
            .await
            .unwrap();

        let result = Alias.run("", &mut state.ctx()).await.unwrap();
        assert_eq!(result.out, "ll=ls -la\n");
        assert_eq!(state.aliases.get("ll"), Some("ls -la"));
    }

    #[tokio::test]
    async fn test_value_may_contain_equals() {
        let mut state = TestCtx::new();
        Alias
            .run("go=make BUILD=release", &mut state.ctx())
            .await
            .unwrap();
        assert_eq!(state.aliases.get("go"), Some("make BUILD=release"));
    }

    #[tokio::test]
    async fn test_bad_definition() {
        let mut state = TestCtx::new();
        let result = Alias.run("nonsense", &mut state.ctx()).await.unwrap();
        assert!(!result.ok());
    }

    #[tokio::test]
    async fn test_unalias_missing_is_not_found() {
        let mut state = TestCtx::new();
        let err = Unalias.run("nope", &mut state.ctx()).await.unwrap_err();
        assert!(matches!(
            err,
            ShellError::NotFound(NotFoundError::Alias(_))
        ));
    }

    #[tokio::test]
    async fn test_unalias_removes() {
        let mut state = TestCtx::new();
        Alias.run("g=git", &mut state.ctx()).await.unwrap();
        Unalias.run("g", &mut state.ctx()).await.unwrap();
        assert!(state.aliases.get("g").is_none());
    }
}
