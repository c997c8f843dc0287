//! Environment builtins: `setenv` and `getenv`.

use std::env;

use async_trait::async_trait;

use super::{Builtin, BuiltinCtx};
use crate::error::ShellError;
use crate::result::ExecResult;

/// `setenv NAME=value`: set a process environment variable. Children
/// inherit it, and `$NAME` expands to it on later lines.
pub struct Setenv;

#[async_trait]
impl Builtin for Setenv {
    fn name(&self) -> &str {
        "setenv"
    }

    fn summary(&self) -> &str {
        "setenv NAME=value     set an environment variable"
    }

    async fn run(&self, arg: &str, _ctx: &mut BuiltinCtx<'_>) -> Result<ExecResult, ShellError> {
        let Some((name, value)) = arg.split_once('=') else {
            return Ok(ExecResult::failure(1, "usage: setenv NAME=value\n"));
        };
        let name = name.trim();
        if name.is_empty() {
            return Ok(ExecResult::failure(1, "usage: setenv NAME=value\n"));
        }
        env::set_var(name, value.trim());
        Ok(ExecResult::success(""))
    }
}

/// `getenv NAME`: print one variable, or every variable when called
/// with no argument.
pub struct Getenv;

#[async_trait]
impl Builtin for Getenv {
    fn name(&self) -> &str {
        "getenv"
    }

    fn summary(&self) -> &str {
        "getenv [NAME]         print one or all environment variables"
    }

    async fn run(&self, arg: &str, _ctx: &mut BuiltinCtx<'_>) -> Result<ExecResult, ShellError> {
        if arg.is_empty() {
            let mut pairs: Vec<(String, String)> = env::vars().collect();
            pairs.sort();
            let mut out = String::new();
            for (name, value) in pairs {
                out.push_str(&format!("{name}={value}\n"));
            }
            return Ok(ExecResult::success(out));
        }

        match env::var(arg) {
            Ok(value) => Ok(ExecResult::success(format!("{arg}={value}\n"))),
            Err(_) => Ok(ExecResult::failure(1, format!("getenv: {arg}: not set\n"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::testing::TestCtx;

    #[tokio::test]
    async fn test_setenv_then_getenv() {
        let mut state = TestCtx::new();
        let result = Setenv
            .run("BRINE_ENV_TEST=salty", &mut state.ctx())
            .await
            .unwrap();
        assert!(result.ok());

        let result = Getenv.run("BRINE_ENV_TEST", &mut state.ctx()).await.unwrap();
        assert_eq!(result.out, "BRINE_ENV_TEST=salty\n");
    }

    #[tokio::test]
    async fn test_setenv_without_equals_is_usage_error() {
        let mut state = TestCtx::new();
        let result = Setenv.run("JUSTANAME", &mut state.ctx()).await.unwrap();
        assert!(!result.ok());
        assert!(result.err.contains("usage"));
    }

    #[tokio::test]
    async fn test_getenv_unset_variable() {
        let mut state = TestCtx::new();
        let result = Getenv
            .run("BRINE_DEFINITELY_UNSET_ZZ", &mut state.ctx())
            .await
            .unwrap();
        assert!(!result.ok());
    }
}
