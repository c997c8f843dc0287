//! Line preprocessing: environment-variable and alias substitution.
//!
//! Runs once per line, before tokenization. `$NAME` occurrences are
//! replaced with the process environment value (empty string when
//! unset), then the first word is looked up in the alias table and
//! replaced by its expansion. A single pass only: aliases never expand
//! recursively, so `alias ls='ls -la'` cannot loop.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)").expect("valid regex"));

/// Alias name → replacement command text.
///
/// Written only by the `alias`/`unalias` builtins; read here during
/// preprocessing.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    map: HashMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, command: impl Into<String>) {
        self.map.insert(name.into(), command.into());
    }

    /// Remove an alias. Returns false when the name was not defined.
    pub fn remove(&mut self, name: &str) -> bool {
        self.map.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    /// All aliases, sorted by name for stable listings.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<_> = self
            .map
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort();
        entries
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Preprocess one line: environment substitution, then a single alias
/// substitution on the first word.
pub fn expand_line(line: &str, aliases: &AliasTable) -> String {
    let expanded = expand_env(line);
    expand_alias(&expanded, aliases)
}

fn expand_env(line: &str) -> String {
    VAR_RE
        .replace_all(line, |caps: &regex::Captures<'_>| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}

fn expand_alias(line: &str, aliases: &AliasTable) -> String {
    let trimmed = line.trim_start();
    let (first, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest),
        None => (trimmed, ""),
    };
    match aliases.get(first) {
        Some(replacement) if rest.is_empty() => replacement.to_string(),
        Some(replacement) => format!("{replacement} {rest}"),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_substitution() {
        std::env::set_var("BRINE_TEST_VAR", "hello");
        assert_eq!(expand_env("echo $BRINE_TEST_VAR!"), "echo hello!");
    }

    #[test]
    fn test_unset_var_expands_to_empty() {
        std::env::remove_var("BRINE_TEST_UNSET");
        assert_eq!(expand_env("echo [$BRINE_TEST_UNSET]"), "echo []");
    }

    #[test]
    fn test_lone_dollar_is_literal() {
        assert_eq!(expand_env("echo 100$ $ "), "echo 100$ $ ");
    }

    #[test]
    fn test_alias_first_word_only() {
        let mut aliases = AliasTable::new();
        aliases.set("ll", "ls -la");
        assert_eq!(expand_alias("ll /tmp", &aliases), "ls -la /tmp");
        assert_eq!(expand_alias("ll", &aliases), "ls -la");
        // Not the first word: untouched.
        assert_eq!(expand_alias("echo ll", &aliases), "echo ll");
    }

    #[test]
    fn test_alias_does_not_expand_recursively() {
        let mut aliases = AliasTable::new();
        aliases.set("ls", "ls --color");
        assert_eq!(expand_alias("ls /tmp", &aliases), "ls --color /tmp");
    }

    #[test]
    fn test_remove() {
        let mut aliases = AliasTable::new();
        aliases.set("g", "git");
        assert!(aliases.remove("g"));
        assert!(!aliases.remove("g"));
        assert_eq!(expand_alias("g st", &aliases), "g st");
    }
}
