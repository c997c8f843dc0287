//! Parser for command lines.
//!
//! Turns a token stream into a [`Pipeline`] (ordered stages) plus an
//! [`ExecMode`]. The grammar is deliberately small:
//!
//! ```text
//! line     := stage ( '|' stage )* '&'?
//! stage    := word+ redirect*
//! redirect := '<' word | '>' word
//! ```
//!
//! Input redirection is only meaningful on the first stage and output
//! redirection on the last; anywhere else it is a parse error rather
//! than a silently dropped token.

use std::path::PathBuf;

use crate::error::ParseError;
use crate::lexer::{tokenize, Token};

/// One external program invocation within a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    /// Program name (resolved against PATH at spawn time).
    pub program: String,
    /// Arguments, not including the program name.
    pub args: Vec<String>,
    /// `< file` on the first stage.
    pub stdin_file: Option<PathBuf>,
    /// `> file` on the last stage.
    pub stdout_file: Option<PathBuf>,
}

/// An ordered chain of stages connected by byte streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub stages: Vec<Stage>,
    /// Original command text, kept for job listings.
    pub display: String,
}

/// Whether the caller waits for the pipeline or detaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    Foreground,
    Background,
}

/// Parse one preprocessed command line.
pub fn parse(line: &str) -> Result<(Pipeline, ExecMode), ParseError> {
    let mut tokens = tokenize(line)?;
    if tokens.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    // A trailing unquoted `&` detaches the pipeline. Anywhere else the
    // background marker is ambiguous and rejected outright.
    let mode = if tokens.last() == Some(&Token::Amp) {
        tokens.pop();
        ExecMode::Background
    } else {
        ExecMode::Foreground
    };
    if tokens.contains(&Token::Amp) {
        return Err(ParseError::BackgroundNotLast);
    }
    if tokens.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let groups: Vec<&[Token]> = tokens.split(|t| *t == Token::Pipe).collect();
    let last_group = groups.len() - 1;

    let mut stages = Vec::with_capacity(groups.len());
    for (i, group) in groups.iter().enumerate() {
        stages.push(parse_stage(group, i == 0, i == last_group)?);
    }

    let display = match mode {
        ExecMode::Foreground => line.trim().to_string(),
        ExecMode::Background => line.trim().trim_end_matches('&').trim_end().to_string(),
    };

    Ok((Pipeline { stages, display }, mode))
}

fn parse_stage(tokens: &[Token], first: bool, last: bool) -> Result<Stage, ParseError> {
    let mut argv: Vec<String> = Vec::new();
    let mut stdin_file = None;
    let mut stdout_file = None;

    let mut iter = tokens.iter();
    while let Some(token) = iter.next() {
        match token {
            Token::Word(w) => argv.push(w.clone()),
            Token::RedirectIn => {
                if !first {
                    return Err(ParseError::MisplacedRedirect);
                }
                stdin_file = Some(PathBuf::from(redirect_target(&mut iter, '<')?));
            }
            Token::RedirectOut => {
                if !last {
                    return Err(ParseError::MisplacedRedirect);
                }
                stdout_file = Some(PathBuf::from(redirect_target(&mut iter, '>')?));
            }
            // `|` split the groups and `&` was stripped above.
            Token::Pipe | Token::Amp => unreachable!(),
        }
    }

    if argv.is_empty() {
        return Err(ParseError::EmptyStage);
    }
    let program = argv.remove(0);

    Ok(Stage {
        program,
        args: argv,
        stdin_file,
        stdout_file,
    })
}

fn redirect_target<'a>(
    iter: &mut std::slice::Iter<'a, Token>,
    which: char,
) -> Result<&'a str, ParseError> {
    match iter.next() {
        Some(Token::Word(w)) => Ok(w),
        _ => Err(ParseError::MissingRedirectTarget(which)),
    }
}
