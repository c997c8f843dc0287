//! Lexer for command lines.
//!
//! Converts a preprocessed line into a stream of tokens using the logos
//! lexer generator. Quoting follows the usual shell rules: single quotes
//! are literal, double quotes allow backslash escapes, and a bare
//! backslash escapes the next character. Adjacent word segments with no
//! whitespace between them (`foo"bar baz"`) merge into a single word, so
//! arguments may contain spaces or the `|`/`&` metacharacters themselves.

use logos::Logos;

use crate::error::ParseError;

/// Raw lexemes as logos sees them. Word segments are merged into
/// [`Token::Word`]s by [`tokenize`]; whitespace is kept as an explicit
/// segment boundary rather than skipped.
#[derive(Logos, Debug, Clone, PartialEq)]
enum RawToken {
    #[token("|")]
    Pipe,

    #[token("&")]
    Amp,

    #[token("<")]
    RedirectIn,

    #[token(">")]
    RedirectOut,

    #[regex(r"[ \t]+")]
    Whitespace,

    #[regex(r#"[^ \t|&<>'"\\]+"#, |lex| lex.slice().to_owned())]
    Bare(String),

    #[regex(r"'[^']*'", |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].to_owned()
    })]
    SingleQuoted(String),

    #[regex(r#""(\\.|[^"\\])*""#, |lex| {
        let s = lex.slice();
        unescape(&s[1..s.len() - 1])
    })]
    DoubleQuoted(String),

    #[regex(r"\\.", |lex| lex.slice()[1..].to_owned())]
    Escaped(String),
}

/// Tokens handed to the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A complete word: program name, argument, or redirection target.
    Word(String),
    /// Unquoted `|`.
    Pipe,
    /// Unquoted `&`.
    Amp,
    /// Unquoted `<`.
    RedirectIn,
    /// Unquoted `>`.
    RedirectOut,
}

/// Strip backslash escapes inside a double-quoted segment.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Tokenize one command line.
///
/// Fails with [`ParseError::UnterminatedQuote`] when a quote is opened
/// but never closed, and [`ParseError::UnexpectedCharacter`] for input
/// logos cannot match (in practice only a trailing lone backslash).
pub fn tokenize(line: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = RawToken::lexer(line);
    let mut out = Vec::new();
    // Pending word built from adjacent segments. `Some("")` is a real
    // (empty) word, produced by '' or "".
    let mut word: Option<String> = None;

    let mut flush = |word: &mut Option<String>, out: &mut Vec<Token>| {
        if let Some(w) = word.take() {
            out.push(Token::Word(w));
        }
    };

    while let Some(item) = lexer.next() {
        match item {
            Ok(RawToken::Bare(s))
            | Ok(RawToken::SingleQuoted(s))
            | Ok(RawToken::DoubleQuoted(s))
            | Ok(RawToken::Escaped(s)) => {
                word.get_or_insert_with(String::new).push_str(&s);
            }
            Ok(RawToken::Whitespace) => flush(&mut word, &mut out),
            Ok(RawToken::Pipe) => {
                flush(&mut word, &mut out);
                out.push(Token::Pipe);
            }
            Ok(RawToken::Amp) => {
                flush(&mut word, &mut out);
                out.push(Token::Amp);
            }
            Ok(RawToken::RedirectIn) => {
                flush(&mut word, &mut out);
                out.push(Token::RedirectIn);
            }
            Ok(RawToken::RedirectOut) => {
                flush(&mut word, &mut out);
                out.push(Token::RedirectOut);
            }
            Err(()) => {
                let at = lexer.span().start;
                let rest = &line[at..];
                return Err(match rest.chars().next() {
                    Some('\'') | Some('"') => ParseError::UnterminatedQuote,
                    _ => ParseError::UnexpectedCharacter(at),
                });
            }
        }
    }
    flush(&mut word, &mut out);

    Ok(out)
}
