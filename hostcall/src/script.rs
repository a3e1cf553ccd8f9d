//! Call scripts
//!
//! One call per line:
//!
//! ```text
//! ; comment
//! let util = resolve-class example.Util
//! invoke-static parseNumber $util "42"
//! ```
//!
//! Arguments are integers, `'c'` characters, `"strings"`, `t`, `nil`, bare
//! words (taken as strings) or `$name` references to earlier `let` results.

use crate::error::RuntimeError;
use crate::session::Session;
use crate::value::Value;
use logos::Logos;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Byte range in a script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

fn unescape(inner: &str) -> String {
    let mut result = String::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('0') => result.push('\0'),
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }
    result
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r]+")]
#[logos(skip r";[^\n]*")]
pub enum Token {
    #[token("let")]
    Let,
    #[token("=")]
    Eq,
    #[token("t")]
    True,
    #[token("nil")]
    Nil,
    #[token("\n")]
    Newline,

    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok(), priority = 2)]
    Int(i64),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        unescape(&s[1..s.len() - 1])
    })]
    Str(String),

    #[regex(r"'([^'\\]|\\.)'", |lex| {
        let s = lex.slice();
        let unescaped = unescape(&s[1..s.len() - 1]);
        let mut chars = unescaped.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    })]
    Char(char),

    #[regex(r"\$[a-zA-Z_][a-zA-Z0-9_\-]*", |lex| lex.slice()[1..].to_string())]
    Var(String),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_.\-]*", |lex| lex.slice().to_string(), priority = 1)]
    Word(String),
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Lexer error at {span}: {message}")]
    Lexer { message: String, span: Span },

    #[error("Parse error at {span}: {message}")]
    Parse { message: String, span: Span },

    #[error("Unbound variable ${name}")]
    Unbound { name: String, span: Span },

    #[error("{error}")]
    Runtime { error: RuntimeError, span: Span },
}

impl ScriptError {
    pub fn span(&self) -> Span {
        match self {
            ScriptError::Lexer { span, .. }
            | ScriptError::Parse { span, .. }
            | ScriptError::Unbound { span, .. }
            | ScriptError::Runtime { span, .. } => *span,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ScriptError::Lexer { .. } => "Lexer",
            ScriptError::Parse { .. } => "Parse",
            ScriptError::Unbound { .. } => "Binding",
            ScriptError::Runtime { .. } => "Runtime",
        }
    }

    fn label(&self) -> String {
        match self {
            ScriptError::Lexer { message, .. } | ScriptError::Parse { message, .. } => {
                message.clone()
            }
            ScriptError::Unbound { name, .. } => format!("`${name}` is not bound"),
            ScriptError::Runtime { error, .. } => error.message.clone(),
        }
    }
}

pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>, ScriptError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(_) => {
                return Err(ScriptError::Lexer {
                    message: format!("unexpected character: {:?}", lexer.slice()),
                    span,
                });
            }
        }
    }

    Ok(tokens)
}

/// A call argument as written
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Int(i64),
    Char(char),
    Str(String),
    T,
    Nil,
    Var(String),
}

/// One script line
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub binding: Option<String>,
    pub operation: String,
    pub args: Vec<(Arg, Span)>,
    pub span: Span,
}

fn parse_line(line: &[(Token, Span)], source: &str) -> Result<Call, ScriptError> {
    let unexpected = |what: &str, span: Span| ScriptError::Parse {
        message: format!("{what}, found {:?}", &source[span.start..span.end]),
        span,
    };

    let mut tokens = line.iter().peekable();
    let mut binding = None;
    let mut span = line[0].1;

    if let Some((Token::Let, let_span)) = tokens.peek() {
        let let_span = *let_span;
        tokens.next();
        match tokens.next() {
            Some((Token::Word(name), _)) => binding = Some(name.clone()),
            Some((_, s)) => return Err(unexpected("expected a variable name", *s)),
            None => {
                return Err(ScriptError::Parse {
                    message: "expected a variable name after `let`".to_string(),
                    span: let_span,
                });
            }
        }
        match tokens.next() {
            Some((Token::Eq, _)) => {}
            Some((_, s)) => return Err(unexpected("expected `=`", *s)),
            None => {
                return Err(ScriptError::Parse {
                    message: "expected `=`".to_string(),
                    span: let_span,
                });
            }
        }
    }

    let operation = match tokens.next() {
        Some((Token::Word(name), s)) => {
            span = span.merge(*s);
            name.clone()
        }
        Some((_, s)) => return Err(unexpected("expected an operation name", *s)),
        None => {
            return Err(ScriptError::Parse {
                message: "expected an operation name".to_string(),
                span,
            });
        }
    };

    let mut args = Vec::new();
    for (token, s) in tokens {
        let arg = match token {
            Token::Int(n) => Arg::Int(*n),
            Token::Char(c) => Arg::Char(*c),
            Token::Str(text) => Arg::Str(text.clone()),
            Token::Word(w) => Arg::Str(w.clone()),
            Token::True => Arg::T,
            Token::Nil => Arg::Nil,
            Token::Var(name) => Arg::Var(name.clone()),
            Token::Let | Token::Eq | Token::Newline => {
                return Err(unexpected("expected an argument", *s));
            }
        };
        span = span.merge(*s);
        args.push((arg, *s));
    }

    Ok(Call {
        binding,
        operation,
        args,
        span,
    })
}

/// Parse a script into its calls; blank and comment-only lines are skipped
pub fn parse(source: &str) -> Result<Vec<Call>, ScriptError> {
    let tokens = tokenize(source)?;
    tokens
        .split(|(token, _)| *token == Token::Newline)
        .filter(|line| !line.is_empty())
        .map(|line| parse_line(line, source))
        .collect()
}

/// Executes calls against a session, keeping `let` bindings
pub struct Runner<'s> {
    session: &'s Session,
    bindings: HashMap<String, Value>,
}

impl<'s> Runner<'s> {
    pub fn new(session: &'s Session) -> Self {
        Runner {
            session,
            bindings: HashMap::new(),
        }
    }

    pub fn binding(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    fn arg_value(&self, arg: &Arg, span: Span) -> Result<Value, ScriptError> {
        Ok(match arg {
            Arg::Int(n) => Value::Int(*n),
            Arg::Char(c) => Value::Char(*c),
            Arg::Str(s) => Value::string(s.as_str()),
            Arg::T => Value::T,
            Arg::Nil => Value::Nil,
            Arg::Var(name) => self
                .bindings
                .get(name)
                .cloned()
                .ok_or_else(|| ScriptError::Unbound {
                    name: name.clone(),
                    span,
                })?,
        })
    }

    pub fn run_call(&mut self, call: &Call) -> Result<Value, ScriptError> {
        let args = call
            .args
            .iter()
            .map(|(arg, span)| self.arg_value(arg, *span))
            .collect::<Result<Vec<_>, _>>()?;
        let value = self
            .session
            .call(&call.operation, args)
            .map_err(|error| ScriptError::Runtime {
                error,
                span: call.span,
            })?;
        if let Some(name) = &call.binding {
            self.bindings.insert(name.clone(), value.clone());
        }
        Ok(value)
    }

    /// Run every call in order, handing each result to `on_result`; stops
    /// at the first failure.
    pub fn run_each<F>(&mut self, source: &str, mut on_result: F) -> Result<(), ScriptError>
    where
        F: FnMut(&Call, &Value),
    {
        for call in parse(source)? {
            let value = self.run_call(&call)?;
            on_result(&call, &value);
        }
        Ok(())
    }

    pub fn run(&mut self, source: &str) -> Result<Vec<Value>, ScriptError> {
        let mut results = Vec::new();
        self.run_each(source, |_, value| results.push(value.clone()))?;
        Ok(results)
    }
}

/// Render `error` against `source` on stderr
pub fn report_error(filename: &str, source: &str, error: &ScriptError) -> std::io::Result<()> {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let span = error.span();
    Report::build(ReportKind::Error, (filename, span.start..span.end))
        .with_message(format!("{} error", error.kind()))
        .with_label(
            Label::new((filename, span.start..span.end))
                .with_message(error.label())
                .with_color(Color::Red),
        )
        .finish()
        .eprint((filename, Source::from(source)))
}
