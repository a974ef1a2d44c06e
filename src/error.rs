use std::cmp::max;
use std::fmt;
use std::io;
use std::path::Path;

use unicode_width::UnicodeWidthStr;

use crate::types::span::Span;

/// An error that can occur while compiling a template.
///
/// Errors are fatal for the single template being compiled. When compiling
/// a directory tree with [`generate`][crate::generate] each failure is
/// collected in the [`Report`][crate::Report] and compilation continues with
/// the remaining templates.
///
/// The [`Display`][fmt::Display] implementation prints a one line summary.
/// The alternate form `{:#}` prints a snippet of the template source
/// pointing at the offending region.
pub struct Error {
    kind: ErrorKind,
    msg: String,
    span: Option<(String, Span)>,
    path: Option<String>,
    io: Option<io::Error>,
}

/// The category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The template could not be split into tokens.
    Scan(ScanError),
    /// The token stream does not match the template grammar.
    Parse(ParseError),
    /// A function signature is invalid.
    Resolve(ResolveError),
    /// Reading a template or writing generated code failed.
    Io,
}

/// Errors raised while scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScanError {
    /// A directive was opened but never closed.
    UnterminatedDirective,
    /// A closing bracket without a matching opening bracket.
    InvalidDelimiterNesting,
    /// A character that cannot start a token inside a directive.
    UnexpectedCharacter,
}

/// Errors raised while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// A token that does not fit the current grammar position.
    UnexpectedToken,
    /// A `for`, `if` or `fn` block without a matching `end`.
    UnclosedBlock,
    /// A parameter name declared twice in the same function.
    DuplicateParameterName,
    /// A block directive that starts with an unknown word.
    UnknownDirective,
    /// A block directive in a position where it is not allowed.
    UnexpectedBlock,
}

/// Errors raised while resolving function signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResolveError {
    /// An invalid function name, parameter name, type or return type.
    InvalidParameterSignature,
    /// Two generated functions would have the same name.
    DuplicateFunctionName,
}

impl Error {
    fn new(kind: ErrorKind, msg: impl Into<String>, source: &str, span: impl Into<Span>) -> Self {
        Self {
            kind,
            msg: msg.into(),
            span: Some((source.to_owned(), span.into())),
            path: None,
            io: None,
        }
    }

    pub(crate) fn scan(
        err: ScanError,
        msg: impl Into<String>,
        source: &str,
        span: impl Into<Span>,
    ) -> Self {
        Self::new(ErrorKind::Scan(err), msg, source, span)
    }

    pub(crate) fn parse(
        err: ParseError,
        msg: impl Into<String>,
        source: &str,
        span: impl Into<Span>,
    ) -> Self {
        Self::new(ErrorKind::Parse(err), msg, source, span)
    }

    pub(crate) fn resolve(
        err: ResolveError,
        msg: impl Into<String>,
        source: &str,
        span: impl Into<Span>,
    ) -> Self {
        Self::new(ErrorKind::Resolve(err), msg, source, span)
    }

    pub(crate) fn io(err: io::Error, msg: impl Into<String>, path: &Path) -> Self {
        Self {
            kind: ErrorKind::Io,
            msg: msg.into(),
            span: None,
            path: Some(path.display().to_string()),
            io: Some(err),
        }
    }

    /// Attach the path of the template that caused this error.
    pub(crate) fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Returns the category of this error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the reason for this error without any location information.
    #[inline]
    pub fn reason(&self) -> &str {
        &self.msg
    }

    /// Returns the path of the template that caused this error, if known.
    #[inline]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Returns the one-based line and column of the error, if known.
    pub fn line_col(&self) -> Option<(usize, usize)> {
        self.span.as_ref().map(|(source, span)| {
            let pos = span.position(source);
            (pos.line + 1, pos.column + 1)
        })
    }

    fn category(&self) -> &'static str {
        match self.kind {
            ErrorKind::Scan(_) => "scan error",
            ErrorKind::Parse(_) => "parse error",
            ErrorKind::Resolve(_) => "resolve error",
            ErrorKind::Io => "io error",
        }
    }

    fn display_path(&self) -> &str {
        self.path.as_deref().unwrap_or("<anonymous>")
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.io
            .as_ref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:#}")
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let category = self.category();
        match (&self.span, &self.io) {
            (Some((source, span)), _) => {
                if f.alternate() {
                    writeln!(f, "{category}")?;
                    fmt_pretty(&self.msg, self.display_path(), source, *span, f)
                } else {
                    let pos = span.position(source);
                    write!(
                        f,
                        "{category}: {} at {}:{}:{}",
                        self.msg,
                        self.display_path(),
                        pos.line + 1,
                        pos.column + 1
                    )
                }
            }
            (None, Some(err)) => write!(f, "{category}: {}: {err}", self.msg),
            (None, None) => write!(f, "{category}: {}", self.msg),
        }
    }
}

fn fmt_pretty(
    msg: &str,
    path: &str,
    source: &str,
    span: Span,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    let pos = span.position(source);
    let code = source.split('\n').nth(pos.line).unwrap_or("");
    let code = code.strip_suffix('\r').unwrap_or(code);

    // Only underline the part of the span on the first line.
    let spanned = &source[span];
    let spanned = spanned.split('\n').next().unwrap_or("");
    let width = max(1, spanned.width());

    let num = (pos.line + 1).to_string();
    let pad = num.width();
    let col = pos.column;
    let underline = "^".repeat(width);

    write!(
        f,
        " {0:pad$}--> {path}:{line}:{column}\n \
         {0:pad$} |\n \
         {num} | {code}\n \
         {0:pad$} | {0:col$}{underline}\n \
         {0:pad$} |\n \
         {0:pad$} = reason: {msg}\n",
        "",
        pad = pad,
        path = path,
        line = pos.line + 1,
        column = col + 1,
        num = num,
        code = code,
        col = col,
        underline = underline,
        msg = msg,
    )
}
