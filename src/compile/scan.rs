use crate::compile::parse::Keyword;
use crate::error::ScanError;
use crate::types::span::Span;
use crate::types::syntax::{Kind, Syntax};
use crate::{Error, Result};

/// A scanner that tokenizes the template source into distinct chunks so that
/// the parser doesn't have to operate on raw text.
///
/// The scanner is implemented as a fallible iterator. The parser should
/// repeatedly call the [`.next()?`][Scanner::next] method to return the next
/// non-whitespace token until [`None`] is returned.
pub struct Scanner<'a> {
    /// The syntax configuration.
    syntax: &'a Syntax,

    /// The original template source.
    pub source: &'a str,

    /// A cursor over the template source.
    cursor: usize,

    /// The current state of the scanner.
    state: State,

    /// A buffer to store the next token.
    next: Option<(Token, Span)>,
}

/// The state of the scanner.
///
/// Literal template text is copied verbatim, text between directive
/// delimiters is split into tokens depending on what came before.
#[derive(Debug, Clone, Copy)]
enum State {
    /// Within literal template text.
    Literal,

    /// Between directive delimiters.
    Directive {
        /// The span of the begin tag.
        begin: Span,
        /// What we expect to find next.
        mode: Mode,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Keywords and identifiers, e.g. `else if`.
    Head,
    /// Loop variables up to the `in` keyword.
    Bindings,
    /// The name after `include` or `fn`.
    Name { signature: bool },
    /// After a name, an opening parenthesis starts a list.
    Call { signature: bool },
    /// A comma separated list of expressions.
    List { open: Span, signature: bool },
    /// A single expression up to the end tag.
    Tail,
    /// Anything up to the end tag.
    Comment,
}

/// Where an expression stops.
#[derive(Clone, Copy)]
enum Stop {
    /// At the end tag.
    End,
    /// At a comma or closing parenthesis, `<>` are brackets in signatures.
    List { open: Span, signature: bool },
}

/// The unit yielded by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Literal template text.
    Text,
    /// Begin block tag, e.g. `<%`
    BeginBlock,
    /// Begin escaped expression tag, e.g. `<%=`
    BeginExpr,
    /// Begin raw expression tag, e.g. `<%==`
    BeginRaw,
    /// Begin declaration tag, e.g. `<%!`
    BeginDecl,
    /// Begin comment tag, e.g. `<%#`
    BeginComment,
    /// End tag, e.g. `%>`
    EndDirective,
    /// A keyword like `if` or `for`
    Keyword,
    /// A function or variable name
    Ident,
    /// `,`
    Comma,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `->`
    Arrow,
    /// Verbatim host language source.
    Expr,
    /// Sequence of spaces, tabs and newlines within a directive.
    Whitespace,
}

impl<'a> Scanner<'a> {
    /// Construct a new scanner.
    pub fn new(syntax: &'a Syntax, source: &'a str) -> Self {
        Self {
            syntax,
            source,
            cursor: 0,
            state: State::Literal,
            next: None,
        }
    }

    /// Returns the next non-whitespace token and its span.
    pub fn next(&mut self) -> Result<Option<(Token, Span)>> {
        loop {
            match self.scan()? {
                Some((tk, sp)) if !tk.is_whitespace() => return Ok(Some((tk, sp))),
                None => return Ok(None),
                _ => continue,
            }
        }
    }

    /// Returns the next token and span.
    fn scan(&mut self) -> Result<Option<(Token, Span)>> {
        if let Some(next) = self.next.take() {
            return Ok(Some(next));
        }

        let i = self.cursor;

        match self.state {
            State::Directive { begin, .. } if i >= self.source.len() => {
                Err(self.err_unterminated(begin))
            }
            _ if i >= self.source.len() => Ok(None),
            State::Literal => self.scan_literal(i),
            State::Directive {
                begin,
                mode: Mode::Comment,
            } => self.scan_comment(begin, i),
            State::Directive { begin, mode } => self.scan_directive(begin, mode, i),
        }
    }

    fn scan_literal(&mut self, i: usize) -> Result<Option<(Token, Span)>> {
        // We are within literal text, that means all we have to do is find
        // the next begin tag from `i`. The following diagram helps describe
        // the variable naming.
        //
        // xxxxxxx<%=xxxxxxxx
        //    ^   ^  ^
        //    i   j  k

        match self.syntax.find_begin(self.source, i) {
            Some((kind, j, k)) => {
                let (tk, mode) = Token::from_kind(kind);
                let begin = Span::from(j..k);
                self.cursor = k;
                self.state = State::Directive { begin, mode };

                if i == j {
                    // The current cursor is exactly at the tag.
                    Ok(Some((tk, begin)))
                } else {
                    // We must first emit the text token, so we store the
                    // begin tag token in the `next` buffer.
                    self.next = Some((tk, begin));
                    Ok(Some((Token::Text, Span::from(i..j))))
                }
            }
            None => {
                let j = self.source.len();
                self.cursor = j;
                Ok(Some((Token::Text, Span::from(i..j))))
            }
        }
    }

    fn scan_comment(&mut self, begin: Span, i: usize) -> Result<Option<(Token, Span)>> {
        // We are between comment tags <%# ... %>, that means all we have to
        // do is find the end tag.
        //
        // x<%#cccccc%>xxxxxx
        //     ^     ^ ^
        //     i     j k

        match self.syntax.find_end(self.source, i) {
            Some((j, k)) => {
                let end = Span::from(j..k);
                self.cursor = k;
                self.state = State::Literal;
                if i == j {
                    Ok(Some((Token::EndDirective, end)))
                } else {
                    self.next = Some((Token::EndDirective, end));
                    Ok(Some((Token::Text, Span::from(i..j))))
                }
            }
            None => Err(self.err_unterminated(begin)),
        }
    }

    fn scan_directive(
        &mut self,
        begin: Span,
        mode: Mode,
        i: usize,
    ) -> Result<Option<(Token, Span)>> {
        // We are between two tags <% ... %> that means we must split out the
        // directive keywords and names and lookout for the end tag. Anything
        // that is host language source is returned as a single token.

        if let Some(k) = self.syntax.end_at(self.source, i) {
            if let Mode::List { open, .. } = mode {
                return Err(self.err_unclosed_paren(open));
            }
            self.cursor = k;
            self.state = State::Literal;
            return Ok(Some((Token::EndDirective, Span::from(i..k))));
        }

        // We can `.unwrap()` since we've already checked that there is more
        // text remaining.
        let c = self.source[i..].chars().next().unwrap();

        if is_whitespace(c) {
            let j = self.scan_while(i, is_whitespace);
            self.cursor = j;
            return Ok(Some((Token::Whitespace, Span::from(i..j))));
        }

        let (tk, j, mode) = match mode {
            Mode::Tail => {
                let j = self.scan_expr(begin, i, Stop::End)?;
                (Token::Expr, self.trim_end(i, j), Mode::Tail)
            }

            Mode::List { open, signature } => match c {
                ',' => (Token::Comma, i + 1, mode),
                ')' => (Token::CloseParen, i + 1, Mode::Head),
                _ => {
                    let j = self.scan_expr(begin, i, Stop::List { open, signature })?;
                    (Token::Expr, self.trim_end(i, j), mode)
                }
            },

            Mode::Call { signature } if c == '(' => {
                let open = Span::from(i..i + 1);
                (Token::OpenParen, i + 1, Mode::List { open, signature })
            }

            Mode::Bindings if c == ',' => (Token::Comma, i + 1, mode),

            Mode::Head | Mode::Call { .. } if self.source[i..].starts_with("->") => {
                (Token::Arrow, i + 2, Mode::Tail)
            }

            mode if is_ident_start(c) => {
                let j = self.scan_while(i, is_ident);
                let kw = Keyword::from_str(&self.source[i..j]);
                let tk = match kw {
                    Some(_) => Token::Keyword,
                    None => Token::Ident,
                };
                let next = match (mode, kw) {
                    (Mode::Bindings, Some(Keyword::In)) => Mode::Tail,
                    (Mode::Bindings, _) => Mode::Bindings,
                    (Mode::Name { signature }, _) => Mode::Call { signature },
                    (_, Some(Keyword::If | Keyword::In)) => Mode::Tail,
                    (_, Some(Keyword::For)) => Mode::Bindings,
                    (_, Some(Keyword::Include)) => Mode::Name { signature: false },
                    (_, Some(Keyword::Fn)) => Mode::Name { signature: true },
                    _ => Mode::Head,
                };
                (tk, j, next)
            }

            _ => {
                return Err(self.err_unexpected_character(i..i + c.len_utf8()));
            }
        };

        self.cursor = j;
        self.state = State::Directive { begin, mode };
        Ok(Some((tk, Span::from(i..j))))
    }

    /// Scans host language source starting at `i` and returns the index
    /// where it stops.
    ///
    /// String, raw string and char literals are skipped over and brackets
    /// must be balanced, so that delimiters inside them do not end the
    /// expression.
    fn scan_expr(&self, begin: Span, i: usize, stop: Stop) -> Result<usize> {
        let bytes = self.source.as_bytes();
        let mut stack: Vec<(u8, usize)> = Vec::new();
        let mut j = i;

        while j < bytes.len() {
            let b = bytes[j];

            if stack.is_empty() {
                match stop {
                    Stop::End => {
                        if self.syntax.end_at(self.source, j).is_some() {
                            return Ok(j);
                        }
                    }
                    Stop::List { open, .. } => {
                        if b == b',' || b == b')' {
                            return Ok(j);
                        }
                        if self.syntax.end_at(self.source, j).is_some() {
                            return Err(self.err_unclosed_paren(open));
                        }
                    }
                }
            }

            // `<>` are brackets in signatures and within turbofish generics.
            let angles = matches!(stop, Stop::List { signature: true, .. })
                || matches!(stack.last(), Some((b'<', _)));
            let closures = matches!(stop, Stop::List { signature: false, .. });

            match b {
                b'"' => {
                    j = self.skip_string(begin, j)?;
                    continue;
                }
                b'r' if self.is_raw_string_start(j) => {
                    j = self.skip_raw_string(begin, j)?;
                    continue;
                }
                b'\'' => {
                    j = self.skip_char(j);
                    continue;
                }
                b'(' | b'[' | b'{' => stack.push((b, j)),
                b'<' if angles || self.source[..j].ends_with("::") => stack.push((b, j)),
                b'|' if closures && self.is_closure_start(i, j) => {
                    // Skip the closure parameters so that their commas do
                    // not split the argument.
                    let end = self
                        .syntax
                        .find_end(self.source, j)
                        .map_or(self.source.len(), |(m, _)| m);
                    if let Some(d) = self.source.get(j + 1..end).and_then(|s| s.find('|')) {
                        j += d + 2;
                        continue;
                    }
                }
                b'>' if angles && j > i && bytes[j - 1] == b'-' => {}
                b')' | b']' | b'}' | b'>' if b != b'>' || angles => {
                    let open = match b {
                        b')' => b'(',
                        b']' => b'[',
                        b'}' => b'{',
                        _ => b'<',
                    };
                    match stack.pop() {
                        Some((o, _)) if o == open => {}
                        Some((o, m)) => {
                            return Err(self.err_mismatched(o, m, b, j));
                        }
                        None => {
                            return Err(self.err_unopened(b, j));
                        }
                    }
                }
                _ => {}
            }
            j += 1;
        }

        Err(self.err_unterminated(begin))
    }

    /// Returns `true` if the `|` at `j` opens the parameters of a closure in
    /// the expression starting at `i`.
    fn is_closure_start(&self, i: usize, j: usize) -> bool {
        let before = self.source[i..j].trim_end();
        if before.is_empty() || before.ends_with(&['(', '[', '{', ',', '='][..]) {
            return true;
        }
        match before.strip_suffix("move") {
            Some(rest) => !rest.ends_with(is_ident),
            None => false,
        }
    }

    /// Skips a string literal starting at the quote at `i`.
    fn skip_string(&self, begin: Span, i: usize) -> Result<usize> {
        let bytes = self.source.as_bytes();
        let mut j = i + 1;
        loop {
            match bytes.get(j) {
                None => return Err(self.err_unterminated(begin)),
                Some(b'\\') => j += 2,
                Some(b'"') => return Ok(j + 1),
                Some(_) => j += 1,
            }
        }
    }

    /// Returns `true` if a raw string literal, e.g. `r#"..."#`, starts at
    /// the `r` at `i`.
    fn is_raw_string_start(&self, i: usize) -> bool {
        let bytes = self.source.as_bytes();
        let prefix_ok = match i {
            0 => true,
            _ if bytes[i - 1] == b'b' => i == 1 || !is_ident_byte(bytes[i - 2]),
            _ => !is_ident_byte(bytes[i - 1]),
        };
        if !prefix_ok {
            return false;
        }
        let hashes = bytes[i + 1..].iter().take_while(|&&b| b == b'#').count();
        bytes.get(i + 1 + hashes) == Some(&b'"')
    }

    /// Skips a raw string literal starting at the `r` at `i`.
    fn skip_raw_string(&self, begin: Span, i: usize) -> Result<usize> {
        let bytes = self.source.as_bytes();
        let hashes = bytes[i + 1..].iter().take_while(|&&b| b == b'#').count();
        let mut j = i + 1 + hashes + 1;
        while j < bytes.len() {
            if bytes[j] == b'"' {
                let closing = bytes[j + 1..]
                    .iter()
                    .take(hashes)
                    .take_while(|&&b| b == b'#')
                    .count();
                if closing == hashes {
                    return Ok(j + 1 + hashes);
                }
            }
            j += 1;
        }
        Err(self.err_unterminated(begin))
    }

    /// Skips a char literal starting at the quote at `i`, or just the quote
    /// if this is a lifetime like `'a`.
    fn skip_char(&self, i: usize) -> usize {
        let bytes = self.source.as_bytes();
        if bytes.get(i + 1) == Some(&b'\\') {
            // An escaped char literal, e.g. '\n' or '\u{1f600}'.
            let mut j = i + 3;
            while j < bytes.len() && bytes[j] != b'\'' && j - i < 12 {
                j += 1;
            }
            if bytes.get(j) == Some(&b'\'') {
                return j + 1;
            }
            return i + 1;
        }
        match self.source[i + 1..].chars().next() {
            Some(c) if bytes.get(i + 1 + c.len_utf8()) == Some(&b'\'') => i + 2 + c.len_utf8(),
            _ => i + 1,
        }
    }

    fn scan_while<P>(&self, i: usize, pred: P) -> usize
    where
        P: Fn(char) -> bool,
    {
        self.source[i..]
            .char_indices()
            .find(|&(_, c)| !pred(c))
            .map(|(d, _)| i + d)
            .unwrap_or(self.source.len())
    }

    fn trim_end(&self, i: usize, j: usize) -> usize {
        i + self.source[i..j].trim_end().len()
    }

    fn err_unterminated(&self, begin: Span) -> Error {
        Error::scan(
            ScanError::UnterminatedDirective,
            "unterminated directive",
            self.source,
            begin,
        )
    }

    fn err_unclosed_paren(&self, open: Span) -> Error {
        Error::scan(
            ScanError::InvalidDelimiterNesting,
            "unclosed `(`",
            self.source,
            open,
        )
    }

    fn err_mismatched(&self, open: u8, m: usize, close: u8, j: usize) -> Error {
        let (open, close) = (open as char, close as char);
        Error::scan(
            ScanError::InvalidDelimiterNesting,
            format!("mismatched `{close}`, expected a match for `{open}` at byte {m}"),
            self.source,
            j..j + 1,
        )
    }

    fn err_unopened(&self, close: u8, j: usize) -> Error {
        let close = close as char;
        Error::scan(
            ScanError::InvalidDelimiterNesting,
            format!("unexpected `{close}` without a matching opening delimiter"),
            self.source,
            j..j + 1,
        )
    }

    fn err_unexpected_character(&self, span: impl Into<Span>) -> Error {
        Error::scan(
            ScanError::UnexpectedCharacter,
            "unexpected character",
            self.source,
            span,
        )
    }
}

impl Token {
    pub fn human(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::BeginBlock => "begin block",
            Self::BeginExpr => "begin expression",
            Self::BeginRaw => "begin raw expression",
            Self::BeginDecl => "begin declaration",
            Self::BeginComment => "begin comment",
            Self::EndDirective => "end of directive",
            Self::Keyword => "keyword",
            Self::Ident => "identifier",
            Self::Comma => "comma",
            Self::OpenParen => "`(`",
            Self::CloseParen => "`)`",
            Self::Arrow => "`->`",
            Self::Expr => "expression",
            Self::Whitespace => "whitespace",
        }
    }

    fn is_whitespace(&self) -> bool {
        matches!(self, Self::Whitespace)
    }

    fn from_kind(kind: Kind) -> (Self, Mode) {
        match kind {
            Kind::Block => (Self::BeginBlock, Mode::Head),
            Kind::Expr => (Self::BeginExpr, Mode::Tail),
            Kind::Raw => (Self::BeginRaw, Mode::Tail),
            Kind::Decl => (Self::BeginDecl, Mode::Tail),
            Kind::Comment => (Self::BeginComment, Mode::Comment),
        }
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, '\t' | ' ' | '\n' | '\r')
}

fn is_ident_byte(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphanumeric() || !b.is_ascii()
}

#[cfg(feature = "unicode")]
pub(crate) fn is_ident_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

#[cfg(feature = "unicode")]
pub(crate) fn is_ident(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

#[cfg(not(feature = "unicode"))]
pub(crate) fn is_ident_start(c: char) -> bool {
    matches!(c, 'A'..='Z' | 'a'..='z' | '_')
}

#[cfg(not(feature = "unicode"))]
pub(crate) fn is_ident(c: char) -> bool {
    matches!(c, '0'..='9' | 'A'..='Z' | 'a'..='z' | '_')
}
