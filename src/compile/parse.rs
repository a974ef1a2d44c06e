use std::fmt::Display;
use std::mem;

use crate::compile::scan::{self, Scanner, Token};
use crate::error::ParseError;
use crate::types::ast;
use crate::types::span::Span;
use crate::types::syntax::Syntax;
use crate::{Error, Result};

/// A parser that constructs an AST from a token stream.
///
/// The parser is implemented as a simple hand written parser with no
/// recursion. Open blocks are kept on a stack together with the scope that
/// encloses them. It sometimes needs to peek at the next token to know how to
/// proceed and uses the `peeked` buffer to do this.
pub struct Parser<'a> {
    /// A scanner that tokenizes the template source.
    tokens: Scanner<'a>,

    /// Remember a peeked value, even if it was `None`
    peeked: Option<Option<(Token, Span)>>,
}

/// Stores the state of a block during parsing.
enum State {
    /// A partial `if` statement.
    If {
        /// The finished branches.
        branches: Vec<ast::Branch>,
        /// The condition of the branch being parsed, `None` once we are in
        /// the `else` clause.
        cond: Option<Span>,
        /// The span of the `if` block.
        span: Span,
    },

    /// A partial `for` statement.
    For {
        /// The loop variables.
        vars: ast::LoopVars,
        /// The value we are iterating over.
        iterable: Span,
        /// The span of the `for` block.
        span: Span,
    },

    /// A partial function.
    Func {
        name: ast::Ident,
        params: Vec<ast::Param>,
        ret: Option<Span>,
        /// The span of the `fn` block.
        span: Span,
    },
}

/// A parsed block directive.
enum Block {
    Fn(ast::Ident, Vec<ast::Param>, Option<Span>),
    If(Span),
    ElseIf(Span),
    Else,
    End,
    For(ast::LoopVars, Span),
    Include(ast::Ident, Vec<Span>),
}

/// A keyword in the template syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Fn,
    For,
    In,
    If,
    Else,
    End,
    Include,
}

impl<'a> Parser<'a> {
    /// Construct a new parser.
    pub fn new(syntax: &'a Syntax, source: &'a str) -> Self {
        Self {
            tokens: Scanner::new(syntax, source),
            peeked: None,
        }
    }

    /// Parses a template.
    ///
    /// This function works using a stack of open blocks, e.g.
    /// `<% if cond %> ... <% else %>`. Each entry stores the scope that
    /// encloses the block, `scope` always collects the nodes of the innermost
    /// block.
    pub fn parse_template(mut self) -> Result<ast::Template<'a>> {
        let mut blocks: Vec<(State, ast::Scope)> = Vec::new();
        let mut scope = ast::Scope::new();
        let mut funcs = Vec::new();
        let mut decls = Vec::new();

        // The first piece of content found outside of any block, templates
        // that declare functions may not have any.
        let mut loose: Option<Span> = None;

        while let Some(next) = self.next()? {
            let (node, span) = match next {
                // Simply literal text, emit a single node for it.
                (Token::Text, span) => {
                    if blocks.is_empty() && !self.source()[span].trim().is_empty() {
                        loose.get_or_insert(span);
                    }
                    scope.nodes.push(ast::Node::Text(span));
                    continue;
                }

                // A comment, e.g. `<%# ... %>`
                (Token::BeginComment, _) => {
                    if self.is_next(Token::Text)? {
                        self.expect(Token::Text)?;
                    }
                    self.expect(Token::EndDirective)?;
                    continue;
                }

                // A declaration, e.g. `<%! use std::fmt::Write; %>`
                (Token::BeginDecl, _) => {
                    if self.is_next(Token::Expr)? {
                        decls.push(self.expect(Token::Expr)?);
                    }
                    self.expect(Token::EndDirective)?;
                    continue;
                }

                // An expression, e.g. `<%= user.name %>` or `<%== html %>`
                (tk @ (Token::BeginExpr | Token::BeginRaw), begin) => {
                    let source = self.expect(Token::Expr)?;
                    let end = self.expect(Token::EndDirective)?;
                    let escape = tk == Token::BeginExpr;
                    let node = ast::Node::Expr(ast::Expr { source, escape });
                    (node, begin.combine(end))
                }

                // A block, e.g. `<% if cond %>`
                (Token::BeginBlock, begin) => {
                    let block = self.parse_block()?;
                    let end = self.expect(Token::EndDirective)?;
                    let span = begin.combine(end);

                    match block {
                        // The start of a function. For example:
                        //
                        //   <% fn user_list(users: &[User]) %>
                        //
                        // Functions are only allowed at the top level.
                        Block::Fn(name, params, ret) => {
                            if !blocks.is_empty() {
                                return Err(self.err_unexpected_block(
                                    "functions cannot be nested",
                                    span,
                                ));
                            }
                            let state = State::Func {
                                name,
                                params,
                                ret,
                                span,
                            };
                            blocks.push((state, mem::take(&mut scope)));
                            continue;
                        }

                        // The start of an `if` statement. For example:
                        //
                        //   <% if cond %>
                        //
                        // We must push a block to the block stack because an
                        // if statement starts a new scope.
                        Block::If(cond) => {
                            if blocks.is_empty() {
                                loose.get_or_insert(span);
                            }
                            let state = State::If {
                                branches: Vec::new(),
                                cond: Some(cond),
                                span,
                            };
                            blocks.push((state, mem::take(&mut scope)));
                            continue;
                        }

                        // An `else if` clause. For example:
                        //
                        //   <% else if cond %>
                        //
                        // We expect that the innermost block is an `if` block
                        // that has not seen an `else` yet. The current scope
                        // becomes the body of the previous branch.
                        Block::ElseIf(next) => match blocks.last_mut() {
                            Some((
                                State::If {
                                    branches,
                                    cond: cond @ Some(_),
                                    ..
                                },
                                _,
                            )) => {
                                let body = mem::take(&mut scope);
                                if let Some(cond) = cond.replace(next) {
                                    branches.push(ast::Branch { cond, body });
                                }
                                continue;
                            }
                            _ => {
                                return Err(
                                    self.err_unexpected_block("unexpected `else if` block", span)
                                );
                            }
                        },

                        // The `else` clause of an `if` statement. For example:
                        //
                        //   <% else %>
                        //
                        Block::Else => match blocks.last_mut() {
                            Some((
                                State::If {
                                    branches,
                                    cond: cond @ Some(_),
                                    ..
                                },
                                _,
                            )) => {
                                let body = mem::take(&mut scope);
                                if let Some(cond) = cond.take() {
                                    branches.push(ast::Branch { cond, body });
                                }
                                continue;
                            }
                            _ => {
                                return Err(
                                    self.err_unexpected_block("unexpected `else` block", span)
                                );
                            }
                        },

                        // The end of the innermost block. For example:
                        //
                        //   <% end %>
                        //
                        // The current scope becomes the body of the block and
                        // the enclosing scope is restored.
                        Block::End => {
                            let (state, parent) = match blocks.pop() {
                                Some(block) => block,
                                None => {
                                    return Err(
                                        self.err_unexpected_block("unexpected `end` block", span)
                                    );
                                }
                            };
                            let body = mem::replace(&mut scope, parent);
                            match state {
                                State::If {
                                    mut branches, cond, ..
                                } => {
                                    let else_branch = match cond {
                                        Some(cond) => {
                                            branches.push(ast::Branch { cond, body });
                                            ast::Scope::new()
                                        }
                                        None => body,
                                    };
                                    let node = ast::Node::If(ast::IfElse {
                                        branches,
                                        else_branch,
                                    });
                                    (node, span)
                                }
                                State::For { vars, iterable, .. } => {
                                    let node = ast::Node::For(ast::ForLoop {
                                        vars,
                                        iterable,
                                        body,
                                    });
                                    (node, span)
                                }
                                State::Func {
                                    name,
                                    params,
                                    ret,
                                    span: begin,
                                } => {
                                    funcs.push(ast::Func {
                                        name: Some(name),
                                        params,
                                        ret,
                                        body,
                                        span: begin.combine(span),
                                    });
                                    continue;
                                }
                            }
                        }

                        // The start of a `for` statement. For example:
                        //
                        //   <% for vars in iterable %>
                        //
                        Block::For(vars, iterable) => {
                            if blocks.is_empty() {
                                loose.get_or_insert(span);
                            }
                            let state = State::For {
                                vars,
                                iterable,
                                span,
                            };
                            blocks.push((state, mem::take(&mut scope)));
                            continue;
                        }

                        // An `include` statement. For example:
                        //
                        //   <% include item(user, index) %>
                        //
                        Block::Include(name, args) => {
                            let node = ast::Node::Include(ast::Include { name, args, span });
                            (node, span)
                        }
                    }
                }

                (tk, span) => {
                    let tk = tk.human();
                    return Err(Error::parse(
                        ParseError::UnexpectedToken,
                        format!("unexpected {tk}"),
                        self.source(),
                        span,
                    ));
                }
            };

            if blocks.is_empty() {
                loose.get_or_insert(span);
            }
            scope.nodes.push(node);
        }

        if let Some((block, _)) = blocks.last() {
            let (msg, span) = match block {
                State::If { span, .. } => ("unclosed `if` block", span),
                State::For { span, .. } => ("unclosed `for` block", span),
                State::Func { span, .. } => ("unclosed `fn` block", span),
            };
            return Err(Error::parse(
                ParseError::UnclosedBlock,
                msg,
                self.source(),
                *span,
            ));
        }

        if funcs.is_empty() {
            funcs.push(ast::Func {
                name: None,
                params: Vec::new(),
                ret: None,
                body: scope,
                span: Span::from(0..self.source().len()),
            });
        } else if let Some(span) = loose {
            return Err(self.err_unexpected_block("content outside of a function", span));
        }

        Ok(ast::Template {
            source: self.source(),
            decls,
            funcs,
        })
    }

    /// Parses a single block. All of the following are valid blocks.
    ///
    ///   fn user_list(users: &[User], title: &str) -> String
    ///
    ///   if user.is_enabled
    ///
    ///   else if user.is_admin()
    ///
    ///   else
    ///
    ///   end
    ///
    ///   for id, user in group.users.iter()
    ///
    ///   include item(user, 3)
    ///
    fn parse_block(&mut self) -> Result<Block> {
        if self.is_next(Token::Ident)? {
            let span = self.expect(Token::Ident)?;
            let word = &self.source()[span];
            return Err(Error::parse(
                ParseError::UnknownDirective,
                format!("unknown directive `{word}`"),
                self.source(),
                span,
            ));
        }

        let (kw, span) = self.parse_keyword()?;
        match kw {
            Keyword::Fn => {
                let name = self.parse_ident()?;
                let params = if self.is_next(Token::OpenParen)? {
                    self.parse_params()?
                } else {
                    Vec::new()
                };
                let ret = if self.is_next(Token::Arrow)? {
                    self.expect(Token::Arrow)?;
                    Some(self.expect(Token::Expr)?)
                } else {
                    None
                };
                Ok(Block::Fn(name, params, ret))
            }
            Keyword::If => {
                let cond = self.expect(Token::Expr)?;
                Ok(Block::If(cond))
            }
            Keyword::Else => {
                if self.is_next_keyword(Keyword::If)? {
                    self.expect_keyword(Keyword::If)?;
                    let cond = self.expect(Token::Expr)?;
                    Ok(Block::ElseIf(cond))
                } else {
                    Ok(Block::Else)
                }
            }
            Keyword::End => Ok(Block::End),
            Keyword::For => {
                let vars = self.parse_loop_vars()?;
                self.expect_keyword(Keyword::In)?;
                let iterable = self.expect(Token::Expr)?;
                Ok(Block::For(vars, iterable))
            }
            Keyword::Include => {
                let name = self.parse_ident()?;
                let args = if self.is_next(Token::OpenParen)? {
                    self.parse_list()?
                } else {
                    Vec::new()
                };
                Ok(Block::Include(name, args))
            }
            Keyword::In => Err(self.err_unexpected_keyword(kw.human(), span)),
        }
    }

    /// Parses loop variable(s).
    ///
    /// This is either a single identifier or two comma separated identifiers.
    /// Both of the following are valid:
    ///
    ///   item
    ///
    ///   key, value
    ///
    fn parse_loop_vars(&mut self) -> Result<ast::LoopVars> {
        let key = self.parse_ident()?;
        if !self.is_next(Token::Comma)? {
            return Ok(ast::LoopVars::Item(key));
        }
        self.expect(Token::Comma)?;
        let value = self.parse_ident()?;
        let span = key.span.combine(value.span);
        Ok(ast::LoopVars::KeyValue(ast::KeyValue { key, value, span }))
    }

    /// Parses a parenthesised, comma separated list of expressions. A
    /// trailing comma is allowed.
    ///
    ///   (user, "title", (1, 2))
    ///
    fn parse_list(&mut self) -> Result<Vec<Span>> {
        self.expect(Token::OpenParen)?;
        let mut items = Vec::new();
        loop {
            if self.is_next(Token::CloseParen)? {
                self.expect(Token::CloseParen)?;
                break;
            }
            items.push(self.expect(Token::Expr)?);
            if self.is_next(Token::Comma)? {
                self.expect(Token::Comma)?;
            } else {
                self.expect(Token::CloseParen)?;
                break;
            }
        }
        Ok(items)
    }

    /// Parses a function parameter list.
    ///
    /// Each parameter is a name followed by a type, optionally separated by
    /// a colon.
    ///
    ///   (users: &[User], title &str)
    ///
    fn parse_params(&mut self) -> Result<Vec<ast::Param>> {
        let mut params: Vec<ast::Param> = Vec::new();
        for span in self.parse_list()? {
            let param = self.parse_param(span)?;
            let name = &self.source()[param.name.span];
            if params.iter().any(|p| &self.source()[p.name.span] == name) {
                return Err(Error::parse(
                    ParseError::DuplicateParameterName,
                    format!("duplicate parameter `{name}`"),
                    self.source(),
                    param.name.span,
                ));
            }
            params.push(param);
        }
        Ok(params)
    }

    /// Splits a single parameter into its name and type.
    fn parse_param(&self, span: Span) -> Result<ast::Param> {
        let raw = &self.source()[span];

        let mut chars = raw.char_indices();
        let n = match chars.next() {
            Some((_, c)) if scan::is_ident_start(c) => chars
                .find(|&(_, c)| !scan::is_ident(c))
                .map(|(i, _)| i)
                .unwrap_or(raw.len()),
            _ => {
                return Err(Error::parse(
                    ParseError::UnexpectedToken,
                    "expected parameter name",
                    self.source(),
                    span,
                ));
            }
        };

        let rest = raw[n..].trim_start();
        let rest = match rest.strip_prefix(':') {
            Some(r) if !r.starts_with(':') => r.trim_start(),
            _ => rest,
        };
        let m = span.m + (raw.len() - rest.len());

        Ok(ast::Param {
            name: ast::Ident {
                span: Span::from(span.m..span.m + n),
            },
            ty: Span::from(m..span.n),
            span,
        })
    }

    /// Expects the given keyword.
    fn expect_keyword(&mut self, exp: Keyword) -> Result<Span> {
        let (kw, span) = self.parse_keyword()?;
        if kw != exp {
            let exp = exp.human();
            let kw = kw.human();
            return Err(Error::parse(
                ParseError::UnexpectedToken,
                format!("expected keyword `{exp}`, found keyword `{kw}`"),
                self.source(),
                span,
            ));
        }
        Ok(span)
    }

    /// Parses a keyword.
    fn parse_keyword(&mut self) -> Result<(Keyword, Span)> {
        match self.parse()? {
            (Token::Keyword, span) => match Keyword::from_str(&self.source()[span]) {
                Some(kw) => Ok((kw, span)),
                None => Err(self.err_unexpected_token("keyword", Token::Keyword, span)),
            },
            (tk, span) => Err(self.err_unexpected_token("keyword", tk, span)),
        }
    }

    /// Parses an identifier.
    fn parse_ident(&mut self) -> Result<ast::Ident> {
        let span = self.expect(Token::Ident)?;
        Ok(ast::Ident { span })
    }

    /// Parses any token.
    fn parse(&mut self) -> Result<(Token, Span)> {
        match self.next()? {
            Some((tk, sp)) => Ok((tk, sp)),
            None => Err(self.err_unexpected_eof("token")),
        }
    }

    /// Parses the specified token and returns its span.
    fn expect(&mut self, exp: Token) -> Result<Span> {
        match self.next()? {
            Some((tk, span)) if tk == exp => Ok(span),
            Some((tk, span)) => Err(self.err_unexpected_token(exp.human(), tk, span)),
            None => Err(self.err_unexpected_eof(exp.human())),
        }
    }

    /// Returns `true` if the next token is a keyword equal to the provided one.
    fn is_next_keyword(&mut self, exp: Keyword) -> Result<bool> {
        Ok(self
            .peek()?
            .map(|(tk, sp)| {
                tk == Token::Keyword && Keyword::from_str(&self.source()[sp]) == Some(exp)
            })
            .unwrap_or(false))
    }

    /// Returns `true` if the next token is equal to the provided one.
    fn is_next(&mut self, token: Token) -> Result<bool> {
        Ok(self.peek()?.map(|(tk, _)| tk == token).unwrap_or(false))
    }

    /// Returns a copy of the next token without affecting the result of the
    /// following `.next()` call.
    fn peek(&mut self) -> Result<Option<(Token, Span)>> {
        match self.peeked {
            Some(peeked) => Ok(peeked),
            None => {
                let peeked = self.tokens.next()?;
                self.peeked = Some(peeked);
                Ok(peeked)
            }
        }
    }

    /// Returns the next token and span in the stream.
    fn next(&mut self) -> Result<Option<(Token, Span)>> {
        match self.peeked.take() {
            Some(v) => Ok(v),
            None => self.tokens.next(),
        }
    }

    fn source(&self) -> &'a str {
        self.tokens.source
    }

    fn err_unexpected_eof(&self, exp: impl Display) -> Error {
        let n = self.source().len();
        Error::parse(
            ParseError::UnexpectedToken,
            format!("expected {exp}, found EOF"),
            self.source(),
            n..n,
        )
    }

    fn err_unexpected_token(&self, exp: impl Display, got: Token, span: Span) -> Error {
        let got = got.human();
        Error::parse(
            ParseError::UnexpectedToken,
            format!("expected {exp}, found {got}"),
            self.source(),
            span,
        )
    }

    fn err_unexpected_keyword(&self, kw: impl Display, span: Span) -> Error {
        Error::parse(
            ParseError::UnexpectedToken,
            format!("unexpected keyword `{kw}`"),
            self.source(),
            span,
        )
    }

    fn err_unexpected_block(&self, msg: &str, span: Span) -> Error {
        Error::parse(ParseError::UnexpectedBlock, msg, self.source(), span)
    }
}

impl Keyword {
    pub(crate) const fn human(&self) -> &'static str {
        match self {
            Self::Fn => "fn",
            Self::For => "for",
            Self::In => "in",
            Self::If => "if",
            Self::Else => "else",
            Self::End => "end",
            Self::Include => "include",
        }
    }

    pub(crate) fn from_str(s: &str) -> Option<Self> {
        match s {
            "fn" => Some(Self::Fn),
            "for" => Some(Self::For),
            "in" => Some(Self::In),
            "if" => Some(Self::If),
            "else" => Some(Self::Else),
            "end" => Some(Self::End),
            "include" => Some(Self::Include),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::ErrorKind;

    fn parse(source: &str) -> Result<ast::Template<'_>> {
        let syntax = Box::leak(Box::new(Syntax::default()));
        Parser::new(syntax, source).parse_template()
    }

    #[track_caller]
    fn assert_err(source: &str, kind: ParseError, reason: &str) {
        let err = parse(source).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse(kind), "{err:#}");
        assert_eq!(err.reason(), reason);
    }

    #[test]
    fn parse_implicit_function() {
        let t = parse("Hello <%= name %>!").unwrap();
        assert_eq!(t.funcs.len(), 1);
        let f = &t.funcs[0];
        assert!(f.name.is_none());
        assert!(f.params.is_empty());
        assert_eq!(f.body.nodes.len(), 3);
        match &f.body.nodes[1] {
            ast::Node::Expr(expr) => {
                assert_eq!(t.text(expr.source), "name");
                assert!(expr.escape);
            }
            node => panic!("unexpected node {node:?}"),
        }
    }

    #[test]
    fn parse_raw_expr() {
        let t = parse("<%== html %>").unwrap();
        match &t.funcs[0].body.nodes[..] {
            [ast::Node::Expr(expr)] => assert!(!expr.escape),
            nodes => panic!("unexpected nodes {nodes:?}"),
        }
    }

    #[test]
    fn parse_function_signature() {
        let t = parse("<% fn list(users: &[User], title &str) -> Vec<u8> %>x<% end %>").unwrap();
        let f = &t.funcs[0];
        assert_eq!(t.text(f.name.as_ref().unwrap().span), "list");
        let params: Vec<_> = f
            .params
            .iter()
            .map(|p| (t.text(p.name.span), t.text(p.ty)))
            .collect();
        assert_eq!(params, [("users", "&[User]"), ("title", "&str")]);
        assert_eq!(t.text(f.ret.unwrap()), "Vec<u8>");
    }

    #[test]
    fn parse_param_path_type() {
        let t = parse("<% fn f(m ::std::collections::HashMap<u8, u8>) %><% end %>").unwrap();
        let p = &t.funcs[0].params[0];
        assert_eq!(t.text(p.name.span), "m");
        assert_eq!(t.text(p.ty), "::std::collections::HashMap<u8, u8>");
    }

    #[test]
    fn parse_multiple_functions() {
        let t = parse(
            "<%! use std::fmt; %>\n<% fn a() %>a<% end %>\n<%# note %>\n<% fn b() %>b<% end %>\n",
        )
        .unwrap();
        assert_eq!(t.decls.len(), 1);
        assert_eq!(t.text(t.decls[0]), "use std::fmt;");
        let names: Vec<_> = t
            .funcs
            .iter()
            .map(|f| t.text(f.name.as_ref().unwrap().span))
            .collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn parse_if_else_if_else() {
        let t = parse("<% if a %>1<% else if b %>2<% else %>3<% end %>").unwrap();
        match &t.funcs[0].body.nodes[..] {
            [ast::Node::If(if_else)] => {
                let conds: Vec<_> = if_else.branches.iter().map(|b| t.text(b.cond)).collect();
                assert_eq!(conds, ["a", "b"]);
                assert_eq!(if_else.else_branch.nodes.len(), 1);
            }
            nodes => panic!("unexpected nodes {nodes:?}"),
        }
    }

    #[test]
    fn parse_if_without_else() {
        let t = parse("<% if a %>1<% end %>").unwrap();
        match &t.funcs[0].body.nodes[..] {
            [ast::Node::If(if_else)] => {
                assert_eq!(if_else.branches.len(), 1);
                assert!(if_else.else_branch.is_empty());
            }
            nodes => panic!("unexpected nodes {nodes:?}"),
        }
    }

    #[test]
    fn parse_for_key_value() {
        let t = parse("<% for i, user in users.iter().enumerate() %><%= i %><% end %>").unwrap();
        match &t.funcs[0].body.nodes[..] {
            [ast::Node::For(for_loop)] => {
                match &for_loop.vars {
                    ast::LoopVars::KeyValue(kv) => {
                        assert_eq!(t.text(kv.key.span), "i");
                        assert_eq!(t.text(kv.value.span), "user");
                    }
                    vars => panic!("unexpected vars {vars:?}"),
                }
                assert_eq!(t.text(for_loop.iterable), "users.iter().enumerate()");
                assert_eq!(for_loop.body.nodes.len(), 1);
            }
            nodes => panic!("unexpected nodes {nodes:?}"),
        }
    }

    #[test]
    fn parse_include() {
        let t = parse("<% include item(user, \"a, b\",) %><% include footer %>").unwrap();
        match &t.funcs[0].body.nodes[..] {
            [ast::Node::Include(a), ast::Node::Include(b)] => {
                assert_eq!(t.text(a.name.span), "item");
                let args: Vec<_> = a.args.iter().map(|s| t.text(*s)).collect();
                assert_eq!(args, ["user", "\"a, b\""]);
                assert_eq!(t.text(b.name.span), "footer");
                assert!(b.args.is_empty());
            }
            nodes => panic!("unexpected nodes {nodes:?}"),
        }
    }

    #[test]
    fn parse_err_unknown_directive() {
        assert_err(
            "<% while x %><% end %>",
            ParseError::UnknownDirective,
            "unknown directive `while`",
        );
    }

    #[test]
    fn parse_err_unclosed_block() {
        assert_err(
            "<% for x in xs %><% if x %>",
            ParseError::UnclosedBlock,
            "unclosed `if` block",
        );
        assert_err(
            "<% fn a() %>",
            ParseError::UnclosedBlock,
            "unclosed `fn` block",
        );
    }

    #[test]
    fn parse_err_unexpected_end() {
        assert_err(
            "text <% end %>",
            ParseError::UnexpectedBlock,
            "unexpected `end` block",
        );
    }

    #[test]
    fn parse_err_else_after_else() {
        assert_err(
            "<% if a %><% else %><% else %><% end %>",
            ParseError::UnexpectedBlock,
            "unexpected `else` block",
        );
        assert_err(
            "<% for a in b %><% else if c %><% end %>",
            ParseError::UnexpectedBlock,
            "unexpected `else if` block",
        );
    }

    #[test]
    fn parse_err_nested_function() {
        assert_err(
            "<% fn a() %><% fn b() %><% end %><% end %>",
            ParseError::UnexpectedBlock,
            "functions cannot be nested",
        );
    }

    #[test]
    fn parse_err_content_outside_function() {
        assert_err(
            "hello <% fn a() %><% end %>",
            ParseError::UnexpectedBlock,
            "content outside of a function",
        );
        assert_err(
            "<% fn a() %><% end %><%= x %>",
            ParseError::UnexpectedBlock,
            "content outside of a function",
        );
    }

    #[test]
    fn parse_err_duplicate_parameter() {
        assert_err(
            "<% fn a(x: u8, x: u16) %><% end %>",
            ParseError::DuplicateParameterName,
            "duplicate parameter `x`",
        );
    }

    #[test]
    fn parse_err_missing_in() {
        assert_err(
            "<% for x xs %><% end %>",
            ParseError::UnexpectedToken,
            "expected keyword, found identifier",
        );
    }

    #[test]
    fn parse_err_missing_param_name() {
        assert_err(
            "<% fn a(&str) %><% end %>",
            ParseError::UnexpectedToken,
            "expected parameter name",
        );
    }
}
