//! AST representing a template.
//!
//! Nodes refer back to the template source using [`Span`]s, use
//! [`Template::text`] to get the source text for a span.

pub use crate::types::span::Span;

/// A parsed template file.
#[derive(Debug)]
pub struct Template<'source> {
    /// The original template source.
    pub source: &'source str,
    /// File level declarations, e.g. `<%! use std::fmt; %>`.
    pub decls: Vec<Span>,
    /// The functions declared in this template in source order.
    pub funcs: Vec<Func>,
}

/// A function that will be generated from the template.
#[derive(Debug)]
pub struct Func {
    /// The declared name, `None` if the template has no `fn` directive.
    pub name: Option<Ident>,
    pub params: Vec<Param>,
    /// The declared return type, e.g. `Vec<u8>`.
    pub ret: Option<Span>,
    pub body: Scope,
    pub span: Span,
}

/// A function parameter, e.g. `users: &[User]`.
#[derive(Debug, Clone, Copy)]
pub struct Param {
    pub name: Ident,
    pub ty: Span,
    pub span: Span,
}

#[derive(Debug, Default)]
pub struct Scope {
    pub nodes: Vec<Node>,
}

#[derive(Debug)]
pub enum Node {
    /// Literal template text.
    Text(Span),
    /// An expression to output.
    Expr(Expr),
    /// A loop over an iterable expression.
    For(ForLoop),
    /// A conditional with one or more branches.
    If(IfElse),
    /// A call to another template function.
    Include(Include),
}

#[derive(Debug)]
pub struct Expr {
    pub source: Span,
    /// Whether the value is HTML escaped before being written.
    pub escape: bool,
}

#[derive(Debug)]
pub struct ForLoop {
    pub vars: LoopVars,
    pub iterable: Span,
    pub body: Scope,
}

#[derive(Debug, Clone, Copy)]
pub enum LoopVars {
    Item(Ident),
    KeyValue(KeyValue),
}

#[derive(Debug, Clone, Copy)]
pub struct KeyValue {
    pub key: Ident,
    pub value: Ident,
    pub span: Span,
}

#[derive(Debug)]
pub struct IfElse {
    pub branches: Vec<Branch>,
    /// Empty if there is no `else` clause.
    pub else_branch: Scope,
}

#[derive(Debug)]
pub struct Branch {
    pub cond: Span,
    pub body: Scope,
}

#[derive(Debug)]
pub struct Include {
    pub name: Ident,
    pub args: Vec<Span>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy)]
pub struct Ident {
    pub span: Span,
}

impl Template<'_> {
    /// Returns the source text for the given span.
    #[inline]
    pub fn text(&self, span: Span) -> &str {
        &self.source[span]
    }
}

impl Scope {
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl LoopVars {
    pub fn span(&self) -> Span {
        match self {
            Self::Item(item) => item.span,
            Self::KeyValue(kv) => kv.span,
        }
    }
}
