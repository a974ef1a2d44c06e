//! Resolve a parsed template into a [`Program`].
//!
//! The resolver decides what each generated function is called and checks
//! that the signatures written in the template can be pasted into Rust
//! source. Expressions are never inspected, the Rust compiler does that.

use crate::compile::scan;
use crate::error::ResolveError;
use crate::types::ast;
use crate::types::program::{Function, Output, Program};
use crate::types::span::Span;
use crate::{Error, Result};

/// Names used by the generated code that parameters and loop variables may
/// not shadow.
const RESERVED: &[&str] = &["buffer", "output", "pooled", "writer"];

/// Strict and reserved Rust keywords.
const RUST_KEYWORDS: &[&str] = &[
    "Self", "abstract", "as", "async", "await", "become", "box", "break", "const", "continue",
    "crate", "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "static", "struct", "super", "trait", "true", "try", "type", "typeof",
    "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Resolves a template.
///
/// `name` is used for a template without `fn` directives, it is usually
/// derived from the file name by the namer.
pub fn program<'a>(
    template: &'a ast::Template<'a>,
    name: &str,
    path: &'a str,
    package: &'a str,
) -> Result<Program<'a>> {
    Resolver {
        source: template.source,
    }
    .resolve(template, name, path, package)
}

/// The default namer.
///
/// Takes the file name up to the first `.`, lower-cases it and replaces
/// every character that may not appear in an identifier with `_`.
///
/// ```text
/// user-list.html  => user_list
/// 404.html        => _404
/// ```
pub fn default_name(file_name: &str) -> String {
    let stem = file_name.split('.').next().unwrap_or_default();
    let mut name: String = stem
        .to_lowercase()
        .chars()
        .map(|c| if scan::is_ident(c) { c } else { '_' })
        .collect();
    match name.chars().next() {
        Some(c) if scan::is_ident_start(c) => {}
        _ => name.insert(0, '_'),
    }
    name
}

struct Resolver<'a> {
    source: &'a str,
}

impl<'a> Resolver<'a> {
    fn resolve(
        &self,
        template: &'a ast::Template<'a>,
        default: &str,
        path: &'a str,
        package: &'a str,
    ) -> Result<Program<'a>> {
        let mut funcs: Vec<Function<'a>> = Vec::with_capacity(template.funcs.len());
        let mut taken: Vec<String> = Vec::new();

        for func in &template.funcs {
            let (name, span) = match &func.name {
                Some(ident) => (self.source[ident.span].to_owned(), ident.span),
                None => (default.to_owned(), Span::from(0..0)),
            };
            self.check_ident(&name, "function name", span)?;

            let mut params = Vec::with_capacity(func.params.len());
            for param in &func.params {
                params.push(self.resolve_param(param)?);
            }

            self.check_scope(&func.body)?;

            let output = match func.ret {
                Some(ret) => self.resolve_output(ret)?,
                None => Output::String,
            };

            let function = Function {
                name,
                params,
                output,
                body: &func.body,
            };

            let names = [
                function.name.clone(),
                function.to_writer_name(),
                function.to_writer_with_result_name(),
            ];
            if let Some(dup) = names.iter().find(|n| taken.contains(*n)) {
                return Err(Error::resolve(
                    ResolveError::DuplicateFunctionName,
                    format!("function `{dup}` is defined more than once"),
                    self.source,
                    span,
                ));
            }
            taken.extend(names);
            funcs.push(function);
        }

        Ok(Program {
            path,
            package,
            source: self.source,
            decls: template.decls.iter().map(|&d| &self.source[d]).collect(),
            funcs,
        })
    }

    fn resolve_param(&self, param: &ast::Param) -> Result<(&'a str, &'a str)> {
        let name = &self.source[param.name.span];
        self.check_ident(name, "parameter name", param.name.span)?;
        if RESERVED.contains(&name) {
            return Err(self.err_signature(
                format!("parameter name `{name}` is reserved"),
                param.name.span,
            ));
        }

        let ty = &self.source[param.ty];
        if ty.trim().is_empty() {
            return Err(self.err_signature(format!("parameter `{name}` has no type"), param.span));
        }
        if let Some(reason) = check_type(ty) {
            return Err(self.err_signature(reason, param.ty));
        }
        Ok((name, ty.trim()))
    }

    /// Checks the loop variables of every `for` block in the scope.
    fn check_scope(&self, scope: &ast::Scope) -> Result<()> {
        for node in &scope.nodes {
            match node {
                ast::Node::For(ast::ForLoop { vars, body, .. }) => {
                    match vars {
                        ast::LoopVars::Item(item) => self.check_loop_var(item)?,
                        ast::LoopVars::KeyValue(kv) => {
                            self.check_loop_var(&kv.key)?;
                            self.check_loop_var(&kv.value)?;
                        }
                    }
                    self.check_scope(body)?;
                }
                ast::Node::If(ast::IfElse {
                    branches,
                    else_branch,
                }) => {
                    for branch in branches {
                        self.check_scope(&branch.body)?;
                    }
                    self.check_scope(else_branch)?;
                }
                ast::Node::Text(_) | ast::Node::Expr(_) | ast::Node::Include(_) => {}
            }
        }
        Ok(())
    }

    fn check_loop_var(&self, var: &ast::Ident) -> Result<()> {
        let name = &self.source[var.span];
        if name == "_" {
            return Ok(());
        }
        self.check_ident(name, "loop variable", var.span)?;
        if RESERVED.contains(&name) {
            return Err(self.err_signature(
                format!("loop variable `{name}` is reserved"),
                var.span,
            ));
        }
        Ok(())
    }

    fn resolve_output(&self, ret: Span) -> Result<Output> {
        let ty: String = self.source[ret]
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        match ty.as_str() {
            "String" => Ok(Output::String),
            "Vec<u8>" => Ok(Output::Bytes),
            _ => Err(self.err_signature("return type must be `String` or `Vec<u8>`", ret)),
        }
    }

    fn check_ident(&self, name: &str, what: &str, span: Span) -> Result<()> {
        let mut chars = name.chars();
        let valid = match chars.next() {
            Some(c) if scan::is_ident_start(c) => chars.all(scan::is_ident) && name != "_",
            _ => false,
        };
        if !valid {
            return Err(self.err_signature(format!("invalid {what} `{name}`"), span));
        }
        if RUST_KEYWORDS.contains(&name) {
            return Err(self.err_signature(format!("{what} `{name}` is a keyword"), span));
        }
        Ok(())
    }

    fn err_signature(&self, msg: impl Into<String>, span: Span) -> Error {
        Error::resolve(
            ResolveError::InvalidParameterSignature,
            msg,
            self.source,
            span,
        )
    }
}

/// Checks that a type can be pasted into a function signature, returning
/// the reason if it can not.
fn check_type(ty: &str) -> Option<String> {
    let bytes = ty.as_bytes();
    let mut stack = Vec::new();
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b';' if stack.last() == Some(&b'[') => {}
            b';' | b'{' | b'}' => return Some(format!("unexpected `{}` in type", b as char)),
            b':' => {
                let pair = bytes.get(i + 1) == Some(&b':') || (i > 0 && bytes[i - 1] == b':');
                if !pair {
                    return Some("unexpected `:` in type".into());
                }
            }
            b'(' | b'[' | b'<' => stack.push(b),
            b'>' if i > 0 && bytes[i - 1] == b'-' => {}
            b')' | b']' | b'>' => {
                let open = match b {
                    b')' => b'(',
                    b']' => b'[',
                    _ => b'<',
                };
                if stack.pop() != Some(open) {
                    return Some(format!("unbalanced `{}` in type", b as char));
                }
            }
            _ => {}
        }
    }
    stack
        .pop()
        .map(|b| format!("unclosed `{}` in type", b as char))
}
