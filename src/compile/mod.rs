//! Compile a template into Rust source.
//!
//! This process has four stages:
//! - The scanner chunks the template source into tokens.
//! - The parser constructs an AST from the token stream.
//! - The resolver names the functions and checks their signatures.
//! - The generator writes the Rust source for the resolved program.

mod codegen;
mod parse;
mod resolve;
mod scan;

pub use crate::compile::resolve::default_name;

use crate::types::ast;
use crate::types::syntax::Syntax;
use crate::Result;

/// Parse a template into an AST.
pub fn parse<'a>(syntax: &'a Syntax, source: &'a str) -> Result<ast::Template<'a>> {
    parse::Parser::new(syntax, source).parse_template()
}

/// Compile a template into Rust source.
///
/// `name` is used for a template without `fn` directives.
pub fn template(
    syntax: &Syntax,
    source: &str,
    name: &str,
    path: &str,
    package: &str,
    rt: &str,
) -> Result<String> {
    let ast = parse(syntax, source)?;
    let program = resolve::program(&ast, name, path, package)?;
    Ok(codegen::program(&program, rt))
}
