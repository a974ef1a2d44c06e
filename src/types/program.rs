//! Defines a resolved [`Program`], the input to the code generator.
//!
//! A program borrows the parsed template and adds everything that is needed
//! to shape the generated function signatures.

use crate::types::ast;

#[derive(Debug)]
pub struct Program<'a> {
    /// The absolute path of the template, written to the header.
    pub path: &'a str,
    /// The package the generated file belongs to.
    pub package: &'a str,
    /// The template source, node spans index into this.
    pub source: &'a str,
    /// File level declarations copied verbatim.
    pub decls: Vec<&'a str>,
    pub funcs: Vec<Function<'a>>,
}

#[derive(Debug)]
pub struct Function<'a> {
    /// The exported name of the buffer returning variant.
    pub name: String,
    /// Parameter names and types in declaration order.
    pub params: Vec<(&'a str, &'a str)>,
    pub output: Output,
    pub body: &'a ast::Scope,
}

/// The output style of the buffer returning variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Returns a `String`.
    String,
    /// Returns a `Vec<u8>`.
    Bytes,
}

impl Function<'_> {
    pub fn to_writer_name(&self) -> String {
        format!("{}_to_writer", self.name)
    }

    pub fn to_writer_with_result_name(&self) -> String {
        format!("{}_to_writer_with_result", self.name)
    }
}
