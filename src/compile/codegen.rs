//! Generate Rust source from a resolved [`Program`].
//!
//! Every template function becomes three Rust functions, one that returns
//! the rendered output, one that renders into a writer and one that does the
//! same but reports the outcome of the write. Generated code only uses fully
//! qualified paths so that several generated files can share a module.

use crate::types::ast;
use crate::types::program::{Function, Output, Program};

/// Generates the source of a program.
///
/// `rt` is the path of the runtime support module, e.g. `::hewn::rt`.
pub fn program(program: &Program<'_>, rt: &str) -> String {
    let mut gen = Generator {
        source: program.source,
        rt,
        buf: String::new(),
        indent: 0,
    };
    gen.header(program);
    for func in &program.funcs {
        gen.buf.push('\n');
        gen.function(func);
    }
    gen.buf
}

/// A generator that writes Rust source into a buffer.
struct Generator<'a> {
    /// The template source, node spans index into this.
    source: &'a str,
    /// The path of the runtime support module.
    rt: &'a str,
    buf: String,
    indent: usize,
}

impl Generator<'_> {
    fn header(&mut self, program: &Program<'_>) {
        self.line("// Code generated by hewn.");
        self.line(&format!("// source: {}", program.path));
        self.line("// DO NOT EDIT!");
        self.line(&format!("// package: {}", program.package));
        if !program.decls.is_empty() {
            self.buf.push('\n');
            for decl in &program.decls {
                self.line(decl);
            }
        }
    }

    fn function(&mut self, func: &Function<'_>) {
        let params: Vec<String> = func
            .params
            .iter()
            .map(|(name, ty)| format!("{name}: {ty}"))
            .collect();
        let mut writer_params = params.clone();
        writer_params.push("writer: &mut W".to_owned());
        let params = params.join(", ");
        let writer_params = writer_params.join(", ");
        let rt = self.rt;

        // pub fn name(params) -> String
        let (ret, result) = match func.output {
            Output::String => ("String", "output"),
            Output::Bytes => ("Vec<u8>", "output.into_bytes()"),
        };
        self.open(&format!("pub fn {}({params}) -> {ret}", func.name));
        self.line("let mut output = String::new();");
        self.line("let buffer = &mut output;");
        self.scope(func.body);
        self.line(result);
        self.close("}");

        self.buf.push('\n');

        // pub fn name_to_writer(params, writer)
        self.open(&format!(
            "pub fn {}<W: ::std::io::Write + ?Sized>({writer_params})",
            func.to_writer_name()
        ));
        self.line(&format!("let mut pooled = {rt}::acquire();"));
        self.line("let buffer: &mut String = &mut pooled;");
        self.scope(func.body);
        self.line("let _ = writer.write_all(buffer.as_bytes());");
        self.close("}");

        self.buf.push('\n');

        // pub fn name_to_writer_with_result(params, writer) -> io::Result<usize>
        self.open(&format!(
            "pub fn {}<W: ::std::io::Write + ?Sized>({writer_params}) -> ::std::io::Result<usize>",
            func.to_writer_with_result_name()
        ));
        self.line(&format!("let mut pooled = {rt}::acquire();"));
        self.line("let buffer: &mut String = &mut pooled;");
        self.scope(func.body);
        self.line("writer.write_all(buffer.as_bytes())?;");
        self.line("Ok(buffer.len())");
        self.close("}");
    }

    fn scope(&mut self, scope: &ast::Scope) {
        let source = self.source;
        let rt = self.rt;

        // Consecutive text is written with a single `push_str`.
        let mut text = String::new();

        for node in &scope.nodes {
            if let ast::Node::Text(span) = node {
                text.push_str(&source[*span]);
                continue;
            }
            self.flush(&mut text);

            match node {
                ast::Node::Text(_) => {}

                ast::Node::Expr(ast::Expr { source: expr, escape }) => {
                    let func = if *escape { "escape_html" } else { "write_raw" };
                    let expr = &source[*expr];
                    self.line(&format!("{rt}::{func}(&({expr}), buffer);"));
                }

                ast::Node::For(ast::ForLoop {
                    vars,
                    iterable,
                    body,
                }) => {
                    let vars = match vars {
                        ast::LoopVars::Item(item) => source[item.span].to_owned(),
                        ast::LoopVars::KeyValue(kv) => {
                            format!("({}, {})", &source[kv.key.span], &source[kv.value.span])
                        }
                    };
                    let iterable = &source[*iterable];
                    self.open(&format!("for {vars} in {iterable}"));
                    self.scope(body);
                    self.close("}");
                }

                ast::Node::If(ast::IfElse {
                    branches,
                    else_branch,
                }) => {
                    for (i, branch) in branches.iter().enumerate() {
                        let cond = &source[branch.cond];
                        if i == 0 {
                            self.open(&format!("if {cond}"));
                        } else {
                            self.indent -= 1;
                            self.line(&format!("}} else if {cond} {{"));
                            self.indent += 1;
                        }
                        self.scope(&branch.body);
                    }
                    if !else_branch.is_empty() {
                        self.indent -= 1;
                        self.line("} else {");
                        self.indent += 1;
                        self.scope(else_branch);
                    }
                    self.close("}");
                }

                ast::Node::Include(ast::Include { name, args, .. }) => {
                    let args: Vec<&str> = args.iter().map(|a| &source[*a]).collect();
                    self.line(&format!(
                        "{rt}::append(buffer, {}({}));",
                        &source[name.span],
                        args.join(", ")
                    ));
                }
            }
        }

        self.flush(&mut text);
    }

    /// Writes pending literal text.
    fn flush(&mut self, text: &mut String) {
        if text.is_empty() {
            return;
        }
        let lit = string_literal(text);
        self.line(&format!("buffer.push_str({lit});"));
        text.clear();
    }

    fn open(&mut self, head: &str) {
        self.line(&format!("{head} {{"));
        self.indent += 1;
    }

    fn close(&mut self, tail: &str) {
        self.indent -= 1;
        self.line(tail);
    }

    fn line(&mut self, s: &str) {
        for _ in 0..self.indent {
            self.buf.push_str("    ");
        }
        self.buf.push_str(s);
        self.buf.push('\n');
    }
}

/// Returns a Rust string literal for the given text.
///
/// Raw string literals are used with the least number of `#` needed.
/// Carriage returns are not allowed in raw string literals so text
/// containing them is escaped instead.
fn string_literal(text: &str) -> String {
    if text.contains('\r') {
        return format!("{text:?}");
    }
    let hashes = text
        .match_indices('"')
        .map(|(i, _)| text[i + 1..].bytes().take_while(|&b| b == b'#').count() + 1)
        .max()
        .unwrap_or(0);
    let hashes = "#".repeat(hashes);
    format!("r{hashes}\"{text}\"{hashes}")
}
