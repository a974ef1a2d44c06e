use hewn::{ast, Compiler, ErrorKind, ParseError, ResolveError, Syntax};

#[test]
fn compile_empty() {
    let code = Compiler::new().compile("empty.html", "", "pages").unwrap();
    assert!(code.contains("pub fn empty() -> String {"));
}

#[test]
fn compile_text_only() {
    let code = Compiler::new()
        .compile("about.html", "<p>lorem ipsum</p>\n", "pages")
        .unwrap();
    assert!(code.contains("    buffer.push_str(r\"<p>lorem ipsum</p>\n\");\n"));
}

#[test]
fn compile_include_only() {
    let code = Compiler::new()
        .compile("home.html", "<% include footer() %>", "pages")
        .unwrap();
    // Once per variant.
    assert_eq!(code.matches("::hewn::rt::append(").count(), 3);
    assert_eq!(
        code.matches("    ::hewn::rt::append(buffer, footer());\n").count(),
        3
    );
    assert!(!code.contains("push_str"));
}

#[test]
fn compile_header() {
    let code = Compiler::new()
        .compile("/srv/templates/index.html", "hi", "templates")
        .unwrap();
    assert!(code.starts_with(
        "// Code generated by hewn.\n\
         // source: /srv/templates/index.html\n\
         // DO NOT EDIT!\n\
         // package: templates\n\
         \n"
    ));
}

#[test]
fn compile_user_list() {
    let code = Compiler::new()
        .compile(
            "list.html",
            r#"<%! use crate::User; %>
<% fn user_list(users: &[User]) %>
<% for user in users %>
<div><a href="/user/<%= user.name %>"><%= user.name %></a></div>
<% end %>
<% end %>
"#,
            "templates",
        )
        .unwrap();

    assert!(code.contains("\nuse crate::User;\n"));
    assert!(code.contains("pub fn user_list(users: &[User]) -> String {\n"));
    assert!(code.contains(
        "pub fn user_list_to_writer<W: ::std::io::Write + ?Sized>(users: &[User], writer: &mut W) {\n"
    ));
    assert!(code.contains(
        "pub fn user_list_to_writer_with_result<W: ::std::io::Write + ?Sized>(users: &[User], writer: &mut W) -> ::std::io::Result<usize> {\n"
    ));
    assert!(code.contains(
        r##"    for user in users {
        buffer.push_str(r#"
<div><a href="/user/"#);
        ::hewn::rt::escape_html(&(user.name), buffer);
        buffer.push_str(r#"">"#);
        ::hewn::rt::escape_html(&(user.name), buffer);
        buffer.push_str(r"</a></div>
");
    }
"##
    ));
    // the template functions and nothing else
    assert_eq!(code.matches("pub fn ").count(), 3);
}

#[test]
fn compile_is_deterministic() {
    let source = "<% fn a(x: u8) %><%= x %><% end %><% fn b() %><% include a(1) %><% end %>";
    let compiler = Compiler::new();
    let a = compiler.compile("/t/a.html", source, "pages").unwrap();
    let b = compiler.compile("/t/a.html", source, "pages").unwrap();
    assert_eq!(a, b);
}

#[test]
fn compile_custom_syntax() {
    let syntax = Syntax::builder().directive("{%", "%}").build();
    let code = Compiler::with_syntax(syntax)
        .compile("x.html", "{% if ok %}<%= not code %>{%= name %}{% end %}", "pages")
        .unwrap();
    assert!(code.contains("    if ok {\n        buffer.push_str(r\"<%= not code %>\");\n"));
    assert!(code.contains("::hewn::rt::escape_html(&(name), buffer);"));
}

#[test]
fn compile_custom_runtime_path() {
    let mut compiler = Compiler::new();
    compiler.set_runtime_path("crate::support::rt");
    let code = compiler.compile("x.html", "<%== body %>", "pages").unwrap();
    assert!(code.contains("    let mut pooled = crate::support::rt::acquire();\n"));
    assert!(code.contains("    crate::support::rt::write_raw(&(body), buffer);\n"));
    assert!(!code.contains("::hewn::"));
}

#[test]
fn compile_default_names() {
    let compiler = Compiler::new();
    for (file, name) in [
        ("index.html", "index"),
        ("user-list.html", "user_list"),
        ("Layout.tpl.html", "layout"),
        ("404.html", "_404"),
    ] {
        let code = compiler.compile(file, "x", "pages").unwrap();
        assert!(code.contains(&format!("pub fn {name}() -> String {{")), "{file}");
    }
}

#[test]
fn compile_custom_namer() {
    let mut compiler = Compiler::new();
    compiler.set_namer(|file| format!("page_{}", file.split('.').next().unwrap()));
    let code = compiler.compile("dir/home.html", "x", "pages").unwrap();
    assert!(code.contains("pub fn page_home() -> String {"));
    assert!(code.contains("pub fn page_home_to_writer<"));
}

#[test]
fn compile_bytes_output() {
    let code = Compiler::new()
        .compile("x.html", "<% fn raw() -> Vec<u8> %>x<% end %>", "pages")
        .unwrap();
    assert!(code.contains("pub fn raw() -> Vec<u8> {"));
    assert!(code.contains("    output.into_bytes()\n"));
}

#[test]
fn compile_multiline_expression() {
    let code = Compiler::new()
        .compile(
            "x.html",
            "<%= users\n    .iter()\n    .map(|u| u.name.as_str())\n    .collect::<Vec<_>>()\n    .join(\", \") %>",
            "pages",
        )
        .unwrap();
    assert!(code.contains(
        "::hewn::rt::escape_html(&(users\n    .iter()\n    .map(|u| u.name.as_str())\n    .collect::<Vec<_>>()\n    .join(\", \")), buffer);"
    ));
}

#[test]
fn parse_returns_ast() {
    let compiler = Compiler::new();
    let template = compiler
        .parse("<% fn a(x: u8) %><% if x > 1 %>big<% end %><% end %>")
        .unwrap();
    assert_eq!(template.funcs.len(), 1);
    let func = &template.funcs[0];
    assert_eq!(template.text(func.name.as_ref().unwrap().span), "a");
    match &func.body.nodes[..] {
        [ast::Node::If(if_else)] => {
            assert_eq!(template.text(if_else.branches[0].cond), "x > 1");
        }
        nodes => panic!("unexpected nodes {nodes:?}"),
    }
}

#[test]
fn compile_err_unclosed_block() {
    let err = Compiler::new()
        .compile("list.html", "<% for x in xs %>", "pages")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse(ParseError::UnclosedBlock));
    assert_eq!(err.path(), Some("list.html"));
    assert_eq!(
        format!("{err:#}"),
        "parse error
  --> list.html:1:1
   |
 1 | <% for x in xs %>
   | ^^^^^^^^^^^^^^^^^
   |
   = reason: unclosed `for` block
"
    );
}

#[test]
fn compile_err_unexpected_end() {
    let err = Compiler::new()
        .compile("x.html", "lorem\n<% end %>", "pages")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse(ParseError::UnexpectedBlock));
    assert_eq!(
        err.to_string(),
        "parse error: unexpected `end` block at x.html:2:1"
    );
}

#[test]
fn compile_err_unknown_directive() {
    let err = Compiler::new()
        .compile("x.html", "<% match x %><% end %>", "pages")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse(ParseError::UnknownDirective));
    assert_eq!(err.reason(), "unknown directive `match`");
    assert_eq!(err.line_col(), Some((1, 4)));
}

#[test]
fn compile_err_duplicate_parameter() {
    let err = Compiler::new()
        .compile("x.html", "<% fn f(a: u8, a: u8) %><% end %>", "pages")
        .unwrap_err();
    assert_eq!(
        err.kind(),
        ErrorKind::Parse(ParseError::DuplicateParameterName)
    );
}

#[test]
fn compile_err_content_outside_function() {
    let err = Compiler::new()
        .compile("x.html", "<% fn f() %><% end %>\noops\n", "pages")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse(ParseError::UnexpectedBlock));
    assert_eq!(err.reason(), "content outside of a function");
    assert_eq!(err.line_col(), Some((1, 22)));
}

#[test]
fn compile_err_reserved_parameter() {
    let err = Compiler::new()
        .compile("x.html", "<% fn f(writer: &str) %><% end %>", "pages")
        .unwrap_err();
    assert_eq!(
        err.kind(),
        ErrorKind::Resolve(ResolveError::InvalidParameterSignature)
    );
    assert_eq!(err.reason(), "parameter name `writer` is reserved");
}

#[test]
fn compile_err_parameter_shadows_output() {
    let err = Compiler::new()
        .compile("p.html", "<% fn p(output: &str) %><%= output %><% end %>", "pages")
        .unwrap_err();
    assert_eq!(
        err.kind(),
        ErrorKind::Resolve(ResolveError::InvalidParameterSignature)
    );
    assert_eq!(err.reason(), "parameter name `output` is reserved");
}

#[test]
fn compile_err_loop_variable_shadows_buffer() {
    let err = Compiler::new()
        .compile(
            "p.html",
            "<% fn p(xs: &[u8]) %><% for buffer in xs %><%= buffer %><% end %><% end %>",
            "pages",
        )
        .unwrap_err();
    assert_eq!(
        err.kind(),
        ErrorKind::Resolve(ResolveError::InvalidParameterSignature)
    );
    assert_eq!(err.reason(), "loop variable `buffer` is reserved");
    assert_eq!(err.line_col(), Some((1, 29)));
}

#[test]
fn compile_err_duplicate_function() {
    let err = Compiler::new()
        .compile(
            "x.html",
            "<% fn f() %><% end %>\n<% fn f_to_writer_with_result() %><% end %>",
            "pages",
        )
        .unwrap_err();
    assert_eq!(
        err.kind(),
        ErrorKind::Resolve(ResolveError::DuplicateFunctionName)
    );
    assert_eq!(err.line_col(), Some((2, 7)));
}

#[test]
fn compile_err_invalid_default_name() {
    let err = Compiler::new().compile("fn.html", "x", "pages").unwrap_err();
    assert_eq!(
        err.kind(),
        ErrorKind::Resolve(ResolveError::InvalidParameterSignature)
    );
    assert_eq!(err.reason(), "function name `fn` is a keyword");
}
