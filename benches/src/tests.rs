use crate::context::{Context, User};
use crate::templates;

fn context() -> Context {
    Context {
        title: String::from("<Users>"),
        users: vec![
            User {
                name: String::from("Tom & Jerry"),
                age: 42,
                is_disabled: false,
            },
            User {
                name: String::from("Inactive"),
                age: 7,
                is_disabled: true,
            },
        ],
    }
}

#[test]
fn render_users() {
    let result = templates::users(&context());
    assert!(result.contains("<title>&lt;Users&gt;</title>"));
    assert!(result.contains("<tr><td>Tom &amp; Jerry</td><td>42</td></tr>"));
    assert!(result.contains(r#"<tr class="disabled"><td>Inactive</td></tr>"#));
    assert!(!result.contains("<td>7</td>"));
}

#[test]
fn render_users_to_writer() {
    let ctx = context();
    let mut buf = Vec::new();
    let n = templates::users_to_writer_with_result(&ctx, &mut buf).unwrap();
    assert_eq!(n, buf.len());
    assert_eq!(String::from_utf8(buf).unwrap(), templates::users(&ctx));
}

#[test]
fn compile_repeated() {
    let source = crate::repeat(3);
    let code = hewn::Compiler::new()
        .compile("users.html", &source, "templates")
        .unwrap();
    assert!(code.contains("pub fn users_2(ctx: &Context) -> String {"));
}
