pub mod context;
#[cfg(test)]
mod tests;

/// Templates compiled by the build script.
pub mod templates {
    include!(concat!(env!("OUT_DIR"), "/users.html.rs"));
}

/// The source of the benchmark template.
pub const USERS: &str = include_str!("../benchdata/users.html");

/// Returns a template source with `n` copies of the benchmark template, each
/// with a unique function name.
pub fn repeat(n: usize) -> String {
    (0..n)
        .map(|i| {
            let source = USERS.replace("fn users(", &format!("fn users_{i}("));
            if i == 0 {
                source
            } else {
                // declarations only once
                source.replacen("<%! use crate::context::Context; %>", "", 1)
            }
        })
        .collect()
}
