//! An ahead of time HTML template compiler that generates Rust source.
//!
//! Templates are compiled into plain Rust functions at build time. Rendering
//! is then just a series of `push_str` calls, there is no template runtime
//! to speak of other than escaping and a buffer pool.
//!
//! # Features
//!
//! ### Syntax
//!
//! - Functions: `<% fn user_list(users: &[User]) %> ... <% end %>`
//! - Escaped expressions: `<%= user.name %>`
//! - Raw expressions: `<%== user.bio_html %>`
//! - Conditionals: `<% if user.admin %> ... <% else if x %> ... <% else %> ... <% end %>`
//! - Loops: `<% for user in users %> ... <% end %>`, `<% for i, user in users.iter().enumerate() %>`
//! - Nested templates: `<% include user_card(user, |u| u.name.len()) %>`
//! - Declarations copied to the generated file: `<%! use crate::models::User; %>`
//! - Comments: `<%# ignored %>`
//! - Configurable delimiters: `{% if user.admin %}`
//!
//! ### Generated code
//!
//! For each template function `name` three functions are generated:
//!
//! - `name(..) -> String` renders into a new string. Declaring the function
//!   with `-> Vec<u8>` returns bytes instead.
//! - `name_to_writer(.., writer: &mut W)` renders into a pooled buffer and
//!   writes it to any [`std::io::Write`] implementor.
//! - `name_to_writer_with_result(.., writer: &mut W) -> io::Result<usize>`
//!   does the same and reports the outcome of the write.
//!
//! A template without any `fn` directive is a single function without
//! parameters named after the file, e.g. `index.html` becomes `index()`.
//!
//! # Getting started
//!
//! Templates are usually compiled from a build script.
//!
//! ```no_run
//! // build.rs
//! fn main() {
//!     let out_dir = std::env::var("OUT_DIR").unwrap();
//!     let report = hewn::generate("templates", &out_dir, "templates").unwrap();
//!     assert!(report.is_success());
//! }
//! ```
//!
//! The generated files are then included into a module that has everything
//! the templates refer to in scope.
//!
//! ```ignore
//! mod templates {
//!     use crate::models::User;
//!
//!     include!(concat!(env!("OUT_DIR"), "/users.html.rs"));
//! }
//!
//! let html = templates::user_list(&users);
//! ```
//!
//! The [`Compiler`] type gives access to the configuration and can compile a
//! single template held in memory.
//!
//! ```
//! let compiler = hewn::Compiler::new();
//! let code = compiler.compile("hello.html", "Hello <%= name %>!", "pages")?;
//! assert!(code.contains("pub fn hello() -> String {"));
//! assert!(code.contains("pub fn hello_to_writer<W: ::std::io::Write + ?Sized>(writer: &mut W) {"));
//! # Ok::<(), hewn::Error>(())
//! ```

mod compile;
mod error;
mod generate;
pub mod rt;
mod types;

use std::fmt;
use std::fs;
use std::path::Path;

pub use crate::error::{Error, ErrorKind, ParseError, ResolveError, ScanError};
pub use crate::generate::Report;
pub use crate::types::ast;
pub use crate::types::span::{Position, Span};
pub use crate::types::syntax::{Syntax, SyntaxBuilder};

/// A type alias for results in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Derives the function name of a template without `fn` directives from its
/// file name.
type NamerFn = dyn Fn(&str) -> String + Send + Sync + 'static;

/// The template compiler.
///
/// The compiler stores the syntax config, the namer and the paths used by
/// generated code. Generally, you only need to construct one compiler.
pub struct Compiler {
    syntax: Syntax,
    namer: Box<NamerFn>,
    runtime: String,
    extensions: Vec<String>,
}

impl Default for Compiler {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    /// Construct a new compiler.
    #[inline]
    pub fn new() -> Self {
        Self::with_syntax(Syntax::default())
    }

    /// Construct a new compiler with custom syntax.
    ///
    /// # Examples
    ///
    /// ```
    /// use hewn::{Compiler, Syntax};
    ///
    /// let syntax = Syntax::builder().directive("{%", "%}").build();
    /// let compiler = Compiler::with_syntax(syntax);
    /// ```
    #[inline]
    pub fn with_syntax(syntax: Syntax) -> Self {
        Self {
            syntax,
            namer: Box::new(compile::default_name),
            runtime: String::from("::hewn::rt"),
            extensions: vec![String::from(".html")],
        }
    }

    /// Set the function that names templates without `fn` directives.
    ///
    /// The function receives the file name of the template, e.g.
    /// `user-list.html`, and must return a valid Rust identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut compiler = hewn::Compiler::new();
    /// compiler.set_namer(|file_name| format!("render_{}", file_name.replace('.', "_")));
    /// let code = compiler.compile("index.html", "Hi", "pages")?;
    /// assert!(code.contains("pub fn render_index_html() -> String {"));
    /// # Ok::<(), hewn::Error>(())
    /// ```
    #[inline]
    pub fn set_namer<F>(&mut self, f: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.namer = Box::new(f);
    }

    /// Set the path of the runtime support module used by generated code.
    ///
    /// Defaults to `::hewn::rt`. This is useful if `hewn` is re-exported by
    /// another crate.
    #[inline]
    pub fn set_runtime_path(&mut self, path: impl Into<String>) {
        self.runtime = path.into();
    }

    /// Set the file name extensions of templates picked up by
    /// [`.generate(..)`][Compiler::generate].
    ///
    /// Defaults to `.html`.
    #[inline]
    pub fn set_extensions<I, S>(&mut self, extensions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
    }

    /// Parse a template without generating any code.
    #[inline]
    pub fn parse<'a>(&'a self, source: &'a str) -> Result<ast::Template<'a>> {
        compile::parse(&self.syntax, source)
    }

    /// Compile a template held in memory into Rust source.
    ///
    /// The path is written to the header of the generated source and its
    /// file name is used to name a template without `fn` directives. The
    /// file is not read.
    pub fn compile(&self, path: impl AsRef<Path>, source: &str, package: &str) -> Result<String> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        let name = (self.namer)(&*file_name);
        compile::template(
            &self.syntax,
            source,
            &name,
            &display,
            package,
            &self.runtime,
        )
        .map_err(|err| err.with_path(display))
    }

    /// Read and compile a template file into Rust source.
    pub fn compile_file(&self, path: impl AsRef<Path>, package: &str) -> Result<String> {
        let path = path.as_ref();
        let path = path
            .canonicalize()
            .map_err(|err| Error::io(err, "failed to open template", path))?;
        let source = fs::read_to_string(&path)
            .map_err(|err| Error::io(err, "failed to read template", &path))?;
        self.compile(&path, &source, package)
    }

    /// Compile every template under `src` into Rust source files under
    /// `dest`.
    ///
    /// The directory structure is mirrored, `src/users/list.html` is written
    /// to `dest/users/list.html.rs`. Templates that fail are recorded in the
    /// returned [`Report`] and do not stop the others. An error is only
    /// returned if `src` can not be opened.
    pub fn generate(
        &self,
        src: impl AsRef<Path>,
        dest: impl AsRef<Path>,
        package: &str,
    ) -> Result<Report> {
        generate::run(self, src.as_ref(), dest.as_ref(), package)
    }
}

impl fmt::Debug for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiler")
            .field("syntax", &self.syntax)
            .field("runtime", &self.runtime)
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

/// Compile every template under `src` into Rust source files under `dest`
/// using the default configuration.
///
/// See [`Compiler::generate`].
#[inline]
pub fn generate(src: impl AsRef<Path>, dest: impl AsRef<Path>, package: &str) -> Result<Report> {
    Compiler::new().generate(src, dest, package)
}
