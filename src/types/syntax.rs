/// The template syntax configuration.
///
/// Use [`Syntax::default()`] to get the default syntax configuration and
/// [`Syntax::builder()`] to create a custom syntax configuration.
///
/// Only the outer delimiters are configurable. The character following the
/// begin delimiter always selects the kind of directive:
///
/// | begin   | directive                      |
/// |---------|--------------------------------|
/// | `<%`    | block, e.g. `<% for x in xs %>` |
/// | `<%=`   | escaped expression             |
/// | `<%==`  | raw expression                 |
/// | `<%!`   | file level declaration         |
/// | `<%#`   | comment                        |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syntax {
    pub(crate) begin: String,
    pub(crate) end: String,
}

/// A builder for the syntax configuration.
///
/// This struct is typically created using [`Syntax::builder()`].
#[derive(Debug, Clone)]
pub struct SyntaxBuilder {
    directive: Option<(String, String)>,
}

/// The kind of directive selected by the characters after a begin
/// delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Block,
    Expr,
    Raw,
    Decl,
    Comment,
}

impl Default for Syntax {
    /// Returns the default syntax configuration.
    ///
    /// This is equivalent to the following.
    /// ```
    /// use hewn::Syntax;
    ///
    /// let syntax = Syntax::builder().directive("<%", "%>").build();
    /// assert_eq!(syntax, Syntax::default());
    /// ```
    #[inline]
    fn default() -> Self {
        Syntax::builder().directive("<%", "%>").build()
    }
}

impl Syntax {
    /// Create a new syntax builder.
    ///
    /// # Examples
    ///
    /// ```
    /// let syntax = hewn::Syntax::builder().directive("{%", "%}").build();
    /// ```
    #[inline]
    pub fn builder() -> SyntaxBuilder {
        SyntaxBuilder::new()
    }

    /// Returns the begin delimiter.
    #[inline]
    pub fn begin(&self) -> &str {
        &self.begin
    }

    /// Returns the end delimiter.
    #[inline]
    pub fn end(&self) -> &str {
        &self.end
    }

    /// Finds the next begin delimiter at or after `at`.
    ///
    /// Returns the directive kind and the start and end of the full begin
    /// tag including its sigil.
    pub(crate) fn find_begin(&self, source: &str, at: usize) -> Option<(Kind, usize, usize)> {
        let i = at + source[at..].find(self.begin.as_str())?;
        let j = i + self.begin.len();
        let rest = &source[j..];
        let (kind, len) = if rest.starts_with("==") {
            (Kind::Raw, 2)
        } else if rest.starts_with('=') {
            (Kind::Expr, 1)
        } else if rest.starts_with('!') {
            (Kind::Decl, 1)
        } else if rest.starts_with('#') {
            (Kind::Comment, 1)
        } else {
            (Kind::Block, 0)
        };
        Some((kind, i, j + len))
    }

    /// Finds the next end delimiter at or after `at`.
    pub(crate) fn find_end(&self, source: &str, at: usize) -> Option<(usize, usize)> {
        let i = at + source[at..].find(self.end.as_str())?;
        Some((i, i + self.end.len()))
    }

    /// Returns the index just past the end delimiter if `source` starts with
    /// it at `at`.
    pub(crate) fn end_at(&self, source: &str, at: usize) -> Option<usize> {
        source.as_bytes()[at..]
            .starts_with(self.end.as_bytes())
            .then(|| at + self.end.len())
    }
}

impl SyntaxBuilder {
    /// Creates a new syntax builder.
    #[inline]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self { directive: None }
    }

    /// Set the directive delimiters.
    ///
    /// # Panics
    ///
    /// If either of the strings are empty or if they are equal.
    #[inline]
    pub fn directive(&mut self, begin: &str, end: &str) -> &mut Self {
        assert!(!begin.is_empty() && !end.is_empty());
        assert!(begin != end, "begin and end delimiters must differ");
        self.directive = Some((begin.into(), end.into()));
        self
    }

    /// Builds the syntax configuration.
    ///
    /// If no delimiters were set the default `<%` and `%>` are used.
    pub fn build(&self) -> Syntax {
        let (begin, end) = self
            .directive
            .clone()
            .unwrap_or_else(|| ("<%".into(), "%>".into()));
        Syntax { begin, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_begin_kinds() {
        let syntax = Syntax::default();
        let cases = [
            ("<% if x %>", Kind::Block, 2),
            ("<%= x %>", Kind::Expr, 3),
            ("<%== x %>", Kind::Raw, 4),
            ("<%! use x; %>", Kind::Decl, 3),
            ("<%# x %>", Kind::Comment, 3),
        ];
        for (source, kind, len) in cases {
            assert_eq!(syntax.find_begin(source, 0), Some((kind, 0, len)));
        }
    }

    #[test]
    fn find_begin_offset() {
        let syntax = Syntax::default();
        assert_eq!(
            syntax.find_begin("ab <%= x %>", 1),
            Some((Kind::Expr, 3, 6))
        );
        assert_eq!(syntax.find_begin("lorem ipsum", 0), None);
    }

    #[test]
    fn custom_delimiters() {
        let syntax = Syntax::builder().directive("{%", "%}").build();
        assert_eq!(syntax.find_begin("a {%= b %}", 0), Some((Kind::Expr, 2, 5)));
        assert_eq!(syntax.find_end("a {%= b %}", 5), Some((8, 10)));
    }
}
