//! Templates compiled by the build script.

use std::cell::Cell;
use std::fmt;

/// A value that counts how often it is formatted.
pub struct Counted<'a> {
    pub value: &'a str,
    pub count: &'a Cell<usize>,
}

impl fmt::Display for Counted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.count.set(self.count.get() + 1);
        f.write_str(self.value)
    }
}

pub mod templates {
    include!(concat!(env!("OUT_DIR"), "/bytes.html.rs"));
    include!(concat!(env!("OUT_DIR"), "/counted.html.rs"));
    include!(concat!(env!("OUT_DIR"), "/escape.html.rs"));
    include!(concat!(env!("OUT_DIR"), "/index.html.rs"));
    include!(concat!(env!("OUT_DIR"), "/layout.html.rs"));
    include!(concat!(env!("OUT_DIR"), "/list.html.rs"));
    include!(concat!(env!("OUT_DIR"), "/partials/footer.html.rs"));
}
