//! Runtime support for generated code.
//!
//! Generated functions render into a `&mut String` using the helpers in this
//! module. The writer variants borrow their buffer from a process wide
//! [`Pool`] so that repeated renders do not allocate.
//!
//! ```
//! let mut buf = String::new();
//! hewn::rt::escape_html(&"<b>Tom & Jerry</b>", &mut buf);
//! hewn::rt::write_raw(&"<br>", &mut buf);
//! assert_eq!(buf, "&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;<br>");
//! ```

use std::fmt;
use std::fmt::{Display, Write};
use std::mem;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The most buffers a pool keeps around.
pub const MAX_BUFFERS: usize = 64;

/// Buffers that grew larger than this are dropped instead of returned.
pub const MAX_CAPACITY: usize = 1 << 20;

static GLOBAL: Pool = Pool::new();

/// Writes a value to the buffer, escaping HTML special characters.
///
/// `<`, `>`, `&`, `"` and `'` are replaced by `&lt;`, `&gt;`, `&amp;`,
/// `&quot;` and `&#39;`. The value is formatted straight into the buffer.
#[inline]
pub fn escape_html<T>(value: &T, buffer: &mut String)
where
    T: Display + ?Sized,
{
    // Writing to a `String` never fails.
    let _ = write!(Escape { buf: buffer }, "{value}");
}

/// Writes a value to the buffer unchanged.
#[inline]
pub fn write_raw<T>(value: &T, buffer: &mut String)
where
    T: Display + ?Sized,
{
    let _ = write!(buffer, "{value}");
}

/// Appends the output of an included template to the buffer.
///
/// Byte output that is not valid UTF-8 is written lossily.
#[inline]
pub fn append<B>(buffer: &mut String, output: B)
where
    B: AsRef<[u8]>,
{
    buffer.push_str(&String::from_utf8_lossy(output.as_ref()));
}

/// Acquires a buffer from the global pool.
#[inline]
pub fn acquire() -> Pooled<'static> {
    Pool::global().acquire()
}

/// A [`fmt::Write`] adapter that escapes everything written to it.
struct Escape<'a> {
    buf: &'a mut String,
}

impl fmt::Write for Escape<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut last = 0;
        for (i, b) in s.bytes().enumerate() {
            let esc = match b {
                b'<' => "&lt;",
                b'>' => "&gt;",
                b'&' => "&amp;",
                b'"' => "&quot;",
                b'\'' => "&#39;",
                _ => continue,
            };
            self.buf.push_str(&s[last..i]);
            self.buf.push_str(esc);
            last = i + 1;
        }
        self.buf.push_str(&s[last..]);
        Ok(())
    }
}

/// A pool of reusable string buffers.
///
/// Buffers are handed out as [`Pooled`] guards and go back to the pool,
/// cleared but with their capacity, when the guard is dropped.
#[derive(Debug, Default)]
pub struct Pool {
    buffers: Mutex<Vec<String>>,
}

/// A buffer borrowed from a [`Pool`].
#[derive(Debug)]
pub struct Pooled<'a> {
    pool: &'a Pool,
    buf: String,
}

impl Pool {
    /// Construct a new empty pool.
    pub const fn new() -> Self {
        Self {
            buffers: Mutex::new(Vec::new()),
        }
    }

    /// Returns the process wide pool used by generated code.
    #[inline]
    pub fn global() -> &'static Pool {
        &GLOBAL
    }

    /// Takes an idle buffer from the pool or allocates a new one.
    pub fn acquire(&self) -> Pooled<'_> {
        let buf = self.lock().pop().unwrap_or_default();
        Pooled { pool: self, buf }
    }

    /// Returns the number of idle buffers.
    pub fn idle(&self) -> usize {
        self.lock().len()
    }

    fn release(&self, mut buf: String) {
        if buf.capacity() > MAX_CAPACITY {
            return;
        }
        buf.clear();
        let mut buffers = self.lock();
        if buffers.len() < MAX_BUFFERS {
            buffers.push(buf);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        // A panic while holding the lock cannot leave the list of buffers in
        // an invalid state.
        self.buffers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Pooled<'_> {
    /// Returns the buffer to its pool.
    ///
    /// This is the same as dropping the guard.
    #[inline]
    pub fn release(self) {}
}

impl Deref for Pooled<'_> {
    type Target = String;

    #[inline]
    fn deref(&self) -> &String {
        &self.buf
    }
}

impl DerefMut for Pooled<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut String {
        &mut self.buf
    }
}

impl Drop for Pooled<'_> {
    fn drop(&mut self) {
        self.pool.release(mem::take(&mut self.buf));
    }
}
