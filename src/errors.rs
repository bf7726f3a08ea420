//! Crate-wide error taxonomy.
//!
//! Recoverable variants (`DuplicateKey`, `NotFound`, `Syntax`, `Validation`, `Capacity`)
//! are returned up to the REPL and printed as a one-line diagnostic. `Io` and `Corruption`
//! are fatal: the pager and node layout never try to recover from them, and the CLI entry
//! point maps them to a non-zero exit code.
use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// Fatal. Propagated from file open/read/write/seek/close.
    Io(std::io::Error),
    /// Fatal. Malformed file length, invalid-page-sentinel dereference, or a
    /// child/key index that exceeds its node's bookkeeping.
    Corruption(String),
    /// Recoverable at the API, fatal in practice: the pager or a node ran out
    /// of the page-cache/body capacity this design fixes ahead of time.
    Capacity(String),
    /// Insert found an existing cell with the same key.
    DuplicateKey(u32),
    /// Delete or update found no cell with the given key.
    NotFound(u32),
    /// The command tokenizer/parser rejected the input.
    Syntax(String),
    /// A row field violated a width or sign constraint before reaching storage.
    Validation(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Corruption(msg) => write!(f, "Corruption: {}", msg),
            Error::Capacity(msg) => write!(f, "Capacity exceeded: {}", msg),
            Error::DuplicateKey(id) => write!(f, "Duplicate key: {}", id),
            Error::NotFound(id) => write!(f, "Not found: {}", id),
            Error::Syntax(msg) => write!(f, "Syntax error: {}", msg),
            Error::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl Error {
    /// `Io` and `Corruption` are the two variants this design considers fatal;
    /// the REPL uses this to decide whether to keep looping or abort the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Io(_) | Error::Corruption(_))
    }
}

/// Build an `errors::Error` variant with a formatted message, mirroring the call
/// site `err!(Corruption, "page {} beyond capacity", n)`.
#[macro_export]
macro_rules! err {
    ($variant:ident, $($arg:tt)*) => {
        $crate::errors::Error::$variant(format!($($arg)*))
    };
}
