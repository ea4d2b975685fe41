//! Error types.

use core::fmt;

/// A specialized [`Result`] type for content stream operations.
pub type Result<T> = core::result::Result<T, Error>;

/// An error returned by the tokenizer or by an operation on a
/// [`Document`](crate::Document).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The bytes starting at the given offset could not be parsed as an
    /// operation.
    Syntax {
        /// The byte offset at which the failed operation starts.
        offset: usize,
    },
    /// Arrays or dictionaries were nested deeper than allowed.
    NestingTooDeep {
        /// The byte offset at which the failed operation starts.
        offset: usize,
    },
    /// An edit referenced a range outside of the document.
    OutOfBounds {
        /// The requested start position.
        pos: usize,
        /// The requested length.
        len: usize,
        /// The length of the document, in characters.
        doc_len: usize,
    },
    /// The owner of the content stream currently has an external handle open
    /// on it, so its bytes cannot be read.
    SourceBusy,
}

impl Error {
    /// The byte offset of a tokenization error, if this is one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Syntax { offset } | Self::NestingTooDeep { offset } => Some(*offset),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { offset } => write!(f, "syntax error at offset {offset}"),
            Self::NestingTooDeep { offset } => {
                write!(f, "objects nested too deeply at offset {offset}")
            }
            Self::OutOfBounds { pos, len, doc_len } => write!(
                f,
                "range {pos}..{} is out of bounds for a document of length {doc_len}",
                pos.saturating_add(*len)
            ),
            Self::SourceBusy => f.write_str("content stream has an open external handle"),
        }
    }
}

impl core::error::Error for Error {}
