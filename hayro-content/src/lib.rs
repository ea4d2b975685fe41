/*!
An editable, byte-exact text view of PDF content streams.

A PDF content stream is a sequence of operators and operands. This crate turns
such a stream into a [`Document`]: a list of styled text [`Segment`]s that can be
shown in a text editor, edited, and serialized back into a content stream.

Everything that is not edited is written back exactly as it was read, including
whitespace, comments, and the escape sequences inside of strings. Strings that
hold text are shown decoded, while binary strings and inline image data are
protected from edits that would corrupt them: binary strings can only be edited
as hex digits and inline images can only be removed as a whole.

```
use hayro_content::Document;

let mut document = Document::new(b"BT (Hello) Tj ET");
assert_eq!(document.text(), "BT \n  (Hello) Tj \nET");

// Append to the text of the string.
assert!(document.insert(12, " world").unwrap());
assert_eq!(document.serialize(), b"BT (Hello world) Tj ET");
```

## Features
- `images` (default): decode inline images so that a preview of them can be
  shown. Without it, inline images are still kept, but never decoded.

## Safety
This crate forbids unsafe code via a crate-level attribute.
*/

#![forbid(unsafe_code)]

mod document;
mod encoding;
mod error;
mod hex;
mod indent;
mod reader;
mod settings;
mod source;
mod trivia;

pub mod content;
pub mod image;
pub mod object;

pub use document::{Change, Document, Edit, Segment, Style, Verdict};
pub use encoding::{Classification, TextEncoding, classify};
pub use error::{Error, Result};
pub use indent::IndentTracker;
pub use settings::{BuildSettings, BuildWarning, WarningSinkFn};
pub use source::ContentSource;
