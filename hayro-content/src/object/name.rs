//! Names.

use crate::hex::decode_hex_digit;
use crate::reader::Reader;
use crate::trivia::is_regular_character;

/// A name object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Name<'a> {
    raw: &'a [u8],
}

impl<'a> Name<'a> {
    /// The name as written, without the leading slash and with `#xx` escapes
    /// still in place.
    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    /// Decode the name, resolving `#xx` escapes.
    ///
    /// A `#` that is not followed by two hex digits is kept as it is.
    pub fn decode(&self) -> Vec<u8> {
        // Fast path: no escape sequences.
        if !self.raw.contains(&b'#') {
            return self.raw.to_vec();
        }

        let mut out = Vec::with_capacity(self.raw.len());
        let mut r = Reader::new(self.raw);

        while let Some(b) = r.read_byte() {
            if b == b'#'
                && let Some(hex) = r.peek_bytes(2)
                && let (Some(hi), Some(lo)) = (decode_hex_digit(hex[0]), decode_hex_digit(hex[1]))
            {
                out.push(hi << 4 | lo);
                r.forward();
                r.forward();
            } else {
                out.push(b);
            }
        }

        out
    }

    /// Whether the decoded name is equal to `other`.
    pub fn matches(&self, other: &[u8]) -> bool {
        if self.raw.contains(&b'#') {
            self.decode() == other
        } else {
            self.raw == other
        }
    }
}

pub(crate) fn read<'a>(r: &mut Reader<'a>) -> Option<Name<'a>> {
    r.forward_tag(b"/")?;
    let start = r.offset();
    r.forward_while(is_regular_character);

    Some(Name {
        raw: r.range(start..r.offset())?,
    })
}
