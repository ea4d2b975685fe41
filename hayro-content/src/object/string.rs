//! Strings.

use crate::hex;
use crate::reader::Reader;
use crate::trivia::is_white_space_character;

/// The syntax a string was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringSyntax {
    /// A literal string, delimited by parentheses.
    Literal,
    /// A hexadecimal string, delimited by angle brackets.
    Hex,
}

impl StringSyntax {
    /// Write `data` as a complete string token of this syntax, including the
    /// delimiters.
    pub fn write(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Literal => write_literal(data),
            Self::Hex => {
                let mut out = Vec::with_capacity(data.len() * 2 + 2);
                out.push(b'<');
                out.extend_from_slice(hex::encode(data).as_bytes());
                out.push(b'>');
                out
            }
        }
    }

    pub(crate) fn delimiters(self) -> (&'static str, &'static str) {
        match self {
            Self::Literal => ("(", ")"),
            Self::Hex => ("<", ">"),
        }
    }
}

/// A string object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct String<'a> {
    raw: &'a [u8],
    syntax: StringSyntax,
}

impl<'a> String<'a> {
    pub(crate) fn new(raw: &'a [u8], syntax: StringSyntax) -> Self {
        Self { raw, syntax }
    }

    /// The bytes between the delimiters, with escapes still in place.
    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    /// The syntax the string was written in.
    pub fn syntax(&self) -> StringSyntax {
        self.syntax
    }

    /// Decode the string into its byte value.
    pub fn decode(&self) -> Vec<u8> {
        match self.syntax {
            StringSyntax::Literal => decode_literal(self.raw),
            StringSyntax::Hex => decode_hex(self.raw),
        }
    }
}

pub(crate) fn parse_literal<'a>(r: &mut Reader<'a>) -> Option<&'a [u8]> {
    let start = r.offset();
    r.forward_tag(b"(")?;
    let mut depth = 1_u32;

    while depth > 0 {
        match r.read_byte()? {
            b'\\' => {
                r.read_byte()?;
            }
            b'(' => depth += 1,
            b')' => depth -= 1,
            _ => {}
        }
    }

    // Exclude outer parentheses.
    r.range(start + 1..r.offset() - 1)
}

pub(crate) fn parse_hex<'a>(r: &mut Reader<'a>) -> Option<&'a [u8]> {
    r.forward_tag(b"<")?;
    let start = r.offset();
    r.forward_while(|b| b.is_ascii_hexdigit() || is_white_space_character(b));
    let end = r.offset();
    r.forward_tag(b">")?;

    r.range(start..end)
}

fn decode_hex(raw: &[u8]) -> Vec<u8> {
    // Only hex digits and white spaces survive parsing, so the lenient decoder
    // is exact here.
    hex::decode_lenient(raw)
}

fn decode_literal(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut r = Reader::new(raw);

    while let Some(byte) = r.read_byte() {
        match byte {
            b'\\' => {
                let Some(next) = r.read_byte() else {
                    break;
                };

                if is_octal_digit(next) {
                    let mut value = u16::from(next - b'0');

                    for _ in 0..2 {
                        match r.eat(is_octal_digit) {
                            Some(d) => value = value * 8 + u16::from(d - b'0'),
                            None => break,
                        }
                    }

                    // High-order overflow is ignored.
                    out.push((value & 0xff) as u8);
                } else {
                    match next {
                        b'n' => out.push(0xA),
                        b'r' => out.push(0xD),
                        b't' => out.push(0x9),
                        b'b' => out.push(0x8),
                        b'f' => out.push(0xC),
                        b'\r' => {
                            // A backslash followed by an end-of-line marker splits the
                            // string over several lines and contributes nothing.
                            r.eat(|b| b == b'\n');
                        }
                        b'\n' => {}
                        other => out.push(other),
                    }
                }
            }
            // An unescaped end-of-line marker always reads as a single line feed.
            b'\r' => {
                r.eat(|b| b == b'\n');
                out.push(b'\n');
            }
            other => out.push(other),
        }
    }

    out
}

/// Write bytes as a literal string, escaping only what is needed to read
/// them back unchanged.
pub(crate) fn write_literal(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 2);
    out.push(b'(');

    for &b in data {
        match b {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(b);
            }
            // A bare carriage return would be read back as a line feed.
            b'\r' => out.extend_from_slice(b"\\r"),
            _ => out.push(b),
        }
    }

    out.push(b')');
    out
}

fn is_octal_digit(byte: u8) -> bool {
    matches!(byte, b'0'..=b'7')
}
