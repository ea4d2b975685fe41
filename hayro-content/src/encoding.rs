//! Guessing and applying the encoding of string operands.
//!
//! Strings in content streams are plain byte sequences. Some of them are text
//! (for example the alternate descriptions of marked content), most of them are
//! glyph codes of a font whose encoding cannot be known without the font. The
//! heuristics here decide which strings can be safely shown as text.

/// A text encoding that a string operand can be shown and edited in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    /// UTF-16BE with a byte order mark.
    Utf16Be,
    /// UTF-8 with a byte order mark.
    Utf8,
    /// PDFDocEncoding.
    PdfDocEncoding,
}

const UTF16_BOM: &[u8] = &[0xfe, 0xff];
const UTF8_BOM: &[u8] = &[0xef, 0xbb, 0xbf];

impl TextEncoding {
    /// The name of the encoding.
    pub fn name(self) -> &'static str {
        match self {
            Self::Utf16Be => "UTF-16BE",
            Self::Utf8 => "UTF-8",
            Self::PdfDocEncoding => "PDFDocEncoding",
        }
    }

    /// Decode the bytes of a string, including its byte order mark.
    ///
    /// Returns `None` if the bytes are not valid in this encoding.
    pub fn decode(self, data: &[u8]) -> Option<String> {
        match self {
            Self::Utf16Be => {
                let data = data.strip_prefix(UTF16_BOM)?;

                if data.len() % 2 != 0 {
                    return None;
                }

                let units = data
                    .chunks_exact(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]));

                char::decode_utf16(units).collect::<Result<String, _>>().ok()
            }
            Self::Utf8 => {
                let data = data.strip_prefix(UTF8_BOM)?;
                core::str::from_utf8(data).ok().map(str::to_owned)
            }
            Self::PdfDocEncoding => data.iter().map(|b| pdf_doc_decode(*b)).collect(),
        }
    }

    /// Encode text, including the byte order mark for the Unicode encodings.
    ///
    /// Returns `None` if the text contains a character that cannot be
    /// represented.
    pub fn encode(self, text: &str) -> Option<Vec<u8>> {
        match self {
            Self::Utf16Be => {
                let mut out = UTF16_BOM.to_vec();
                out.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
                Some(out)
            }
            Self::Utf8 => {
                let mut out = UTF8_BOM.to_vec();
                out.extend_from_slice(text.as_bytes());
                Some(out)
            }
            Self::PdfDocEncoding => text.chars().map(pdf_doc_encode).collect(),
        }
    }
}

/// The result of classifying the bytes of a string operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The string is text in the given encoding.
    Text {
        /// The encoding.
        encoding: TextEncoding,
        /// The decoded text, without a byte order mark.
        text: String,
    },
    /// The string cannot be safely shown as text.
    Binary,
}

/// Classify the bytes of a string operand.
///
/// A byte order mark decides between UTF-16BE and UTF-8. Without one, the
/// string is only considered to be PDFDocEncoding text if it consists of
/// alphanumeric characters and a small set of punctuation. Everything else,
/// notably glyph codes of fonts with custom encodings, is binary.
pub fn classify(data: &[u8]) -> Classification {
    let encoding = if data.starts_with(UTF16_BOM) {
        TextEncoding::Utf16Be
    } else if data.starts_with(UTF8_BOM) {
        TextEncoding::Utf8
    } else {
        TextEncoding::PdfDocEncoding
    };

    let Some(text) = encoding.decode(data) else {
        return Classification::Binary;
    };

    if encoding == TextEncoding::PdfDocEncoding && !text.chars().all(is_plain_text_char) {
        return Classification::Binary;
    }

    Classification::Text { encoding, text }
}

fn is_plain_text_char(c: char) -> bool {
    c.is_alphanumeric()
        || matches!(
            c,
            '<' | '>' | '(' | ')' | '\\' | '/' | '?' | '.' | '!' | '{' | '}' | ' ' | '\n' | '\t'
        )
}

/// Decode a byte in PDFDocEncoding. Returns `None` for undefined codes.
fn pdf_doc_decode(code: u8) -> Option<char> {
    let c = match code {
        0x18 => '\u{02D8}', // BREVE
        0x19 => '\u{02C7}', // CARON
        0x1A => '\u{02C6}', // MODIFIER LETTER CIRCUMFLEX ACCENT
        0x1B => '\u{02D9}', // DOT ABOVE
        0x1C => '\u{02DD}', // DOUBLE ACUTE ACCENT
        0x1D => '\u{02DB}', // OGONEK
        0x1E => '\u{02DA}', // RING ABOVE
        0x1F => '\u{02DC}', // SMALL TILDE
        0x7F | 0x9F | 0xAD => return None,
        0x80 => '\u{2022}', // BULLET
        0x81 => '\u{2020}', // DAGGER
        0x82 => '\u{2021}', // DOUBLE DAGGER
        0x83 => '\u{2026}', // HORIZONTAL ELLIPSIS
        0x84 => '\u{2014}', // EM DASH
        0x85 => '\u{2013}', // EN DASH
        0x86 => '\u{0192}', // LATIN SMALL LETTER F WITH HOOK
        0x87 => '\u{2044}', // FRACTION SLASH
        0x88 => '\u{2039}', // SINGLE LEFT-POINTING ANGLE QUOTATION MARK
        0x89 => '\u{203A}', // SINGLE RIGHT-POINTING ANGLE QUOTATION MARK
        0x8A => '\u{2212}', // MINUS SIGN
        0x8B => '\u{2030}', // PER MILLE SIGN
        0x8C => '\u{201E}', // DOUBLE LOW-9 QUOTATION MARK
        0x8D => '\u{201C}', // LEFT DOUBLE QUOTATION MARK
        0x8E => '\u{201D}', // RIGHT DOUBLE QUOTATION MARK
        0x8F => '\u{2018}', // LEFT SINGLE QUOTATION MARK
        0x90 => '\u{2019}', // RIGHT SINGLE QUOTATION MARK
        0x91 => '\u{201A}', // SINGLE LOW-9 QUOTATION MARK
        0x92 => '\u{2122}', // TRADE MARK SIGN
        0x93 => '\u{FB01}', // LATIN SMALL LIGATURE FI
        0x94 => '\u{FB02}', // LATIN SMALL LIGATURE FL
        0x95 => '\u{0141}', // LATIN CAPITAL LETTER L WITH STROKE
        0x96 => '\u{0152}', // LATIN CAPITAL LIGATURE OE
        0x97 => '\u{0160}', // LATIN CAPITAL LETTER S WITH CARON
        0x98 => '\u{0178}', // LATIN CAPITAL LETTER Y WITH DIAERESIS
        0x99 => '\u{017D}', // LATIN CAPITAL LETTER Z WITH CARON
        0x9A => '\u{0131}', // LATIN SMALL LETTER DOTLESS I
        0x9B => '\u{0142}', // LATIN SMALL LETTER L WITH STROKE
        0x9C => '\u{0153}', // LATIN SMALL LIGATURE OE
        0x9D => '\u{0161}', // LATIN SMALL LETTER S WITH CARON
        0x9E => '\u{017E}', // LATIN SMALL LETTER Z WITH CARON
        0xA0 => '\u{20AC}', // EURO SIGN
        _ => char::from(code),
    };

    Some(c)
}

fn pdf_doc_encode(c: char) -> Option<u8> {
    // Most text is ASCII, which maps to itself apart from DEL.
    if c.is_ascii() && !matches!(c as u8, 0x18..=0x1F | 0x7F) {
        return Some(c as u8);
    }

    (0..=u8::MAX).find(|b| pdf_doc_decode(*b) == Some(c))
}
