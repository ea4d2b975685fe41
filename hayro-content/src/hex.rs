//! Conversion between bytes and hex digit text.

const DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Encode bytes as lowercase hex digits.
pub(crate) fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2);

    for b in data {
        out.push(DIGITS[(b >> 4) as usize] as char);
        out.push(DIGITS[(b & 0x0f) as usize] as char);
    }

    out
}

/// Decode hex digits, ignoring every character that is not a hex digit.
///
/// A trailing odd digit is treated as if it was followed by `0`.
pub(crate) fn decode_lenient(text: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() / 2 + 1);
    let mut high = None;

    for digit in text.iter().copied().filter_map(decode_hex_digit) {
        match high.take() {
            Some(h) => out.push(h << 4 | digit),
            None => high = Some(digit),
        }
    }

    if let Some(h) = high {
        out.push(h << 4);
    }

    out
}

/// Keep only the hex digits of `text`, lowercased.
pub(crate) fn filter_digits(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_hexdigit)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[inline(always)]
pub(crate) fn decode_hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}
