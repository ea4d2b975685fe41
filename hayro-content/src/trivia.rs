//! Character classes of the content stream syntax.

#[inline(always)]
pub(crate) fn is_white_space_character(char: u8) -> bool {
    matches!(char, 0x00 | 0x09 | 0x0a | 0x0c | 0x0d | 0x20)
}

#[inline(always)]
pub(crate) fn is_delimiter_character(char: u8) -> bool {
    matches!(
        char,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

#[inline(always)]
pub(crate) fn is_regular_character(char: u8) -> bool {
    !is_white_space_character(char) && !is_delimiter_character(char)
}

#[inline(always)]
pub(crate) fn is_eol_character(char: u8) -> bool {
    matches!(char, 0x0a | 0x0d)
}

/// Whether the bytes can be shown as they are, i.e. they consist only of printable
/// ASCII characters and the white spaces a text view can display.
pub(crate) fn is_displayable(data: &[u8]) -> bool {
    data.iter()
        .all(|b| matches!(b, 0x20..=0x7e | b'\t' | b'\n' | b'\r'))
}
