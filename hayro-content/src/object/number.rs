//! Numbers.

use crate::reader::Reader;
use crate::trivia::is_regular_character;

/// A number object.
///
/// The number keeps its textual form, so that it is written back exactly as it
/// was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Number<'a> {
    raw: &'a [u8],
    real: bool,
}

impl<'a> Number<'a> {
    /// The number as it was written.
    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    /// Whether the number was written as a real number.
    pub fn is_real(&self) -> bool {
        self.real
    }

    /// Return the value as an `f64`.
    pub fn as_f64(&self) -> f64 {
        core::str::from_utf8(self.raw)
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or_default()
    }

    /// Return the value as an `i64`, if it is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        if self.real {
            return None;
        }

        core::str::from_utf8(self.raw).ok()?.parse::<i64>().ok()
    }

    /// Return the value as an `u32`, truncating real numbers.
    pub fn as_u32(&self) -> Option<u32> {
        match self.as_i64() {
            Some(v) => u32::try_from(v).ok(),
            None => {
                let v = self.as_f64();
                (0.0..=f64::from(u32::MAX))
                    .contains(&v)
                    .then_some(v as u32)
            }
        }
    }
}

pub(crate) fn read<'a>(r: &mut Reader<'a>) -> Option<Number<'a>> {
    let start = r.offset();

    r.eat(|b| b == b'+' || b == b'-');

    let digits_start = r.offset();
    r.forward_while(|b| b.is_ascii_digit());
    let mut has_digits = r.offset() > digits_start;

    let real = r.eat(|b| b == b'.').is_some();

    if real {
        let fraction_start = r.offset();
        r.forward_while(|b| b.is_ascii_digit());
        has_digits |= r.offset() > fraction_start;
    }

    if !has_digits {
        return None;
    }

    // A number must be terminated by a white space, a delimiter, or the end
    // of the data. Anything else (`12ab`) is not a number.
    if r.peek_byte().is_some_and(is_regular_character) {
        return None;
    }

    let raw = r.range(start..r.offset())?;

    Some(Number { raw, real })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(input: &[u8]) -> Option<Number<'_>> {
        let mut r = Reader::new(input);
        read(&mut r)
    }

    #[test]
    fn integers() {
        assert_eq!(number(b"123 ").unwrap().as_i64(), Some(123));
        assert_eq!(number(b"-98").unwrap().as_i64(), Some(-98));
        assert_eq!(number(b"+17]").unwrap().as_i64(), Some(17));
        assert_eq!(number(b"0").unwrap().as_u32(), Some(0));
    }

    #[test]
    fn reals() {
        assert_eq!(number(b"34.5 ").unwrap().as_f64(), 34.5);
        assert_eq!(number(b"-.002 ").unwrap().as_f64(), -0.002);
        assert_eq!(number(b"4. ").unwrap().as_f64(), 4.0);
        assert!(number(b"4.5").unwrap().is_real());
        assert_eq!(number(b"4.5").unwrap().as_i64(), None);
        assert_eq!(number(b"4.5").unwrap().as_u32(), Some(4));
    }

    #[test]
    fn keeps_raw_text() {
        assert_eq!(number(b"0.500 ").unwrap().raw(), b"0.500");
    }

    #[test]
    fn invalid() {
        assert!(number(b"-").is_none());
        assert!(number(b".").is_none());
        assert!(number(b"12ab").is_none());
        assert!(number(b"abc").is_none());
    }
}
