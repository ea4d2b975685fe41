//! Tokenizing content streams.
//!
//! The [`Tokenizer`] splits the bytes of a content stream into
//! [`Instruction`]s: operators together with their operands, and inline
//! images. Every token remembers the byte range it was read from, so that
//! callers can reproduce the exact bytes between and around tokens.

mod ops;

pub use ops::OperatorKind;

use core::ops::Range;

use log::{trace, warn};
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::object::{
    Dict, DictEntry, Object, Operand, ReadFailure, Token, read_entry, read_token,
};
use crate::reader::Reader;
use crate::settings::BuildSettings;
use crate::trivia::{is_delimiter_character, is_white_space_character};

// 6 operands are used for example for `cm` or cubic curves, anything
// above is rare.
const OPERANDS_THRESHOLD: usize = 6;

/// An operator, as written in the content stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator<'a> {
    name: &'a [u8],
    span: Range<usize>,
}

impl<'a> Operator<'a> {
    /// The name of the operator.
    pub fn name(&self) -> &'a [u8] {
        self.name
    }

    /// The byte range of the operator.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// The category of the operator.
    pub fn kind(&self) -> OperatorKind {
        OperatorKind::of(self.name)
    }
}

/// An operator together with its operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation<'a> {
    operands: SmallVec<[Operand<'a>; OPERANDS_THRESHOLD]>,
    operator: Operator<'a>,
}

impl<'a> Operation<'a> {
    /// The operands, in the order they were written.
    pub fn operands(&self) -> &[Operand<'a>] {
        &self.operands
    }

    /// The operator.
    pub fn operator(&self) -> &Operator<'a> {
        &self.operator
    }
}

/// An inline image: `BI <entries> ID <data> EI`.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage<'a> {
    begin: Range<usize>,
    dict: Dict<'a>,
    data_marker: Range<usize>,
    data: &'a [u8],
    data_span: Range<usize>,
    end: Range<usize>,
}

impl<'a> InlineImage<'a> {
    /// The byte range of the `BI` operator.
    pub fn begin_span(&self) -> Range<usize> {
        self.begin.clone()
    }

    /// The image dictionary.
    pub fn dict(&self) -> &Dict<'a> {
        &self.dict
    }

    /// The entries of the image dictionary.
    pub fn entries(&self) -> &[DictEntry<'a>] {
        self.dict.entries()
    }

    /// The byte range of the `ID` operator.
    pub fn data_marker_span(&self) -> Range<usize> {
        self.data_marker.clone()
    }

    /// The raw, still encoded image data.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// The byte range of the image data.
    pub fn data_span(&self) -> Range<usize> {
        self.data_span.clone()
    }

    /// The byte range of the `EI` operator.
    pub fn end_span(&self) -> Range<usize> {
        self.end.clone()
    }
}

/// A single instruction of a content stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction<'a> {
    /// An operator with its operands.
    Operation(Operation<'a>),
    /// An inline image.
    InlineImage(InlineImage<'a>),
}

/// An iterator over the instructions of a content stream.
///
/// The iterator yields an error for the first group of tokens that cannot be
/// parsed and ends afterwards. Everything yielded before stays valid.
pub struct Tokenizer<'a> {
    reader: Reader<'a>,
    max_depth: usize,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    /// Create a new tokenizer over the given content stream bytes.
    pub fn new(data: &'a [u8], settings: &BuildSettings) -> Self {
        Self {
            reader: Reader::new(data),
            max_depth: settings.max_nesting_depth,
            done: false,
        }
    }

    fn read_instruction(&mut self) -> core::result::Result<Instruction<'a>, ReadFailure> {
        let mut operands = SmallVec::new();

        loop {
            self.reader.skip_white_spaces_and_comments();

            if self.reader.at_end() {
                // Operands without an operator.
                return Err(ReadFailure::Syntax);
            }

            match read_token(&mut self.reader, self.max_depth)? {
                Token::Operand(operand) => operands.push(operand),
                Token::Keyword(b"BI", span) => {
                    if !operands.is_empty() {
                        return Err(ReadFailure::Syntax);
                    }

                    return self.read_inline_image(span).map(Instruction::InlineImage);
                }
                Token::Keyword(name, span) => {
                    return Ok(Instruction::Operation(Operation {
                        operands,
                        operator: Operator { name, span },
                    }));
                }
            }
        }
    }

    fn read_inline_image(
        &mut self,
        begin: Range<usize>,
    ) -> core::result::Result<InlineImage<'a>, ReadFailure> {
        let r = &mut self.reader;
        let mut entries = vec![];

        let data_marker = loop {
            r.skip_white_spaces_and_comments();

            if r.peek_byte() == Some(b'/') {
                entries.push(read_entry(r, self.max_depth)?);
                continue;
            }

            match read_token(r, self.max_depth)? {
                Token::Keyword(b"ID", span) => break span,
                _ => return Err(ReadFailure::Syntax),
            }
        };

        let dict = Dict::new(entries);

        // A single white space separates `ID` from the data.
        r.eat(is_white_space_character);

        let data_start = r.offset();
        let tail = r.tail().ok_or(ReadFailure::Syntax)?;
        let (data_len, ei_pos) = find_end(tail, &dict).ok_or(ReadFailure::Syntax)?;

        r.jump(data_start + ei_pos);
        let end_start = r.offset();
        r.forward_tag(b"EI").ok_or(ReadFailure::Syntax)?;

        Ok(InlineImage {
            begin,
            dict,
            data_marker,
            data: &tail[..data_len],
            data_span: data_start..data_start + data_len,
            end: end_start..r.offset(),
        })
    }
}

/// Locate the end of inline image data. Returns the length of the data and the
/// position of `EI`, both relative to the start of the data.
fn find_end(tail: &[u8], dict: &Dict<'_>) -> Option<(usize, usize)> {
    let is_end_marker = |pos: usize| {
        tail.get(pos..pos + 2) == Some(&b"EI"[..])
            && tail
                .get(pos + 2)
                .is_none_or(|b| is_white_space_character(*b) || is_delimiter_character(*b))
    };

    // PDF 2.0 allows stating the length of the data explicitly.
    if let Some(Object::Number(n)) = dict.get_any(&[b"L", b"Length"])
        && let Some(len) = n.as_u32().map(|l| l as usize)
        && len <= tail.len()
    {
        let mut r = Reader::new(tail);
        r.jump(len);
        r.skip_white_spaces();

        if is_end_marker(r.offset()) {
            return Some((len, r.offset()));
        }

        warn!("inline image length doesn't point to EI, searching for it instead");
    }

    // Otherwise, the data ends at the first `EI` that looks like an operator. The
    // white space in front of it is not part of the data.
    memchr::memmem::find_iter(tail, b"EI")
        .filter(|&pos| pos == 0 || is_white_space_character(tail[pos - 1]))
        .find(|&pos| is_end_marker(pos))
        .map(|pos| (pos.saturating_sub(1), pos))
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Instruction<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        self.reader.skip_white_spaces_and_comments();

        if self.reader.at_end() {
            self.done = true;
            return None;
        }

        let offset = self.reader.offset();

        match self.read_instruction() {
            Ok(instruction) => {
                trace!("read instruction at offset {offset}");

                Some(Ok(instruction))
            }
            Err(failure) => {
                self.done = true;
                self.reader.jump_to_end();

                Some(Err(match failure {
                    ReadFailure::Syntax => Error::Syntax { offset },
                    ReadFailure::TooDeep => Error::NestingTooDeep { offset },
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(data: &[u8]) -> Vec<Result<Instruction<'_>>> {
        Tokenizer::new(data, &BuildSettings::default()).collect()
    }

    fn operation<'a, 'b>(i: &'b Result<Instruction<'a>>) -> &'b Operation<'a> {
        match i {
            Ok(Instruction::Operation(op)) => op,
            other => panic!("expected an operation, got {other:?}"),
        }
    }

    #[test]
    fn simple_operations() {
        let items = tokenize(b"q 1 0 0 1 10 20 cm\n(Hello world!) Tj Q");
        assert_eq!(items.len(), 4);

        let cm = operation(&items[1]);
        assert_eq!(cm.operator().name(), b"cm");
        assert_eq!(cm.operands().len(), 6);
        assert_eq!(cm.operator().span(), 16..18);
        assert_eq!(cm.operator().kind(), OperatorKind::GraphicsState);

        let tj = operation(&items[2]);
        assert_eq!(tj.operator().name(), b"Tj");
        assert_eq!(tj.operands()[0].span(), 19..33);
        assert_eq!(operation(&items[3]).operator().name(), b"Q");
    }

    #[test]
    fn comments_are_skipped() {
        let items = tokenize(b"% leading\nBT % inside\nET");
        assert_eq!(items.len(), 2);
        assert_eq!(operation(&items[1]).operator().name(), b"ET");
    }

    #[test]
    fn keywords_as_operands() {
        let items = tokenize(b"true false null foo");
        let op = operation(&items[0]);
        assert_eq!(op.operands().len(), 3);
        assert_eq!(op.operands()[2].object(), &Object::Null);
    }

    #[test]
    fn marked_content() {
        let items = tokenize(b"/Span <</MCID 3>> BDC (x) Tj EMC");
        let bdc = operation(&items[0]);
        assert_eq!(bdc.operator().name(), b"BDC");
        assert!(matches!(bdc.operands()[1].object(), Object::Dict(_)));
    }

    #[test]
    fn empty_stream() {
        assert!(tokenize(b"").is_empty());
        assert!(tokenize(b"  \n% only a comment").is_empty());
    }

    #[test]
    fn error_stops_iteration() {
        let items = tokenize(b"q (unterminated Tj Q");
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert_eq!(items[1], Err(Error::Syntax { offset: 2 }));
    }

    #[test]
    fn dangling_operands() {
        let items = tokenize(b"BT 1 2");
        assert_eq!(items[1], Err(Error::Syntax { offset: 3 }));
    }

    #[test]
    fn stray_delimiter() {
        let items = tokenize(b"] Tj");
        assert_eq!(items, vec![Err(Error::Syntax { offset: 0 })]);
    }

    #[test]
    fn nesting_limit() {
        let mut data = b"q ".to_vec();
        data.extend(vec![b'['; 100]);
        data.extend(vec![b']'; 100]);
        data.extend(b" Tj");

        let items = tokenize(&data);
        assert_eq!(items[1], Err(Error::NestingTooDeep { offset: 2 }));
    }

    #[test]
    fn inline_image() {
        let data = b"q BI /W 2 /H 1 /CS /G /BPC 8 ID \x00\xff EI Q";
        let items = tokenize(data);
        assert_eq!(items.len(), 3);

        let Ok(Instruction::InlineImage(image)) = &items[1] else {
            panic!("expected an inline image");
        };

        assert_eq!(image.begin_span(), 2..4);
        assert_eq!(image.entries().len(), 4);
        assert_eq!(image.data(), b"\x00\xff");
        assert_eq!(&data[image.data_span()], b"\x00\xff");
        assert_eq!(&data[image.end_span()], b"EI");
        assert_eq!(operation(&items[2]).operator().name(), b"Q");
    }

    #[test]
    fn inline_image_data_containing_ei() {
        // The first `EI` is followed by a regular character, so it is data.
        let data = b"BI /W 4 /H 1 /CS /G /BPC 8 ID aEIb EI";
        let items = tokenize(data);

        let Ok(Instruction::InlineImage(image)) = &items[0] else {
            panic!("expected an inline image");
        };

        assert_eq!(image.data(), b"aEIb");
    }

    #[test]
    fn inline_image_with_length() {
        let data = b"BI /W 3 /H 1 /CS /G /BPC 8 /L 3 ID  EI EI";
        let items = tokenize(data);

        let Ok(Instruction::InlineImage(image)) = &items[0] else {
            panic!("expected an inline image");
        };

        assert_eq!(image.data(), b" EI");
        assert_eq!(image.end_span(), 39..41);
    }

    #[test]
    fn inline_image_without_end() {
        let items = tokenize(b"BI /W 1 /H 1 ID xyz");
        assert_eq!(items, vec![Err(Error::Syntax { offset: 0 })]);
    }
}
