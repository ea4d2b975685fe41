//! Turning tokenizer output into segments.

use core::ops::Range;

use log::warn;

use crate::content::{InlineImage, Instruction, Operation, OperatorKind, Tokenizer};
use crate::document::{ImageEntry, Segment, Style};
use crate::encoding::{Classification, classify};
use crate::hex;
use crate::indent::IndentTracker;
use crate::object::{Object, Operand, String as PdfString, StringSyntax};
use crate::reader::Reader;
use crate::settings::{BuildSettings, BuildWarning};
use crate::trivia::{is_displayable, is_eol_character, is_white_space_character};

pub(crate) fn build(data: &[u8], settings: &BuildSettings) -> (Vec<Segment>, Vec<ImageEntry>) {
    let mut builder = Builder {
        data,
        settings,
        segments: vec![],
        images: vec![],
        cursor: 0,
        groups: 0,
        indent: IndentTracker::new(),
    };

    for instruction in Tokenizer::new(data, settings) {
        match instruction {
            Ok(Instruction::Operation(op)) => builder.operation(&op),
            Ok(Instruction::InlineImage(image)) => builder.inline_image(&image),
            Err(e) => builder.unparsed(e.offset().unwrap_or(builder.cursor)),
        }
    }

    builder.trivia(data.len());

    (builder.segments, builder.images)
}

struct Builder<'a> {
    data: &'a [u8],
    settings: &'a BuildSettings,
    segments: Vec<Segment>,
    images: Vec<ImageEntry>,
    /// Everything before this byte offset has been turned into segments.
    cursor: usize,
    groups: usize,
    indent: IndentTracker,
}

impl Builder<'_> {
    fn operation(&mut self, op: &Operation<'_>) {
        let operator = op.operator();
        let style = Style::Operator(operator.kind());

        self.indent.unindent_if_necessary(operator.name());

        let first = op
            .operands()
            .first()
            .map_or(operator.span().start, |o| o.span().start);
        self.line_start(first, self.indent.level());

        let operand_style = self.settings.match_operands.then_some(style);

        for operand in op.operands() {
            self.operand(operand, operand_style);
        }

        self.token(operator.span(), style);
        self.indent.indent_if_necessary(operator.name());
    }

    fn inline_image(&mut self, image: &InlineImage<'_>) {
        let style = Style::Operator(OperatorKind::InlineImage);
        let level = self.indent.level();

        self.line_start(image.begin_span().start, level);
        self.token(image.begin_span(), style);

        for entry in image.entries() {
            self.line_start(entry.key_span().start, level + 1);
            self.token(entry.key_span(), Style::Name);
            self.operand(entry.value(), None);
        }

        self.line_start(image.data_marker_span().start, level);
        self.token(image.data_marker_span(), style);
        self.trivia(image.data_span().start);

        let preview = self.settings.image_decoder.decode(image);

        if let Err(e) = &preview {
            let offset = image.begin_span().start;
            warn!("failed to decode inline image at offset {offset}: {e}");
            (self.settings.warning_sink)(BuildWarning::ImageDecodeFailure { offset });
        }

        let text = match &preview {
            Ok(p) => format!("[inline image {}x{}]", p.width(), p.height()),
            Err(_) => "[inline image, no preview]".to_string(),
        };

        let index = self.images.len();
        let decoded = preview.is_ok();
        self.images.push(ImageEntry {
            preview,
            data_len: image.data().len(),
        });

        let mut payload = Segment::new(text, Style::Image)
            .with_backing(image.data().to_vec())
            .with_origin(image.data_span());
        payload.image = Some(index);
        self.segments.push(payload);
        self.cursor = image.data_span().end;

        if decoded {
            let mut save = Segment::display_only(" [save image]", Style::Image).with_backing(vec![]);
            save.image = Some(index);
            self.segments.push(save);
        }

        self.line_start(image.end_span().start, level);
        self.token(image.end_span(), style);
    }

    /// Keep everything starting at `offset` as a single opaque segment.
    fn unparsed(&mut self, offset: usize) {
        warn!("failed to parse content stream at offset {offset}, keeping the rest unchanged");
        (self.settings.warning_sink)(BuildWarning::Unparsed { offset });

        self.line_start(offset, self.indent.level());

        let range = self.cursor..self.data.len();
        let bytes = &self.data[range.clone()];

        let text = if is_displayable(bytes) {
            String::from_utf8_lossy(bytes).into_owned()
        } else {
            format!("{{{}}}", hex::encode(bytes))
        };

        self.segments.push(
            Segment::new(text, Style::Unparsed)
                .with_backing(bytes.to_vec())
                .with_origin(range.clone()),
        );
        self.cursor = range.end;
    }

    /// Emit the white space and comments in front of `to`, so that the next
    /// token starts on its own line with the indentation of `level`.
    fn line_start(&mut self, to: usize, level: usize) {
        let gap = &self.data[self.cursor..to];

        match gap.iter().rposition(|b| is_eol_character(*b)) {
            Some(last_eol) => {
                self.trivia(self.cursor + last_eol + 1);
                self.indentation(level);
                self.trivia(to);
            }
            None => {
                self.trivia(to);

                if !self.segments.is_empty() {
                    self.segments
                        .push(Segment::display_only("\n", Style::Whitespace));
                }

                self.indentation(level);
            }
        }
    }

    fn indentation(&mut self, level: usize) {
        if level > 0 && !self.settings.indent.is_empty() {
            self.segments.push(Segment::display_only(
                self.settings.indent.repeat(level),
                Style::Indent,
            ));
        }
    }

    fn operand(&mut self, operand: &Operand<'_>, style: Option<Style>) {
        let span = operand.span();

        match operand.object() {
            Object::String(s) => self.string(span, s, style),
            Object::Array(array) => {
                let delimiter = style.unwrap_or(Style::Delimiter);
                self.token(span.start..span.start + 1, delimiter);

                for item in array.items() {
                    self.operand(item, style);
                }

                self.token(span.end - 1..span.end, delimiter);
            }
            Object::Dict(dict) => {
                let delimiter = style.unwrap_or(Style::Delimiter);
                self.token(span.start..span.start + 2, delimiter);

                for entry in dict.entries() {
                    self.token(entry.key_span(), style.unwrap_or(Style::Name));
                    self.operand(entry.value(), style);
                }

                self.token(span.end - 2..span.end, delimiter);
            }
            Object::Number(_) => self.token(span, style.unwrap_or(Style::Number)),
            Object::Name(_) => self.token(span, style.unwrap_or(Style::Name)),
            Object::Boolean(_) | Object::Null => self.token(span, style.unwrap_or(Style::Keyword)),
        }
    }

    fn string(&mut self, span: Range<usize>, string: &PdfString<'_>, style: Option<Style>) {
        self.trivia(span.start);

        let group = self.groups;
        self.groups += 1;

        let decoded = string.decode();
        let syntax = string.syntax();
        let (open, close) = syntax.delimiters();
        let delimiter = style.unwrap_or(Style::Delimiter);

        let classification = match syntax {
            StringSyntax::Literal => classify(&decoded),
            // Hex strings are almost always glyph codes.
            StringSyntax::Hex => Classification::Binary,
        };

        let mut parts = match classification {
            Classification::Text { encoding, text } => {
                let mut value = Segment::new(text, style.unwrap_or(Style::String))
                    .with_origin(span.clone());
                value.encoding = Some(encoding);

                vec![
                    Segment::display_only(open, delimiter),
                    value,
                    Segment::display_only(close, delimiter),
                ]
            }
            Classification::Binary => {
                let mut value = Segment::new(hex::encode(&decoded), style.unwrap_or(Style::Binary))
                    .with_backing(self.data[span.clone()].to_vec())
                    .with_origin(span.clone());
                value.hex = Some(syntax);

                vec![
                    Segment::display_only(open, delimiter),
                    Segment::display_only("{", delimiter).with_backing(vec![]),
                    value,
                    Segment::display_only("}", delimiter).with_backing(vec![]),
                    Segment::display_only(close, delimiter),
                ]
            }
        };

        for part in &mut parts {
            part.group = Some(group);
        }

        self.segments.extend(parts);
        self.cursor = span.end;
    }

    /// Emit the token at `range`, preceded by the white space and comments in
    /// front of it.
    fn token(&mut self, range: Range<usize>, style: Style) {
        self.trivia(range.start);
        self.raw(range, style);
    }

    /// Emit the white space and comments up to `to`.
    fn trivia(&mut self, to: usize) {
        if to <= self.cursor {
            return;
        }

        let start = self.cursor;
        let mut r = Reader::new(&self.data[..to]);
        r.jump(start);

        while !r.at_end() {
            let run_start = r.offset();

            let style = if r.peek_byte() == Some(b'%') {
                r.forward_while(|b| !is_eol_character(b));
                Style::Comment
            } else {
                r.forward_while(is_white_space_character);
                Style::Whitespace
            };

            if r.offset() == run_start {
                // Not white space or a comment, keep it as it is.
                r.jump_to_end();
                self.raw(run_start..r.offset(), Style::Unparsed);
            } else {
                self.raw(run_start..r.offset(), style);
            }
        }

        self.cursor = to;
    }

    /// Emit the bytes at `range` as they are.
    fn raw(&mut self, range: Range<usize>, style: Style) {
        let bytes = &self.data[range.clone()];

        let segment = if is_displayable(bytes) {
            Segment::new(String::from_utf8_lossy(bytes), style)
        } else {
            Segment::new(display_lossy(bytes), style).with_backing(bytes.to_vec())
        };

        self.segments.push(segment.with_origin(range.clone()));
        self.cursor = range.end;
    }
}

/// Show bytes that are not plain text, replacing what cannot be shown.
fn display_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .map(|c| {
            if c.is_control() && !matches!(c, '\t' | '\n' | '\r') {
                char::REPLACEMENT_CHARACTER
            } else {
                c
            }
        })
        .collect()
}
