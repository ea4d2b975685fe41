//! Validating and applying edits.
//!
//! Edits are first validated against the segments they touch, which yields
//! either a [`Change`] that can be applied or a rejection. Text can be typed
//! freely everywhere except into segments backed by bytes that the text
//! cannot represent. Those can only be removed as a whole or, for strings
//! shown as hex digits, edited with hex digits.

use core::ops::Range;

use log::debug;

use crate::document::{Document, Segment, Style};
use crate::encoding::TextEncoding;
use crate::error::{Error, Result};
use crate::hex;

/// An edit requested by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Insert text at a position.
    Insert {
        /// The position to insert at.
        pos: usize,
        /// The text to insert.
        text: String,
    },
    /// Remove a range of text.
    Remove {
        /// The start of the range.
        pos: usize,
        /// The length of the range.
        len: usize,
    },
    /// Replace a range of text.
    Replace {
        /// The start of the range.
        pos: usize,
        /// The length of the range.
        len: usize,
        /// The replacement.
        text: String,
    },
}

impl Edit {
    fn range(&self) -> (usize, usize) {
        match self {
            Self::Insert { pos, .. } => (*pos, 0),
            Self::Remove { pos, len } | Self::Replace { pos, len, .. } => (*pos, *len),
        }
    }
}

/// The outcome of validating an [`Edit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The edit may be applied, in the form of the given change.
    Accepted(Change),
    /// The edit would corrupt data and must not be applied.
    Rejected,
}

/// An accepted edit.
///
/// A change is only valid for the state of the document it was validated
/// against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pos: usize,
    len: usize,
    text: String,
    /// The hex-editable segment the change is confined to.
    hex_segment: Option<usize>,
}

impl Change {
    /// The start of the replaced range.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The length of the replaced range.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing is removed.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The text that is inserted, which for hex edits only consists of
    /// the hex digits of the requested text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the change edits the hex digits of a binary string.
    pub fn is_hex(&self) -> bool {
        self.hex_segment.is_some()
    }
}

impl Document {
    /// Check whether an edit may be applied.
    ///
    /// Returns an error if the edit refers to a range outside of the document.
    pub fn validate(&self, edit: &Edit) -> Result<Verdict> {
        let (pos, len) = edit.range();
        self.check_bounds(pos, len)?;

        let verdict = match edit {
            Edit::Insert { pos, text } => self.validate_insert(*pos, text),
            Edit::Remove { pos, len } => self.validate_replace(*pos, *len, ""),
            Edit::Replace { pos, len, text } if *len == 0 => self.validate_insert(*pos, text),
            Edit::Replace { pos, len, text } => self.validate_replace(*pos, *len, text),
        };

        if verdict == Verdict::Rejected {
            debug!("rejected edit {edit:?}");
        }

        Ok(verdict)
    }

    /// Apply a change that was accepted by [`Document::validate`].
    pub fn apply(&mut self, change: Change) -> Result<()> {
        self.check_bounds(change.pos, change.len)?;

        match change.hex_segment {
            Some(index) => self.apply_hex(index, &change),
            None => {
                if change.len > 0 {
                    self.remove_text(change.pos, change.len);
                }

                if !change.text.is_empty() {
                    self.insert_text(change.pos, &change.text);
                }
            }
        }

        Ok(())
    }

    /// Validate and, if accepted, apply an edit. Returns whether the edit was
    /// applied.
    pub fn edit(&mut self, edit: &Edit) -> Result<bool> {
        match self.validate(edit)? {
            Verdict::Accepted(change) => self.apply(change).map(|_| true),
            Verdict::Rejected => Ok(false),
        }
    }

    /// Insert text at `pos`, if allowed.
    pub fn insert(&mut self, pos: usize, text: &str) -> Result<bool> {
        self.edit(&Edit::Insert {
            pos,
            text: text.to_string(),
        })
    }

    /// Remove `len` characters at `pos`, if allowed.
    pub fn remove(&mut self, pos: usize, len: usize) -> Result<bool> {
        self.edit(&Edit::Remove { pos, len })
    }

    /// Replace `len` characters at `pos` with `text`, if allowed.
    pub fn replace(&mut self, pos: usize, len: usize, text: &str) -> Result<bool> {
        self.edit(&Edit::Replace {
            pos,
            len,
            text: text.to_string(),
        })
    }

    fn check_bounds(&self, pos: usize, len: usize) -> Result<()> {
        let doc_len = self.len();

        match pos.checked_add(len) {
            Some(end) if end <= doc_len => Ok(()),
            _ => Err(Error::OutOfBounds { pos, len, doc_len }),
        }
    }

    fn validate_insert(&self, pos: usize, text: &str) -> Verdict {
        if self.is_textual(pos) {
            return Verdict::Accepted(Change {
                pos,
                len: 0,
                text: text.to_string(),
                hex_segment: None,
            });
        }

        match self.hex_segment_at(pos) {
            Some(index) => {
                let digits = hex::filter_digits(text);

                if digits.is_empty() {
                    Verdict::Rejected
                } else {
                    Verdict::Accepted(Change {
                        pos,
                        len: 0,
                        text: digits,
                        hex_segment: Some(index),
                    })
                }
            }
            None => Verdict::Rejected,
        }
    }

    fn validate_replace(&self, pos: usize, len: usize, text: &str) -> Verdict {
        let end = pos + len;
        let spans = self.spans();

        // Inside of a single binary string, only hex digits are kept. If none
        // remain, this is a removal.
        if let Some(index) = spans
            .iter()
            .zip(&self.segments)
            .position(|(span, s)| s.hex.is_some() && span.start <= pos && end <= span.end)
        {
            return Verdict::Accepted(Change {
                pos,
                len,
                text: hex::filter_digits(text),
                hex_segment: Some(index),
            });
        }

        let covered_groups = self.covered_groups(&spans, pos, end);

        // Elsewhere, segments with backing bytes can only be replaced as a
        // whole. Delimiters and binary values only go together with the rest
        // of their string.
        let allowed = spans.iter().zip(&self.segments).all(|(span, s)| {
            let touched = span.start < end && span.end > pos;
            let covered = pos <= span.start && span.end <= end;

            match s.group {
                _ if !touched => true,
                Some(group) if s.encoding.is_none() => covered_groups[group],
                _ => covered || s.backing.is_none(),
            }
        });

        if allowed {
            Verdict::Accepted(Change {
                pos,
                len,
                text: text.to_string(),
                hex_segment: None,
            })
        } else {
            Verdict::Rejected
        }
    }

    fn apply_hex(&mut self, index: usize, change: &Change) {
        let Some(span) = self.spans().get(index).cloned() else {
            return;
        };

        let Some(segment) = self.segments.get_mut(index) else {
            return;
        };

        // Hex digits are ASCII, so characters and bytes line up.
        let start = change.pos.saturating_sub(span.start).min(segment.text.len());
        let end = (start + change.len).min(segment.text.len());
        segment.text.replace_range(start..end, &change.text);
        segment.update_hex_backing();
    }

    fn remove_text(&mut self, pos: usize, len: usize) {
        let end = pos + len;
        let spans = self.spans();

        let covered = spans
            .iter()
            .map(|s| pos <= s.start && s.end <= end)
            .collect::<Vec<_>>();
        let covered_groups = self.covered_groups(&spans, pos, end);

        // A string is only removed entirely if all of its parts are. Otherwise,
        // its value is kept, so that the delimiters stay balanced.
        let keep_empty = self
            .segments
            .iter()
            .zip(&covered)
            .map(|(s, c)| {
                *c && s.is_string_value() && !s.group.is_some_and(|g| covered_groups[g])
            })
            .collect::<Vec<_>>();

        let segments = core::mem::take(&mut self.segments);

        for (i, mut segment) in segments.into_iter().enumerate() {
            let span = &spans[i];

            if keep_empty[i] {
                segment.text.clear();
                segment.touch();
                self.segments.push(segment);
            } else if covered[i] {
                continue;
            } else if span.start < end && span.end > pos {
                let from = pos.max(span.start) - span.start;
                let to = end.min(span.end) - span.start;
                let range = char_range(&segment.text, from, to);
                segment.text.replace_range(range, "");
                segment.touch();
                self.segments.push(segment);
            } else {
                self.segments.push(segment);
            }
        }
    }

    /// Whether all segments of each string group lie within `pos..end`,
    /// indexed by group.
    fn covered_groups(&self, spans: &[Range<usize>], pos: usize, end: usize) -> Vec<bool> {
        let count = self
            .segments
            .iter()
            .filter_map(|s| s.group)
            .max()
            .map_or(0, |g| g + 1);
        let mut covered = vec![true; count];

        for (span, segment) in spans.iter().zip(&self.segments) {
            if let Some(group) = segment.group
                && !(pos <= span.start && span.end <= end)
            {
                covered[group] = false;
            }
        }

        covered
    }

    fn insert_text(&mut self, pos: usize, text: &str) {
        let spans = self.spans();

        // Inside of a segment.
        if let Some(i) = spans.iter().position(|s| s.start < pos && pos < s.end) {
            let offset = pos - spans[i].start;

            if self.segments[i].is_editable() {
                let at = char_range(&self.segments[i].text, offset, offset).start;
                self.segments[i].text.insert_str(at, text);
                self.segments[i].touch();
            } else {
                // Text never goes into content that is only shown, so split it.
                let at = char_range(&self.segments[i].text, offset, offset).start;
                let mut tail = self.segments[i].clone();
                tail.text = self.segments[i].text.split_off(at);
                self.segments[i].touch();
                tail.touch();

                self.segments.insert(i + 1, Segment::new(text, Style::Plain));
                self.segments.insert(i + 2, tail);
            }

            return;
        }

        // At the end of a segment.
        if let Some(i) = (0..spans.len())
            .rev()
            .find(|i| spans[*i].end == pos && self.segments[*i].is_editable())
        {
            self.segments[i].text.push_str(text);
            self.segments[i].touch();
            return;
        }

        // At the start of a segment.
        if let Some(i) =
            (0..spans.len()).find(|i| spans[*i].start == pos && self.segments[*i].is_editable())
        {
            self.segments[i].text.insert_str(0, text);
            self.segments[i].touch();
            return;
        }

        let index = spans
            .iter()
            .position(|s| s.end > pos)
            .unwrap_or(self.segments.len());
        self.segments.insert(index, Segment::new(text, Style::Plain));
    }
}

impl Segment {
    /// Mark the segment as edited, so that it is written back from its text.
    fn touch(&mut self) {
        self.origin = None;

        if self.hex.is_some() {
            self.update_hex_backing();
        }

        if self.encoding == Some(TextEncoding::PdfDocEncoding)
            && TextEncoding::PdfDocEncoding.encode(&self.text).is_none()
        {
            debug!("text can't be written in PDFDocEncoding anymore, switching to UTF-16BE");
            self.encoding = Some(TextEncoding::Utf16Be);
        }
    }

    fn update_hex_backing(&mut self) {
        self.origin = None;

        if let Some(syntax) = self.hex {
            self.backing = Some(syntax.write(&hex::decode_lenient(self.text.as_bytes())));
        }
    }
}

/// The byte range of the characters `from..to` of `text`.
fn char_range(text: &str, from: usize, to: usize) -> Range<usize> {
    let byte = |n: usize| {
        text.char_indices()
            .nth(n)
            .map_or(text.len(), |(offset, _)| offset)
    };

    byte(from)..byte(to)
}
