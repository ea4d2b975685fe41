//! An editable text view of a content stream.
//!
//! A [`Document`] is an ordered list of [`Segment`]s whose concatenated text is
//! what a user sees and edits. Every segment knows how it is written back, so
//! that [`Document::serialize`] reproduces the original bytes for everything
//! that was not edited.
//!
//! All positions and lengths are counted in characters of the document text.

use core::ops::Range;

use crate::content::OperatorKind;
use crate::encoding::TextEncoding;
use crate::error::{Error, Result};
use crate::image::{DecodeError, InlineImagePreview};
use crate::object::StringSyntax;
use crate::settings::BuildSettings;
use crate::source::ContentSource;

mod build;
mod edit;
mod serialize;

pub use edit::{Change, Edit, Verdict};

/// How a segment is highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    /// An operator of the given category.
    Operator(OperatorKind),
    /// A number.
    Number,
    /// A name.
    Name,
    /// A string shown as text.
    String,
    /// A string shown as hex digits.
    Binary,
    /// `true`, `false` or `null`.
    Keyword,
    /// Delimiters of strings, arrays and dictionaries.
    Delimiter,
    /// A comment.
    Comment,
    /// White space.
    Whitespace,
    /// Indentation in front of nested operators.
    Indent,
    /// An inline image.
    Image,
    /// Data that could not be parsed.
    Unparsed,
    /// Text typed by the user.
    Plain,
}

/// A piece of the document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub(crate) text: String,
    pub(crate) backing: Option<Vec<u8>>,
    pub(crate) encoding: Option<TextEncoding>,
    pub(crate) hex: Option<StringSyntax>,
    pub(crate) display_only: bool,
    pub(crate) style: Style,
    /// The bytes of the source this segment was read from. Cleared once the
    /// segment is edited.
    pub(crate) origin: Option<Range<usize>>,
    /// The segments of one string share a group.
    pub(crate) group: Option<usize>,
    pub(crate) image: Option<usize>,
}

impl Segment {
    pub(crate) fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            backing: None,
            encoding: None,
            hex: None,
            display_only: false,
            style,
            origin: None,
            group: None,
            image: None,
        }
    }

    pub(crate) fn display_only(text: impl Into<String>, style: Style) -> Self {
        Self {
            display_only: true,
            ..Self::new(text, style)
        }
    }

    pub(crate) fn with_origin(mut self, origin: Range<usize>) -> Self {
        self.origin = Some(origin);
        self
    }

    pub(crate) fn with_backing(mut self, backing: Vec<u8>) -> Self {
        self.backing = Some(backing);
        self
    }

    /// The text shown for this segment.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The length of the text, in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether the text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The bytes this segment stands for, if they cannot be derived from its
    /// text alone.
    ///
    /// Segments with backing bytes can only be removed as a whole, or, if
    /// they are hex-editable, edited with hex digits.
    pub fn backing(&self) -> Option<&[u8]> {
        self.backing.as_deref()
    }

    /// The encoding the text is written back with, if this is a string.
    pub fn encoding(&self) -> Option<TextEncoding> {
        self.encoding
    }

    /// Whether the text consists of hex digits standing for the bytes of a
    /// string.
    pub fn is_hex_editable(&self) -> bool {
        self.hex.is_some()
    }

    /// The syntax the bytes of a hex-editable segment are written back with.
    pub fn hex_syntax(&self) -> Option<StringSyntax> {
        self.hex
    }

    /// Whether this segment is only shown and never written back.
    pub fn is_display_only(&self) -> bool {
        self.display_only
    }

    /// The highlighting style.
    pub fn style(&self) -> Style {
        self.style
    }

    /// Whether this segment still stands for unchanged bytes of the source.
    pub fn is_untouched(&self) -> bool {
        self.origin.is_some()
    }

    pub(crate) fn is_editable(&self) -> bool {
        self.backing.is_none() && !self.display_only
    }

    pub(crate) fn is_string_value(&self) -> bool {
        self.encoding.is_some() || self.hex.is_some()
    }
}

/// An inline image shown in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImageEntry {
    pub(crate) preview: core::result::Result<InlineImagePreview, DecodeError>,
    pub(crate) data_len: usize,
}

/// An editable text view of a content stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    source: Vec<u8>,
    segments: Vec<Segment>,
    images: Vec<ImageEntry>,
}

impl Document {
    /// Build a document from the bytes of a content stream, using the
    /// default settings.
    pub fn new(data: &[u8]) -> Self {
        Self::new_with(data, &BuildSettings::default())
    }

    /// Build a document from the bytes of a content stream.
    ///
    /// Building never fails: parts of the stream that cannot be parsed are
    /// kept as opaque data and reported to the warning sink.
    pub fn new_with(data: &[u8], settings: &BuildSettings) -> Self {
        let (segments, images) = build::build(data, settings);

        Self {
            source: data.to_vec(),
            segments,
            images,
        }
    }

    /// Build a document from the owner of a content stream.
    ///
    /// Fails with [`Error::SourceBusy`] if the owner currently has an external
    /// handle open on the stream.
    pub fn load<S: ContentSource + ?Sized>(source: &S, settings: &BuildSettings) -> Result<Self> {
        if source.has_external_open_handle() {
            return Err(Error::SourceBusy);
        }

        Ok(Self::new_with(source.content(), settings))
    }

    /// The bytes the document was built from.
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// The segments of the document.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The text of the document.
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// The length of the document text, in characters.
    pub fn len(&self) -> usize {
        self.segments.iter().map(Segment::len).sum()
    }

    /// Whether the document text is empty.
    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(Segment::is_empty)
    }

    /// The character range of every segment.
    pub(crate) fn spans(&self) -> Vec<Range<usize>> {
        let mut start = 0;

        self.segments
            .iter()
            .map(|s| {
                let end = start + s.len();
                let span = start..end;
                start = end;
                span
            })
            .collect()
    }

    fn index_at(&self, pos: usize) -> Option<usize> {
        self.spans().iter().position(|s| s.contains(&pos))
    }

    /// The segment containing the character at `pos`.
    pub fn segment_at(&self, pos: usize) -> Option<&Segment> {
        self.index_at(pos).map(|i| &self.segments[i])
    }

    /// The style of the character at `pos`.
    pub fn style_at(&self, pos: usize) -> Option<Style> {
        self.segment_at(pos).map(Segment::style)
    }

    /// Whether text can be typed at `pos` as it is.
    ///
    /// This is the case inside segments without backing bytes, and at the end
    /// of the document if the last segment has none.
    pub fn is_textual(&self, pos: usize) -> bool {
        if pos == self.len() {
            return self
                .segments
                .iter()
                .rev()
                .find(|s| !s.is_empty())
                .is_none_or(|s| s.backing.is_none());
        }

        self.index_at(pos).is_some_and(|i| {
            self.segments[i].backing.is_none() && !self.closes_binary_string(i)
        })
    }

    /// Whether the segment at `index` follows the value of a binary string in
    /// the same group. Text typed in front of it would end up inside of the
    /// string, where only hex digits are allowed.
    fn closes_binary_string(&self, index: usize) -> bool {
        let Some(group) = self.segments[index].group else {
            return false;
        };

        self.segments[..index]
            .iter()
            .rev()
            .take_while(|s| s.group == Some(group))
            .any(|s| s.hex.is_some())
    }

    /// Whether hex digits can be typed at `pos`.
    ///
    /// This is the case inside of hex-editable segments and directly after
    /// them.
    pub fn is_hex_editable(&self, pos: usize) -> bool {
        self.hex_segment_at(pos).is_some()
    }

    pub(crate) fn hex_segment_at(&self, pos: usize) -> Option<usize> {
        self.spans()
            .iter()
            .zip(&self.segments)
            .position(|(span, s)| s.hex.is_some() && span.start <= pos && pos <= span.end)
    }

    /// A description of the content at `pos`, for example to be shown when
    /// hovering over it.
    pub fn tooltip(&self, pos: usize) -> Option<String> {
        let segment = self.segment_at(pos)?;

        if let Some(image) = segment.image.and_then(|i| self.images.get(i)) {
            return Some(match (&image.preview, segment.display_only) {
                (Ok(_), true) => "Save the decoded inline image as PNG".to_string(),
                (Ok(p), false) => format!(
                    "Inline image, {}x{} pixels, {} bytes of data",
                    p.width(),
                    p.height(),
                    image.data_len
                ),
                (Err(e), _) => format!(
                    "Inline image that cannot be previewed ({e}), {} bytes of data",
                    image.data_len
                ),
            });
        }

        if segment.style == Style::Unparsed {
            return Some("Data that could not be parsed, it is kept unchanged".to_string());
        }

        // Delimiters share the description of their string.
        let value = match segment.group {
            Some(group) => self
                .segments
                .iter()
                .find(|s| s.group == Some(group) && s.is_string_value())?,
            None => segment,
        };

        if value.hex.is_some() {
            return Some(
                "Binary string, shown as hex digits. Only hex digits can be typed here."
                    .to_string(),
            );
        }

        if let Some(encoding) = value.encoding {
            return Some(format!("Text string in {}", encoding.name()));
        }

        match segment.style {
            Style::Operator(kind) => Some(format!("Operator ({})", kind.description())),
            _ => None,
        }
    }

    /// The decoded inline image at `pos`, to be saved through
    /// [`InlineImagePreview::to_png`].
    pub fn image_at(&self, pos: usize) -> Option<&InlineImagePreview> {
        let index = self.segment_at(pos)?.image?;
        self.images.get(index)?.preview.as_ref().ok()
    }

    /// Write the document back into the bytes of a content stream.
    pub fn serialize(&self) -> Vec<u8> {
        serialize::serialize(&self.source, &self.segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Busy;

    impl ContentSource for Busy {
        fn content(&self) -> &[u8] {
            b"q Q"
        }

        fn has_external_open_handle(&self) -> bool {
            true
        }
    }

    #[test]
    fn load_checks_for_open_handles() {
        assert_eq!(
            Document::load(&Busy, &BuildSettings::default()),
            Err(Error::SourceBusy)
        );

        let doc = Document::load(b"q Q".as_slice(), &BuildSettings::default()).unwrap();
        assert_eq!(doc.serialize(), b"q Q");
    }

    #[test]
    fn positions() {
        let doc = Document::new(b"(Hi) Tj");
        assert_eq!(doc.text(), "(Hi) Tj");
        assert_eq!(doc.len(), 7);
        assert_eq!(doc.style_at(1), Some(Style::String));
        assert_eq!(doc.style_at(0), Some(Style::Delimiter));
        assert_eq!(doc.style_at(5), Some(Style::Operator(OperatorKind::Text)));
        assert_eq!(doc.style_at(7), None);
    }

    #[test]
    fn textual_positions() {
        let doc = Document::new(b"(Hello\0world!) Tj");

        // `({` at 0 and 1, the hex digits from 2 to 26, `})` at 26 and 27, then ` Tj`.
        assert!(doc.is_textual(0));
        assert!(!doc.is_textual(1));
        assert!(!doc.is_textual(2));
        assert!(!doc.is_textual(26));
        assert!(!doc.is_textual(27));
        assert!(doc.is_textual(28));
        assert!(doc.is_textual(doc.len()));

        assert!(!doc.is_hex_editable(1));
        assert!(doc.is_hex_editable(2));
        assert!(doc.is_hex_editable(26));
        assert!(!doc.is_hex_editable(27));
    }

    #[test]
    fn empty_document() {
        let doc = Document::new(b"");
        assert!(doc.is_empty());
        assert!(doc.is_textual(0));
        assert_eq!(doc.serialize(), b"");
    }

    #[test]
    fn tooltips() {
        let doc = Document::new(b"(Hi) Tj <00> Tj");
        assert_eq!(doc.tooltip(1).unwrap(), "Text string in PDFDocEncoding");
        assert_eq!(doc.tooltip(0).unwrap(), "Text string in PDFDocEncoding");
        assert_eq!(doc.tooltip(5).unwrap(), "Operator (text)");
        assert!(doc.tooltip(10).unwrap().starts_with("Binary string"));
        assert_eq!(doc.tooltip(4), None);
    }
}
