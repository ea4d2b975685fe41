use std::sync::Arc;

use crate::image::{DefaultDecoder, ImageDecoder};

/// A callback function for receiving warnings while building a document.
pub type WarningSinkFn = Arc<dyn Fn(BuildWarning) + Send + Sync>;

#[derive(Clone, Debug, PartialEq, Eq)]
/// Warnings that can occur while building a document from a content stream.
pub enum BuildWarning {
    /// The content stream could not be parsed starting at the given byte
    /// offset. The rest of the stream is kept as opaque data.
    Unparsed {
        /// The byte offset of the first unparsed operation.
        offset: usize,
    },
    /// An inline image could not be decoded for a preview. Its data is kept
    /// unchanged.
    ImageDecodeFailure {
        /// The byte offset of the `BI` operator of the image.
        offset: usize,
    },
}

#[derive(Clone)]
/// Settings that are applied when building a document from a content stream.
pub struct BuildSettings {
    /// Whether operands are highlighted with the style of their operator
    /// instead of the style of their own type.
    pub match_operands: bool,

    /// The text that is shown once per indentation level in front of nested
    /// operators.
    pub indent: String,

    /// How deeply arrays and dictionaries may be nested inside of an operand
    /// before the content stream is considered malformed.
    pub max_nesting_depth: usize,

    /// The decoder used for previews of inline images.
    pub image_decoder: Arc<dyn ImageDecoder + Send + Sync>,

    /// A callback for warnings encountered while building a document.
    pub warning_sink: WarningSinkFn,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            match_operands: false,
            indent: "  ".to_string(),
            max_nesting_depth: 64,
            image_decoder: Arc::new(DefaultDecoder),
            warning_sink: Arc::new(|_| {}),
        }
    }
}
