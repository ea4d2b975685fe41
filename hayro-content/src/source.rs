/// The owner of a content stream.
///
/// A document is usually built from a stream object of a PDF file. Such an
/// object may be backed by an external byte source (for example a file
/// that is still being written), in which case its bytes must not be read.
pub trait ContentSource {
    /// The decoded bytes of the content stream.
    fn content(&self) -> &[u8];

    /// Whether the stream currently has an external handle open on its bytes.
    fn has_external_open_handle(&self) -> bool {
        false
    }
}

impl ContentSource for [u8] {
    fn content(&self) -> &[u8] {
        self
    }
}

impl ContentSource for Vec<u8> {
    fn content(&self) -> &[u8] {
        self
    }
}
