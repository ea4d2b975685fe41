//! Writing segments back into content stream bytes.

use log::debug;

use crate::document::Segment;
use crate::encoding::TextEncoding;
use crate::hex;
use crate::object::write_literal;

pub(crate) fn serialize(source: &[u8], segments: &[Segment]) -> Vec<u8> {
    let mut out = Vec::with_capacity(source.len());

    for segment in segments {
        if segment.display_only {
            continue;
        }

        if let Some(bytes) = segment.origin.clone().and_then(|o| source.get(o)) {
            out.extend_from_slice(bytes);
        } else if let Some(syntax) = segment.hex {
            out.extend(syntax.write(&hex::decode_lenient(segment.text.as_bytes())));
        } else if let Some(backing) = &segment.backing {
            out.extend_from_slice(backing);
        } else if let Some(encoding) = segment.encoding {
            out.extend(write_literal(&encode(encoding, &segment.text)));
        } else {
            out.extend_from_slice(segment.text.as_bytes());
        }
    }

    out
}

fn encode(encoding: TextEncoding, text: &str) -> Vec<u8> {
    encoding.encode(text).unwrap_or_else(|| {
        debug!("failed to encode text in {}, using UTF-16BE", encoding.name());

        TextEncoding::Utf16Be.encode(text).unwrap_or_default()
    })
}
