#![no_main]

use hayro_content::Document;
use libfuzzer_sys::fuzz_target;

// Header layout (5 bytes):
// [0..2]  position (u16 LE), wrapped to the document length
// [2]     length of the edited range
// [3]     kind of edit (0=insert, 1=remove, 2+=replace)
// [4]     length of the inserted text, taken from the end of the data
// [5..]   content stream, followed by the inserted text

const HEADER_SIZE: usize = 5;

fuzz_target!(|data: &[u8]| {
    if data.len() < HEADER_SIZE {
        return;
    }

    let (header, rest) = data.split_at(HEADER_SIZE);
    let text_len = usize::from(header[4]).min(rest.len());
    let (stream, text) = rest.split_at(rest.len() - text_len);
    let text = String::from_utf8_lossy(text);

    let mut document = Document::new(stream);
    let doc_len = document.len();
    let pos = usize::from(u16::from_le_bytes([header[0], header[1]])) % (doc_len + 1);
    let len = usize::from(header[2]).min(doc_len - pos);

    let result = match header[3] {
        0 => document.insert(pos, &text),
        1 => document.remove(pos, len),
        _ => document.replace(pos, len, &text),
    };

    // Rejected edits leave the stream untouched.
    if let Ok(false) = result {
        assert_eq!(document.serialize(), stream);
    } else {
        assert!(result.is_ok());
    }
});
