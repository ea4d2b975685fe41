//! Tests for building, editing and serializing content streams.

use std::sync::{Arc, Mutex};

use hayro_content::{BuildSettings, BuildWarning, ContentSource, Document, Error, Style};

fn round_trip(data: &[u8]) {
    let document = Document::new(data);
    assert_eq!(
        document.serialize(),
        data,
        "round trip failed for {:?}",
        String::from_utf8_lossy(data)
    );
}

fn recording_settings() -> (BuildSettings, Arc<Mutex<Vec<BuildWarning>>>) {
    let warnings = Arc::new(Mutex::new(vec![]));
    let sink = warnings.clone();

    let settings = BuildSettings {
        warning_sink: Arc::new(move |w| sink.lock().unwrap().push(w)),
        ..BuildSettings::default()
    };

    (settings, warnings)
}

/// The character position of `needle` in the text of the document.
fn position(document: &Document, needle: &str) -> usize {
    let text = document.text();
    let byte = text.find(needle).unwrap();
    text[..byte].chars().count()
}

#[test]
fn round_trip_plain() {
    round_trip(b"q 1 0 0 1 72 720 cm BT /F1 12 Tf (Hello) Tj ET Q");
    round_trip(b"q\r\n0.5 g\r\n10 10 100 100 re\r\nf\r\nQ\r\n");
    round_trip(b"");
    round_trip(b"   \n\n ");
}

#[test]
fn round_trip_arrays() {
    round_trip(b"BT\n[(A) 120 (W) -50 <0041>] TJ\nET\n");
    round_trip(b"BT [[(nested)] [1 2 [3]]] TJ ET");
}

#[test]
fn round_trip_marked_content() {
    round_trip(b"/Span <</MCID 0 /ActualText (x)>> BDC\n(text) Tj\nEMC");
    round_trip(b"/P <</MCID 1/Lang (en-US)/Alt<feff0041>>>BDC EMC");
}

#[test]
fn round_trip_comments() {
    round_trip(b"% header\nq %inline\nQ\n%trailing");
}

#[test]
fn round_trip_strings() {
    // UTF-16BE
    round_trip(b"(\xfe\xff\x30\x53\x30\x93\x30\x6b\x30\x61\x30\x6f) Tj");
    // UTF-8
    round_trip(b"(\xef\xbb\xbf\xe4\xb8\x96) Tj");
    // Escape sequences stay as they were written.
    round_trip(b"(a\\051b\\\\c\\\nd) Tj");
    round_trip(b"(Hello\\000world) Tj");
    round_trip(b"(Hello\0world!) Tj");
    round_trip(b"<48 65 6C 6C 6F> Tj");
}

#[test]
fn round_trip_malformed() {
    round_trip(b"q ) garbage\nQ");
    round_trip(b"1 0 0");
    round_trip(b"BT (unterminated Tj ET");
    round_trip(b"BI /W 1 /H 1 ID \x00\x01\x02");
}

#[test]
fn unicode_strings_are_shown_as_text() {
    let document = Document::new(b"(\xfe\xff\x30\x53\x30\x93\x30\x6b\x30\x61\x30\x6f) Tj");
    assert_eq!(document.text(), "(こんにちは) Tj");
    assert_eq!(
        document.tooltip(1).as_deref(),
        Some("Text string in UTF-16BE")
    );

    let document = Document::new(b"(\xef\xbb\xbf\xe4\xb8\x96) Tj");
    assert_eq!(document.text(), "(世) Tj");
}

#[test]
fn utf8_edit() {
    let mut document = Document::new(b"(\xef\xbb\xbf\xe4\xb8\x96) Tj");

    assert!(document.replace(1, 1, "違う").unwrap());
    assert_eq!(document.text(), "(違う) Tj");
    assert_eq!(
        document.serialize(),
        b"(\xef\xbb\xbf\xe9\x81\x95\xe3\x81\x86) Tj"
    );
}

#[test]
fn text_edit_keeps_other_bytes() {
    let data = b"q\n  1 0 0 1 0 0 cm   % move\nBT (abc) Tj ET\nQ";
    let mut document = Document::new(data);

    let pos = position(&document, "abc");
    assert!(document.replace(pos, 3, "xyz").unwrap());
    assert_eq!(
        document.serialize(),
        b"q\n  1 0 0 1 0 0 cm   % move\nBT (xyz) Tj ET\nQ"
    );
}

#[test]
fn plain_text_edit() {
    let mut document = Document::new(b"(Hello world!) Tj");
    assert_eq!(document.text(), "(Hello world!) Tj");
    assert!(document.is_textual(1));
    assert!(!document.is_hex_editable(1));

    let pos = position(&document, "world");
    assert!(document.replace(pos, 5, "there").unwrap());
    assert_eq!(document.serialize(), b"(Hello there!) Tj");
}

#[test]
fn text_falls_back_to_utf16() {
    let mut document = Document::new(b"(Hello) Tj");

    assert!(document.insert(6, "\u{2192}").unwrap());
    assert_eq!(document.text(), "(Hello\u{2192}) Tj");
    assert_eq!(
        document.serialize(),
        b"(\xfe\xff\x00H\x00e\x00l\x00l\x00o\x21\x92) Tj"
    );
}

#[test]
fn document_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Document>();
}

#[test]
fn binary_string_is_shown_as_hex() {
    let document = Document::new(b"(Hello\0world!) Tj");

    assert_eq!(document.text(), "({48656c6c6f00776f726c6421}) Tj");
    assert!(document.is_hex_editable(2));
    assert!(!document.is_textual(2));
    assert_eq!(document.style_at(2), Some(Style::Binary));
    assert_eq!(
        document.tooltip(2).as_deref(),
        Some("Binary string, shown as hex digits. Only hex digits can be typed here.")
    );
}

#[test]
fn hex_replace() {
    let mut document = Document::new(b"(Hello\0world!) Tj");

    // Replace the digits of the second `o`.
    assert!(document.replace(10, 2, "757575").unwrap());
    assert_eq!(document.serialize(), b"(Helluuu\0world!) Tj");
}

#[test]
fn hex_remove() {
    let mut document = Document::new(b"(Hello\0world!) Tj");

    assert!(document.remove(4, 2).unwrap());
    assert_eq!(document.text(), "({486c6c6f00776f726c6421}) Tj");
    assert_eq!(document.serialize(), b"(Hllo\0world!) Tj");

    // An odd number of digits is padded when writing.
    assert!(document.remove(4, 3).unwrap());
    assert_eq!(document.text(), "({48c6f00776f726c6421}) Tj");
    assert_eq!(
        document.serialize(),
        b"(\x48\xc6\xf0\x07\x76\xf7\x26\xc6\x42\x10) Tj"
    );
}

#[test]
fn hex_insert() {
    let mut document = Document::new(b"(Hello\0world!) Tj");

    // Nothing but hex digits can be typed.
    assert!(!document.insert(10, "xyz").unwrap());
    assert_eq!(document.serialize(), b"(Hello\0world!) Tj");

    // Other characters are dropped.
    assert!(document.insert(2, "a-B").unwrap());
    assert_eq!(document.text(), "({ab48656c6c6f00776f726c6421}) Tj");
    assert_eq!(document.serialize(), b"(\xabHello\0world!) Tj");
}

#[test]
fn hex_remove_all_keeps_delimiters() {
    let mut document = Document::new(b"<4142> Tj");

    assert_eq!(document.text(), "<{4142}> Tj");
    assert!(document.remove(2, 4).unwrap());
    assert_eq!(document.serialize(), b"<> Tj");
}

#[test]
fn boundary_edits_are_rejected() {
    let mut document = Document::new(b"(Hello\0world!) Tj");

    // The opening brace and the first digits.
    assert!(!document.remove(1, 3).unwrap());
    // The last digits and the closing brace.
    assert!(!document.replace(24, 3, "").unwrap());
    // Typing onto the brace.
    assert!(!document.insert(1, "x").unwrap());

    assert_eq!(document.serialize(), b"(Hello\0world!) Tj");
}

#[test]
fn typing_into_emptied_binary_string() {
    let mut document = Document::new(b"(Hello\0world!) Tj");

    assert!(!document.remove(1, 26).unwrap());
    assert!(!document.replace(26, 1, "ab").unwrap());

    assert!(document.remove(2, 24).unwrap());
    assert!(!document.insert(3, "abc").unwrap());
    assert!(document.insert(2, "abc").unwrap());

    assert_eq!(document.text(), "({abc}) Tj");
    assert_eq!(document.serialize(), b"(\xab\xc0) Tj");
}

#[test]
fn select_all_remove() {
    let data = b"(ab) Tj\n".repeat(20_000);
    let mut document = Document::new(&data);

    assert!(document.remove(0, document.len()).unwrap());
    assert!(document.is_empty());
    assert_eq!(document.serialize(), b"");
}

#[test]
fn whole_string_can_be_removed() {
    let mut document = Document::new(b"(Hello\0world!) Tj (a) Tj");

    let end = position(&document, " Tj");
    assert!(document.remove(0, end).unwrap());
    assert_eq!(document.serialize(), b" Tj (a) Tj");
}

#[test]
fn out_of_bounds() {
    let mut document = Document::new(b"q Q");

    assert_eq!(
        document.remove(3, 5),
        Err(Error::OutOfBounds {
            pos: 3,
            len: 5,
            doc_len: 4
        })
    );
}

#[test]
fn indentation() {
    let document = Document::new(b"q\nBT\n/F1 12 Tf\n(Hi) Tj\nET\nQ");
    assert_eq!(
        document.text(),
        "q\n  BT\n    /F1 12 Tf\n    (Hi) Tj\n  ET\nQ"
    );

    let document = Document::new(b"0 0 m 10 10 l S");
    assert_eq!(document.text(), "0 0 m \n  10 10 l \nS");

    // Indentation is never written back.
    assert_eq!(document.serialize(), b"0 0 m 10 10 l S");
}

#[test]
fn custom_indentation() {
    let settings = BuildSettings {
        indent: "\t".to_string(),
        ..BuildSettings::default()
    };

    let document = Document::new_with(b"BT\nET", &settings);
    assert_eq!(document.text(), "BT\nET");

    let document = Document::new_with(b"BT\n0 g\nET", &settings);
    assert_eq!(document.text(), "BT\n\t0 g\nET");
}

#[test]
fn match_operands() {
    let settings = BuildSettings {
        match_operands: true,
        ..BuildSettings::default()
    };

    let document = Document::new_with(b"1 0 0 RG", &settings);
    assert!(
        document
            .segments()
            .iter()
            .filter(|s| !s.text().trim().is_empty())
            .all(|s| s.style() == document.style_at(7).unwrap())
    );

    let document = Document::new(b"1 0 0 RG");
    assert_eq!(document.style_at(0), Some(Style::Number));
}

#[test]
fn unparsed_data() {
    let (settings, warnings) = recording_settings();
    let data = b"q\n1 0 0 1 0 0 cm\n) garbage\nQ";
    let document = Document::new_with(data, &settings);

    assert_eq!(
        warnings.lock().unwrap().as_slice(),
        &[BuildWarning::Unparsed { offset: 17 }]
    );

    let pos = position(&document, ")");
    assert_eq!(document.style_at(pos), Some(Style::Unparsed));
    assert!(document.tooltip(pos).is_some());
    assert_eq!(document.serialize(), data);

    let mut document = document;
    assert!(!document.insert(pos + 1, "x").unwrap());
}

#[test]
fn busy_source() {
    struct Stream {
        data: Vec<u8>,
        open: bool,
    }

    impl ContentSource for Stream {
        fn content(&self) -> &[u8] {
            &self.data
        }

        fn has_external_open_handle(&self) -> bool {
            self.open
        }
    }

    let mut stream = Stream {
        data: b"q Q".to_vec(),
        open: true,
    };

    assert_eq!(
        Document::load(&stream, &BuildSettings::default()),
        Err(Error::SourceBusy)
    );

    stream.open = false;
    let document = Document::load(&stream, &BuildSettings::default()).unwrap();
    assert_eq!(document.serialize(), b"q Q");
}

#[test]
fn inline_image_is_protected() {
    let data = b"q BI /W 2 /H 1 /CS /G /BPC 8 /F /AHx ID 00ff> EI Q";
    let mut document = Document::new(data);

    let pos = position(&document, "[inline image");
    assert_eq!(document.style_at(pos), Some(Style::Image));

    assert!(!document.insert(pos + 3, "x").unwrap());
    assert!(!document.remove(pos + 1, 2).unwrap());
    assert_eq!(document.serialize(), data);
}

#[test]
fn inline_image_corrupt() {
    let (settings, warnings) = recording_settings();
    let data = b"BI /W 1 /H 1 /CS /Foo /BPC 8 ID \x00 EI";
    let document = Document::new_with(data, &settings);

    assert_eq!(
        warnings.lock().unwrap().as_slice(),
        &[BuildWarning::ImageDecodeFailure { offset: 0 }]
    );

    let pos = position(&document, "[inline image, no preview]");
    assert!(document.image_at(pos).is_none());
    assert!(!document.text().contains("[save image]"));
    assert_eq!(document.serialize(), data);
}

#[test]
fn inline_image_too_large() {
    let (settings, warnings) = recording_settings();
    let data = b"BI /W 2147483648 /H 2147483648 /CS /CMYK /BPC 8 ID x EI";
    let document = Document::new_with(data, &settings);

    assert_eq!(
        warnings.lock().unwrap().as_slice(),
        &[BuildWarning::ImageDecodeFailure { offset: 0 }]
    );
    assert!(document.text().contains("[inline image, no preview]"));
    assert_eq!(document.serialize(), data);
}

#[cfg(feature = "images")]
#[test]
fn inline_image_preview() {
    let (settings, warnings) = recording_settings();
    let data = b"q BI /W 2 /H 1 /CS /G /BPC 8 /F /AHx ID 00ff> EI Q";
    let document = Document::new_with(data, &settings);

    assert!(warnings.lock().unwrap().is_empty());
    assert!(document.text().contains("[inline image 2x1] [save image]"));

    let pos = position(&document, "[inline image");
    assert_eq!(
        document.tooltip(pos).as_deref(),
        Some("Inline image, 2x1 pixels, 5 bytes of data")
    );

    let preview = document.image_at(pos).unwrap();
    assert_eq!(preview.pixels(), &[0, 0, 0, 255, 255, 255, 255, 255]);

    let save = position(&document, "[save image]");
    assert_eq!(document.image_at(save), Some(preview));

    let png = preview.to_png().unwrap();
    let decoded = image::load_from_memory_with_format(&png, image::ImageFormat::Png)
        .unwrap()
        .to_rgba8();
    assert_eq!(decoded.dimensions(), (2, 1));
    assert_eq!(decoded.as_raw().as_slice(), preview.pixels());
}

#[cfg(feature = "images")]
#[test]
fn inline_image_with_length() {
    // The data contains `EI`, so only the length finds the right end.
    let data = b"BI /W 2 /H 1 /CS /G /BPC 8 /L 2 ID EI EI";
    let document = Document::new(data);

    let pos = position(&document, "[inline image");
    let preview = document.image_at(pos).unwrap();
    assert_eq!(preview.pixels(), &[b'E', b'E', b'E', 255, b'I', b'I', b'I', 255]);
    assert_eq!(document.serialize(), data);
}

#[test]
fn whole_inline_image_can_be_removed() {
    let mut document = Document::new(b"q BI /W 1 /H 1 /CS /G /BPC 8 ID \x80 EI Q");

    let start = position(&document, "BI");
    let end = position(&document, "EI") + 2;
    assert!(document.remove(start, end - start).unwrap());
    assert_eq!(document.serialize(), b"q  Q");
}
