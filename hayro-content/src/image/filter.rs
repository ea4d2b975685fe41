//! Filters that can be applied to inline image data.

use std::io::{Cursor, Read};

use log::warn;
use zune_jpeg::JpegDecoder;
use zune_jpeg::zune_core::colorspace::ColorSpace as JpegColorSpace;
use zune_jpeg::zune_core::options::DecoderOptions;

use crate::hex::decode_hex_digit;
use crate::image::ColorSpace;
use crate::reader::Reader;
use crate::trivia::is_white_space_character;

pub(crate) fn ascii_hex(data: &[u8]) -> Option<Vec<u8>> {
    let mut digits = Vec::with_capacity(data.len());

    // The `>` end marker is optional.
    for &b in data.iter().take_while(|b| **b != b'>') {
        match decode_hex_digit(b) {
            Some(d) => digits.push(d),
            None if is_white_space_character(b) => {}
            None => return None,
        }
    }

    Some(
        digits
            .chunks(2)
            .map(|pair| pair[0] << 4 | pair.get(1).copied().unwrap_or(0))
            .collect(),
    )
}

pub(crate) fn ascii_85(data: &[u8]) -> Option<Vec<u8>> {
    let mut decoded = vec![];
    let mut group = [0_u8; 5];
    let mut len = 0;

    let symbols = data
        .iter()
        .copied()
        .filter(|b| !is_white_space_character(*b))
        .take_while(|b| *b != b'~');

    for symbol in symbols {
        match symbol {
            b'z' if len == 0 => decoded.extend_from_slice(&[0; 4]),
            b'!'..=b'u' => {
                group[len] = symbol - b'!';
                len += 1;

                if len == 5 {
                    decoded.extend_from_slice(&word_85(group)?);
                    len = 0;
                }
            }
            _ => return None,
        }
    }

    // A partial group is padded with the highest digit.
    if len > 0 {
        if len == 1 {
            return None;
        }

        group[len..].fill(b'u' - b'!');
        decoded.extend_from_slice(&word_85(group)?[..len - 1]);
    }

    Some(decoded)
}

fn word_85(group: [u8; 5]) -> Option<[u8; 4]> {
    let value = group
        .iter()
        .fold(0_u64, |acc, digit| acc * 85 + u64::from(*digit));

    // 85^5 > 256^4, so the group might not fit.
    u32::try_from(value).ok().map(u32::to_be_bytes)
}

pub(crate) fn run_length(data: &[u8]) -> Option<Vec<u8>> {
    let mut r = Reader::new(data);
    let mut decoded = vec![];

    while let Some(length) = r.read_byte() {
        match length {
            128 => return Some(decoded),
            0..=127 => decoded.extend_from_slice(r.read_bytes(length as usize + 1)?),
            _ => {
                let byte = r.read_byte()?;
                decoded.extend(core::iter::repeat_n(byte, 257 - length as usize));
            }
        }
    }

    warn!("run-length data ended without end-of-data marker");

    Some(decoded)
}

/// Inflate zlib or raw deflate data, stopping after `limit` bytes of output.
pub(crate) fn flate(data: &[u8], limit: usize) -> Option<Vec<u8>> {
    let limit = limit as u64;

    let zlib = |data: &[u8]| {
        let mut out = vec![];
        flate2::read::ZlibDecoder::new(data)
            .take(limit)
            .read_to_end(&mut out)
            .ok()
            .map(|_| out)
    };

    let deflate = |data: &[u8]| {
        let mut out = vec![];
        flate2::read::DeflateDecoder::new(data)
            .take(limit)
            .read_to_end(&mut out)
            .ok()
            .map(|_| out)
    };

    zlib(data).or_else(|| deflate(data))
}

/// JPEG data decoded into 8-bit samples.
pub(crate) struct DecodedJpeg {
    pub(crate) samples: Vec<u8>,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) color_space: ColorSpace,
}

pub(crate) fn dct(data: &[u8]) -> Option<DecodedJpeg> {
    let options = DecoderOptions::default()
        .set_max_width(u16::MAX as usize)
        .set_max_height(u16::MAX as usize);

    let mut decoder = JpegDecoder::new_with_options(Cursor::new(data), options);
    decoder.decode_headers().ok()?;

    let (out, color_space) = match decoder.input_colorspace()? {
        JpegColorSpace::Luma | JpegColorSpace::LumaA => (JpegColorSpace::Luma, ColorSpace::Gray),
        JpegColorSpace::CMYK | JpegColorSpace::YCCK => (JpegColorSpace::CMYK, ColorSpace::Cmyk),
        _ => (JpegColorSpace::RGB, ColorSpace::Rgb),
    };

    decoder.set_options(options.jpeg_set_out_colorspace(out));
    let samples = decoder.decode().ok()?;
    let (width, height) = decoder.dimensions()?;

    Some(DecodedJpeg {
        samples,
        width: width as u32,
        height: height as u32,
        color_space,
    })
}
