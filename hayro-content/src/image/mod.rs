//! Previews of inline images.
//!
//! Inline images are never re-encoded: their data is always written back as it
//! was read. Decoding only happens to give the user an idea of what the image
//! shows, and the decoded pixels can be exported, but never edited.

#![cfg_attr(not(feature = "images"), allow(dead_code))]

use core::fmt;

use crate::content::InlineImage;
use crate::object::{Dict, Object};

#[cfg(feature = "images")]
mod decode;
#[cfg(feature = "images")]
mod filter;

/// A decoder that turns inline images into previews.
pub trait ImageDecoder {
    /// Decode the given inline image.
    fn decode(&self, image: &InlineImage<'_>) -> Result<InlineImagePreview, DecodeError>;
}

/// The decoder used by default.
///
/// It supports the `ASCIIHexDecode`, `ASCII85Decode`, `RunLengthDecode`,
/// `FlateDecode` (without predictors) and `DCTDecode` filters, device colour
/// spaces and image masks with 1, 2, 4 or 8 bits per component.
///
/// Without the `images` feature, every image fails to decode.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultDecoder;

impl ImageDecoder for DefaultDecoder {
    #[cfg(feature = "images")]
    fn decode(&self, image: &InlineImage<'_>) -> Result<InlineImagePreview, DecodeError> {
        let params = ImageParams::from_dict(image.dict())?;
        decode::decode(image.data(), &params)
    }

    #[cfg(not(feature = "images"))]
    fn decode(&self, _: &InlineImage<'_>) -> Result<InlineImagePreview, DecodeError> {
        Err(DecodeError::Disabled)
    }
}

/// The decoded pixels of an inline image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImagePreview {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl InlineImagePreview {
    /// Create a new preview from RGBA8 pixels.
    ///
    /// Returns `None` if the number of pixels doesn't match the dimensions.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;

        (rgba.len() == expected).then_some(Self {
            width,
            height,
            rgba,
        })
    }

    /// The width of the image in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The height of the image in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The pixels of the image, as non-premultiplied RGBA8.
    pub fn pixels(&self) -> &[u8] {
        &self.rgba
    }

    /// Encode the preview as a PNG file.
    #[cfg(feature = "images")]
    pub fn to_png(&self) -> Option<Vec<u8>> {
        use image::{DynamicImage, ImageFormat, RgbaImage};
        use std::io::Cursor;

        let image = RgbaImage::from_raw(self.width, self.height, self.rgba.clone())?;

        let mut png = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .ok()?;

        Some(png)
    }
}

/// An error that occurred while decoding an inline image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A required entry of the image dictionary is missing.
    MissingEntry(&'static str),
    /// An entry of the image dictionary has an invalid value.
    InvalidEntry(&'static str),
    /// The image uses a filter that is not supported.
    UnsupportedFilter(String),
    /// The image uses a colour space that is not supported.
    UnsupportedColorSpace(String),
    /// The image uses an unsupported number of bits per component.
    UnsupportedBitsPerComponent(u32),
    /// The image uses a predictor, which is not supported.
    UnsupportedPredictor(u32),
    /// The image data could not be decoded.
    CorruptData,
    /// The image data is too short for the dimensions of the image.
    NotEnoughData {
        /// The number of bytes needed.
        expected: usize,
        /// The number of bytes available.
        found: usize,
    },
    /// The image has too many pixels to be previewed.
    TooLarge {
        /// The width of the image.
        width: u32,
        /// The height of the image.
        height: u32,
    },
    /// Support for decoding images was not compiled in.
    Disabled,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEntry(key) => write!(f, "missing /{key} entry"),
            Self::InvalidEntry(key) => write!(f, "invalid /{key} entry"),
            Self::UnsupportedFilter(name) => write!(f, "unsupported filter /{name}"),
            Self::UnsupportedColorSpace(name) => write!(f, "unsupported colour space {name}"),
            Self::UnsupportedBitsPerComponent(bpc) => {
                write!(f, "unsupported number of bits per component: {bpc}")
            }
            Self::UnsupportedPredictor(p) => write!(f, "unsupported predictor {p}"),
            Self::CorruptData => f.write_str("corrupt image data"),
            Self::NotEnoughData { expected, found } => {
                write!(f, "expected {expected} bytes of image data, found {found}")
            }
            Self::TooLarge { width, height } => {
                write!(f, "image of {width}x{height} pixels is too large")
            }
            Self::Disabled => f.write_str("image decoding is disabled"),
        }
    }
}

impl core::error::Error for DecodeError {}

/// The colour space of an inline image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColorSpace {
    Gray,
    Rgb,
    Cmyk,
}

impl ColorSpace {
    pub(crate) fn num_components(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
            Self::Cmyk => 4,
        }
    }
}

/// A filter of an inline image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Filter {
    AsciiHex,
    Ascii85,
    RunLength,
    Flate,
    Dct,
}

impl Filter {
    fn from_name(name: &[u8]) -> Result<Self, DecodeError> {
        match name {
            b"AHx" | b"ASCIIHexDecode" => Ok(Self::AsciiHex),
            b"A85" | b"ASCII85Decode" => Ok(Self::Ascii85),
            b"RL" | b"RunLengthDecode" => Ok(Self::RunLength),
            b"Fl" | b"FlateDecode" => Ok(Self::Flate),
            b"DCT" | b"DCTDecode" => Ok(Self::Dct),
            _ => Err(DecodeError::UnsupportedFilter(
                String::from_utf8_lossy(name).into_owned(),
            )),
        }
    }
}

/// The entries of an inline image dictionary that matter for decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImageParams {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) bits_per_component: u8,
    /// `None` for image masks.
    pub(crate) color_space: Option<ColorSpace>,
    pub(crate) filters: Vec<Filter>,
    /// Whether the samples of an image mask are inverted by a `/D [1 0]` entry.
    pub(crate) invert_mask: bool,
}

impl ImageParams {
    pub(crate) fn from_dict(dict: &Dict<'_>) -> Result<Self, DecodeError> {
        let dimension = |keys: &[&[u8]], name: &'static str| match dict.get_any(keys) {
            Some(Object::Number(n)) => n
                .as_u32()
                .filter(|v| *v > 0)
                .ok_or(DecodeError::InvalidEntry(name)),
            Some(_) => Err(DecodeError::InvalidEntry(name)),
            None => Err(DecodeError::MissingEntry(name)),
        };

        let width = dimension(&[b"W", b"Width"], "Width")?;
        let height = dimension(&[b"H", b"Height"], "Height")?;

        let image_mask = matches!(
            dict.get_any(&[b"IM", b"ImageMask"]),
            Some(Object::Boolean(true))
        );

        let filters = match dict.get_any(&[b"F", b"Filter"]) {
            None => vec![],
            Some(Object::Name(n)) => vec![Filter::from_name(&n.decode())?],
            Some(Object::Array(a)) => a
                .items()
                .iter()
                .map(|i| match i.object() {
                    Object::Name(n) => Filter::from_name(&n.decode()),
                    _ => Err(DecodeError::InvalidEntry("Filter")),
                })
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(DecodeError::InvalidEntry("Filter")),
        };

        if let Some(predictor) = predictor(dict)
            && predictor > 1
        {
            return Err(DecodeError::UnsupportedPredictor(predictor));
        }

        let color_space = if image_mask {
            None
        } else {
            match dict.get_any(&[b"CS", b"ColorSpace"]) {
                Some(Object::Name(n)) => Some(match n.decode().as_slice() {
                    b"G" | b"DeviceGray" | b"CalGray" => ColorSpace::Gray,
                    b"RGB" | b"DeviceRGB" | b"CalRGB" => ColorSpace::Rgb,
                    b"CMYK" | b"DeviceCMYK" => ColorSpace::Cmyk,
                    other => {
                        return Err(DecodeError::UnsupportedColorSpace(format!(
                            "/{}",
                            String::from_utf8_lossy(other)
                        )));
                    }
                }),
                Some(Object::Array(_)) => {
                    return Err(DecodeError::UnsupportedColorSpace("array".to_string()));
                }
                Some(_) => return Err(DecodeError::InvalidEntry("ColorSpace")),
                // JPEG data knows its own colour space.
                None if filters.last() == Some(&Filter::Dct) => None,
                None => return Err(DecodeError::MissingEntry("ColorSpace")),
            }
        };

        let bits_per_component = match dict.get_any(&[b"BPC", b"BitsPerComponent"]) {
            Some(Object::Number(n)) => match n.as_u32() {
                Some(bpc @ (1 | 2 | 4 | 8)) => bpc as u8,
                Some(bpc) => return Err(DecodeError::UnsupportedBitsPerComponent(bpc)),
                None => return Err(DecodeError::InvalidEntry("BitsPerComponent")),
            },
            Some(_) => return Err(DecodeError::InvalidEntry("BitsPerComponent")),
            None if image_mask => 1,
            None if filters.last() == Some(&Filter::Dct) => 8,
            None => return Err(DecodeError::MissingEntry("BitsPerComponent")),
        };

        if image_mask && bits_per_component != 1 {
            return Err(DecodeError::UnsupportedBitsPerComponent(u32::from(
                bits_per_component,
            )));
        }

        let invert_mask = match dict.get_any(&[b"D", b"Decode"]) {
            Some(Object::Array(a)) => a
                .items()
                .first()
                .is_some_and(|i| matches!(i.object(), Object::Number(n) if n.as_f64() == 1.0)),
            _ => false,
        };

        Ok(Self {
            width,
            height,
            bits_per_component,
            color_space,
            filters,
            invert_mask,
        })
    }
}

fn predictor(dict: &Dict<'_>) -> Option<u32> {
    let predictor_of = |o: &Object<'_>| match o {
        Object::Dict(d) => match d.get(b"Predictor") {
            Some(Object::Number(n)) => n.as_u32(),
            _ => None,
        },
        _ => None,
    };

    match dict.get_any(&[b"DP", b"DecodeParms"])? {
        Object::Array(a) => a.items().iter().find_map(|i| predictor_of(i.object())),
        other => predictor_of(other),
    }
}
