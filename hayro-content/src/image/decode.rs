use crate::image::filter;
use crate::image::{ColorSpace, DecodeError, Filter, ImageParams, InlineImagePreview};

/// Images with more pixels than this are not previewed.
const MAX_PIXELS: u64 = 1 << 24;

pub(crate) fn decode(data: &[u8], params: &ImageParams) -> Result<InlineImagePreview, DecodeError> {
    // JPEG data may bring up to 4 components of its own.
    let components = match params.color_space {
        None if params.filters.last() == Some(&Filter::Dct) => 4,
        cs => cs.map_or(1, ColorSpace::num_components),
    };
    let expected = data_len(params.width, params.height, components, params.bits_per_component)?;

    let mut data = data.to_vec();

    for (i, f) in params.filters.iter().enumerate() {
        let last = i + 1 == params.filters.len();

        data = match f {
            Filter::AsciiHex => filter::ascii_hex(&data),
            Filter::Ascii85 => filter::ascii_85(&data),
            Filter::RunLength => filter::run_length(&data),
            // Data that still goes through other filters may be larger.
            Filter::Flate => filter::flate(&data, if last { expected } else { expected * 4 }),
            Filter::Dct => {
                // JPEG data contains the pixels themselves, nothing can follow.
                if !last {
                    return Err(DecodeError::UnsupportedFilter("DCTDecode".to_string()));
                }

                let jpeg = filter::dct(&data).ok_or(DecodeError::CorruptData)?;
                let color_space = params.color_space.unwrap_or(jpeg.color_space);

                return to_rgba(
                    &jpeg.samples,
                    jpeg.width,
                    jpeg.height,
                    8,
                    Some(color_space),
                    false,
                );
            }
        }
        .ok_or(DecodeError::CorruptData)?;
    }

    to_rgba(
        &data,
        params.width,
        params.height,
        params.bits_per_component,
        params.color_space,
        params.invert_mask,
    )
}

/// The number of bytes of samples an image needs. Rows start at byte
/// boundaries.
fn data_len(
    width: u32,
    height: u32,
    components: usize,
    bits_per_component: u8,
) -> Result<usize, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::CorruptData);
    }

    if u64::from(width) * u64::from(height) > MAX_PIXELS {
        return Err(DecodeError::TooLarge { width, height });
    }

    // The pixel count is bounded, so none of this can overflow.
    let row_bits = width as usize * components * usize::from(bits_per_component);
    Ok(row_bits.div_ceil(8) * height as usize)
}

fn to_rgba(
    data: &[u8],
    width: u32,
    height: u32,
    bits_per_component: u8,
    color_space: Option<ColorSpace>,
    invert_mask: bool,
) -> Result<InlineImagePreview, DecodeError> {
    let components = color_space.map_or(1, ColorSpace::num_components);
    let bpc = usize::from(bits_per_component);

    let expected = data_len(width, height, components, bits_per_component)?;
    let row_len = expected / height as usize;

    if data.len() < expected {
        return Err(DecodeError::NotEnoughData {
            expected,
            found: data.len(),
        });
    }

    let max = (1_u16 << bpc) - 1;
    let scale = |v: u16| (u32::from(v) * 255 / u32::from(max)) as u8;

    let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
    let mut pixel = [0_u8; 4];

    for row in data[..expected].chunks_exact(row_len) {
        let mut samples = Samples::new(row, bits_per_component);

        for _ in 0..width {
            for c in pixel.iter_mut().take(components) {
                *c = scale(samples.next().unwrap_or_default());
            }

            let [r, g, b, a] = match color_space {
                Some(ColorSpace::Gray) => [pixel[0], pixel[0], pixel[0], 255],
                Some(ColorSpace::Rgb) => [pixel[0], pixel[1], pixel[2], 255],
                Some(ColorSpace::Cmyk) => {
                    let k = u16::from(pixel[3]);
                    let channel = |c: u8| 255 - (u16::from(c) + k).min(255) as u8;
                    [channel(pixel[0]), channel(pixel[1]), channel(pixel[2]), 255]
                }
                // Image masks paint samples of 0 black and leave the rest
                // transparent, unless inverted by the decode array.
                None => {
                    let painted = (pixel[0] == 0) != invert_mask;
                    [0, 0, 0, if painted { 255 } else { 0 }]
                }
            };

            rgba.extend_from_slice(&[r, g, b, a]);
        }
    }

    InlineImagePreview::new(width, height, rgba).ok_or(DecodeError::CorruptData)
}

/// An iterator over the samples of a row of image data.
struct Samples<'a> {
    data: &'a [u8],
    bits_per_component: u8,
    bit_pos: usize,
}

impl<'a> Samples<'a> {
    fn new(data: &'a [u8], bits_per_component: u8) -> Self {
        Self {
            data,
            bits_per_component,
            bit_pos: 0,
        }
    }
}

impl Iterator for Samples<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<Self::Item> {
        let byte = *self.data.get(self.bit_pos / 8)?;

        let value = if self.bits_per_component == 8 {
            u16::from(byte)
        } else {
            let shift = 8 - self.bits_per_component as usize - self.bit_pos % 8;
            let mask = (1_u8 << self.bits_per_component) - 1;
            u16::from((byte >> shift) & mask)
        };

        self.bit_pos += self.bits_per_component as usize;

        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(width: u32, height: u32, bpc: u8, color_space: Option<ColorSpace>) -> ImageParams {
        ImageParams {
            width,
            height,
            bits_per_component: bpc,
            color_space,
            filters: vec![],
            invert_mask: false,
        }
    }

    #[test]
    fn gray_8() {
        let preview = decode(&[0, 255], &params(2, 1, 8, Some(ColorSpace::Gray))).unwrap();
        assert_eq!(preview.pixels(), &[0, 0, 0, 255, 255, 255, 255, 255]);
    }

    #[test]
    fn rgb_with_hex_filter() {
        let mut p = params(1, 1, 8, Some(ColorSpace::Rgb));
        p.filters = vec![Filter::AsciiHex];

        let preview = decode(b"ff8000>", &p).unwrap();
        assert_eq!(preview.pixels(), &[255, 128, 0, 255]);
    }

    #[test]
    fn gray_1_rows_are_padded() {
        // Two rows of 3 pixels each, every row padded to a full byte.
        let preview = decode(&[0b1010_0000, 0b0100_0000], &params(3, 2, 1, Some(ColorSpace::Gray)))
            .unwrap();
        let gray = preview.pixels().chunks(4).map(|p| p[0]).collect::<Vec<_>>();
        assert_eq!(gray, vec![255, 0, 255, 0, 255, 0]);
    }

    #[test]
    fn gray_4() {
        let preview = decode(&[0xf0], &params(2, 1, 4, Some(ColorSpace::Gray))).unwrap();
        assert_eq!(preview.pixels(), &[255, 255, 255, 255, 0, 0, 0, 255]);
    }

    #[test]
    fn cmyk() {
        let preview = decode(&[0, 0, 0, 255], &params(1, 1, 8, Some(ColorSpace::Cmyk))).unwrap();
        assert_eq!(preview.pixels(), &[0, 0, 0, 255]);
    }

    #[test]
    fn image_mask() {
        let preview = decode(&[0b0100_0000], &params(2, 1, 1, None)).unwrap();
        assert_eq!(preview.pixels(), &[0, 0, 0, 255, 0, 0, 0, 0]);
    }

    #[test]
    fn too_short() {
        assert_eq!(
            decode(&[0; 5], &params(2, 1, 8, Some(ColorSpace::Rgb))),
            Err(DecodeError::NotEnoughData {
                expected: 6,
                found: 5
            })
        );
    }

    #[test]
    fn huge_dimensions() {
        let p = params(u32::MAX / 2 + 1, u32::MAX / 2 + 1, 8, Some(ColorSpace::Cmyk));
        assert_eq!(
            decode(b"x", &p),
            Err(DecodeError::TooLarge {
                width: 2_147_483_648,
                height: 2_147_483_648
            })
        );

        let p = params(1 << 13, 1 << 12, 1, Some(ColorSpace::Gray));
        assert!(matches!(decode(b"x", &p), Err(DecodeError::TooLarge { .. })));
    }

    #[test]
    fn flate_output_is_capped() {
        use flate2::Compression;
        use flate2::write::ZlibEncoder;
        use std::io::Write;

        let mut encoder = ZlibEncoder::new(vec![], Compression::best());
        encoder.write_all(&[0; 1 << 20]).unwrap();
        let compressed = encoder.finish().unwrap();

        let mut p = params(2, 2, 8, Some(ColorSpace::Gray));
        p.filters = vec![Filter::Flate];

        let preview = decode(&compressed, &p).unwrap();
        assert_eq!(preview.pixels(), [0_u8, 0, 0, 255].repeat(4).as_slice());
    }

    #[test]
    fn corrupt_filter_data() {
        let mut p = params(1, 1, 8, Some(ColorSpace::Gray));
        p.filters = vec![Filter::Flate];
        assert_eq!(decode(b"garbage", &p), Err(DecodeError::CorruptData));
    }
}
