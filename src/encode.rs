//! Image encoders: a self-contained 24-bit bitmap and a
//! headerless packed RGB565 buffer.
//!
//! Both normalize each pixel against the configured display
//! range and map it through the chosen [`ColorMap`]. Neither
//! branches on pixel validity; conditioning upstream already
//! guarantees finite values.

use std::io::Cursor;

use byteordered::ByteOrdered;
use itertools::iproduct;

use crate::{
    color::ColorMap,
    errors::PipelineError,
    frame::{TemperatureField, SENSOR_COLS, SENSOR_ROWS},
    stats::DisplayRange,
};

const BMP_HEADER_BYTES: usize = 54;
/// 72 DPI in pixels per meter, both axes.
const BMP_PPM: u32 = 2835;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 24-bit bottom-up BGR bitmap with file + info headers.
    Bmp24,
    /// Big-endian packed 5-6-5, row major, no header.
    Packed16,
}

impl PixelFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            PixelFormat::Bmp24 => "image/bmp",
            PixelFormat::Packed16 => "application/octet-stream",
        }
    }
}

/// One rendered frame, ready to serve. Ownership moves into
/// the published-frame holder; consumers only ever share it.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
}

impl EncodedImage {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Byte length the declared format and dimensions imply.
    pub fn expected_len(&self) -> usize {
        match self.format {
            PixelFormat::Bmp24 => {
                BMP_HEADER_BYTES + padded_row_size(self.width) * self.height as usize
            }
            PixelFormat::Packed16 => self.width as usize * self.height as usize * 2,
        }
    }
}

fn padded_row_size(width: u32) -> usize {
    ((width as usize * 3 + 3) / 4) * 4
}

/// Bitmap encoder with nearest-neighbor block upscaling: each
/// source pixel becomes a scale x scale solid block.
pub struct BmpEncoder {
    scale: u32,
    map: ColorMap,
}

impl BmpEncoder {
    pub fn new(scale: u32, map: ColorMap) -> Self {
        BmpEncoder {
            scale: scale.max(1),
            map,
        }
    }

    pub fn encode(
        &self,
        field: &TemperatureField,
        range: &DisplayRange,
    ) -> Result<EncodedImage, PipelineError> {
        let scale = self.scale as usize;
        let width = SENSOR_COLS * scale;
        let height = SENSOR_ROWS * scale;
        let row_size = padded_row_size(width as u32);
        let pixel_data_size = row_size * height;
        let file_size = BMP_HEADER_BYTES + pixel_data_size;

        // All header integers are little-endian. Height is
        // written positive: rows run bottom-up.
        let mut header = ByteOrdered::le(Cursor::new(Vec::with_capacity(file_size)));
        header.write_u8(b'B')?;
        header.write_u8(b'M')?;
        header.write_u32(file_size as u32)?;
        header.write_u16(0)?; // reserved
        header.write_u16(0)?; // reserved
        header.write_u32(BMP_HEADER_BYTES as u32)?; // pixel data offset

        header.write_u32(40)?; // info header size
        header.write_u32(width as u32)?;
        header.write_u32(height as u32)?;
        header.write_u16(1)?; // planes
        header.write_u16(24)?; // bits per pixel
        header.write_u32(0)?; // no compression
        header.write_u32(pixel_data_size as u32)?;
        header.write_u32(BMP_PPM)?;
        header.write_u32(BMP_PPM)?;
        header.write_u32(0)?; // palette colors
        header.write_u32(0)?; // important colors

        let mut data = header.into_inner().into_inner();
        // Row padding stays zero.
        data.resize(file_size, 0);

        for (y, x) in iproduct!(0..SENSOR_ROWS, 0..SENSOR_COLS) {
            let value = range.normalize(field.get(y, x));
            let rgb = self.map.rgb(value);

            for (sy, sx) in iproduct!(0..scale, 0..scale) {
                let bmp_y = (height - 1) - (y * scale + sy);
                let bmp_x = x * scale + sx;
                let offset = BMP_HEADER_BYTES + bmp_y * row_size + bmp_x * 3;
                data[offset] = rgb.b;
                data[offset + 1] = rgb.g;
                data[offset + 2] = rgb.r;
            }
        }

        Ok(EncodedImage {
            bytes: data,
            width: width as u32,
            height: height as u32,
            format: PixelFormat::Bmp24,
        })
    }
}

/// Native-resolution packed 5-6-5 buffer, one big-endian word
/// per pixel, intended for streaming rather than file storage.
pub struct Packed16Encoder {
    map: ColorMap,
}

impl Packed16Encoder {
    pub fn new(map: ColorMap) -> Self {
        Packed16Encoder { map }
    }

    pub fn encode(
        &self,
        field: &TemperatureField,
        range: &DisplayRange,
    ) -> Result<EncodedImage, PipelineError> {
        let mut out = ByteOrdered::be(Cursor::new(Vec::with_capacity(
            SENSOR_COLS * SENSOR_ROWS * 2,
        )));
        for (y, x) in iproduct!(0..SENSOR_ROWS, 0..SENSOR_COLS) {
            let value = range.normalize(field.get(y, x));
            out.write_u16(self.map.rgb565(value))?;
        }

        Ok(EncodedImage {
            bytes: out.into_inner().into_inner(),
            width: SENSOR_COLS as u32,
            height: SENSOR_ROWS as u32,
            format: PixelFormat::Packed16,
        })
    }
}

/// Encoder strategy, chosen once per deployment.
pub enum ImageEncoder {
    Bmp(BmpEncoder),
    Packed16(Packed16Encoder),
}

impl ImageEncoder {
    pub fn encode(
        &self,
        field: &TemperatureField,
        range: &DisplayRange,
    ) -> Result<EncodedImage, PipelineError> {
        match self {
            ImageEncoder::Bmp(enc) => enc.encode(field, range),
            ImageEncoder::Packed16(enc) => enc.encode(field, range),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::PIXEL_COUNT;

    fn uniform(value: f32) -> TemperatureField {
        TemperatureField::from_values(vec![value; PIXEL_COUNT])
    }

    fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    }

    fn read_u16_le(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    #[test]
    fn bmp_at_scale_ten_is_byte_exact() {
        let encoder = BmpEncoder::new(10, ColorMap::Ironbow);
        let range = DisplayRange::new(0.0, 100.0);
        let image = encoder.encode(&uniform(50.0), &range).unwrap();

        assert_eq!(image.bytes().len(), 230_454);
        assert_eq!(image.expected_len(), 230_454);
        assert_eq!(image.width(), 320);
        assert_eq!(image.height(), 240);

        let bytes = image.bytes();
        assert_eq!(&bytes[0..2], b"BM");
        assert_eq!(read_u32_le(bytes, 2), 230_454);
        assert_eq!(read_u32_le(bytes, 10), 54);
        assert_eq!(read_u32_le(bytes, 14), 40);
        assert_eq!(read_u32_le(bytes, 18), 320);
        assert_eq!(read_u32_le(bytes, 22), 240);
        assert_eq!(read_u16_le(bytes, 26), 1);
        assert_eq!(read_u16_le(bytes, 28), 24);
        assert_eq!(read_u32_le(bytes, 30), 0);
        assert_eq!(read_u32_le(bytes, 34), 230_400);
    }

    #[test]
    fn uniform_field_renders_the_scale_endpoints() {
        let range = DisplayRange::new(10.0, 40.0);
        let encoder = BmpEncoder::new(2, ColorMap::Ironbow);

        let cold = encoder.encode(&uniform(10.0), &range).unwrap();
        let expected = ColorMap::Ironbow.rgb(0.0);
        for px in cold.bytes()[54..].chunks(3) {
            assert_eq!((px[0], px[1], px[2]), (expected.b, expected.g, expected.r));
        }

        let hot = encoder.encode(&uniform(40.0), &range).unwrap();
        let expected = ColorMap::Ironbow.rgb(1.0);
        for px in hot.bytes()[54..].chunks(3) {
            assert_eq!((px[0], px[1], px[2]), (expected.b, expected.g, expected.r));
        }
    }

    #[test]
    fn bmp_rows_are_bottom_up() {
        // Hot top-left source pixel lands in the last row of
        // the file's pixel data.
        let range = DisplayRange::new(0.0, 100.0);
        let mut values = vec![0.0f32; PIXEL_COUNT];
        values[0] = 100.0;
        let field = TemperatureField::from_values(values);

        let encoder = BmpEncoder::new(1, ColorMap::Ironbow);
        let image = encoder.encode(&field, &range).unwrap();
        let row_size = ((32 * 3 + 3) / 4) * 4;
        let hot = ColorMap::Ironbow.rgb(1.0);

        let last_row_start = 54 + (24 - 1) * row_size;
        let px = &image.bytes()[last_row_start..last_row_start + 3];
        assert_eq!((px[0], px[1], px[2]), (hot.b, hot.g, hot.r));

        let cold = ColorMap::Ironbow.rgb(0.0);
        let first_row = &image.bytes()[54..57];
        assert_eq!((first_row[0], first_row[1], first_row[2]), (cold.b, cold.g, cold.r));
    }

    #[test]
    fn packed16_is_big_endian_row_major() {
        let range = DisplayRange::new(0.0, 100.0);
        let encoder = Packed16Encoder::new(ColorMap::Lookup);
        let image = encoder.encode(&uniform(100.0), &range).unwrap();

        assert_eq!(image.bytes().len(), 32 * 24 * 2);
        assert_eq!(image.format(), PixelFormat::Packed16);
        assert_eq!(image.format().content_type(), "application/octet-stream");

        let expected = ColorMap::Lookup.rgb565(1.0);
        for px in image.bytes().chunks(2) {
            assert_eq!(u16::from_be_bytes([px[0], px[1]]), expected);
        }
    }

    #[test]
    fn sentinel_pixels_encode_like_any_other_value() {
        // The sentinel equals the display high bound; encoders
        // must not treat it specially.
        let range = DisplayRange::new(0.0, 100.0);
        let mut values = vec![50.0f32; PIXEL_COUNT];
        values[7] = 100.0; // sentinel-for-invalid upstream
        let field = TemperatureField::from_values(values);

        let encoder = Packed16Encoder::new(ColorMap::Ironbow);
        let image = encoder.encode(&field, &range).unwrap();
        let px = &image.bytes()[14..16];
        assert_eq!(
            u16::from_be_bytes([px[0], px[1]]),
            ColorMap::Ironbow.rgb565(1.0)
        );
    }
}
