//! Temperature-to-color mapping.
//!
//! Two interchangeable strategies, both producing the usual
//! ironbow look (dark blue through cyan, green, orange, red to
//! white-orange as the normalized value rises): a procedural
//! five-band gradient and a fixed 256-entry RGB565 lookup
//! table. Inputs outside [0, 1] are clamped silently.

use serde_derive::*;

/// 8-bit-per-channel color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

/// Expand a packed 5-6-5 color to 8-bit channels.
///
/// `(c5 * 527 + 23) >> 6` approximates `c5 * 255 / 31` without
/// a divide; likewise `(c6 * 259 + 33) >> 6` for the 6-bit
/// green channel.
pub fn rgb565_to_rgb888(color: u16) -> Rgb {
    let r5 = (color >> 11) & 0x1F;
    let g6 = (color >> 5) & 0x3F;
    let b5 = color & 0x1F;
    Rgb {
        r: ((r5 * 527 + 23) >> 6) as u8,
        g: ((g6 * 259 + 33) >> 6) as u8,
        b: ((b5 * 527 + 23) >> 6) as u8,
    }
}

/// Pack 8-bit channels into 5-6-5 by truncation.
pub fn rgb888_to_rgb565(rgb: Rgb) -> u16 {
    ((rgb.r as u16 >> 3) << 11) | ((rgb.g as u16 >> 2) << 5) | (rgb.b as u16 >> 3)
}

/// Color-mapping strategy. Either variant may feed either
/// encoder; the conversions above bridge the representations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMap {
    /// Procedural five-band gradient.
    Ironbow,
    /// Fixed 256-entry RGB565 palette.
    Lookup,
}

impl ColorMap {
    /// Map a normalized value (clamped to [0, 1]) to 8-bit RGB.
    pub fn rgb(&self, value: f32) -> Rgb {
        match self {
            ColorMap::Ironbow => ironbow(value),
            ColorMap::Lookup => rgb565_to_rgb888(lookup(value)),
        }
    }

    /// Map a normalized value (clamped to [0, 1]) to packed
    /// 5-6-5.
    pub fn rgb565(&self, value: f32) -> u16 {
        match self {
            ColorMap::Ironbow => rgb888_to_rgb565(ironbow(value)),
            ColorMap::Lookup => lookup(value),
        }
    }
}

/// Five equal bands over [0, 1], linear within each band.
fn ironbow(value: f32) -> Rgb {
    let v = value.max(0.0).min(1.0);
    if v < 0.2 {
        let t = v * 5.0;
        Rgb::new(0, 0, (100.0 + t * 155.0) as u8)
    } else if v < 0.4 {
        let t = (v - 0.2) * 5.0;
        Rgb::new(0, (t * 255.0) as u8, 255)
    } else if v < 0.6 {
        let t = (v - 0.4) * 5.0;
        Rgb::new(0, 255, ((1.0 - t) * 255.0) as u8)
    } else if v < 0.8 {
        let t = (v - 0.6) * 5.0;
        Rgb::new((t * 255.0) as u8, 255, 0)
    } else {
        let t = (v - 0.8) * 5.0;
        Rgb::new(255, (255.0 - t * 100.0) as u8, (t * 200.0) as u8)
    }
}

/// Table entry at `floor(value * 255)`, clamped to [0, 255].
fn lookup(value: f32) -> u16 {
    let v = value.max(0.0).min(1.0);
    let index = ((v * 255.0) as usize).min(255);
    CAM_COLORS[index]
}

/// 256-entry ironbow palette, packed 5-6-5.
const CAM_COLORS: [u16; 256] = [
    0x480F, 0x400F, 0x400F, 0x400F, 0x4010, 0x3810, 0x3810, 0x3810, 0x3810, 0x3010, 0x3010,
    0x3010, 0x2810, 0x2810, 0x2810, 0x2810, 0x2010, 0x2010, 0x2010, 0x1810, 0x1810, 0x1811,
    0x1811, 0x1011, 0x1011, 0x1011, 0x0811, 0x0811, 0x0811, 0x0011, 0x0011, 0x0011, 0x0011,
    0x0011, 0x0031, 0x0031, 0x0051, 0x0072, 0x0072, 0x0092, 0x00B2, 0x00B2, 0x00D2, 0x00F2,
    0x00F2, 0x0112, 0x0132, 0x0152, 0x0152, 0x0172, 0x0192, 0x0192, 0x01B2, 0x01D2, 0x01F3,
    0x01F3, 0x0213, 0x0233, 0x0253, 0x0253, 0x0273, 0x0293, 0x02B3, 0x02D3, 0x02D3, 0x02F3,
    0x0313, 0x0333, 0x0333, 0x0353, 0x0373, 0x0394, 0x03B4, 0x03D4, 0x03D4, 0x03F4, 0x0414,
    0x0434, 0x0454, 0x0474, 0x0474, 0x0494, 0x04B4, 0x04D4, 0x04F4, 0x0514, 0x0534, 0x0534,
    0x0554, 0x0554, 0x0574, 0x0574, 0x0573, 0x0573, 0x0573, 0x0572, 0x0572, 0x0572, 0x0571,
    0x0591, 0x0591, 0x0590, 0x0590, 0x058F, 0x058F, 0x058F, 0x058E, 0x05AE, 0x05AE, 0x05AD,
    0x05AD, 0x05AD, 0x05AC, 0x05AC, 0x05AB, 0x05CB, 0x05CB, 0x05CA, 0x05CA, 0x05CA, 0x05C9,
    0x05C9, 0x05C8, 0x05E8, 0x05E8, 0x05E7, 0x05E7, 0x05E6, 0x05E6, 0x05E6, 0x05E5, 0x05E5,
    0x0604, 0x0604, 0x0604, 0x0603, 0x0603, 0x0602, 0x0602, 0x0601, 0x0621, 0x0621, 0x0620,
    0x0620, 0x0620, 0x0620, 0x0E20, 0x0E20, 0x0E40, 0x1640, 0x1640, 0x1E40, 0x1E40, 0x2640,
    0x2640, 0x2E40, 0x2E60, 0x3660, 0x3660, 0x3E60, 0x3E60, 0x3E60, 0x4660, 0x4660, 0x4E60,
    0x4E80, 0x5680, 0x5680, 0x5E80, 0x5E80, 0x6680, 0x6680, 0x6E80, 0x6EA0, 0x76A0, 0x76A0,
    0x7EA0, 0x7EA0, 0x86A0, 0x86A0, 0x8EA0, 0x8EC0, 0x96C0, 0x96C0, 0x9EC0, 0x9EC0, 0xA6C0,
    0xAEC0, 0xAEC0, 0xB6E0, 0xB6E0, 0xBEE0, 0xBEE0, 0xC6E0, 0xC6E0, 0xCEE0, 0xCEE0, 0xD6E0,
    0xD700, 0xDF00, 0xDEE0, 0xDEC0, 0xDEA0, 0xDE80, 0xDE80, 0xE660, 0xE640, 0xE620, 0xE600,
    0xE5E0, 0xE5C0, 0xE5A0, 0xE580, 0xE560, 0xE540, 0xE520, 0xE500, 0xE4E0, 0xE4C0, 0xE4A0,
    0xE480, 0xE460, 0xEC40, 0xEC20, 0xEC00, 0xEBE0, 0xEBC0, 0xEBA0, 0xEB80, 0xEB60, 0xEB40,
    0xEB20, 0xEB00, 0xEAE0, 0xEAC0, 0xEAA0, 0xEA80, 0xEA60, 0xEA40, 0xF220, 0xF200, 0xF1E0,
    0xF1C0, 0xF1A0, 0xF180, 0xF160, 0xF140, 0xF100, 0xF0E0, 0xF0C0, 0xF0A0, 0xF080, 0xF060,
    0xF040, 0xF020, 0xF800,
];
