//! Colour parsing and colour-space conversion.
//!
//! Colours in the configuration are written the way a designer writes them:
//! sRGB hex strings. Shaders work in linear space and the surface is sRGB, so
//! every colour is converted once when it enters the GPU side.

use anyhow::{Context, bail};

/// A colour in linear RGB space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl LinearColor {
    pub const BLACK: LinearColor = LinearColor {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// Parse `#rgb` or `#rrggbb` (leading `#` optional) as sRGB and convert to linear.
    pub fn from_hex(hex: &str) -> anyhow::Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            len => bail!("colour '{}' has {} hex digits, expected 3 or 6", hex, len),
        };
        let channel = |i: usize| -> anyhow::Result<u8> {
            u8::from_str_radix(&expanded[i..i + 2], 16)
                .with_context(|| format!("colour '{}' is not valid hex", hex))
        };
        Ok(Self::from_srgb8(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn from_srgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: srgb_to_linear(r as f32 / 255.0),
            g: srgb_to_linear(g as f32 / 255.0),
            b: srgb_to_linear(b as f32 / 255.0),
        }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn with_alpha(self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }

    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: 1.0,
        }
    }
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
