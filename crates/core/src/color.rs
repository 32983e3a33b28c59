//! Layer color parsing
//!
//! Layers are styled from a `#rrggbb` hex encoding supplied by layer
//! configuration. Malformed input fails fast: a bad color is a
//! configuration bug, not a transient condition.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One RGBA color, channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
    /// Alpha channel
    pub a: f32,
}

impl Rgba {
    fn with_alpha(self, a: f32) -> Rgba {
        Rgba { a, ..self }
    }
}

/// Color variants derived from one base layer color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerColor {
    /// Opaque base color (annotation outline, label lane)
    pub base: Rgba,
    /// Hover highlight variant
    pub hover: Rgba,
    /// Translucent interval fill
    pub fill: Rgba,
}

const HOVER_ALPHA: f32 = 0.85;
const FILL_ALPHA: f32 = 0.2;

impl LayerColor {
    /// Parse a `#rrggbb` (or bare `rrggbb`) encoding into its variants.
    pub fn from_hex(input: &str) -> Result<Self> {
        let hex = input.strip_prefix('#').unwrap_or(input);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidColorInput(input.to_string()));
        }
        let channel = |s: &str| -> f32 {
            // validated above, cannot fail
            u8::from_str_radix(s, 16).unwrap_or(0) as f32 / 255.0
        };
        let base = Rgba {
            r: channel(&hex[0..2]),
            g: channel(&hex[2..4]),
            b: channel(&hex[4..6]),
            a: 1.0,
        };
        Ok(Self {
            base,
            hover: base.with_alpha(HOVER_ALPHA),
            fill: base.with_alpha(FILL_ALPHA),
        })
    }
}

impl fmt::Display for LayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}",
            (self.base.r * 255.0).round() as u8,
            (self.base.g * 255.0).round() as u8,
            (self.base.b * 255.0).round() as u8
        )
    }
}
