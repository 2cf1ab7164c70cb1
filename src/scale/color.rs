//! Color values and ramps.

use std::{fmt, str::FromStr};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Simple RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `#rgb` (the leading `#` is optional).
    pub fn from_hex(text: &str) -> Result<Self> {
        let digits = text.trim().trim_start_matches('#');
        let expanded: String = match digits.len() {
            6 => digits.to_string(),
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            _ => bail!("[scale::color] expected #rrggbb or #rgb, got {text:?}"),
        };
        let bytes = hex::decode(&expanded)
            .with_context(|| format!("[scale::color] invalid hex color {text:?}"))?;
        Ok(Self { r: bytes[0], g: bytes[1], b: bytes[2] })
    }

    /// Linear interpolation between two colors, `t` clamped to [0, 1].
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let mix = |a: u8, b: u8| -> u8 {
            (a as f64 + (b as f64 - a as f64) * t)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Rgb { r: mix(self.r, other.r), g: mix(self.g, other.g), b: mix(self.b, other.b) }
    }
}

impl fmt::Display for Rgb {
    /// Format as CSS hex: #rrggbb
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", hex::encode([self.r, self.g, self.b]))
    }
}

impl FromStr for Rgb {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

/// Neutral gray for parties without a configured color and precincts without a winner.
pub const NEUTRAL_GRAY: Rgb = Rgb::new(0xcc, 0xcc, 0xcc);

/// Fill for precincts whose legislative district has no configured color.
pub const DISTRICT_GRAY: Rgb = Rgb::new(0x99, 0x99, 0x99);

/// Fill for precincts left out of a categorical view.
pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);

/// Default outline.
pub const STROKE: Rgb = Rgb::new(0x66, 0x66, 0x66);

/// Outline of hovered precincts.
pub const STROKE_HOVER: Rgb = Rgb::new(0x33, 0x33, 0x33);

/// Nine-class sequential blues, light to dark.
const BLUES: [Rgb; 9] = [
    Rgb::new(0xf7, 0xfb, 0xff),
    Rgb::new(0xde, 0xeb, 0xf7),
    Rgb::new(0xc6, 0xdb, 0xef),
    Rgb::new(0x9e, 0xca, 0xe1),
    Rgb::new(0x6b, 0xae, 0xd6),
    Rgb::new(0x42, 0x92, 0xc6),
    Rgb::new(0x21, 0x71, 0xb5),
    Rgb::new(0x08, 0x51, 0x9c),
    Rgb::new(0x08, 0x30, 0x6b),
];

/// Sequential blue ramp for `t` in [0, 1]; NaN maps to the light end.
pub fn interpolate_blues(t: f64) -> Rgb {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let segments = (BLUES.len() - 1) as f64;
    let pos = t * segments;
    let i = (pos.floor() as usize).min(BLUES.len() - 2);
    BLUES[i].lerp(BLUES[i + 1], pos - i as f64)
}
