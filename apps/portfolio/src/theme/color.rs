//! Color derivation — seed color → primary/secondary/accent/focus-ring palette.
//!
//! # Pipeline
//! sRGB → linear RGB → CIE XYZ (D65) → CIE Lab → (L, C, H) where
//! `C = |(a, b)| / 100` and `H = atan2(b, a)` in degrees.
//!
//! The values are labelled OKLCH because that is how the stylesheet consumes them,
//! but no OKLab matrices are applied: the damping constants below are tuned for the
//! Lab-derived numbers and are authoritative.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ThemeError;
use crate::theme::Seed;

// ────────────────────────────────────────────────────────────────────────────
// Constants
// ────────────────────────────────────────────────────────────────────────────

/// D65 reference white.
const WHITE_X: f64 = 0.95047;
const WHITE_Y: f64 = 1.0;
const WHITE_Z: f64 = 1.08883;

const LAB_EPSILON: f64 = 0.008856;
const LAB_KAPPA: f64 = 903.3;

const LIGHTNESS_DAMPING: f64 = 0.8;
const CHROMA_DAMPING: f64 = 0.3;
pub const MAX_CHROMA: f64 = 0.4;

/// Primary lightness is kept inside this band so text on it stays legible.
const PRIMARY_L_MIN: f64 = 0.4;
const PRIMARY_L_MAX: f64 = 0.7;
const PRIMARY_L_LIFT: f64 = 0.1;

const PRIMARY_C_BOOST: f64 = 0.10;
const SECONDARY_C_BOOST: f64 = 0.12;
const ACCENT_C_BOOST: f64 = 0.13;

const SECONDARY_L_DROP: f64 = 0.04;
const ACCENT_L_DROP: f64 = 0.07;

pub const SECONDARY_HUE_SHIFT: f64 = 20.0;
pub const ACCENT_HUE_SHIFT: f64 = -10.0;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// 24-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Rgb {
    type Err = ThemeError;

    /// Accepts `#RRGGBB`, `#RGB`, with or without a single leading `#`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ThemeError::InvalidHex(s.to_string());
        let trimmed = s.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());

        match hex.len() {
            6 => Ok(Rgb::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Ok(Rgb::new(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// A color as (lightness, chroma, hue).
/// L ∈ [0, 1], C ∈ [0, 0.4], H ∈ [0, 360).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oklch {
    pub l: f64,
    pub c: f64,
    pub h: f64,
}

impl fmt::Display for Oklch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "oklch({:.2} {:.2} {:.0})", self.l, self.c, self.h)
    }
}

/// Palette derived from a literal seed color. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedTheme {
    pub primary: Oklch,
    pub secondary: Oklch,
    pub accent: Oklch,
    pub ring: Oklch,
}

impl DerivedTheme {
    /// CSS custom properties overriding the preset palette, in application order.
    pub fn css_variables(&self) -> Vec<(&'static str, String)> {
        vec![
            ("--primary", self.primary.to_string()),
            ("--secondary", self.secondary.to_string()),
            ("--accent", self.accent.to_string()),
            ("--ring", self.ring.to_string()),
            ("--sidebar-primary", self.primary.to_string()),
            ("--sidebar-ring", self.ring.to_string()),
        ]
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Derivation
// ────────────────────────────────────────────────────────────────────────────

/// Derives the palette for a seed.
///
/// Presets return `None`: the caller selects the named stylesheet variant and
/// clears any literal overrides it applied earlier.
pub fn derive(seed: &Seed) -> Option<DerivedTheme> {
    match seed {
        Seed::Preset(_) => None,
        Seed::Literal(rgb) => Some(derive_from_rgb(*rgb)),
    }
}

pub fn derive_from_rgb(rgb: Rgb) -> DerivedTheme {
    let base = base_lch(rgb);

    let primary_l = (base.l + PRIMARY_L_LIFT).clamp(PRIMARY_L_MIN, PRIMARY_L_MAX);
    let primary = Oklch {
        l: primary_l,
        c: clamp_chroma(base.c + PRIMARY_C_BOOST),
        h: base.h,
    };

    DerivedTheme {
        primary,
        secondary: Oklch {
            l: primary_l - SECONDARY_L_DROP,
            c: clamp_chroma(base.c + SECONDARY_C_BOOST),
            h: shift_hue(base.h, SECONDARY_HUE_SHIFT),
        },
        accent: Oklch {
            l: primary_l - ACCENT_L_DROP,
            c: clamp_chroma(base.c + ACCENT_C_BOOST),
            h: shift_hue(base.h, ACCENT_HUE_SHIFT),
        },
        ring: primary,
    }
}

/// Damped (L, C, H) of a color before the palette offsets are applied.
pub fn base_lch(rgb: Rgb) -> Oklch {
    let lr = srgb_to_linear(rgb.r);
    let lg = srgb_to_linear(rgb.g);
    let lb = srgb_to_linear(rgb.b);

    let x = 0.4124564 * lr + 0.3575761 * lg + 0.1804375 * lb;
    let y = 0.2126729 * lr + 0.7151522 * lg + 0.0721750 * lb;
    let z = 0.0193339 * lr + 0.1191920 * lg + 0.9503041 * lb;

    let fx = lab_f(x / WHITE_X);
    let fy = lab_f(y / WHITE_Y);
    let fz = lab_f(z / WHITE_Z);

    let lab_l = 116.0 * fy - 16.0;
    let lab_a = 500.0 * (fx - fy);
    let lab_b = 200.0 * (fy - fz);

    let l = lab_l / 100.0;
    let c = lab_a.hypot(lab_b) / 100.0;
    let h = normalize_hue(lab_b.atan2(lab_a).to_degrees());

    Oklch {
        l: (l * LIGHTNESS_DAMPING).clamp(0.0, 1.0),
        c: clamp_chroma(c * CHROMA_DAMPING),
        h,
    }
}

fn srgb_to_linear(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn lab_f(t: f64) -> f64 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        (LAB_KAPPA * t + 16.0) / 116.0
    }
}

fn clamp_chroma(c: f64) -> f64 {
    c.clamp(0.0, MAX_CHROMA)
}

/// Shifts a hue and wraps it back into [0, 360).
pub fn shift_hue(h: f64, degrees: f64) -> f64 {
    normalize_hue(h + degrees)
}

fn normalize_hue(h: f64) -> f64 {
    let wrapped = h.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
