//! RGBA colors and the small color generators effects draw from.
//!
//! Every channel lives in `[0, 1]`. [`Rgba`] is `#[repr(C)]` and [`bytemuck::Pod`]
//! so an output frame can be handed to a host as a flat `f32` buffer.
//!
//! ```ignore
//! let ember = Rgba::rgb(0.98, 0.45, 0.05);
//! let faded = Rgba::WHITE.lerp(ember, 0.25);
//! let flash = ember.inverted();
//! ```

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::math::clamp01;

/// A color with straight (non-premultiplied) alpha.
///
/// Serializes as `[r, g, b, a]`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Rgba = Rgba::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);
    pub const RED: Rgba = Rgba::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Rgba = Rgba::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Rgba = Rgba::rgb(0.0, 0.0, 1.0);
    pub const ORANGE: Rgba = Rgba::rgb(1.0, 0.5, 0.0);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    #[inline]
    pub const fn from_array(c: [f32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }

    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Per-channel linear interpolation, alpha included.
    #[inline]
    pub fn lerp(self, to: Rgba, t: f32) -> Self {
        Self::new(
            self.r + (to.r - self.r) * t,
            self.g + (to.g - self.g) * t,
            self.b + (to.b - self.b) * t,
            self.a + (to.a - self.a) * t,
        )
    }

    /// RGB interpolation that always yields an opaque color.
    #[inline]
    pub fn lerp_opaque(self, to: Rgba, t: f32) -> Self {
        self.lerp(to, t).with_alpha(1.0)
    }

    /// Every channel clamped into `[0, 1]`; NaN becomes 0.
    #[inline]
    pub fn clamped(self) -> Self {
        Self::new(clamp01(self.r), clamp01(self.g), clamp01(self.b), clamp01(self.a))
    }

    /// RGB inverted, alpha kept.
    #[inline]
    pub fn inverted(self) -> Self {
        Self::new(1.0 - self.r, 1.0 - self.g, 1.0 - self.b, self.a)
    }

    /// Manhattan distance over RGB.
    #[inline]
    pub fn rgb_distance(self, other: Rgba) -> f32 {
        (self.r - other.r).abs() + (self.g - other.g).abs() + (self.b - other.b).abs()
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    /// Channels quantized to thousandths, for cheap change detection.
    #[inline]
    pub fn quantized(self) -> [i32; 4] {
        let q = |c: f32| (c * 1000.0).round() as i32;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

impl From<[f32; 4]> for Rgba {
    fn from(c: [f32; 4]) -> Self {
        Rgba::from_array(c)
    }
}

impl From<Rgba> for [f32; 4] {
    fn from(c: Rgba) -> Self {
        c.to_array()
    }
}

/// HSV to opaque RGB. `h` wraps, `s` and `v` are clamped.
pub fn hsv(h: f32, s: f32, v: f32) -> Rgba {
    let h = h.rem_euclid(1.0) * 6.0;
    let s = clamp01(s);
    let v = clamp01(v);
    let c = v * s;
    let x = c * (1.0 - ((h % 2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 1.0 {
        (c, x, 0.0)
    } else if h < 2.0 {
        (x, c, 0.0)
    } else if h < 3.0 {
        (0.0, c, x)
    } else if h < 4.0 {
        (0.0, x, c)
    } else if h < 5.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    Rgba::rgb(r + m, g + m, b + m)
}

/// HSL to opaque RGB. `h` wraps, `s` and `l` are clamped.
pub fn hsl(h: f32, s: f32, l: f32) -> Rgba {
    let h = h.rem_euclid(1.0);
    let s = clamp01(s);
    let l = clamp01(l);
    if s == 0.0 {
        return Rgba::rgb(l, l, l);
    }

    let hue = |p: f32, q: f32, mut t: f32| {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    Rgba::rgb(hue(p, q, h + 1.0 / 3.0), hue(p, q, h), hue(p, q, h - 1.0 / 3.0))
}

/// Display grade applied to an underlay color.
///
/// Order: multiply, raise to `gamma`, clamp into `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    /// Channel multiplier (lower is darker).
    pub multiply: f32,
    pub gamma: f32,
    pub min: f32,
    pub max: f32,
}

impl Default for Grade {
    fn default() -> Self {
        Self {
            multiply: 1.0,
            gamma: 1.0,
            min: 0.0,
            max: 1.0,
        }
    }
}

impl Grade {
    /// Deep darkening that keeps the underlay well below the bands.
    pub fn deep() -> Self {
        Self {
            multiply: 0.05,
            gamma: 1.0,
            min: 0.0,
            max: 0.95,
        }
    }

    pub fn apply(&self, c: Rgba) -> Rgba {
        let mul = self.multiply.max(0.0);
        let gamma = if self.gamma > 0.0 { self.gamma } else { 1.0 };
        let grade = |x: f32| {
            let y = (x * mul).max(0.0);
            let y = if gamma != 1.0 { y.powf(gamma) } else { y };
            y.clamp(self.min, self.max)
        };
        Rgba::new(grade(c.r), grade(c.g), grade(c.b), c.a)
    }
}
