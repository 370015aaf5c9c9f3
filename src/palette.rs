//! Literal color tables and the pickers that draw from them.
//!
//! # Pickers
//!
//! | Type | Draw rule |
//! |------|-----------|
//! | [`Palette::pick`] | uniform random index, repeats allowed |
//! | [`NonRepeatingPicker`] | uniform, re-rolled while equal to the previous index |
//! | [`NoRepeatBag`] | without replacement until exhausted, then refill |
//!
//! # Built-in tables
//!
//! [`Swatch`] names the tables the catalog uses; each resolves to a
//! [`Palette`] through [`Swatch::palette`].

use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::error::{Result, RippError};
use crate::spawn::SpawnContext;

/// A non-empty list of colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Rgba>", into = "Vec<Rgba>")]
pub struct Palette {
    colors: Vec<Rgba>,
}

impl Palette {
    /// Build a palette. Fails when `colors` is empty.
    pub fn new(colors: Vec<Rgba>) -> Result<Self> {
        if colors.is_empty() {
            return Err(RippError::EmptyPalette("custom"));
        }
        Ok(Self { colors })
    }

    fn from_table(table: &[[f32; 4]]) -> Self {
        Self {
            colors: table.iter().copied().map(Rgba::from_array).collect(),
        }
    }

    /// Uniform random color.
    #[inline]
    pub fn pick(&self, ctx: &mut SpawnContext) -> Rgba {
        ctx.pick(&self.colors).copied().unwrap_or_default()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Rgba {
        self.colors[index % self.colors.len()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[inline]
    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }
}

impl TryFrom<Vec<Rgba>> for Palette {
    type Error = RippError;

    fn try_from(colors: Vec<Rgba>) -> Result<Self> {
        Palette::new(colors)
    }
}

impl From<Palette> for Vec<Rgba> {
    fn from(p: Palette) -> Self {
        p.colors
    }
}

/// Uniform draw that never returns the same index twice in a row.
#[derive(Debug, Clone, Default)]
pub struct NonRepeatingPicker {
    last: Option<usize>,
}

impl NonRepeatingPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pick(&mut self, palette: &Palette, ctx: &mut SpawnContext) -> Rgba {
        let n = palette.len();
        let mut idx = ctx.random_index(n);
        if n > 1 {
            while Some(idx) == self.last {
                idx = ctx.random_index(n);
            }
        }
        self.last = Some(idx);
        palette.get(idx)
    }
}

/// Draws without replacement, refilling once every color has been used.
///
/// With more than one color, the first draw after a refill skips whatever
/// was drawn last, so no color ever appears twice in a row.
#[derive(Debug, Clone)]
pub struct NoRepeatBag {
    palette: Palette,
    /// Indices into `palette` still in the bag.
    remaining: Vec<usize>,
    last: Option<usize>,
}

impl NoRepeatBag {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            remaining: Vec::new(),
            last: None,
        }
    }

    /// Colors left before the next refill.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    pub fn draw(&mut self, ctx: &mut SpawnContext) -> Rgba {
        if self.remaining.is_empty() {
            self.remaining = (0..self.palette.len()).collect();
        }

        let mut slot = ctx.random_index(self.remaining.len());
        if self.remaining.len() > 1 && Some(self.remaining[slot]) == self.last {
            slot = (slot + 1 + ctx.random_index(self.remaining.len() - 1)) % self.remaining.len();
        }

        let idx = self.remaining.swap_remove(slot);
        self.last = Some(idx);
        self.palette.get(idx)
    }
}

/// Named built-in color tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Swatch {
    /// Warm magentas, violets and deep blues.
    Dusk,
    /// Acid greens with red accents.
    Lime,
    /// Candy pastels, corals and plums.
    Temari,
    /// Saturated primaries plus white and near-black.
    Candy,
    /// Reds, oranges and ambers.
    Autumn,
    /// Five-color ember and violet set.
    Ember,
    /// Amber, sky, navy and pink.
    Harbor,
}

impl Swatch {
    pub fn palette(self) -> Palette {
        Palette::from_table(self.table())
    }

    pub fn name(self) -> &'static str {
        match self {
            Swatch::Dusk => "Dusk",
            Swatch::Lime => "Lime",
            Swatch::Temari => "Temari",
            Swatch::Candy => "Candy",
            Swatch::Autumn => "Autumn",
            Swatch::Ember => "Ember",
            Swatch::Harbor => "Harbor",
        }
    }

    fn table(self) -> &'static [[f32; 4]] {
        match self {
            Swatch::Dusk => DUSK,
            Swatch::Lime => LIME,
            Swatch::Temari => TEMARI,
            Swatch::Candy => CANDY,
            Swatch::Autumn => AUTUMN,
            Swatch::Ember => EMBER,
            Swatch::Harbor => HARBOR,
        }
    }
}

const DUSK: &[[f32; 4]] = &[
    [1.0, 0.753, 0.078, 1.0],
    [0.969, 0.384, 0.094, 1.0],
    [1.0, 0.114, 0.408, 1.0],
    [0.694, 0.0, 0.396, 1.0],
    [0.455, 0.02, 0.502, 1.0],
    [0.675, 0.424, 0.855, 1.0],
    [0.42, 0.365, 0.808, 1.0],
    [0.137, 0.302, 0.761, 1.0],
    [0.0, 0.137, 0.82, 1.0],
    [0.0, 0.137, 0.82, 1.0],
    [0.055, 0.055, 0.408, 1.0],
    [0.38, 0.557, 1.0, 1.0],
    [0.996, 0.886, 0.671, 1.0],
    [0.31, 0.0, 0.42, 1.0],
    [0.639, 0.0, 0.118, 1.0],
    [1.0, 0.2, 0.239, 1.0],
    [1.0, 0.251, 0.102, 1.0],
    [0.988, 0.482, 0.286, 1.0],
    [0.49, 0.0, 0.867, 1.0],
    [0.8, 0.0, 0.8, 1.0],
    [1.0, 0.035, 0.616, 1.0],
    [1.0, 0.482, 0.0, 1.0],
    [1.0, 0.882, 0.0, 1.0],
    [0.31, 0.302, 0.616, 1.0],
    [0.259, 0.255, 0.667, 1.0],
    [0.631, 0.502, 0.976, 1.0],
    [0.502, 0.624, 1.0, 1.0],
    [1.0, 0.878, 0.439, 1.0],
    [0.392, 0.008, 0.361, 1.0],
    [0.576, 0.086, 0.447, 1.0],
    [0.906, 0.243, 0.396, 1.0],
    [0.275, 0.004, 0.494, 1.0],
    [0.522, 0.0, 0.345, 1.0],
    [0.761, 0.024, 0.031, 1.0],
    [1.0, 0.157, 0.078, 1.0],
    [1.0, 0.157, 0.078, 1.0],
    [1.0, 0.392, 0.173, 1.0],
];

const LIME: &[[f32; 4]] = &[
    [0.643, 1.0, 0.141, 1.0],
    [0.643, 1.0, 0.141, 1.0],
    [0.643, 1.0, 0.141, 1.0],
    [0.643, 1.0, 0.141, 1.0],
    [0.647, 0.945, 0.624, 1.0],
    [1.0, 0.969, 0.0, 1.0],
    [0.875, 0.839, 0.424, 1.0],
    [0.612, 0.91, 0.047, 1.0],
    [0.522, 1.0, 0.592, 1.0],
    [0.898, 0.737, 0.243, 1.0],
    [0.455, 0.741, 0.498, 1.0],
    [0.337, 0.82, 0.024, 1.0],
    [0.91, 0.502, 0.133, 1.0],
    [0.047, 0.725, 0.412, 1.0],
    [0.988, 0.012, 0.173, 1.0],
    [0.988, 0.012, 0.173, 1.0],
    [0.988, 0.012, 0.173, 1.0],
    [0.918, 0.447, 0.369, 1.0],
    [0.373, 0.561, 0.463, 1.0],
    [0.09, 0.678, 0.024, 1.0],
    [0.761, 0.392, 0.518, 1.0],
    [0.796, 0.525, 0.024, 1.0],
    [0.42, 0.49, 0.106, 1.0],
    [0.11, 0.529, 0.439, 1.0],
    [0.753, 0.345, 0.318, 1.0],
    [0.455, 0.435, 0.263, 1.0],
    [0.153, 0.494, 0.043, 1.0],
    [0.333, 0.341, 0.478, 1.0],
    [0.651, 0.231, 0.459, 1.0],
    [0.529, 0.271, 0.212, 1.0],
    [0.071, 0.271, 0.412, 1.0],
    [0.204, 0.0, 0.639, 1.0],
];

const TEMARI: &[[f32; 4]] = &[
    [0.949, 0.769, 0.278, 1.0],
    [0.969, 0.384, 0.094, 1.0],
    [1.0, 0.114, 0.408, 1.0],
    [0.694, 0.0, 0.396, 1.0],
    [0.455, 0.02, 0.502, 1.0],
    [0.675, 0.424, 0.855, 1.0],
    [0.42, 0.365, 0.808, 1.0],
    [0.137, 0.302, 0.761, 1.0],
    [0.098, 0.192, 0.671, 1.0],
    [0.055, 0.055, 0.408, 1.0],
    [0.996, 0.914, 0.722, 1.0],
    [0.659, 0.702, 0.808, 1.0],
    [0.886, 0.663, 0.847, 1.0],
    [0.996, 0.886, 0.671, 1.0],
    [0.998, 0.757, 0.596, 1.0],
    [0.337, 0.196, 0.388, 1.0],
    [0.698, 0.243, 0.325, 1.0],
    [0.945, 0.298, 0.333, 1.0],
    [0.996, 0.388, 0.271, 1.0],
    [0.988, 0.482, 0.286, 1.0],
    [0.49, 0.0, 0.867, 1.0],
    [0.8, 0.0, 0.8, 1.0],
    [1.0, 0.035, 0.616, 1.0],
    [1.0, 0.482, 0.0, 1.0],
    [1.0, 0.882, 0.0, 1.0],
    [0.31, 0.302, 0.616, 1.0],
    [0.361, 0.357, 0.647, 1.0],
    [0.569, 0.478, 0.827, 1.0],
    [0.659, 0.71, 0.863, 1.0],
    [0.875, 0.541, 0.867, 1.0],
    [1.0, 0.463, 0.388, 1.0],
    [1.0, 0.569, 0.404, 1.0],
    [1.0, 0.671, 0.541, 1.0],
    [1.0, 0.776, 0.427, 1.0],
    [1.0, 0.878, 0.439, 1.0],
    [0.196, 0.094, 0.286, 1.0],
    [0.576, 0.086, 0.447, 1.0],
    [0.906, 0.243, 0.396, 1.0],
    [0.933, 0.365, 0.373, 1.0],
    [0.906, 0.494, 0.431, 1.0],
    [0.231, 0.031, 0.392, 1.0],
    [0.431, 0.051, 0.302, 1.0],
    [0.761, 0.024, 0.031, 1.0],
    [0.969, 0.161, 0.086, 1.0],
    [1.0, 0.392, 0.173, 1.0],
];

const CANDY: &[[f32; 4]] = &[
    [0.992, 0.992, 0.992, 1.0],
    [0.976, 0.984, 0.0, 1.0],
    [0.012, 0.996, 1.0, 1.0],
    [0.004, 1.0, 0.0, 1.0],
    [0.992, 0.0, 0.984, 1.0],
    [0.984, 0.004, 0.008, 1.0],
    [0.078, 0.078, 0.078, 1.0],
    [0.012, 0.004, 0.984, 1.0],
];

const AUTUMN: &[[f32; 4]] = &[
    [0.459, 0.024, 0.024, 1.0],
    [0.494, 0.02, 0.0, 1.0],
    [0.816, 0.133, 0.012, 1.0],
    [0.816, 0.133, 0.012, 1.0],
    [0.914, 0.161, 0.0, 1.0],
    [0.98, 0.196, 0.012, 1.0],
    [0.969, 0.298, 0.047, 1.0],
    [0.992, 0.282, 0.008, 1.0],
    [0.992, 0.322, 0.035, 1.0],
    [0.992, 0.322, 0.035, 1.0],
    [0.992, 0.322, 0.035, 1.0],
    [0.957, 0.298, 0.0, 1.0],
    [0.996, 0.322, 0.0, 1.0],
    [0.988, 0.357, 0.012, 1.0],
    [0.988, 0.514, 0.016, 1.0],
    [0.988, 0.514, 0.016, 1.0],
    [0.988, 0.514, 0.016, 1.0],
    [1.0, 0.529, 0.008, 1.0],
    [0.996, 0.573, 0.043, 1.0],
    [1.0, 0.58, 0.012, 1.0],
    [0.996, 0.58, 0.008, 1.0],
    [0.988, 0.58, 0.012, 1.0],
    [0.988, 0.592, 0.0, 1.0],
    [0.988, 0.639, 0.047, 1.0],
    [0.988, 0.714, 0.016, 1.0],
    [0.969, 0.914, 0.333, 1.0],
    [0.996, 0.922, 0.008, 1.0],
    [0.271, 0.008, 0.035, 1.0],
    [0.412, 0.012, 0.024, 1.0],
    [0.443, 0.016, 0.027, 1.0],
];

const EMBER: &[[f32; 4]] = &[
    [1.0, 0.196, 0.102, 1.0],
    [1.0, 0.565, 0.106, 1.0],
    [0.886, 0.0, 0.969, 1.0],
    [0.271, 0.055, 1.0, 1.0],
    [0.133, 0.0, 0.439, 1.0],
];

const HARBOR: &[[f32; 4]] = &[
    [1.0, 0.737, 0.02, 1.0],
    [0.0, 0.529, 0.878, 1.0],
    [0.0, 0.078, 0.522, 1.0],
    [0.984, 0.027, 0.6, 1.0],
];
