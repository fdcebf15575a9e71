//! Color schemes and multi-stop interpolation engine.

/// RGB color as (r, g, b) with values in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_rgba(self, alpha: u8) -> [u8; 4] {
        [self.r, self.g, self.b, alpha]
    }
}

/// A color stop: position in [0, 1] mapped to an RGB color.
#[derive(Debug, Clone, Copy)]
pub struct ColorStop {
    pub t: f64,
    pub color: Rgb,
}

impl ColorStop {
    pub const fn new(t: f64, r: u8, g: u8, b: u8) -> Self {
        Self {
            t,
            color: Rgb::new(r, g, b),
        }
    }
}

/// Available color schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorScheme {
    /// Green -> Yellow -> Brown -> White (elevation)
    Terrain,
    /// Brown -> Yellow -> Green (NDVI)
    Ndvi,
    /// Blue -> White -> Red (differences centred on zero)
    Divergent,
    /// Black -> White
    Grayscale,
    /// Discrete palette for class labels
    Categorical,
}

impl ColorScheme {
    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Terrain => "Terrain",
            Self::Ndvi => "NDVI",
            Self::Divergent => "Divergent",
            Self::Grayscale => "Grayscale",
            Self::Categorical => "Categorical",
        }
    }
}

// ─── Color stop definitions ────────────────────────────────────────────

const TERRAIN_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 34, 139, 34),
    ColorStop::new(0.25, 144, 190, 60),
    ColorStop::new(0.50, 220, 200, 80),
    ColorStop::new(0.75, 180, 120, 60),
    ColorStop::new(1.00, 255, 255, 255),
];

const NDVI_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 120, 70, 20),
    ColorStop::new(0.3, 200, 170, 60),
    ColorStop::new(0.5, 240, 230, 100),
    ColorStop::new(0.7, 100, 180, 50),
    ColorStop::new(1.0, 10, 100, 20),
];

const DIVERGENT_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 33, 102, 172),
    ColorStop::new(0.25, 103, 169, 207),
    ColorStop::new(0.50, 247, 247, 247),
    ColorStop::new(0.75, 239, 138, 98),
    ColorStop::new(1.00, 178, 24, 43),
];

/// Class colors, indexed by label. Label 1 is water, 2 land for the
/// elevation pipeline; the change classes reuse 1..=3 as decrease, stable,
/// increase.
const CATEGORICAL_PALETTE: &[Rgb] = &[
    Rgb::new(120, 120, 120), // 0: below the first boundary
    Rgb::new(31, 120, 180),  // 1
    Rgb::new(215, 190, 120), // 2
    Rgb::new(51, 160, 44),   // 3
    Rgb::new(227, 26, 28),   // 4
    Rgb::new(255, 127, 0),   // 5
    Rgb::new(106, 61, 154),  // 6
    Rgb::new(177, 89, 40),   // 7
];

// ─── Interpolation engine ──────────────────────────────────────────────

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_color(c1: Rgb, c2: Rgb, t: f64) -> Rgb {
    Rgb::new(
        lerp(c1.r as f64, c2.r as f64, t).round() as u8,
        lerp(c1.g as f64, c2.g as f64, t).round() as u8,
        lerp(c1.b as f64, c2.b as f64, t).round() as u8,
    )
}

fn multi_stop(stops: &[ColorStop], t: f64) -> Rgb {
    let first = stops[0];
    let last = stops[stops.len() - 1];
    if t <= first.t {
        return first.color;
    }
    if t >= last.t {
        return last.color;
    }
    stops
        .windows(2)
        .find(|pair| t <= pair[1].t)
        .map(|pair| {
            let ratio = (t - pair[0].t) / (pair[1].t - pair[0].t);
            lerp_color(pair[0].color, pair[1].color, ratio)
        })
        .unwrap_or(last.color)
}

/// Color of a class label; labels past the palette wrap around
pub fn categorical(label: u16) -> Rgb {
    CATEGORICAL_PALETTE[label as usize % CATEGORICAL_PALETTE.len()]
}

/// Evaluate a color scheme at normalized position `t` ∈ [0, 1].
///
/// For `Categorical`, `t` is mapped to one of the palette entries.
pub fn evaluate(scheme: ColorScheme, t: f64) -> Rgb {
    match scheme {
        ColorScheme::Terrain => multi_stop(TERRAIN_STOPS, t),
        ColorScheme::Ndvi => multi_stop(NDVI_STOPS, t),
        ColorScheme::Divergent => multi_stop(DIVERGENT_STOPS, t),
        ColorScheme::Grayscale => {
            let v = (t.clamp(0.0, 1.0) * 255.0).round() as u8;
            Rgb::new(v, v, v)
        }
        ColorScheme::Categorical => {
            let n = CATEGORICAL_PALETTE.len();
            let idx = (t.clamp(0.0, 1.0) * n as f64).floor().min((n - 1) as f64) as usize;
            CATEGORICAL_PALETTE[idx]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terrain_endpoints() {
        assert_eq!(evaluate(ColorScheme::Terrain, 0.0), Rgb::new(34, 139, 34));
        assert_eq!(evaluate(ColorScheme::Terrain, 1.0), Rgb::new(255, 255, 255));
    }

    #[test]
    fn grayscale_midpoint() {
        assert_eq!(evaluate(ColorScheme::Grayscale, 0.5), Rgb::new(128, 128, 128));
    }

    #[test]
    fn divergent_centre_is_neutral() {
        assert_eq!(evaluate(ColorScheme::Divergent, 0.5), Rgb::new(247, 247, 247));
    }

    #[test]
    fn stops_interpolate() {
        // halfway between the first two NDVI stops
        let c = evaluate(ColorScheme::Ndvi, 0.15);
        assert_eq!(c, Rgb::new(160, 120, 40));
    }

    #[test]
    fn clamping() {
        assert_eq!(evaluate(ColorScheme::Terrain, -0.5), Rgb::new(34, 139, 34));
        assert_eq!(evaluate(ColorScheme::Terrain, 1.5), Rgb::new(255, 255, 255));
        assert_eq!(evaluate(ColorScheme::Categorical, 2.0), categorical(7));
    }

    #[test]
    fn categorical_labels() {
        assert_eq!(categorical(1), Rgb::new(31, 120, 180));
        assert_eq!(categorical(9), categorical(1));
        assert_ne!(categorical(1), categorical(2));
    }

    #[test]
    fn names() {
        assert_eq!(ColorScheme::Ndvi.name(), "NDVI");
    }
}
