/// An RGBA color with normalized `f32` channels in `[0, 1]`.
///
/// Raster surfaces store 8 bits per channel; use [`Color::to_rgba8`] and
/// [`Color::from_rgba8`] at that boundary.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Tolerance used by [`Color::approx_eq`].
    pub const EPSILON: f32 = 1e-6;

    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Color { r, g, b, a }
    }

    /// An opaque color.
    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Color { r, g, b, a: 1.0 }
    }

    #[inline]
    pub const fn with_alpha(mut self, a: f32) -> Self {
        self.a = a;
        self
    }

    /// Builds an opaque color from hue (degrees), saturation and brightness.
    ///
    /// The hue wraps around, negative values included. Saturation and brightness
    /// are clamped to `[0, 1]`.
    pub fn hsb(hue: f32, saturation: f32, brightness: f32) -> Self {
        let h = ((hue % 360.0) + 360.0) % 360.0;
        let s = saturation.max(0.0).min(1.0);
        let v = brightness.max(0.0).min(1.0);

        if s == 0.0 {
            return Color::rgb(v, v, v);
        }

        let sector = h / 60.0;
        let i = sector.floor();
        let f = sector - i;

        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        match i as u32 {
            0 => Color::rgb(v, t, p),
            1 => Color::rgb(q, v, p),
            2 => Color::rgb(p, v, t),
            3 => Color::rgb(p, q, v),
            4 => Color::rgb(t, p, v),
            _ => Color::rgb(v, p, q),
        }
    }

    /// Hue in degrees, in `[0, 360)`. Achromatic colors have a hue of zero.
    pub fn hue(&self) -> f32 {
        let r = self.r.max(0.0).min(1.0);
        let g = self.g.max(0.0).min(1.0);
        let b = self.b.max(0.0).min(1.0);

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        if delta == 0.0 {
            return 0.0;
        }

        let h = if max == r {
            (g - b) / delta
        } else if max == g {
            2.0 + (b - r) / delta
        } else {
            4.0 + (r - g) / delta
        };

        let h = h * 60.0;
        if h < 0.0 {
            h + 360.0
        } else {
            h
        }
    }

    /// Compares all four channels with a tolerance of [`Color::EPSILON`].
    pub fn approx_eq(&self, other: &Color) -> bool {
        (self.r - other.r).abs() < Self::EPSILON
            && (self.g - other.g).abs() < Self::EPSILON
            && (self.b - other.b).abs() < Self::EPSILON
            && (self.a - other.a).abs() < Self::EPSILON
    }

    /// `#rrggbb`, ignoring alpha.
    pub fn to_hex(&self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        fn channel(c: f32) -> u8 {
            (c.max(0.0).min(1.0) * 255.0).round() as u8
        }

        [channel(self.r), channel(self.g), channel(self.b), channel(self.a)]
    }

    pub fn from_rgba8(rgba: [u8; 4]) -> Self {
        Color::new(
            rgba[0] as f32 / 255.0,
            rgba[1] as f32 / 255.0,
            rgba[2] as f32 / 255.0,
            rgba[3] as f32 / 255.0,
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

#[test]
fn hsb_primaries() {
    assert!(Color::hsb(0.0, 1.0, 1.0).approx_eq(&Color::rgb(1.0, 0.0, 0.0)));
    assert!(Color::hsb(120.0, 1.0, 1.0).approx_eq(&Color::rgb(0.0, 1.0, 0.0)));
    assert!(Color::hsb(240.0, 1.0, 1.0).approx_eq(&Color::rgb(0.0, 0.0, 1.0)));
    assert!(Color::hsb(360.0, 1.0, 1.0).approx_eq(&Color::rgb(1.0, 0.0, 0.0)));
    assert!(Color::hsb(-120.0, 1.0, 1.0).approx_eq(&Color::rgb(0.0, 0.0, 1.0)));
    assert!(Color::hsb(42.0, 0.0, 0.5).approx_eq(&Color::rgb(0.5, 0.5, 0.5)));
}

#[test]
fn hue_round_trips_through_hsb() {
    for i in 0..36 {
        let hue = i as f32 * 10.0;
        let color = Color::hsb(hue, 1.0, 1.0);
        assert!((color.hue() - hue).abs() < 1e-3, "{} != {}", color.hue(), hue);
    }

    assert_eq!(Color::WHITE.hue(), 0.0);
    assert_eq!(Color::rgb(0.3, 0.3, 0.3).hue(), 0.0);
}

#[test]
fn eight_bit_conversions() {
    assert_eq!(Color::WHITE.to_rgba8(), [255, 255, 255, 255]);
    assert_eq!(Color::TRANSPARENT.to_rgba8(), [0, 0, 0, 0]);
    assert!(Color::from_rgba8([255, 255, 255, 255]).approx_eq(&Color::WHITE));
    assert_eq!(Color::rgb(1.0, 0.5, 0.0).to_hex(), "#ff8000");
    assert_eq!(Color::rgb(0.3, 0.3, 0.3).to_hex(), "#4d4d4d");
}
