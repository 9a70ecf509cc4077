use crate::fit::{Centerer, Scaler};
use crate::resample::FixedDistanceResampler;
use crate::{Polygon, PolygonConverter};

use std::ops::Index;

/// Parameters of the normalization pipeline.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct NormalizerOptions {
    /// Converts outline design units into field pixels.
    ///
    /// Default value: `4.0`.
    pub scale_factor: f32,

    /// Default value: `500.0`.
    pub field_width: f32,

    /// Default value: `500.0`.
    pub field_height: f32,

    /// Distance between consecutive vertices after resampling.
    ///
    /// Default value: `NormalizerOptions::DEFAULT_FIXED_DISTANCE`.
    pub fixed_distance: f32,
}

impl NormalizerOptions {
    pub const DEFAULT_FIXED_DISTANCE: f32 = 5.0;

    pub const DEFAULT: Self = NormalizerOptions {
        scale_factor: 4.0,
        field_width: 500.0,
        field_height: 500.0,
        fixed_distance: Self::DEFAULT_FIXED_DISTANCE,
    };

    #[inline]
    pub const fn with_scale_factor(mut self, scale_factor: f32) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    #[inline]
    pub const fn with_field_size(mut self, width: f32, height: f32) -> Self {
        self.field_width = width;
        self.field_height = height;
        self
    }

    #[inline]
    pub const fn with_fixed_distance(mut self, fixed_distance: f32) -> Self {
        self.fixed_distance = fixed_distance;
        self
    }
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The polygons of one character, and whether they have been normalized yet.
///
/// The flag is what makes normalization idempotent: scaling twice would move the strokes
/// out of the field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolygonSet {
    polygons: Vec<Polygon>,
    normalized: bool,
}

impl PolygonSet {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        PolygonSet {
            polygons,
            normalized: false,
        }
    }

    #[inline]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    #[inline]
    pub fn get(&self, idx: usize) -> Option<&Polygon> {
        self.polygons.get(idx)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    #[inline]
    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Polygon> {
        self.polygons.iter()
    }

    pub fn into_polygons(self) -> Vec<Polygon> {
        self.polygons
    }
}

impl From<Vec<Polygon>> for PolygonSet {
    fn from(polygons: Vec<Polygon>) -> Self {
        PolygonSet::new(polygons)
    }
}

impl Index<usize> for PolygonSet {
    type Output = Polygon;
    fn index(&self, idx: usize) -> &Polygon {
        &self.polygons[idx]
    }
}

impl<'l> IntoIterator for &'l PolygonSet {
    type Item = &'l Polygon;
    type IntoIter = std::slice::Iter<'l, Polygon>;
    fn into_iter(self) -> Self::IntoIter {
        self.polygons.iter()
    }
}

/// Scales, centers and resamples the polygons of a character, in this order.
///
/// ## Example
///
/// ```
/// use kanji_trace_algorithms::{Normalizer, NormalizerOptions, PolygonSet};
/// use kanji_trace_algorithms::geom::Polygon;
/// use kanji_trace_algorithms::math::point;
///
/// let mut set = PolygonSet::new(vec![
///     Polygon::from(vec![point(10.0, 50.0), point(90.0, 50.0)]),
/// ]);
///
/// let normalizer = Normalizer::new(NormalizerOptions::DEFAULT);
/// assert!(normalizer.normalize(&mut set));
/// // The second call does nothing.
/// assert!(!normalizer.normalize(&mut set));
///
/// assert_eq!(set[0].first(), Some(point(90.0, 250.0)));
/// assert_eq!(set[0].last(), Some(point(410.0, 250.0)));
/// assert_eq!(set[0].len(), 64);
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Normalizer {
    options: NormalizerOptions,
}

impl Normalizer {
    pub fn new(options: NormalizerOptions) -> Self {
        Normalizer { options }
    }

    pub fn options(&self) -> &NormalizerOptions {
        &self.options
    }

    /// Normalizes the set unless it already is.
    ///
    /// Returns whether anything was done.
    pub fn normalize(&self, set: &mut PolygonSet) -> bool {
        if set.normalized {
            log::trace!("Polygon set already normalized, skipping.");
            return false;
        }

        let scaler = Scaler::new(self.options.scale_factor);
        let centerer = Centerer::new(self.options.field_width, self.options.field_height);
        let resampler = FixedDistanceResampler::new(self.options.fixed_distance);
        let stages: [&dyn PolygonConverter; 3] = [&scaler, &centerer, &resampler];

        for stage in stages {
            stage.convert(&mut set.polygons);
        }

        set.normalized = true;

        true
    }
}

#[cfg(test)]
use crate::geom::bounding_box;
#[cfg(test)]
use crate::math::point;

#[cfg(test)]
fn two_strokes() -> PolygonSet {
    PolygonSet::new(vec![
        Polygon::from(vec![point(20.0, 20.0), point(80.0, 20.0)]),
        Polygon::from(vec![
            point(50.0, 10.0),
            point(50.0, 50.0),
            point(45.0, 90.0),
        ]),
    ])
}

#[test]
fn normalize_fits_the_field() {
    let mut set = two_strokes();
    Normalizer::default().normalize(&mut set);

    assert!(set.is_normalized());
    let bounds = bounding_box(set.iter()).unwrap();
    assert!((bounds.min.x + bounds.max.x - 500.0).abs() < 1e-3);
    assert!((bounds.min.y + bounds.max.y - 500.0).abs() < 1e-3);
    // 60 units scaled by 4, resampled every 5 pixels.
    assert_eq!(set[0].len(), 48);
}

#[test]
fn normalize_twice_does_not_scale_twice() {
    let mut set = two_strokes();
    let normalizer = Normalizer::default();

    assert!(normalizer.normalize(&mut set));
    let once = set.clone();
    assert!(!normalizer.normalize(&mut set));

    assert_eq!(set, once);
}

#[test]
fn fresh_set_from_normalized_polygons() {
    // Each set tracks its own state: a new set built from normalized polygons is a new
    // character as far as the normalizer is concerned.
    let mut set = two_strokes();
    Normalizer::default().normalize(&mut set);
    let polygons = set.into_polygons();
    let copy = PolygonSet::from(polygons.clone());
    assert!(!copy.is_normalized());
    assert_eq!(copy.polygons(), &polygons[..]);
}

#[test]
fn normalize_empty_set() {
    let mut set = PolygonSet::default();
    assert!(Normalizer::default().normalize(&mut set));
    assert!(set.is_empty());
    assert!(set.is_normalized());
}
