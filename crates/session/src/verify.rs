//! Scoring a drawn stroke against its reference.
//!
//! The reference is drawn as a wide [`LayeredGradientRenderer`] stroke: the hue encodes
//! the position along the stroke and the saturation the distance to its center line. The
//! candidate is drawn as dots whose color is the hue the reference has at the nearest vertex,
//! fully saturated. Where the candidate follows the reference in position and direction, both
//! images agree; elsewhere the colors diverge.
//!
//! Three similarities are computed, each in `[0, 1]` for reasonable inputs (they can go below
//! zero for very wrong strokes):
//!
//! - image similarity: average color difference of the pixels covered by the candidate,
//! - length similarity: relative difference of the vertex counts once both strokes are
//!   resampled at the same fixed distance,
//! - angular similarity: average direction difference at evenly distributed samples.
//!
//! A stroke is correct when no similarity falls below its threshold.

use crate::algorithms::resample::FixedDistanceResampler;
use crate::algorithms::{NormalizerOptions, PolygonConverter};
use crate::geom::utils::direction_diff;
use crate::geom::{Color, ColoredPolygon, Polygon};
use crate::options::VerificationOptions;
use crate::raster::renderers::{
    ColorProvider, DottedRenderer, LayeredGradientRenderer, PolygonRenderer,
};
use crate::raster::{Canvas, Surface};

use std::fmt;

const BACKGROUND: [u8; 4] = [255, 255, 255, 255];

/// Outcome of a verification.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum VerifyResult {
    Correct,
    Incorrect,
    /// Incorrect, and the last allowed attempt.
    NoMoreTries,
}

impl VerifyResult {
    pub fn is_correct(self) -> bool {
        self == VerifyResult::Correct
    }
}

/// The similarity that caused a stroke to be rejected, if any.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Invalidator {
    None,
    Image,
    Length,
    Angle,
}

impl fmt::Display for Invalidator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Invalidator::None => "none",
            Invalidator::Image => "image",
            Invalidator::Length => "length",
            Invalidator::Angle => "angle",
        };
        f.write_str(name)
    }
}

/// Measurements of the last verification.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Similarities {
    pub image: f32,
    pub length: f32,
    pub angular: f32,
    /// Number of candidate pixels the image similarity is computed from.
    pub compared_pixels: usize,
    pub angular_samples: usize,
    /// The lowest similarity below its threshold.
    pub invalidator: Invalidator,
    /// Value of the invalidating similarity clamped to `[0, 1]`, `1.0` if none.
    pub score: f32,
}

impl Similarities {
    pub fn passed(&self) -> bool {
        self.invalidator == Invalidator::None
    }
}

/// Image similarity of two RGBA8 buffers of the same size.
///
/// Only the pixels where `candidate` is not the opaque white background are compared.
/// Returns the similarity and the number of compared pixels. Without any compared pixel,
/// there is nothing to score and the similarity is zero.
pub fn image_similarity(reference: &[u8], candidate: &[u8], color_exp: f32) -> (f32, usize) {
    let exp = 1.0 / color_exp;
    let mut compared = 0;
    let mut total = 0.0;

    for (a, b) in reference.chunks_exact(4).zip(candidate.chunks_exact(4)) {
        if b == BACKGROUND {
            continue;
        }

        compared += 1;
        for channel in 0..3 {
            let diff = (a[channel] as f32 - b[channel] as f32).abs() / 255.0;
            total += diff.powf(exp);
        }
    }

    if compared == 0 {
        return (0.0, 0);
    }

    (1.0 - total / compared as f32, compared)
}

/// Similarity of the vertex counts of two strokes resampled at the same distance.
pub fn length_similarity(reference_count: usize, candidate_count: usize, length_exp: f32) -> f32 {
    if reference_count == 0 {
        return if candidate_count == 0 { 1.0 } else { 0.0 };
    }

    let diff = reference_count.abs_diff(candidate_count) as f32 / reference_count as f32;

    1.0 - diff.powf(1.0 / length_exp)
}

/// Direction similarity at evenly distributed positions along both strokes.
///
/// A sample at `p` percent compares the segment starting at `p` percent of the reference
/// with the one starting at `p` percent of the candidate. Strokes with fewer than three
/// vertices have no meaningful direction changes and score `1.0`.
///
/// Returns the similarity and the number of samples taken.
pub fn angular_similarity(
    reference: &Polygon,
    candidate: &Polygon,
    max_angle_range: f32,
    max_samples: usize,
) -> (f32, usize) {
    let ref_count = reference.len();
    let cand_count = candidate.len();
    if ref_count < 3 || cand_count < 3 {
        return (1.0, 0);
    }

    let sample_size = max_samples.min(ref_count / 2).min(cand_count / 2);
    let scale = 360.0 / max_angle_range;

    let mut last_ref = None;
    let mut last_cand = None;
    let mut samples = 0;
    let mut total = 0.0;

    for i in 0..sample_size {
        let percentage = i as f32 / sample_size as f32;
        let ref_idx = (ref_count as f32 * percentage) as usize;
        let cand_idx = (cand_count as f32 * percentage) as usize;

        if last_ref == Some(ref_idx)
            || last_cand == Some(cand_idx)
            || ref_idx + 1 >= ref_count
            || cand_idx + 1 >= cand_count
        {
            continue;
        }

        total += direction_diff(
            reference[ref_idx],
            reference[ref_idx + 1],
            candidate[cand_idx],
            candidate[cand_idx + 1],
        ) * scale;

        samples += 1;
        last_ref = Some(ref_idx);
        last_cand = Some(cand_idx);
    }

    if samples == 0 {
        return (1.0, 0);
    }

    (1.0 - total / samples as f32, samples)
}

/// Colors each candidate vertex with the hue of the nearest reference vertex.
///
/// The hue never decreases along the candidate, so that a noisy nearest match cannot send
/// the stroke backwards.
pub struct NearestHueProvider<'l> {
    reference: Option<&'l ColoredPolygon>,
    max_hue: f32,
}

impl<'l> NearestHueProvider<'l> {
    pub fn new(reference: Option<&'l ColoredPolygon>) -> Self {
        NearestHueProvider {
            reference,
            max_hue: 0.0,
        }
    }
}

impl<'l> ColorProvider for NearestHueProvider<'l> {
    fn color(&mut self, vertex: usize, polygon: &Polygon) -> Color {
        let nearest = self
            .reference
            .and_then(|reference| reference.color_near(polygon[vertex]));

        match nearest {
            Some(color) => {
                self.max_hue = self.max_hue.max(color.hue());
                Color::hsb(self.max_hue, 1.0, 1.0)
            }
            None => Color::WHITE,
        }
    }
}

/// Compares candidate strokes with reference strokes and counts the attempts.
///
/// The engine owns the surfaces it draws on; they are cleared at the beginning of each
/// verification and can be inspected until the next one.
pub struct VerificationEngine {
    options: VerificationOptions,
    resampler: FixedDistanceResampler,
    reference_surface: Canvas,
    candidate_surface: Canvas,
    debug_surface: Canvas,
    tries: u32,
    last: Option<Similarities>,
}

impl VerificationEngine {
    /// Resamples at [`NormalizerOptions::DEFAULT_FIXED_DISTANCE`].
    pub fn new(options: VerificationOptions) -> Self {
        Self::with_resample_distance(options, NormalizerOptions::DEFAULT_FIXED_DISTANCE)
    }

    /// The distance should be the one the reference strokes were normalized with.
    pub fn with_resample_distance(options: VerificationOptions, distance: f32) -> Self {
        let (w, h) = (options.field_width, options.field_height);
        VerificationEngine {
            options,
            resampler: FixedDistanceResampler::new(distance),
            reference_surface: Canvas::new(w, h),
            candidate_surface: Canvas::new(w, h),
            debug_surface: Canvas::new(w, h),
            tries: 0,
            last: None,
        }
    }

    pub fn options(&self) -> &VerificationOptions {
        &self.options
    }

    /// Number of verifications since the last reset.
    pub fn tries(&self) -> u32 {
        self.tries
    }

    pub fn reset_tries(&mut self) {
        self.tries = 0;
    }

    /// Measurements of the last verification.
    pub fn similarities(&self) -> Option<&Similarities> {
        self.last.as_ref()
    }

    pub fn reference_surface(&self) -> &Canvas {
        &self.reference_surface
    }

    pub fn candidate_surface(&self) -> &Canvas {
        &self.candidate_surface
    }

    /// Both compared images on a transparent background, when debugging is enabled.
    pub fn debug_surface(&self) -> Option<&Canvas> {
        if self.options.debug {
            Some(&self.debug_surface)
        } else {
            None
        }
    }

    pub fn verify(&mut self, reference: &Polygon, candidate: &Polygon) -> VerifyResult {
        let mut polygons = [candidate.clone(), reference.clone()];
        self.resampler.convert(&mut polygons);
        let [candidate, reference] = polygons;

        self.reference_surface.clear(Some(Color::WHITE));
        self.candidate_surface.clear(Some(Color::WHITE));
        self.debug_surface.clear(None);

        let mut gradient = LayeredGradientRenderer::new(
            self.options.min_gradient_line_width,
            self.options.max_gradient_line_width,
            self.options.gradient_lines,
        );
        let colored = gradient.draw_polygon(&mut self.reference_surface, &reference);

        let mut dots = DottedRenderer::new(
            self.options.to_verify_dot_size,
            NearestHueProvider::new(colored.as_ref()),
        );
        dots.draw_polygon(&mut self.candidate_surface, &candidate);

        if self.options.debug {
            self.debug_surface.blit(&self.reference_surface, Some(Color::WHITE));
            self.debug_surface.blit(&self.candidate_surface, Some(Color::WHITE));
        }

        let similarities = self.measure(&reference, &candidate);
        self.tries += 1;

        let result = if similarities.passed() {
            VerifyResult::Correct
        } else if self.tries >= self.options.max_tries {
            VerifyResult::NoMoreTries
        } else {
            VerifyResult::Incorrect
        };

        log::debug!(
            "Verified stroke: {:?} (invalidator: {}, score: {:.3}, try {}/{})",
            result,
            similarities.invalidator,
            similarities.score,
            self.tries,
            self.options.max_tries,
        );

        self.last = Some(similarities);

        result
    }

    fn measure(&self, reference: &Polygon, candidate: &Polygon) -> Similarities {
        let options = &self.options;

        let (image, compared_pixels) = image_similarity(
            &self.reference_surface.read_pixels(),
            &self.candidate_surface.read_pixels(),
            options.color_correctness_exp,
        );
        let length = length_similarity(
            reference.len(),
            candidate.len(),
            options.length_correctness_exp,
        );
        let (angular, angular_samples) = angular_similarity(
            reference,
            candidate,
            options.max_angle_range_to_score,
            options.angular_diff_max_check_samples,
        );

        log::debug!("Image similarity: {} over {} pixels", image, compared_pixels);
        log::debug!(
            "Length similarity: {} ({} reference vertices, {} candidate vertices)",
            length,
            reference.len(),
            candidate.len()
        );
        log::debug!("Angular similarity: {} over {} samples", angular, angular_samples);

        let mut score = 1.0;
        let mut invalidator = Invalidator::None;
        let checks = [
            (image, options.min_image_similarity, Invalidator::Image),
            (length, options.min_length_similarity, Invalidator::Length),
            (angular, options.min_angular_similarity, Invalidator::Angle),
        ];
        for (similarity, threshold, metric) in checks {
            if similarity < score && similarity < threshold {
                score = similarity;
                invalidator = metric;
            }
        }

        Similarities {
            image,
            length,
            angular,
            compared_pixels,
            angular_samples,
            invalidator,
            score: score.max(0.0).min(1.0),
        }
    }
}

#[cfg(test)]
use crate::geom::math::point;

#[cfg(test)]
fn horizontal_stroke() -> Polygon {
    // Same as a normalized stroke: 64 vertices over 320 pixels.
    (0..64)
        .map(|i| point(90.0 + i as f32 * 320.0 / 63.0, 250.0))
        .collect()
}

#[cfg(test)]
fn vertical_stroke() -> Polygon {
    (0..64)
        .map(|i| point(250.0, 90.0 + i as f32 * 320.0 / 63.0))
        .collect()
}

#[test]
fn perfect_trace_is_correct() {
    let mut engine = VerificationEngine::new(VerificationOptions::DEFAULT);
    let reference = horizontal_stroke();

    assert_eq!(engine.verify(&reference, &reference), VerifyResult::Correct);

    let similarities = engine.similarities().unwrap();
    assert!(similarities.passed());
    assert_eq!(similarities.score, 1.0);
    assert!(similarities.image > 0.9, "{:?}", similarities);
    assert_eq!(similarities.length, 1.0);
    assert!(similarities.angular > 0.999, "{:?}", similarities);
    assert!(similarities.compared_pixels > 0);
    assert_eq!(engine.tries(), 1);
}

#[test]
fn slightly_off_trace_is_correct() {
    let mut engine = VerificationEngine::new(VerificationOptions::DEFAULT);
    let reference = horizontal_stroke();
    let candidate: Polygon = (0..30)
        .map(|i| point(95.0 + i as f32 * 11.0, 253.0 + (i % 3) as f32))
        .collect();

    assert_eq!(engine.verify(&reference, &candidate), VerifyResult::Correct);
}

#[test]
fn single_point_is_never_correct() {
    let mut engine = VerificationEngine::new(VerificationOptions::DEFAULT.with_max_tries(10));
    let reference = horizontal_stroke();
    let tap = Polygon::from(vec![point(90.0, 250.0)]);

    assert_eq!(engine.verify(&reference, &tap), VerifyResult::Incorrect);

    let similarities = engine.similarities().unwrap();
    assert_eq!(similarities.compared_pixels, 0);
    assert_eq!(similarities.image, 0.0);
    assert!(!similarities.passed());

    assert_eq!(engine.verify(&reference, &Polygon::new()), VerifyResult::Incorrect);
}

#[test]
fn tries_are_counted() {
    let mut engine = VerificationEngine::new(VerificationOptions::DEFAULT);
    let reference = horizontal_stroke();
    let wrong = vertical_stroke();

    assert_eq!(engine.verify(&reference, &wrong), VerifyResult::Incorrect);
    assert_eq!(engine.verify(&reference, &wrong), VerifyResult::Incorrect);
    assert_eq!(engine.verify(&reference, &wrong), VerifyResult::NoMoreTries);
    assert_eq!(engine.tries(), 3);

    engine.reset_tries();
    assert_eq!(engine.verify(&reference, &wrong), VerifyResult::Incorrect);

    // A correct verification does not reset the counter by itself.
    assert_eq!(engine.verify(&reference, &reference), VerifyResult::Correct);
    assert_eq!(engine.tries(), 2);
}

#[test]
fn reversed_stroke_is_rejected() {
    let mut engine = VerificationEngine::new(VerificationOptions::DEFAULT);
    let reference = horizontal_stroke();
    let reversed: Polygon = reference.iter().rev().copied().collect();

    assert_eq!(engine.verify(&reference, &reversed), VerifyResult::Incorrect);

    let similarities = engine.similarities().unwrap();
    assert_eq!(similarities.length, 1.0);
    assert!(similarities.angular < 0.0);
    assert_ne!(similarities.invalidator, Invalidator::Length);
}

#[test]
fn too_short_stroke_is_rejected() {
    let mut engine = VerificationEngine::new(VerificationOptions::DEFAULT);
    let reference = horizontal_stroke();
    let short = Polygon::from(vec![point(90.0, 250.0), point(150.0, 250.0)]);

    assert_eq!(engine.verify(&reference, &short), VerifyResult::Incorrect);
    assert_eq!(engine.similarities().unwrap().invalidator, Invalidator::Length);
}

#[test]
fn debug_surface() {
    let mut engine = VerificationEngine::new(VerificationOptions::DEFAULT);
    engine.verify(&horizontal_stroke(), &horizontal_stroke());
    assert!(engine.debug_surface().is_none());

    let mut engine = VerificationEngine::new(VerificationOptions::DEFAULT.with_debug(true));
    engine.verify(&horizontal_stroke(), &horizontal_stroke());

    let debug = engine.debug_surface().unwrap();
    assert_eq!(debug.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(debug.pixel(250, 250), engine.candidate_surface().pixel(250, 250));
    assert_eq!(
        debug.pixel(250, 290),
        engine.reference_surface().pixel(250, 290)
    );
    assert_ne!(debug.pixel(250, 290), Some([0, 0, 0, 0]));
}

#[test]
fn nearest_hue_never_decreases() {
    let reference = Polygon::from(vec![point(0.0, 0.0), point(10.0, 0.0), point(20.0, 0.0)]);
    let colored = ColoredPolygon::new(
        reference,
        vec![
            Color::hsb(0.0, 1.0, 1.0),
            Color::hsb(90.0, 1.0, 1.0),
            Color::hsb(180.0, 1.0, 1.0),
        ],
    );

    let candidate = Polygon::from(vec![
        point(0.0, 1.0),
        point(11.0, 1.0),
        point(1.0, 1.0),
        point(19.0, 1.0),
    ]);

    let mut provider = NearestHueProvider::new(Some(&colored));
    let hues: Vec<f32> = (0..candidate.len())
        .map(|i| provider.color(i, &candidate).hue())
        .collect();

    assert!(hues[0].abs() < 1e-3);
    assert!((hues[1] - 90.0).abs() < 1e-3);
    assert!((hues[2] - 90.0).abs() < 1e-3);
    assert!((hues[3] - 180.0).abs() < 1e-3);

    let mut provider = NearestHueProvider::new(None);
    assert_eq!(provider.color(0, &candidate), Color::WHITE);
}

#[test]
fn metrics() {
    assert_eq!(length_similarity(100, 100, 0.5), 1.0);
    assert_eq!(length_similarity(100, 75, 0.5), 0.9375);
    assert_eq!(length_similarity(100, 125, 1.0), 0.75);
    assert_eq!(length_similarity(0, 0, 0.5), 1.0);
    assert_eq!(length_similarity(0, 3, 0.5), 0.0);

    let white = [255u8; 8];
    let mut candidate = white;
    candidate[4..8].copy_from_slice(&[255, 0, 0, 255]);
    let mut reference = white;
    reference[4..8].copy_from_slice(&[255, 0, 0, 255]);
    assert_eq!(image_similarity(&reference, &candidate, 0.6), (1.0, 1));
    assert_eq!(image_similarity(&reference, &white, 0.6), (0.0, 0));
    // Red on white differs by 1.0 in two channels.
    assert_eq!(image_similarity(&white, &candidate, 1.0), (-1.0, 1));

    let line = horizontal_stroke();
    let short = Polygon::from(vec![point(0.0, 0.0), point(1.0, 0.0)]);
    assert_eq!(angular_similarity(&line, &short, 180.0, 20), (1.0, 0));

    let (similarity, samples) = angular_similarity(&line, &vertical_stroke(), 180.0, 20);
    assert_eq!(samples, 20);
    assert!(similarity.abs() < 1e-4);

    let (similarity, _) = angular_similarity(&line, &vertical_stroke(), 360.0, 20);
    assert!((similarity - 0.5).abs() < 1e-4);
}
