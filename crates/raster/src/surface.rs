use crate::geom::math::Point;
use crate::geom::Color;
use crate::path::Path;
use crate::LineCap;

use std::borrow::Cow;

/// How drawn pixels are combined with the pixels already on the surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum CompositeMode {
    /// Draw over the existing content, blending with its alpha.
    SourceOver,
    /// Replace the existing content.
    Copy,
}

/// The drawing state renderers change and have to restore.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct SurfaceStyle {
    pub line_cap: LineCap,
    pub stroke_color: Color,
    pub line_width: f32,
    pub composite_mode: CompositeMode,
}

impl SurfaceStyle {
    pub const DEFAULT: Self = SurfaceStyle {
        line_cap: LineCap::Butt,
        stroke_color: Color::BLACK,
        line_width: 1.0,
        composite_mode: CompositeMode::SourceOver,
    };
}

impl Default for SurfaceStyle {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A 2D raster target.
///
/// The verification engine draws on [`Canvas`](crate::Canvas) surfaces, hosts may implement
/// this trait for their own targets to display hints and strokes with the same renderers.
pub trait Surface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn style(&self) -> SurfaceStyle;

    fn set_style(&mut self, style: SurfaceStyle);

    /// Fills the whole surface with an opaque color, or makes it transparent with `None`.
    fn clear(&mut self, color: Option<Color>);

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color);

    /// Strokes an open polyline with the current style.
    fn stroke_polyline(&mut self, points: &[Point]);

    /// Strokes a path, which may contain curves, with the current style.
    fn stroke_path(&mut self, path: &Path);

    /// Raw RGBA pixels, 8 bits per channel, row by row.
    fn read_pixels(&self) -> Cow<'_, [u8]>;

    /// Draws the pixels of `source` over this surface, skipping the ones equal to `skip`.
    ///
    /// Both surfaces must have the same size.
    fn blit(&mut self, source: &dyn Surface, skip: Option<Color>);

    fn line_cap(&self) -> LineCap {
        self.style().line_cap
    }

    fn set_line_cap(&mut self, line_cap: LineCap) {
        let style = self.style();
        self.set_style(SurfaceStyle { line_cap, ..style });
    }

    fn stroke_color(&self) -> Color {
        self.style().stroke_color
    }

    fn set_stroke_color(&mut self, stroke_color: Color) {
        let style = self.style();
        self.set_style(SurfaceStyle {
            stroke_color,
            ..style
        });
    }

    fn line_width(&self) -> f32 {
        self.style().line_width
    }

    fn set_line_width(&mut self, line_width: f32) {
        let style = self.style();
        self.set_style(SurfaceStyle { line_width, ..style });
    }

    fn composite_mode(&self) -> CompositeMode {
        self.style().composite_mode
    }

    fn set_composite_mode(&mut self, composite_mode: CompositeMode) {
        let style = self.style();
        self.set_style(SurfaceStyle {
            composite_mode,
            ..style
        });
    }
}

/// Runs `draw` and restores the line cap, stroke color, line width and composite mode
/// of the surface afterwards.
pub fn with_preserved_style<S, F, R>(surface: &mut S, draw: F) -> R
where
    S: Surface + ?Sized,
    F: FnOnce(&mut S) -> R,
{
    let saved = surface.style();
    let result = draw(surface);
    surface.set_style(saved);

    result
}
