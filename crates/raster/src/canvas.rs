use crate::geom::math::Point;
use crate::geom::Color;
use crate::path::polygon::Polygon as PathPolygon;
use crate::path::Path;
use crate::rasterizer::{rasterize_triangles, CoverageMask};
use crate::surface::{CompositeMode, Surface, SurfaceStyle};

use lyon_tessellation::geometry_builder::{BuffersBuilder, Positions};
use lyon_tessellation::{
    FillOptions, FillTessellator, LineJoin, StrokeOptions, StrokeTessellator, TessellationResult,
    VertexBuffers,
};

use image::{Rgba, RgbaImage};

use std::borrow::Cow;

/// A software surface backed by an RGBA image.
///
/// Shapes are tessellated with lyon and rasterized without anti-aliasing, so that every
/// drawn pixel has exactly the color it was drawn with.
pub struct Canvas {
    image: RgbaImage,
    style: SurfaceStyle,
    tolerance: f32,
    mask: CoverageMask,
    geometry: VertexBuffers<Point, u32>,
    fill_tessellator: FillTessellator,
    stroke_tessellator: StrokeTessellator,
}

impl Canvas {
    pub const DEFAULT_TOLERANCE: f32 = 0.25;

    /// Creates a transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Canvas {
            image: RgbaImage::new(width, height),
            style: SurfaceStyle::DEFAULT,
            tolerance: Self::DEFAULT_TOLERANCE,
            mask: CoverageMask::new(width, height),
            geometry: VertexBuffers::new(),
            fill_tessellator: FillTessellator::new(),
            stroke_tessellator: StrokeTessellator::new(),
        }
    }

    /// Flattening tolerance used when tessellating curves, caps and circles.
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[inline]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Color of a pixel, `None` outside of the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    fn stroke_options(&self) -> StrokeOptions {
        StrokeOptions::tolerance(self.tolerance)
            .with_line_width(self.style.line_width)
            .with_line_cap(self.style.line_cap)
            .with_line_join(LineJoin::Round)
    }

    // Rasterizes the tessellated geometry and composites it with a single color.
    fn fill_geometry(&mut self, result: TessellationResult, color: Color) {
        if let Err(e) = result {
            log::warn!("Tessellation failed, nothing drawn: {:?}", e);
            self.geometry.clear();
            return;
        }

        rasterize_triangles(&self.geometry.vertices, &self.geometry.indices, &mut self.mask);
        self.geometry.clear();

        let src = color.to_rgba8();
        let mode = self.style.composite_mode;
        let image = &mut self.image;
        self.mask.for_each_covered(|x, y| {
            composite(image.get_pixel_mut(x, y), src, mode);
        });
        self.mask.clear();
    }
}

impl Surface for Canvas {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn style(&self) -> SurfaceStyle {
        self.style
    }

    fn set_style(&mut self, style: SurfaceStyle) {
        self.style = style;
    }

    fn clear(&mut self, color: Option<Color>) {
        let rgba = match color {
            Some(color) => color.with_alpha(1.0).to_rgba8(),
            None => [0, 0, 0, 0],
        };

        for pixel in self.image.pixels_mut() {
            *pixel = Rgba(rgba);
        }
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        if !(radius > 0.0) {
            return;
        }

        let result = self.fill_tessellator.tessellate_circle(
            center,
            radius,
            &FillOptions::tolerance(self.tolerance),
            &mut BuffersBuilder::new(&mut self.geometry, Positions),
        );

        self.fill_geometry(result, color);
    }

    fn stroke_polyline(&mut self, points: &[Point]) {
        if points.is_empty() || !(self.style.line_width > 0.0) {
            return;
        }

        let options = self.stroke_options();
        let result = self.stroke_tessellator.tessellate_polygon(
            PathPolygon {
                points,
                closed: false,
            },
            &options,
            &mut BuffersBuilder::new(&mut self.geometry, Positions),
        );

        self.fill_geometry(result, self.style.stroke_color);
    }

    fn stroke_path(&mut self, path: &Path) {
        if !(self.style.line_width > 0.0) {
            return;
        }

        let options = self.stroke_options();
        let result = self.stroke_tessellator.tessellate_path(
            path,
            &options,
            &mut BuffersBuilder::new(&mut self.geometry, Positions),
        );

        self.fill_geometry(result, self.style.stroke_color);
    }

    fn read_pixels(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.image.as_raw())
    }

    fn blit(&mut self, source: &dyn Surface, skip: Option<Color>) {
        if source.width() != self.width() || source.height() != self.height() {
            log::warn!(
                "Cannot blit a {}x{} surface onto a {}x{} one.",
                source.width(),
                source.height(),
                self.width(),
                self.height()
            );
            return;
        }

        let skip = skip.map(|color| color.to_rgba8());
        let pixels = source.read_pixels();
        for (src, dst) in pixels.chunks_exact(4).zip(self.image.pixels_mut()) {
            let src = [src[0], src[1], src[2], src[3]];
            if Some(src) == skip {
                continue;
            }
            composite(dst, src, CompositeMode::SourceOver);
        }
    }
}

fn composite(dst: &mut Rgba<u8>, src: [u8; 4], mode: CompositeMode) {
    match mode {
        CompositeMode::Copy => {
            dst.0 = src;
        }
        CompositeMode::SourceOver => {
            if src[3] == 255 {
                dst.0 = src;
                return;
            }
            if src[3] == 0 {
                return;
            }

            let src = Color::from_rgba8(src);
            let dst_color = Color::from_rgba8(dst.0);
            let alpha = src.a + dst_color.a * (1.0 - src.a);
            let blend = |s: f32, d: f32| (s * src.a + d * dst_color.a * (1.0 - src.a)) / alpha;

            dst.0 = Color::new(
                blend(src.r, dst_color.r),
                blend(src.g, dst_color.g),
                blend(src.b, dst_color.b),
                alpha,
            )
            .to_rgba8();
        }
    }
}

#[cfg(test)]
use crate::geom::math::point;
#[cfg(test)]
use crate::LineCap;

#[cfg(test)]
fn count_pixels(canvas: &Canvas, rgba: [u8; 4]) -> usize {
    canvas.image().pixels().filter(|p| p.0 == rgba).count()
}

#[test]
fn clear() {
    let mut canvas = Canvas::new(4, 3);
    assert_eq!(count_pixels(&canvas, [0, 0, 0, 0]), 12);

    canvas.clear(Some(Color::WHITE));
    assert_eq!(count_pixels(&canvas, [255, 255, 255, 255]), 12);

    canvas.clear(None);
    assert_eq!(count_pixels(&canvas, [0, 0, 0, 0]), 12);
}

#[test]
fn circle_area() {
    let mut canvas = Canvas::new(64, 64);
    canvas.clear(Some(Color::WHITE));
    canvas.fill_circle(point(32.0, 32.0), 10.0, Color::rgb(1.0, 0.0, 0.0));

    let red = count_pixels(&canvas, [255, 0, 0, 255]) as f32;
    let expected = std::f32::consts::PI * 100.0;
    assert!((red - expected).abs() < expected * 0.05, "{} pixels", red);
    assert_eq!(canvas.pixel(32, 32), Some([255, 0, 0, 255]));
    assert_eq!(canvas.pixel(32, 45), Some([255, 255, 255, 255]));
    assert_eq!(canvas.pixel(64, 0), None);
}

#[test]
fn stroke_with_round_caps() {
    let mut canvas = Canvas::new(100, 40);
    canvas.set_style(SurfaceStyle {
        line_cap: LineCap::Round,
        stroke_color: Color::BLACK,
        line_width: 10.0,
        composite_mode: CompositeMode::SourceOver,
    });
    canvas.stroke_polyline(&[point(20.0, 20.0), point(80.0, 20.0)]);

    // Body and caps.
    assert_eq!(canvas.pixel(50, 20), Some([0, 0, 0, 255]));
    assert_eq!(canvas.pixel(16, 20), Some([0, 0, 0, 255]));
    assert_eq!(canvas.pixel(83, 20), Some([0, 0, 0, 255]));
    // Outside of the stroke.
    assert_eq!(canvas.pixel(50, 27), Some([0, 0, 0, 0]));
    assert_eq!(canvas.pixel(90, 20), Some([0, 0, 0, 0]));

    let drawn = count_pixels(&canvas, [0, 0, 0, 255]) as f32;
    let expected = 60.0 * 10.0 + std::f32::consts::PI * 25.0;
    assert!((drawn - expected).abs() < expected * 0.05, "{} pixels", drawn);
}

#[test]
fn translucent_stroke_is_composited_once() {
    let mut canvas = Canvas::new(40, 40);
    canvas.clear(Some(Color::WHITE));
    canvas.set_line_width(6.0);
    canvas.set_line_cap(LineCap::Round);
    canvas.set_stroke_color(Color::BLACK.with_alpha(0.5));
    // A polyline folding back onto itself.
    canvas.stroke_polyline(&[point(5.0, 20.0), point(35.0, 20.0), point(5.0, 21.0)]);

    let [r, g, b, a] = canvas.pixel(20, 20).unwrap();
    assert_eq!(a, 255);
    assert!(r == g && g == b);
    assert!((127..=129).contains(&r), "{}", r);
}

#[test]
fn copy_mode_replaces() {
    let mut canvas = Canvas::new(10, 10);
    canvas.clear(Some(Color::WHITE));
    canvas.set_composite_mode(CompositeMode::Copy);
    canvas.fill_circle(point(5.0, 5.0), 3.0, Color::TRANSPARENT);
    assert_eq!(canvas.pixel(5, 5), Some([0, 0, 0, 0]));
    assert_eq!(canvas.pixel(0, 0), Some([255, 255, 255, 255]));
}

#[test]
fn blit_skips_background() {
    let mut background = Canvas::new(10, 10);
    background.clear(Some(Color::WHITE));
    background.fill_circle(point(5.0, 5.0), 2.0, Color::rgb(0.0, 0.0, 1.0));

    let mut debug = Canvas::new(10, 10);
    debug.blit(&background, Some(Color::WHITE));

    assert_eq!(debug.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(debug.pixel(5, 5), Some([0, 0, 255, 255]));

    // Mismatched sizes are ignored.
    let mut small = Canvas::new(5, 5);
    small.blit(&background, None);
    assert_eq!(small.pixel(0, 0), Some([0, 0, 0, 0]));
}

#[test]
fn long_strokes_are_drawn() {
    // Enough joins for the tessellated geometry to exceed 16 bit indices.
    let points: Vec<Point> = (0..70_000)
        .map(|i| point(10.0 + i as f32 * 0.0025, if i % 2 == 0 { 20.0 } else { 24.0 }))
        .collect();

    let mut canvas = Canvas::new(200, 40);
    canvas.set_line_width(6.0);
    canvas.set_stroke_color(Color::BLACK);
    canvas.stroke_polyline(&points);

    assert_eq!(canvas.pixel(12, 22), Some([0, 0, 0, 255]));
    assert_eq!(canvas.pixel(100, 22), Some([0, 0, 0, 255]));
    assert_eq!(canvas.pixel(180, 22), Some([0, 0, 0, 255]));
    assert_eq!(canvas.pixel(100, 35), Some([0, 0, 0, 0]));
}
