//! Stroke renderers.
//!
//! A renderer draws a [`Polygon`] onto a [`Surface`] and reports the color it used for each
//! vertex. Renderers save and restore the style of the surface around their own drawing, so
//! several of them can share a surface.
//!
//! Polygons too short for a renderer are not drawn and yield `None`: fewer than two
//! vertices for all renderers, fewer than three for the [`SmoothRenderer`].

use crate::geom::math::Point;
use crate::geom::{Color, ColoredPolygon, Polygon};
use crate::path::Path;
use crate::surface::{with_preserved_style, CompositeMode, Surface};
use crate::LineCap;

/// Draws polygons on surfaces.
pub trait PolygonRenderer {
    fn draw_polygon(
        &mut self,
        surface: &mut dyn Surface,
        polygon: &Polygon,
    ) -> Option<ColoredPolygon>;
}

/// Provides the color of each vertex to the [`DottedRenderer`].
///
/// This trait is also implemented for closures with signature
/// `FnMut(usize, &Polygon) -> Color` and for [`Color`] (all vertices get that color).
pub trait ColorProvider {
    fn color(&mut self, vertex: usize, polygon: &Polygon) -> Color;
}

impl<F> ColorProvider for F
where
    F: FnMut(usize, &Polygon) -> Color,
{
    fn color(&mut self, vertex: usize, polygon: &Polygon) -> Color {
        self(vertex, polygon)
    }
}

impl ColorProvider for Color {
    fn color(&mut self, _: usize, _: &Polygon) -> Color {
        *self
    }
}

/// One continuous stroke smoothed with quadratic curves through the midpoints of consecutive
/// vertices, in a single color.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SmoothRenderer {
    pub line_width: f32,
    pub color: Color,
}

impl SmoothRenderer {
    pub fn new(line_width: f32, color: Color) -> Self {
        SmoothRenderer { line_width, color }
    }

    fn build_path(points: &[Point]) -> Path {
        let n = points.len();
        let mut builder = Path::builder();
        builder.begin(points[0]);
        for i in 1..n - 2 {
            let ctrl = points[i];
            let to = ctrl.lerp(points[i + 1], 0.5);
            builder.quadratic_bezier_to(ctrl, to);
        }
        builder.quadratic_bezier_to(points[n - 2], points[n - 1]);
        builder.end(false);

        builder.build()
    }
}

impl PolygonRenderer for SmoothRenderer {
    fn draw_polygon(
        &mut self,
        surface: &mut dyn Surface,
        polygon: &Polygon,
    ) -> Option<ColoredPolygon> {
        if polygon.len() < 3 {
            return None;
        }

        let path = Self::build_path(polygon.points());
        with_preserved_style(surface, |surface| {
            surface.set_line_cap(LineCap::Round);
            surface.set_line_width(self.line_width);
            surface.set_stroke_color(self.color);
            surface.set_composite_mode(CompositeMode::SourceOver);
            surface.stroke_path(&path);
        });

        Some(ColoredPolygon::uniform(polygon.clone(), self.color))
    }
}

/// Draws the polygon several times, from the widest line to the narrowest.
///
/// Each segment is colored by its position along the stroke (the hue goes from 0 to
/// `max_hue`) and each pass by its width (the saturation grows as the lines get narrower).
/// The returned colors are the ones of the last, narrowest pass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LayeredGradientRenderer {
    pub min_line_width: f32,
    pub max_line_width: f32,
    pub gradient_lines: u32,
    pub max_hue: f32,
}

impl LayeredGradientRenderer {
    pub const DEFAULT_MAX_HUE: f32 = 270.0;

    pub fn new(min_line_width: f32, max_line_width: f32, gradient_lines: u32) -> Self {
        LayeredGradientRenderer {
            min_line_width,
            max_line_width,
            gradient_lines,
            max_hue: Self::DEFAULT_MAX_HUE,
        }
    }

    pub fn with_max_hue(mut self, max_hue: f32) -> Self {
        self.max_hue = max_hue;
        self
    }

    /// Color of the segment starting at `vertex` in the pass of the given saturation.
    pub fn segment_color(&self, vertex: usize, vertex_count: usize, saturation: f32) -> Color {
        let progress = vertex as f32 / vertex_count as f32;
        Color::hsb(self.max_hue * progress, saturation, 1.0)
    }

    fn draw_pass(
        &self,
        surface: &mut dyn Surface,
        points: &[Point],
        saturation: f32,
    ) -> Vec<Color> {
        let mut colors = Vec::with_capacity(points.len());
        for (i, segment) in points.windows(2).enumerate() {
            let color = self.segment_color(i, points.len(), saturation);
            colors.push(color);
            surface.set_stroke_color(color);
            surface.stroke_polyline(segment);
        }

        // The last vertex takes the color of the last segment.
        if let Some(last) = colors.last().copied() {
            colors.push(last);
        }

        colors
    }
}

impl PolygonRenderer for LayeredGradientRenderer {
    fn draw_polygon(
        &mut self,
        surface: &mut dyn Surface,
        polygon: &Polygon,
    ) -> Option<ColoredPolygon> {
        if polygon.len() < 2 {
            return None;
        }

        let lines = self.gradient_lines;
        let step = if lines > 0 {
            (self.max_line_width - self.min_line_width) / lines as f32
        } else {
            0.0
        };

        let colors = with_preserved_style(surface, |surface| {
            surface.set_line_cap(LineCap::Round);

            let mut colors = Vec::new();
            let mut width = self.max_line_width;
            for line in 0..=lines {
                let saturation = (line + 1) as f32 / (lines + 1) as f32;
                surface.set_line_width(width);
                colors = self.draw_pass(surface, polygon.points(), saturation);
                width -= step;
            }

            colors
        });

        Some(ColoredPolygon::new(polygon.clone(), colors))
    }
}

/// Draws one filled dot per vertex, colored by a [`ColorProvider`].
pub struct DottedRenderer<P> {
    pub dot_size: f32,
    pub provider: P,
}

impl<P: ColorProvider> DottedRenderer<P> {
    pub fn new(dot_size: f32, provider: P) -> Self {
        DottedRenderer { dot_size, provider }
    }
}

impl<P: ColorProvider> PolygonRenderer for DottedRenderer<P> {
    fn draw_polygon(
        &mut self,
        surface: &mut dyn Surface,
        polygon: &Polygon,
    ) -> Option<ColoredPolygon> {
        if polygon.len() < 2 {
            return None;
        }

        let radius = self.dot_size / 2.0;
        let colors = with_preserved_style(surface, |surface| {
            surface.set_line_cap(LineCap::Round);
            surface.set_line_width(self.dot_size);

            let mut colors = Vec::with_capacity(polygon.len());
            for (i, vertex) in polygon.iter().enumerate() {
                let color = self.provider.color(i, polygon);
                surface.fill_circle(*vertex, radius, color);
                colors.push(color);
            }

            colors
        });

        Some(ColoredPolygon::new(polygon.clone(), colors))
    }
}

/// Selects and parameterizes one of the renderers.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum RendererConfig {
    Smooth {
        line_width: f32,
        color: Color,
    },
    LayeredGradient {
        min_line_width: f32,
        max_line_width: f32,
        gradient_lines: u32,
        max_hue: f32,
    },
    Dotted {
        dot_size: f32,
        color: Color,
    },
}

impl RendererConfig {
    pub fn build(&self) -> Box<dyn PolygonRenderer> {
        match *self {
            RendererConfig::Smooth { line_width, color } => {
                Box::new(SmoothRenderer::new(line_width, color))
            }
            RendererConfig::LayeredGradient {
                min_line_width,
                max_line_width,
                gradient_lines,
                max_hue,
            } => Box::new(
                LayeredGradientRenderer::new(min_line_width, max_line_width, gradient_lines)
                    .with_max_hue(max_hue),
            ),
            RendererConfig::Dotted { dot_size, color } => {
                Box::new(DottedRenderer::new(dot_size, color))
            }
        }
    }
}

#[cfg(test)]
use crate::geom::math::point;
#[cfg(test)]
use crate::surface::SurfaceStyle;
#[cfg(test)]
use crate::Canvas;

#[cfg(test)]
fn custom_style() -> SurfaceStyle {
    SurfaceStyle {
        line_cap: LineCap::Butt,
        stroke_color: Color::rgb(0.0, 1.0, 0.0),
        line_width: 3.0,
        composite_mode: CompositeMode::Copy,
    }
}

#[cfg(test)]
fn line(n: usize) -> Polygon {
    (0..n).map(|i| point(20.0 + i as f32 * 10.0, 50.0)).collect()
}

#[test]
fn degenerate_polygons_are_not_drawn() {
    let mut canvas = Canvas::new(100, 100);
    let single = Polygon::from(vec![point(50.0, 50.0)]);

    let mut renderers = vec![
        RendererConfig::Smooth {
            line_width: 5.0,
            color: Color::BLACK,
        }
        .build(),
        RendererConfig::LayeredGradient {
            min_line_width: 2.0,
            max_line_width: 10.0,
            gradient_lines: 4,
            max_hue: 270.0,
        }
        .build(),
        RendererConfig::Dotted {
            dot_size: 5.0,
            color: Color::BLACK,
        }
        .build(),
    ];

    for renderer in &mut renderers {
        assert!(renderer.draw_polygon(&mut canvas, &Polygon::new()).is_none());
        assert!(renderer.draw_polygon(&mut canvas, &single).is_none());
    }

    assert!(renderers[0].draw_polygon(&mut canvas, &line(2)).is_none());
    assert!(renderers[1].draw_polygon(&mut canvas, &line(2)).is_some());
    assert!(renderers[2].draw_polygon(&mut canvas, &line(2)).is_some());

    assert!(canvas.image().pixels().filter(|p| p.0[3] != 0).count() > 0);
}

#[test]
fn renderers_preserve_style() {
    let mut canvas = Canvas::new(100, 100);
    canvas.set_style(custom_style());

    let mut smooth = SmoothRenderer::new(5.0, Color::BLACK);
    let mut gradient = LayeredGradientRenderer::new(2.0, 10.0, 3);
    let mut dotted = DottedRenderer::new(4.0, |_: usize, _: &Polygon| Color::WHITE);

    smooth.draw_polygon(&mut canvas, &line(5)).unwrap();
    assert_eq!(canvas.style(), custom_style());
    gradient.draw_polygon(&mut canvas, &line(5)).unwrap();
    assert_eq!(canvas.style(), custom_style());
    dotted.draw_polygon(&mut canvas, &line(5)).unwrap();
    assert_eq!(canvas.style(), custom_style());
}

#[test]
fn smooth_renderer_uses_one_color() {
    let mut canvas = Canvas::new(100, 100);
    let mut renderer = SmoothRenderer::new(4.0, Color::rgb(1.0, 0.0, 0.0));
    let polygon = Polygon::from(vec![point(10.0, 10.0), point(50.0, 80.0), point(90.0, 10.0)]);

    let colored = renderer.draw_polygon(&mut canvas, &polygon).unwrap();
    assert_eq!(colored.polygon(), &polygon);
    assert!(colored.colors().iter().all(|c| *c == Color::rgb(1.0, 0.0, 0.0)));

    // Both ends are drawn, the middle control point is not reached by the curve.
    assert_eq!(canvas.pixel(10, 10), Some([255, 0, 0, 255]));
    assert_eq!(canvas.pixel(89, 10), Some([255, 0, 0, 255]));
    assert_eq!(canvas.pixel(50, 79), Some([0, 0, 0, 0]));
}

#[test]
fn gradient_hue_follows_the_stroke() {
    let mut canvas = Canvas::new(200, 100);
    canvas.clear(Some(Color::WHITE));
    let mut renderer = LayeredGradientRenderer::new(6.0, 20.0, 7);
    let polygon = line(10);

    let colored = renderer.draw_polygon(&mut canvas, &polygon).unwrap();
    let colors = colored.colors();
    assert_eq!(colors.len(), 10);

    // Saturated colors with hues growing along the stroke, the last one repeated.
    for (i, color) in colors.iter().enumerate().take(9) {
        let expected = 270.0 * i as f32 / 10.0;
        assert!((color.hue() - expected).abs() < 1e-3, "{} {}", color.hue(), expected);
    }
    assert_eq!(colors[9], colors[8]);
    assert!(colors[0].approx_eq(&Color::rgb(1.0, 0.0, 0.0)));

    // The narrowest pass is fully saturated, the outer passes are paler.
    assert_eq!(canvas.pixel(21, 50), Some([255, 0, 0, 255]));
    let outer = canvas.pixel(21, 58).unwrap();
    assert_eq!(outer[0], 255);
    assert!(outer[1] > 0 && outer[1] == outer[2]);
    assert_eq!(canvas.pixel(21, 70), Some([255, 255, 255, 255]));
}

#[test]
fn dotted_renderer_asks_the_provider() {
    let mut canvas = Canvas::new(100, 100);
    let mut calls = Vec::new();
    let colored = {
        let mut renderer = DottedRenderer::new(6.0, |i: usize, p: &Polygon| {
            calls.push((i, p.len()));
            if i % 2 == 0 {
                Color::rgb(0.0, 0.0, 1.0)
            } else {
                Color::rgb(0.0, 1.0, 0.0)
            }
        });
        renderer.draw_polygon(&mut canvas, &line(4)).unwrap()
    };

    assert_eq!(calls, vec![(0, 4), (1, 4), (2, 4), (3, 4)]);
    assert_eq!(colored.colors()[1], Color::rgb(0.0, 1.0, 0.0));
    assert_eq!(canvas.pixel(20, 50), Some([0, 0, 255, 255]));
    assert_eq!(canvas.pixel(30, 50), Some([0, 255, 0, 255]));
    // Dots of diameter 6 spaced by 10 leave gaps.
    assert_eq!(canvas.pixel(25, 50), Some([0, 0, 0, 0]));
}
