use crate::geom::Color;

/// Parameters of a tracing session, shared with the host that draws it.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct TraceOptions {
    /// Color of the strokes drawn by the user.
    ///
    /// Default value: white.
    pub drawing_color: Color,

    /// Color of the reference outlines shown as hints.
    ///
    /// Default value: 30% grey.
    pub hint_color: Color,

    /// Default value: `500`.
    pub field_width: u32,

    /// Default value: `500`.
    pub field_height: u32,

    /// Width of the drawn lines, in field pixels.
    ///
    /// Default value: `15.0`.
    pub line_width: f32,

    /// Whether the direction of the next stroke is hinted with an arrow.
    ///
    /// Default value: `true`.
    pub show_hint_arrows: bool,
}

impl TraceOptions {
    pub const DEFAULT_LINE_WIDTH: f32 = 15.0;

    pub const DEFAULT: Self = TraceOptions {
        drawing_color: Color::WHITE,
        hint_color: Color::rgb(0.3, 0.3, 0.3),
        field_width: 500,
        field_height: 500,
        line_width: Self::DEFAULT_LINE_WIDTH,
        show_hint_arrows: true,
    };

    pub const fn with_drawing_color(mut self, color: Color) -> Self {
        self.drawing_color = color;
        self
    }

    pub const fn with_hint_color(mut self, color: Color) -> Self {
        self.hint_color = color;
        self
    }

    pub const fn with_field_size(mut self, width: u32, height: u32) -> Self {
        self.field_width = width;
        self.field_height = height;
        self
    }

    pub const fn with_line_width(mut self, line_width: f32) -> Self {
        self.line_width = line_width;
        self
    }

    pub const fn with_hint_arrows(mut self, show: bool) -> Self {
        self.show_hint_arrows = show;
        self
    }
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Tuning of the [`VerificationEngine`](crate::VerificationEngine).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct VerificationOptions {
    /// Number of narrowing passes of the reference gradient, in addition to the widest one.
    ///
    /// Default value: `10`.
    pub gradient_lines: u32,

    /// Width of the narrowest gradient pass, within which a perfect score is possible.
    ///
    /// Default value: `30.0`.
    pub min_gradient_line_width: f32,

    /// Width of the widest gradient pass, outside of which nothing scores.
    ///
    /// Default value: `105.0`.
    pub max_gradient_line_width: f32,

    /// Diameter of the dots drawn for the candidate stroke.
    ///
    /// Default value: `15.0`.
    pub to_verify_dot_size: f32,

    /// Color differences are raised to `1 / color_correctness_exp`. Above 1.0 wrong pixels
    /// weigh more, below 1.0 they weigh less.
    ///
    /// Default value: `0.6`.
    pub color_correctness_exp: f32,

    /// The relative vertex count difference is raised to `1 / length_correctness_exp`.
    ///
    /// Default value: `0.5`.
    pub length_correctness_exp: f32,

    /// Angle in degrees, between 1 and 360, at which a direction sample scores zero
    /// (twice this angle if above 180).
    ///
    /// Default value: `180.0`.
    pub max_angle_range_to_score: f32,

    /// Default value: `20`.
    pub angular_diff_max_check_samples: usize,

    /// Number of attempts at one stroke.
    ///
    /// Default value: `3`.
    pub max_tries: u32,

    /// Default value: `0.6`.
    pub min_image_similarity: f32,

    /// Default value: `0.4`.
    pub min_length_similarity: f32,

    /// Default value: `0.6`.
    pub min_angular_similarity: f32,

    /// Default value: `500`.
    pub field_width: u32,

    /// Default value: `500`.
    pub field_height: u32,

    /// Composite the compared images on a debug surface.
    ///
    /// Default value: `false`.
    pub debug: bool,
}

impl VerificationOptions {
    pub const DEFAULT: Self = VerificationOptions {
        gradient_lines: 10,
        min_gradient_line_width: 30.0,
        max_gradient_line_width: 105.0,
        to_verify_dot_size: 15.0,
        color_correctness_exp: 0.6,
        length_correctness_exp: 0.5,
        max_angle_range_to_score: 180.0,
        angular_diff_max_check_samples: 20,
        max_tries: 3,
        min_image_similarity: 0.6,
        min_length_similarity: 0.4,
        min_angular_similarity: 0.6,
        field_width: 500,
        field_height: 500,
        debug: false,
    };

    /// Gradient and dot sizes proportional to the line width of the session.
    pub fn for_trace_options(options: &TraceOptions) -> Self {
        let line_width = options.line_width;
        VerificationOptions {
            min_gradient_line_width: line_width * 2.0,
            max_gradient_line_width: line_width * 7.0,
            to_verify_dot_size: line_width,
            field_width: options.field_width,
            field_height: options.field_height,
            ..Self::DEFAULT
        }
    }

    pub const fn with_max_tries(mut self, max_tries: u32) -> Self {
        self.max_tries = max_tries;
        self
    }

    pub const fn with_thresholds(mut self, image: f32, length: f32, angular: f32) -> Self {
        self.min_image_similarity = image;
        self.min_length_similarity = length;
        self.min_angular_similarity = angular;
        self
    }

    pub const fn with_gradient(mut self, min_width: f32, max_width: f32, lines: u32) -> Self {
        self.min_gradient_line_width = min_width;
        self.max_gradient_line_width = max_width;
        self.gradient_lines = lines;
        self
    }

    pub const fn with_dot_size(mut self, dot_size: f32) -> Self {
        self.to_verify_dot_size = dot_size;
        self
    }

    pub const fn with_exponents(mut self, color: f32, length: f32) -> Self {
        self.color_correctness_exp = color;
        self.length_correctness_exp = length;
        self
    }

    pub const fn with_angular_sampling(mut self, max_angle_range: f32, max_samples: usize) -> Self {
        self.max_angle_range_to_score = max_angle_range;
        self.angular_diff_max_check_samples = max_samples;
        self
    }

    pub const fn with_field_size(mut self, width: u32, height: u32) -> Self {
        self.field_width = width;
        self.field_height = height;
        self
    }

    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

impl Default for VerificationOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[test]
fn derived_verification_options() {
    let options = VerificationOptions::for_trace_options(
        &TraceOptions::DEFAULT.with_line_width(10.0).with_field_size(300, 200),
    );

    assert_eq!(options.min_gradient_line_width, 20.0);
    assert_eq!(options.max_gradient_line_width, 70.0);
    assert_eq!(options.to_verify_dot_size, 10.0);
    assert_eq!(options.field_width, 300);
    assert_eq!(options.field_height, 200);
    assert_eq!(options.max_tries, VerificationOptions::DEFAULT.max_tries);

    // The default line width gives the default sizes.
    assert_eq!(
        VerificationOptions::for_trace_options(&TraceOptions::DEFAULT),
        VerificationOptions::DEFAULT
    );
}
