use crate::flatten::flatten_cubic;
use crate::geom::math::{point, Point};
use crate::geom::utils::round_to_decimals;
use crate::geom::{CubicBezierSegment, Polygon};
use crate::CompilerOptions;

use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Clone, Debug, PartialEq)]
pub enum ParseError {
    #[error("Line {line} Column {column}: Expected number, got {src:?}.")]
    Number { src: String, line: i32, column: i32 },
    #[error("Line {line} Column {column}: Invalid command {command:?}.")]
    Command {
        command: char,
        line: i32,
        column: i32,
    },
    #[error("Line {line} Column {column}: Unsupported command {command:?}.")]
    UnsupportedCommand {
        command: char,
        line: i32,
        column: i32,
    },
    #[error("Line {line} Column {column}: Expected move-to command, got {command:?}.")]
    MissingMoveTo {
        command: char,
        line: i32,
        column: i32,
    },
    #[error("Line {line} Column {column}: Missing parameters for command {command:?}.")]
    MissingParameters {
        command: char,
        line: i32,
        column: i32,
    },
}

// A buffered iterator of characters keeping track of line and column.
pub struct Source<Iter> {
    src: Iter,
    current: char,
    line: i32,
    col: i32,
    finished: bool,
}

impl<Iter: Iterator<Item = char>> Source<Iter> {
    pub fn new<IntoIter>(src: IntoIter) -> Self
    where
        IntoIter: IntoIterator<IntoIter = Iter>,
    {
        let mut src = src.into_iter();

        let (current, finished) = match src.next() {
            Some(c) => (c, false),
            None => (' ', true),
        };

        let line = if current == '\n' { 1 } else { 0 };

        Source {
            current,
            finished,
            src,
            line,
            col: 0,
        }
    }

    fn skip_whitespace(&mut self) {
        while !self.finished && (self.current.is_whitespace() || self.current == ',') {
            self.advance_one();
        }
    }

    fn advance_one(&mut self) {
        if self.finished {
            return;
        }
        match self.src.next() {
            Some('\n') => {
                self.current = '\n';
                self.line += 1;
                self.col = -1;
            }
            Some(c) => {
                self.current = c;
                self.col += 1;
            }
            None => {
                self.current = '~';
                self.finished = true;
            }
        }
    }
}

/// Compiles path data into stroke polygons.
///
/// The accepted syntax is the subset of the SVG path syntax used by stroke outlines:
/// move-to, line-to, horizontal and vertical line-to, cubic and smooth cubic curves and
/// close-path, in absolute or relative form, with implicit command repetition.
/// Quadratic curves and arcs are rejected with [`ParseError::UnsupportedCommand`].
///
/// Each move-to starts a new polygon. Line commands append their end point, close-path
/// appends the start of the current subpath and curves are flattened into several vertices.
/// A drawing command following a close-path continues the same polygon from the start of
/// the subpath.
#[derive(Debug, Default)]
pub struct PathCompiler {
    float_buffer: String,
    current_position: Point,
    current_command: char,
    tolerance: f32,
    decimals: Option<u32>,
}

impl PathCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles one path data string, producing one polygon per subpath.
    pub fn compile(
        &mut self,
        options: &CompilerOptions,
        src: &str,
    ) -> Result<Vec<Polygon>, ParseError> {
        self.tolerance = options.tolerance;
        self.decimals = options.decimals;

        let mut output = Vec::new();
        self.parse_path(&mut Source::new(src.chars()), &mut output)?;

        Ok(output)
    }

    fn parse_path(
        &mut self,
        src: &mut Source<impl Iterator<Item = char>>,
        output: &mut Vec<Polygon>,
    ) -> Result<(), ParseError> {
        // A relative move-to at the start of the path is resolved against the origin.
        self.current_position = point(0.0, 0.0);
        let mut first_position = point(0.0, 0.0);

        let mut need_start = true;
        let mut prev_cubic_ctrl = None;
        let mut implicit_cmd = 'M';

        src.skip_whitespace();

        while !src.finished {
            let mut cmd = src.current;
            let cmd_line = src.line;
            let cmd_col = src.col;

            if cmd.is_ascii_alphabetic() {
                src.advance_one();
            } else {
                cmd = implicit_cmd;
            }

            match cmd {
                'q' | 'Q' | 't' | 'T' | 'a' | 'A' => {
                    return Err(ParseError::UnsupportedCommand {
                        command: cmd,
                        line: cmd_line,
                        column: cmd_col,
                    });
                }
                'm' | 'M' | 'l' | 'L' | 'h' | 'H' | 'v' | 'V' | 'c' | 'C' | 's' | 'S' | 'z'
                | 'Z' => {}
                _ => {
                    return Err(ParseError::Command {
                        command: cmd,
                        line: cmd_line,
                        column: cmd_col,
                    });
                }
            }

            if need_start && cmd != 'm' && cmd != 'M' {
                return Err(ParseError::MissingMoveTo {
                    command: cmd,
                    line: cmd_line,
                    column: cmd_col,
                });
            }

            self.current_command = cmd;
            let is_relative = cmd.is_lowercase();

            match cmd {
                'l' | 'L' => {
                    let to = self.parse_endpoint(is_relative, src)?;
                    self.emit(output, to);
                }
                'h' | 'H' => {
                    let mut x = self.parse_number(src)?;
                    if is_relative {
                        x += self.current_position.x;
                    }
                    let to = point(x, self.current_position.y);
                    self.current_position = to;
                    self.emit(output, to);
                }
                'v' | 'V' => {
                    let mut y = self.parse_number(src)?;
                    if is_relative {
                        y += self.current_position.y;
                    }
                    let to = point(self.current_position.x, y);
                    self.current_position = to;
                    self.emit(output, to);
                }
                'c' | 'C' => {
                    let from = self.current_position;
                    let ctrl1 = self.parse_point(is_relative, src)?;
                    let ctrl2 = self.parse_point(is_relative, src)?;
                    let to = self.parse_endpoint(is_relative, src)?;
                    prev_cubic_ctrl = Some(ctrl2);
                    self.cubic_bezier_to(output, from, ctrl1, ctrl2, to);
                }
                's' | 'S' => {
                    let from = self.current_position;
                    let ctrl1 = self.get_smooth_ctrl(prev_cubic_ctrl);
                    let ctrl2 = self.parse_point(is_relative, src)?;
                    let to = self.parse_endpoint(is_relative, src)?;
                    prev_cubic_ctrl = Some(ctrl2);
                    self.cubic_bezier_to(output, from, ctrl1, ctrl2, to);
                }
                'm' | 'M' => {
                    let to = self.parse_endpoint(is_relative, src)?;
                    first_position = to;
                    output.push(Polygon::new());
                    self.emit(output, to);
                    need_start = false;
                }
                'z' | 'Z' => {
                    self.current_position = first_position;
                    self.emit(output, first_position);
                }
                _ => unreachable!(),
            }

            if !matches!(cmd, 'c' | 'C' | 's' | 'S') {
                prev_cubic_ctrl = None;
            }

            implicit_cmd = match cmd {
                'm' => 'l',
                'M' => 'L',
                'z' => 'm',
                'Z' => 'M',
                c => c,
            };

            src.skip_whitespace();
        }

        Ok(())
    }

    fn emit(&self, output: &mut [Polygon], position: Point) {
        let position = match self.decimals {
            Some(decimals) => point(
                round_to_decimals(position.x, decimals),
                round_to_decimals(position.y, decimals),
            ),
            None => position,
        };

        if let Some(polygon) = output.last_mut() {
            polygon.push(position);
        }
    }

    fn cubic_bezier_to(
        &self,
        output: &mut [Polygon],
        from: Point,
        ctrl1: Point,
        ctrl2: Point,
        to: Point,
    ) {
        let curve = CubicBezierSegment {
            from,
            ctrl1,
            ctrl2,
            to,
        };

        flatten_cubic(&curve, self.tolerance, &mut |p| self.emit(output, p));
        self.emit(output, to);
    }

    fn get_smooth_ctrl(&self, prev_ctrl: Option<Point>) -> Point {
        if let Some(prev_ctrl) = prev_ctrl {
            self.current_position + (self.current_position - prev_ctrl)
        } else {
            self.current_position
        }
    }

    fn parse_endpoint(
        &mut self,
        is_relative: bool,
        src: &mut Source<impl Iterator<Item = char>>,
    ) -> Result<Point, ParseError> {
        let position = self.parse_point(is_relative, src)?;
        self.current_position = position;

        Ok(position)
    }

    fn parse_point(
        &mut self,
        is_relative: bool,
        src: &mut Source<impl Iterator<Item = char>>,
    ) -> Result<Point, ParseError> {
        let mut x = self.parse_number(src)?;
        let mut y = self.parse_number(src)?;

        if is_relative {
            x += self.current_position.x;
            y += self.current_position.y;
        }

        Ok(point(x, y))
    }

    fn parse_number(
        &mut self,
        src: &mut Source<impl Iterator<Item = char>>,
    ) -> Result<f32, ParseError> {
        self.float_buffer.clear();

        src.skip_whitespace();

        let line = src.line;
        let column = src.col;

        if src.finished || src.current.is_ascii_alphabetic() {
            return Err(ParseError::MissingParameters {
                command: self.current_command,
                line,
                column,
            });
        }

        if src.current == '-' || src.current == '+' {
            self.float_buffer.push(src.current);
            src.advance_one();
        }

        while src.current.is_ascii_digit() {
            self.float_buffer.push(src.current);
            src.advance_one();
        }

        if src.current == '.' {
            self.float_buffer.push('.');
            src.advance_one();

            while src.current.is_ascii_digit() {
                self.float_buffer.push(src.current);
                src.advance_one();
            }
        }

        if src.current == 'e' || src.current == 'E' {
            self.float_buffer.push(src.current);
            src.advance_one();

            if src.current == '-' || src.current == '+' {
                self.float_buffer.push(src.current);
                src.advance_one();
            }

            while src.current.is_ascii_digit() {
                self.float_buffer.push(src.current);
                src.advance_one();
            }
        }

        match self.float_buffer.parse::<f32>() {
            Ok(val) => Ok(val),
            Err(_) => Err(ParseError::Number {
                src: std::mem::take(&mut self.float_buffer),
                line,
                column,
            }),
        }
    }
}

#[cfg(test)]
fn compile(src: &str) -> Result<Vec<Polygon>, ParseError> {
    PathCompiler::new().compile(&CompilerOptions::DEFAULT, src)
}

#[test]
fn empty() {
    assert_eq!(compile(""), Ok(Vec::new()));
    assert_eq!(compile("  \n "), Ok(Vec::new()));
}

#[test]
fn lines_and_relative_commands() {
    let polygons = compile("M 10 10 L 20 10 h 5 v -5 l -1,-1 H 0 V 0").unwrap();
    assert_eq!(polygons.len(), 1);
    assert_eq!(
        polygons[0].points(),
        &[
            point(10.0, 10.0),
            point(20.0, 10.0),
            point(25.0, 10.0),
            point(25.0, 5.0),
            point(24.0, 4.0),
            point(0.0, 4.0),
            point(0.0, 0.0),
        ]
    );
}

#[test]
fn close_and_subpaths() {
    let polygons = compile("M 0 0 L 1 0 L 1 1 Z m 5 5 l 1 0").unwrap();
    assert_eq!(polygons.len(), 2);
    assert_eq!(
        polygons[0].points(),
        &[point(0.0, 0.0), point(1.0, 0.0), point(1.0, 1.0), point(0.0, 0.0)]
    );
    // After a close-path, a relative move-to is resolved against the subpath start.
    assert_eq!(polygons[1].points(), &[point(5.0, 5.0), point(6.0, 5.0)]);
}

#[test]
fn implicit_polyline() {
    let polygons = compile("0 0 1 1 2 2").unwrap();
    assert_eq!(polygons.len(), 1);
    assert_eq!(
        polygons[0].points(),
        &[point(0.0, 0.0), point(1.0, 1.0), point(2.0, 2.0)]
    );

    let polygons = compile("m 1 1 1 1 1 1").unwrap();
    assert_eq!(
        polygons[0].points(),
        &[point(1.0, 1.0), point(2.0, 2.0), point(3.0, 3.0)]
    );
}

#[test]
fn compact_numbers() {
    let polygons = compile("M0.6.5L-1-2e1").unwrap();
    assert_eq!(polygons[0].points(), &[point(0.6, 0.5), point(-1.0, -20.0)]);
}

#[test]
fn straight_cubic_is_not_subdivided() {
    // Collinear control points are within any tolerance: only the midpoint and the end.
    let polygons = compile("M 0 0 C 10 0 20 0 30 0").unwrap();
    assert_eq!(
        polygons[0].points(),
        &[point(0.0, 0.0), point(15.0, 0.0), point(30.0, 0.0)]
    );
}

#[test]
fn curved_cubic_is_flattened() {
    let polygons = compile("M 0 0 C 0 50 50 50 50 0").unwrap();
    let points = polygons[0].points();
    assert!(points.len() > 10);
    assert_eq!(points[0], point(0.0, 0.0));
    assert_eq!(*points.last().unwrap(), point(50.0, 0.0));
    // The curve peaks at y = 37.5 and every emitted vertex lies under it.
    for p in points {
        assert!(p.y >= 0.0 && p.y <= 37.5 + 1e-3);
    }
    // Vertices progress from start to end.
    for w in points.windows(2) {
        assert!(w[1].x >= w[0].x);
    }
}

#[test]
fn smooth_cubic_reflects_previous_control() {
    let reflected = compile("M 0 0 C 0 10 10 10 10 0 S 20 -10 20 0").unwrap();
    let explicit = compile("M 0 0 C 0 10 10 10 10 0 C 10 -10 20 -10 20 0").unwrap();
    assert_eq!(reflected, explicit);

    // Without a previous cubic, the first control point is the current point.
    let smooth = compile("M 0 0 L 10 0 S 20 10 20 0").unwrap();
    let explicit = compile("M 0 0 L 10 0 C 10 0 20 10 20 0").unwrap();
    assert_eq!(smooth, explicit);
}

#[test]
fn rounding_to_decimals() {
    let options = CompilerOptions::DEFAULT.with_decimals(Some(1));
    let polygons = PathCompiler::new()
        .compile(&options, "M 0.123 0.987 L 2.56 3.04")
        .unwrap();
    assert_eq!(polygons[0].points(), &[point(0.1, 1.0), point(2.6, 3.0)]);
}

#[test]
fn unsupported_commands() {
    assert_eq!(
        compile("M 0 0 Q 1 1 2 2"),
        Err(ParseError::UnsupportedCommand {
            command: 'Q',
            line: 0,
            column: 6
        })
    );
    assert!(matches!(
        compile("M 0 0 a 1 1 0 0 1 2 2"),
        Err(ParseError::UnsupportedCommand { command: 'a', .. })
    ));
}

#[test]
fn invalid_cmd() {
    assert_eq!(
        compile("x 0 0"),
        Err(ParseError::Command {
            command: 'x',
            line: 0,
            column: 0
        })
    );
}

#[test]
fn missing_move_to() {
    assert!(matches!(
        compile("L 1 1"),
        Err(ParseError::MissingMoveTo { command: 'L', .. })
    ));
}

#[test]
fn drawing_after_close() {
    let polygons = compile("M 0 0 L 4 0 L 4 4 Z L 0 4 l 0 1").unwrap();
    assert_eq!(polygons.len(), 1);
    assert_eq!(
        polygons[0].points(),
        &[
            point(0.0, 0.0),
            point(4.0, 0.0),
            point(4.0, 4.0),
            point(0.0, 0.0),
            point(0.0, 4.0),
            point(0.0, 5.0),
        ]
    );

    // Bare numbers after a close-path are a move-to.
    let polygons = compile("M 0 0 L 1 0 Z 5 5 6 6").unwrap();
    assert_eq!(polygons.len(), 2);
    assert_eq!(polygons[1].points(), &[point(5.0, 5.0), point(6.0, 6.0)]);
}

#[test]
fn missing_parameters() {
    assert!(matches!(
        compile("M 0 0 L 1"),
        Err(ParseError::MissingParameters { command: 'L', .. })
    ));
    assert!(matches!(
        compile("M 0 0 C 1 1 2 2 L 3 3"),
        Err(ParseError::MissingParameters { command: 'C', .. })
    ));
}

#[test]
fn malformed_number() {
    assert!(matches!(compile("M 0 -"), Err(ParseError::Number { .. })));
    assert!(matches!(compile("M 0 0 L . 1"), Err(ParseError::Number { .. })));
}
