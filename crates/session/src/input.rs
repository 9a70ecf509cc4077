//! Turning pointer events into strokes.

use crate::controller::TraceSession;
use crate::geom::math::{point, Point, Size};
use crate::geom::Polygon;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum PointerButton {
    /// Draws.
    Primary,
    /// Shows the strokes confirmed so far while held.
    Secondary,
    /// Shows the verification debug surface while held.
    Auxiliary,
}

/// A pointer event, in viewport coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum PointerEvent {
    Press { position: Point, button: PointerButton },
    Move { position: Point },
    Release { position: Point, button: PointerButton },
    Leave,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputAction {
    /// A stroke was drawn, in field coordinates, while the tracker was attached for
    /// `session`.
    StrokeFinished {
        stroke: Polygon,
        session: TraceSession,
    },
    PeekConfirmed,
    PeekDebug,
    EndPeek,
}

/// Accumulates the points of the stroke being drawn.
///
/// The viewport the events are expressed in can differ from the field the strokes are
/// verified in; points are scaled accordingly.
///
/// Drawing events are ignored while the tracker is detached. It detaches itself each time
/// a stroke is finished, the host attaches it again for the current
/// [`TraceSession`] when the next stroke can be drawn. Finished strokes carry that session
/// so that [`StrokeController::submit_traced`](crate::StrokeController::submit_traced)
/// can reject the ones drawn for a character that is not traced anymore.
#[derive(Clone, Debug)]
pub struct PointerTracker {
    field: Size,
    viewport: Size,
    session: Option<TraceSession>,
    stroke: Option<Polygon>,
    peek: Option<PointerButton>,
}

impl PointerTracker {
    pub fn new(field: Size, viewport: Size) -> Self {
        PointerTracker {
            field,
            viewport,
            session: None,
            stroke: None,
            peek: None,
        }
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    pub fn attach(&mut self, session: TraceSession) {
        if self.session != Some(session) {
            self.stroke = None;
        }
        self.session = Some(session);
    }

    /// Also drops the stroke being drawn.
    pub fn detach(&mut self) {
        self.session = None;
        self.stroke = None;
    }

    /// Detaches the tracker if it was attached for another session than `current`.
    ///
    /// Returns whether it did.
    pub fn detach_stale(&mut self, current: TraceSession) -> bool {
        match self.session {
            Some(session) if session != current => {
                self.detach();
                true
            }
            _ => false,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.session.is_some()
    }

    /// The session the tracker is attached for.
    pub fn session(&self) -> Option<TraceSession> {
        self.session
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    /// The points drawn so far, in field coordinates.
    pub fn current_stroke(&self) -> Option<&Polygon> {
        self.stroke.as_ref()
    }

    pub fn to_field(&self, position: Point) -> Point {
        let sx = if self.viewport.width > 0.0 {
            self.field.width / self.viewport.width
        } else {
            1.0
        };
        let sy = if self.viewport.height > 0.0 {
            self.field.height / self.viewport.height
        } else {
            1.0
        };

        point(position.x * sx, position.y * sy)
    }

    pub fn handle(&mut self, event: PointerEvent) -> Option<InputAction> {
        match event {
            PointerEvent::Press { position, button } => match button {
                PointerButton::Primary => {
                    if self.session.is_some() && self.peek.is_none() {
                        let start = self.to_field(position);
                        self.stroke = Some(Polygon::from(vec![start]));
                    }
                    None
                }
                PointerButton::Secondary | PointerButton::Auxiliary => {
                    if self.stroke.is_some() || self.peek.is_some() {
                        return None;
                    }
                    self.peek = Some(button);
                    Some(if button == PointerButton::Secondary {
                        InputAction::PeekConfirmed
                    } else {
                        InputAction::PeekDebug
                    })
                }
            },
            PointerEvent::Move { position } => {
                let position = self.to_field(position);
                if let Some(stroke) = &mut self.stroke {
                    stroke.push(position);
                }
                None
            }
            PointerEvent::Release { button, .. } => {
                if self.peek == Some(button) {
                    self.peek = None;
                    return Some(InputAction::EndPeek);
                }
                if button == PointerButton::Primary {
                    return self.finish_stroke();
                }
                None
            }
            PointerEvent::Leave => {
                if self.peek.take().is_some() {
                    return Some(InputAction::EndPeek);
                }
                self.finish_stroke()
            }
        }
    }

    fn finish_stroke(&mut self) -> Option<InputAction> {
        let stroke = self.stroke.take()?;
        let session = self.session.take()?;

        Some(InputAction::StrokeFinished { stroke, session })
    }
}

#[cfg(test)]
use crate::{StrokeController, TraceOptions};

#[cfg(test)]
fn tracker() -> PointerTracker {
    PointerTracker::new(Size::new(500.0, 500.0), Size::new(250.0, 250.0))
}

#[cfg(test)]
fn press(x: f32, y: f32, button: PointerButton) -> PointerEvent {
    PointerEvent::Press {
        position: point(x, y),
        button,
    }
}

#[cfg(test)]
fn release(x: f32, y: f32, button: PointerButton) -> PointerEvent {
    PointerEvent::Release {
        position: point(x, y),
        button,
    }
}

#[cfg(test)]
fn move_to(x: f32, y: f32) -> PointerEvent {
    PointerEvent::Move {
        position: point(x, y),
    }
}

#[test]
fn draw_a_stroke() {
    let session = TraceSession::default();
    let mut tracker = tracker();
    tracker.attach(session);

    let primary = PointerButton::Primary;
    assert_eq!(tracker.handle(press(10.0, 10.0, primary)), None);
    assert_eq!(tracker.handle(move_to(20.0, 10.0)), None);
    assert_eq!(tracker.handle(move_to(30.0, 15.0)), None);
    assert_eq!(tracker.current_stroke().unwrap().len(), 3);

    let finished = tracker.handle(release(30.0, 15.0, primary));
    assert_eq!(
        finished,
        Some(InputAction::StrokeFinished {
            stroke: Polygon::from(vec![
                point(20.0, 20.0),
                point(40.0, 20.0),
                point(60.0, 30.0),
            ]),
            session,
        })
    );

    // Detached until the host is ready for the next stroke.
    assert!(!tracker.is_attached());
    tracker.handle(press(10.0, 10.0, primary));
    assert!(!tracker.is_drawing());
}

#[test]
fn leaving_finishes_the_stroke() {
    let mut tracker = tracker();
    tracker.attach(TraceSession::default());

    tracker.handle(press(0.0, 0.0, PointerButton::Primary));
    tracker.handle(move_to(1.0, 0.0));
    assert!(matches!(
        tracker.handle(PointerEvent::Leave),
        Some(InputAction::StrokeFinished { stroke, .. }) if stroke.len() == 2
    ));
    assert_eq!(tracker.handle(PointerEvent::Leave), None);
}

#[test]
fn moves_without_press_are_ignored() {
    let mut tracker = tracker();
    tracker.attach(TraceSession::default());
    assert_eq!(tracker.handle(move_to(1.0, 0.0)), None);
    assert_eq!(
        tracker.handle(release(1.0, 0.0, PointerButton::Primary)),
        None
    );

    tracker.handle(press(0.0, 0.0, PointerButton::Primary));
    tracker.detach();
    assert!(!tracker.is_drawing());
}

#[test]
fn stale_sessions_are_detached() {
    let mut controller = StrokeController::new(TraceOptions::DEFAULT);
    let old = controller.session();
    controller.change_target('x');
    let current = controller.session();

    let mut tracker = tracker();
    tracker.attach(old);
    tracker.handle(press(0.0, 0.0, PointerButton::Primary));

    assert!(!tracker.detach_stale(old));
    assert!(tracker.is_drawing());

    assert!(tracker.detach_stale(current));
    assert!(!tracker.is_attached());
    assert!(!tracker.is_drawing());
    assert_eq!(tracker.handle(PointerEvent::Leave), None);

    // Attaching for another session drops the stroke in progress.
    tracker.attach(old);
    tracker.handle(press(0.0, 0.0, PointerButton::Primary));
    tracker.attach(current);
    assert!(!tracker.is_drawing());
    assert_eq!(tracker.session(), Some(current));
}

#[test]
fn peeking() {
    let mut tracker = tracker();

    assert_eq!(
        tracker.handle(press(0.0, 0.0, PointerButton::Secondary)),
        Some(InputAction::PeekConfirmed)
    );
    // No drawing while peeking.
    tracker.attach(TraceSession::default());
    tracker.handle(press(0.0, 0.0, PointerButton::Primary));
    assert!(!tracker.is_drawing());
    assert_eq!(
        tracker.handle(release(0.0, 0.0, PointerButton::Secondary)),
        Some(InputAction::EndPeek)
    );

    assert_eq!(
        tracker.handle(press(0.0, 0.0, PointerButton::Auxiliary)),
        Some(InputAction::PeekDebug)
    );
    assert_eq!(tracker.handle(PointerEvent::Leave), Some(InputAction::EndPeek));
}
