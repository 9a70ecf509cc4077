use crate::algorithms::PolygonSet;
use crate::error::{LoadError, ResourceFetchError, TraceError};
use crate::geom::math::Point;
use crate::geom::Polygon;
use crate::loader::{CharacterLoader, CompiledCharacter};
use crate::options::{TraceOptions, VerificationOptions};
use crate::source::VectorSource;
use crate::verify::{VerificationEngine, VerifyResult};

use std::cell::RefCell;
use std::rc::Rc;

/// How much of the reference is shown while tracing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum TraceMode {
    /// Every stroke outline is shown from the start.
    AllHints,
    /// The outline of each stroke is shown when it is its turn.
    NextHint,
    /// No outline. The direction arrow of the first stroke is still shown.
    NoHints,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TraceState {
    Idle,
    Loading,
    /// Waiting for the user to draw the stroke at this index.
    AwaitingAction { stroke: usize },
    Complete { success: bool },
}

/// Receives the progression events of a [`StrokeController`].
///
/// All methods do nothing by default.
pub trait TraceListener {
    /// Show the outline of a reference stroke.
    fn on_show_hint(&mut self, _stroke: &Polygon) {}

    /// Show, or hide with `None`, the direction arrow of the next stroke.
    fn on_show_hint_arrow(&mut self, _arrow: Option<(Point, Point)>) {}

    /// Redraw the strokes traced correctly so far.
    fn on_draw_corrected_lines(&mut self, _strokes: &[Polygon]) {}

    /// The user can draw the stroke at this index.
    fn on_begin_tracing(&mut self, _stroke: usize) {}

    /// Erase everything drawn for the character.
    fn on_reset_progress(&mut self) {}

    fn on_finished(&mut self, _success: bool) {}
}

pub type ListenerHandle = Rc<RefCell<dyn TraceListener>>;

fn same_listener(a: &ListenerHandle, b: &ListenerHandle) -> bool {
    Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}

/// Identifies a load started with [`StrokeController::begin_loading`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    character: char,
}

impl LoadTicket {
    /// The character to load.
    pub fn character(&self) -> char {
        self.character
    }
}

/// Identifies the character being traced, see [`StrokeController::session`].
///
/// A new session starts each time the target changes or a load begins.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TraceSession {
    generation: u64,
}

/// Direction arrow of a stroke: from its third vertex to the one at 30% of its vertices
/// for long strokes, between the second and second to last vertices for short ones, and
/// from the first to the last vertex when there are no more than three.
pub fn hint_arrow(stroke: &Polygon) -> Option<(Point, Point)> {
    let n = stroke.len();
    match n {
        0 | 1 => None,
        2 | 3 => Some((stroke[0], stroke[n - 1])),
        4..=6 => Some((stroke[1], stroke[n - 2])),
        _ => {
            let to = (n as f32 * 0.3).ceil() as usize;
            Some((stroke[2], stroke[to.min(n - 1)]))
        }
    }
}

/// Walks the user through the strokes of a character, one at a time.
///
/// ```text
/// Idle -> Loading -> AwaitingAction { 0 } -> ... -> AwaitingAction { n - 1 } -> Complete
/// ```
///
/// A stroke that is drawn wrong too many times resets the whole character.
pub struct StrokeController {
    options: TraceOptions,
    engine: VerificationEngine,
    listeners: Vec<ListenerHandle>,
    target: Option<char>,
    mode: TraceMode,
    strokes: PolygonSet,
    next_stroke: usize,
    state: TraceState,
    generation: u64,
    // Mode and state to go back to when a load fails.
    before_load: Option<(TraceMode, TraceState)>,
}

impl StrokeController {
    pub fn new(options: TraceOptions) -> Self {
        let engine = VerificationEngine::new(VerificationOptions::for_trace_options(&options));
        Self::with_engine(options, engine)
    }

    pub fn with_engine(options: TraceOptions, engine: VerificationEngine) -> Self {
        StrokeController {
            options,
            engine,
            listeners: Vec::new(),
            target: None,
            mode: TraceMode::AllHints,
            strokes: PolygonSet::default(),
            next_stroke: 0,
            state: TraceState::Idle,
            generation: 0,
            before_load: None,
        }
    }

    pub fn options(&self) -> &TraceOptions {
        &self.options
    }

    pub fn engine(&self) -> &VerificationEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut VerificationEngine {
        &mut self.engine
    }

    pub fn state(&self) -> TraceState {
        self.state
    }

    pub fn target(&self) -> Option<char> {
        self.target
    }

    pub fn mode(&self) -> TraceMode {
        self.mode
    }

    /// All reference strokes of the current character.
    pub fn strokes(&self) -> &[Polygon] {
        self.strokes.polygons()
    }

    /// The reference stroke the user is expected to draw.
    pub fn current_stroke(&self) -> Option<&Polygon> {
        match self.state {
            TraceState::AwaitingAction { stroke } => self.strokes.get(stroke),
            _ => None,
        }
    }

    /// Pointer trackers are attached for a session, and the strokes they produce are only
    /// accepted while it is current.
    pub fn session(&self) -> TraceSession {
        TraceSession {
            generation: self.generation,
        }
    }

    /// The strokes traced correctly so far.
    pub fn confirmed_strokes(&self) -> &[Polygon] {
        let end = self.next_stroke.min(self.strokes.len());
        &self.strokes.polygons()[..end]
    }

    /// Registering the same listener twice has no effect.
    pub fn add_listener(&mut self, listener: ListenerHandle) {
        if !self.listeners.iter().any(|l| same_listener(l, &listener)) {
            self.listeners.push(listener);
        }
    }

    pub fn remove_listener(&mut self, listener: &ListenerHandle) {
        self.listeners.retain(|l| !same_listener(l, listener));
    }

    /// Selects the character to trace next and abandons the current one.
    ///
    /// A load in flight is discarded when it completes.
    pub fn change_target(&mut self, character: char) {
        log::trace!("Target changed to {:?}", character);
        self.target = Some(character);
        self.generation += 1;
        self.strokes = PolygonSet::default();
        self.next_stroke = 0;
        self.state = TraceState::Idle;
        self.before_load = None;
    }

    /// Loads the target with `loader` and starts tracing it.
    pub async fn start_tracing<S: VectorSource>(
        &mut self,
        loader: &CharacterLoader<S>,
        mode: TraceMode,
    ) -> Result<(), LoadError> {
        let ticket = self.begin_loading(mode)?;
        let result = loader.load(ticket.character()).await;

        self.finish_loading(ticket, result)
    }

    /// First half of [`start_tracing`](Self::start_tracing), for hosts loading the
    /// character themselves.
    ///
    /// Starting a load supersedes any previous one.
    pub fn begin_loading(&mut self, mode: TraceMode) -> Result<LoadTicket, LoadError> {
        let character = self.target.ok_or(LoadError::NoTarget)?;

        if self.before_load.is_none() {
            self.before_load = Some((self.mode, self.state));
        }
        self.generation += 1;
        self.mode = mode;
        self.state = TraceState::Loading;
        log::trace!("Loading {:?} ({:?})", character, mode);

        Ok(LoadTicket {
            generation: self.generation,
            character,
        })
    }

    /// Second half of [`start_tracing`](Self::start_tracing).
    ///
    /// The result of a superseded load is dropped without any effect. A failed load puts
    /// the controller back in the mode and state it had before loading, without touching
    /// the strokes or the progress.
    pub fn finish_loading(
        &mut self,
        ticket: LoadTicket,
        result: Result<CompiledCharacter, ResourceFetchError>,
    ) -> Result<(), LoadError> {
        if ticket.generation != self.generation {
            log::warn!("Discarding the stale load of {:?}", ticket.character);
            return Err(LoadError::Superseded);
        }

        let before_load = self.before_load.take();
        let character = match result {
            Ok(character) => character,
            Err(error) => {
                log::trace!("Loading {:?} failed", ticket.character);
                let (mode, state) = before_load.unwrap_or((self.mode, TraceState::Idle));
                self.mode = mode;
                self.state = state;
                return Err(LoadError::Fetch(error));
            }
        };

        self.reset();
        self.strokes = character.strokes;

        if self.strokes.is_empty() {
            log::warn!("{:?} has no stroke to trace", ticket.character);
        }

        if self.mode == TraceMode::AllHints {
            let strokes = &self.strokes;
            self.dispatch(|l| {
                for stroke in strokes {
                    l.on_show_hint(stroke);
                }
            });
        }

        self.trace_next();

        Ok(())
    }

    /// Verifies a stroke drawn by the user against the current reference stroke.
    pub fn submit_stroke(&mut self, candidate: Polygon) -> Result<VerifyResult, TraceError> {
        let stroke = match self.state {
            TraceState::AwaitingAction { stroke } => stroke,
            _ => return Err(TraceError::NotAwaitingStroke),
        };

        let reference = match self.strokes.get(stroke) {
            Some(reference) => reference,
            None => return Err(TraceError::NotAwaitingStroke),
        };

        let result = self.engine.verify(reference, &candidate);

        match result {
            VerifyResult::NoMoreTries => {
                self.reset();

                let strokes = &self.strokes;
                self.dispatch(|l| {
                    for stroke in strokes {
                        l.on_show_hint(stroke);
                    }
                    l.on_show_hint_arrow(None);
                });

                self.finish(false);
                return Ok(result);
            }
            VerifyResult::Correct => {
                self.next_stroke += 1;
                self.engine.reset_tries();
            }
            VerifyResult::Incorrect => {}
        }

        let confirmed = self.confirmed_strokes();
        self.dispatch(|l| l.on_draw_corrected_lines(confirmed));
        self.trace_next();

        Ok(result)
    }

    /// Like [`submit_stroke`](Self::submit_stroke), for a stroke drawn during `session`.
    ///
    /// Strokes that outlived their session, because the target changed or the character was
    /// reloaded while they were drawn, are rejected without being verified.
    pub fn submit_traced(
        &mut self,
        session: TraceSession,
        candidate: Polygon,
    ) -> Result<VerifyResult, TraceError> {
        if session != self.session() {
            log::warn!("Rejecting a stroke from a previous trace session");
            return Err(TraceError::StaleSession);
        }

        self.submit_stroke(candidate)
    }

    fn reset(&mut self) {
        self.dispatch(|l| l.on_reset_progress());
        self.next_stroke = 0;
        self.engine.reset_tries();
    }

    fn trace_next(&mut self) {
        let stroke = match self.strokes.get(self.next_stroke) {
            Some(stroke) => stroke,
            None => {
                self.dispatch(|l| l.on_show_hint_arrow(None));
                let success = !self.strokes.is_empty();
                self.finish(success);
                return;
            }
        };

        if self.mode == TraceMode::NextHint {
            self.dispatch(|l| l.on_show_hint(stroke));
        }

        let show_arrow = self.options.show_hint_arrows
            && (self.mode != TraceMode::NoHints || self.next_stroke == 0);
        let arrow = if show_arrow { hint_arrow(stroke) } else { None };
        self.dispatch(|l| l.on_show_hint_arrow(arrow));

        let index = self.next_stroke;
        self.state = TraceState::AwaitingAction { stroke: index };
        log::trace!("Awaiting stroke {}", index);

        self.dispatch(|l| l.on_begin_tracing(index));
    }

    fn finish(&mut self, success: bool) {
        self.state = TraceState::Complete { success };
        log::trace!("Finished tracing (success: {})", success);

        self.dispatch(|l| l.on_finished(success));
    }

    fn dispatch<F: FnMut(&mut dyn TraceListener)>(&self, mut callback: F) {
        let listeners = self.listeners.clone();
        for listener in &listeners {
            callback(&mut *listener.borrow_mut());
        }
    }
}

#[cfg(test)]
use crate::geom::math::point;

#[cfg(test)]
fn line(n: usize) -> Polygon {
    (0..n).map(|i| point(i as f32, 0.0)).collect()
}

#[test]
fn hint_arrows() {
    assert_eq!(hint_arrow(&line(0)), None);
    assert_eq!(hint_arrow(&line(1)), None);
    assert_eq!(hint_arrow(&line(2)), Some((point(0.0, 0.0), point(1.0, 0.0))));
    // Never from a vertex to itself.
    assert_eq!(hint_arrow(&line(3)), Some((point(0.0, 0.0), point(2.0, 0.0))));
    assert_eq!(hint_arrow(&line(4)), Some((point(1.0, 0.0), point(2.0, 0.0))));
    assert_eq!(hint_arrow(&line(6)), Some((point(1.0, 0.0), point(4.0, 0.0))));
    assert_eq!(hint_arrow(&line(7)), Some((point(2.0, 0.0), point(3.0, 0.0))));
    assert_eq!(hint_arrow(&line(64)), Some((point(2.0, 0.0), point(20.0, 0.0))));
}

#[cfg(test)]
#[derive(Default)]
struct Counter {
    finished: Vec<bool>,
}

#[cfg(test)]
impl TraceListener for Counter {
    fn on_finished(&mut self, success: bool) {
        self.finished.push(success);
    }
}

#[test]
fn listeners_are_deduplicated() {
    let mut controller = StrokeController::new(TraceOptions::DEFAULT);
    let counter = Rc::new(RefCell::new(Counter::default()));
    let handle: ListenerHandle = counter.clone();

    controller.add_listener(handle.clone());
    controller.add_listener(handle.clone());

    controller.change_target('x');
    let ticket = controller.begin_loading(TraceMode::NoHints).unwrap();
    let empty = CompiledCharacter {
        character: 'x',
        strokes: PolygonSet::default(),
        errors: Vec::new(),
    };
    controller.finish_loading(ticket, Ok(empty.clone())).unwrap();
    assert_eq!(counter.borrow().finished, vec![false]);

    controller.remove_listener(&handle);
    let ticket = controller.begin_loading(TraceMode::NoHints).unwrap();
    controller.finish_loading(ticket, Ok(empty)).unwrap();
    assert_eq!(counter.borrow().finished, vec![false]);
}

#[test]
fn states() {
    let mut controller = StrokeController::new(TraceOptions::DEFAULT);
    assert_eq!(controller.state(), TraceState::Idle);
    assert!(matches!(
        controller.begin_loading(TraceMode::AllHints),
        Err(LoadError::NoTarget)
    ));
    assert_eq!(
        controller.submit_stroke(line(3)),
        Err(TraceError::NotAwaitingStroke)
    );

    controller.change_target('x');
    let ticket = controller.begin_loading(TraceMode::NextHint).unwrap();
    assert_eq!(ticket.character(), 'x');
    assert_eq!(controller.mode(), TraceMode::NextHint);
    assert_eq!(controller.state(), TraceState::Loading);
    assert_eq!(
        controller.submit_stroke(line(3)),
        Err(TraceError::NotAwaitingStroke)
    );

    let error = ResourceFetchError::NotFound {
        character: 'x',
        location: "memory".to_string(),
    };
    assert!(matches!(
        controller.finish_loading(ticket, Err(error)),
        Err(LoadError::Fetch(_))
    ));
    assert_eq!(controller.state(), TraceState::Idle);
    assert_eq!(controller.mode(), TraceMode::AllHints);
    assert!(controller.strokes().is_empty());
}
