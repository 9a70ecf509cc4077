use kanji_trace_session::algorithms::Normalizer;
use kanji_trace_session::geom::math::{point, Point, Size};
use kanji_trace_session::geom::Polygon;
use kanji_trace_session::path::CompilerOptions;
use kanji_trace_session::*;

use futures::executor::block_on;

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq)]
enum Event {
    Hint(Polygon),
    Arrow(Option<(Point, Point)>),
    Corrected(Vec<Polygon>),
    Begin(usize),
    Reset,
    Finished(bool),
}

#[derive(Default)]
struct Recorder {
    events: Vec<Event>,
}

impl TraceListener for Recorder {
    fn on_show_hint(&mut self, stroke: &Polygon) {
        self.events.push(Event::Hint(stroke.clone()));
    }

    fn on_show_hint_arrow(&mut self, arrow: Option<(Point, Point)>) {
        self.events.push(Event::Arrow(arrow));
    }

    fn on_draw_corrected_lines(&mut self, strokes: &[Polygon]) {
        self.events.push(Event::Corrected(strokes.to_vec()));
    }

    fn on_begin_tracing(&mut self, stroke: usize) {
        self.events.push(Event::Begin(stroke));
    }

    fn on_reset_progress(&mut self) {
        self.events.push(Event::Reset);
    }

    fn on_finished(&mut self, success: bool) {
        self.events.push(Event::Finished(success));
    }
}

impl Recorder {
    fn take(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

const CROSS: [&str; 2] = ["M 10 50 L 90 50", "M 50 10 L 50 90"];

fn loader() -> CharacterLoader<MemorySource> {
    let source = MemorySource::new()
        .with_character('十', &CROSS)
        .with_character('x', &["M 0 0 Q 10 10 20 20", "M 0 0 A 1 1 0 0 1 2 2"]);

    CharacterLoader::new(source, CompilerOptions::DEFAULT, Normalizer::default())
}

fn controller() -> (StrokeController, Rc<RefCell<Recorder>>) {
    let mut controller = StrokeController::new(TraceOptions::DEFAULT);
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    controller.add_listener(recorder.clone());

    (controller, recorder)
}

#[test]
fn trace_a_character() {
    let loader = loader();
    let (mut controller, recorder) = controller();

    controller.change_target('十');
    block_on(controller.start_tracing(&loader, TraceMode::AllHints)).unwrap();

    let strokes = controller.strokes().to_vec();
    assert_eq!(strokes.len(), 2);
    assert_eq!(strokes[0].first(), Some(point(90.0, 250.0)));
    assert_eq!(strokes[1].first(), Some(point(250.0, 90.0)));

    assert_eq!(
        recorder.borrow_mut().take(),
        vec![
            Event::Reset,
            Event::Hint(strokes[0].clone()),
            Event::Hint(strokes[1].clone()),
            Event::Arrow(hint_arrow(&strokes[0])),
            Event::Begin(0),
        ]
    );
    assert_eq!(controller.state(), TraceState::AwaitingAction { stroke: 0 });

    assert_eq!(controller.submit_stroke(strokes[0].clone()), Ok(VerifyResult::Correct));
    assert_eq!(
        recorder.borrow_mut().take(),
        vec![
            Event::Corrected(vec![strokes[0].clone()]),
            Event::Arrow(hint_arrow(&strokes[1])),
            Event::Begin(1),
        ]
    );
    assert_eq!(controller.confirmed_strokes(), &strokes[..1]);

    assert_eq!(controller.submit_stroke(strokes[1].clone()), Ok(VerifyResult::Correct));
    assert_eq!(
        recorder.borrow_mut().take(),
        vec![
            Event::Corrected(strokes.clone()),
            Event::Arrow(None),
            Event::Finished(true),
        ]
    );
    assert_eq!(controller.state(), TraceState::Complete { success: true });
    assert_eq!(controller.submit_stroke(strokes[1].clone()), Err(TraceError::NotAwaitingStroke));
}

#[test]
fn exhausting_the_tries_resets_the_character() {
    let loader = loader();
    let (mut controller, recorder) = controller();
    let max_tries = controller.engine().options().max_tries;
    assert_eq!(max_tries, 3);

    controller.change_target('十');
    block_on(controller.start_tracing(&loader, TraceMode::NextHint)).unwrap();
    let strokes = controller.strokes().to_vec();

    assert_eq!(controller.submit_stroke(strokes[0].clone()), Ok(VerifyResult::Correct));
    recorder.borrow_mut().take();

    // The horizontal stroke again, where the vertical one is expected.
    for _ in 1..max_tries {
        assert_eq!(controller.submit_stroke(strokes[0].clone()), Ok(VerifyResult::Incorrect));
        assert_eq!(
            recorder.borrow_mut().take(),
            vec![
                Event::Corrected(vec![strokes[0].clone()]),
                Event::Hint(strokes[1].clone()),
                Event::Arrow(hint_arrow(&strokes[1])),
                Event::Begin(1),
            ]
        );
        assert_eq!(controller.state(), TraceState::AwaitingAction { stroke: 1 });
    }

    assert_eq!(controller.submit_stroke(strokes[0].clone()), Ok(VerifyResult::NoMoreTries));
    assert_eq!(
        recorder.borrow_mut().take(),
        vec![
            Event::Reset,
            Event::Hint(strokes[0].clone()),
            Event::Hint(strokes[1].clone()),
            Event::Arrow(None),
            Event::Finished(false),
        ]
    );
    assert_eq!(controller.state(), TraceState::Complete { success: false });
    assert!(controller.confirmed_strokes().is_empty());
    assert_eq!(controller.engine().tries(), 0);

    // Restarting is up to the caller.
    block_on(controller.start_tracing(&loader, TraceMode::NextHint)).unwrap();
    assert_eq!(controller.state(), TraceState::AwaitingAction { stroke: 0 });
}

#[test]
fn correct_strokes_reset_the_tries() {
    let loader = loader();
    let (mut controller, _recorder) = controller();

    controller.change_target('十');
    block_on(controller.start_tracing(&loader, TraceMode::AllHints)).unwrap();
    let strokes = controller.strokes().to_vec();

    assert_eq!(controller.submit_stroke(strokes[1].clone()), Ok(VerifyResult::Incorrect));
    assert_eq!(controller.submit_stroke(strokes[1].clone()), Ok(VerifyResult::Incorrect));
    assert_eq!(controller.engine().tries(), 2);
    assert_eq!(controller.submit_stroke(strokes[0].clone()), Ok(VerifyResult::Correct));
    assert_eq!(controller.engine().tries(), 0);

    assert_eq!(controller.submit_stroke(strokes[0].clone()), Ok(VerifyResult::Incorrect));
    assert_eq!(controller.submit_stroke(strokes[0].clone()), Ok(VerifyResult::Incorrect));
    assert_eq!(controller.submit_stroke(strokes[1].clone()), Ok(VerifyResult::Correct));
}

#[test]
fn a_tap_is_never_correct() {
    let loader = loader();
    let (mut controller, _recorder) = controller();

    controller.change_target('十');
    block_on(controller.start_tracing(&loader, TraceMode::AllHints)).unwrap();

    let tap = Polygon::from(vec![point(90.0, 250.0)]);
    assert_eq!(controller.submit_stroke(tap), Ok(VerifyResult::Incorrect));
    assert_eq!(controller.state(), TraceState::AwaitingAction { stroke: 0 });
}

#[test]
fn character_without_strokes() {
    let loader = loader();
    let (mut controller, recorder) = controller();

    let character = block_on(loader.load('x')).unwrap();
    assert!(character.strokes.is_empty());
    assert_eq!(character.errors.len(), 2);

    controller.change_target('x');
    block_on(controller.start_tracing(&loader, TraceMode::AllHints)).unwrap();

    assert_eq!(
        recorder.borrow_mut().take(),
        vec![Event::Reset, Event::Arrow(None), Event::Finished(false)]
    );
    assert_eq!(controller.state(), TraceState::Complete { success: false });
}

#[test]
fn missing_character() {
    let loader = loader();
    let (mut controller, recorder) = controller();

    controller.change_target('三');
    let result = block_on(controller.start_tracing(&loader, TraceMode::AllHints));
    assert!(matches!(
        result,
        Err(LoadError::Fetch(ResourceFetchError::NotFound { character: '三', .. }))
    ));
    assert_eq!(controller.state(), TraceState::Idle);
    assert!(recorder.borrow().events.is_empty());
}

#[test]
fn failed_reload_keeps_the_progress() {
    let loader = loader();
    let (mut controller, recorder) = controller();

    controller.change_target('十');
    block_on(controller.start_tracing(&loader, TraceMode::AllHints)).unwrap();
    let first = controller.current_stroke().unwrap().clone();
    assert_eq!(controller.submit_stroke(first), Ok(VerifyResult::Correct));
    recorder.borrow_mut().take();

    let empty = CharacterLoader::new(
        MemorySource::new(),
        CompilerOptions::DEFAULT,
        Normalizer::default(),
    );
    let result = block_on(controller.start_tracing(&empty, TraceMode::NoHints));
    assert!(matches!(result, Err(LoadError::Fetch(_))));

    assert_eq!(controller.state(), TraceState::AwaitingAction { stroke: 1 });
    assert_eq!(controller.mode(), TraceMode::AllHints);
    assert_eq!(controller.strokes().len(), 2);
    assert_eq!(controller.confirmed_strokes().len(), 1);
    assert!(recorder.borrow().events.is_empty());

    let second = controller.current_stroke().unwrap().clone();
    assert_eq!(controller.submit_stroke(second), Ok(VerifyResult::Correct));
    assert_eq!(controller.state(), TraceState::Complete { success: true });
}

#[test]
fn stale_loads_are_discarded() {
    let loader = loader();
    let (mut controller, recorder) = controller();

    controller.change_target('十');
    let stale = controller.begin_loading(TraceMode::AllHints).unwrap();
    controller.change_target('x');

    let result = block_on(loader.load(stale.character()));
    assert!(matches!(
        controller.finish_loading(stale, result),
        Err(LoadError::Superseded)
    ));
    assert_eq!(controller.state(), TraceState::Idle);
    assert!(controller.strokes().is_empty());
    assert!(recorder.borrow().events.is_empty());
}

#[test]
fn hint_arrows_per_mode() {
    let loader = loader();
    let (mut controller, recorder) = controller();
    controller.change_target('十');

    block_on(controller.start_tracing(&loader, TraceMode::NoHints)).unwrap();
    let strokes = controller.strokes().to_vec();
    assert_eq!(
        recorder.borrow_mut().take(),
        vec![Event::Reset, Event::Arrow(hint_arrow(&strokes[0])), Event::Begin(0)]
    );

    controller.submit_stroke(strokes[0].clone()).unwrap();
    assert_eq!(
        recorder.borrow_mut().take(),
        vec![Event::Corrected(vec![strokes[0].clone()]), Event::Arrow(None), Event::Begin(1)]
    );

    let mut controller = StrokeController::new(TraceOptions::DEFAULT.with_hint_arrows(false));
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    controller.add_listener(recorder.clone());
    controller.change_target('十');

    block_on(controller.start_tracing(&loader, TraceMode::NextHint)).unwrap();
    assert_eq!(
        recorder.borrow_mut().take(),
        vec![Event::Reset, Event::Hint(strokes[0].clone()), Event::Arrow(None), Event::Begin(0)]
    );
}

#[test]
fn trace_with_the_pointer() {
    let loader = loader();
    let (mut controller, _recorder) = controller();
    controller.change_target('十');
    block_on(controller.start_tracing(&loader, TraceMode::AllHints)).unwrap();

    // The field is displayed at half its size.
    let mut tracker = PointerTracker::new(Size::new(500.0, 500.0), Size::new(250.0, 250.0));
    tracker.attach(controller.session());

    tracker.handle(PointerEvent::Press {
        position: point(45.0, 125.0),
        button: PointerButton::Primary,
    });
    for i in 1..=32 {
        tracker.handle(PointerEvent::Move {
            position: point(45.0 + i as f32 * 5.0, 125.0),
        });
    }

    let (stroke, session) = match tracker.handle(PointerEvent::Leave) {
        Some(InputAction::StrokeFinished { stroke, session }) => (stroke, session),
        other => panic!("{:?}", other),
    };
    assert_eq!(stroke.last(), Some(point(410.0, 250.0)));

    assert_eq!(
        controller.submit_traced(session, stroke),
        Ok(VerifyResult::Correct)
    );
    assert_eq!(controller.state(), TraceState::AwaitingAction { stroke: 1 });
}

#[test]
fn strokes_across_a_target_change_are_rejected() {
    let loader = loader();
    let (mut controller, recorder) = controller();
    controller.change_target('十');
    block_on(controller.start_tracing(&loader, TraceMode::AllHints)).unwrap();

    let mut tracker = PointerTracker::new(Size::new(500.0, 500.0), Size::new(500.0, 500.0));
    tracker.attach(controller.session());
    tracker.handle(PointerEvent::Press {
        position: point(90.0, 250.0),
        button: PointerButton::Primary,
    });
    tracker.handle(PointerEvent::Move {
        position: point(250.0, 250.0),
    });

    // The character is switched and reloaded while the stroke is being drawn.
    controller.change_target('十');
    block_on(controller.start_tracing(&loader, TraceMode::AllHints)).unwrap();
    recorder.borrow_mut().take();

    tracker.handle(PointerEvent::Move {
        position: point(410.0, 250.0),
    });
    let (stroke, session) = match tracker.handle(PointerEvent::Leave) {
        Some(InputAction::StrokeFinished { stroke, session }) => (stroke, session),
        other => panic!("{:?}", other),
    };

    assert_eq!(
        controller.submit_traced(session, stroke),
        Err(TraceError::StaleSession)
    );
    assert_eq!(controller.state(), TraceState::AwaitingAction { stroke: 0 });
    assert_eq!(controller.engine().tries(), 0);
    assert!(recorder.borrow().events.is_empty());

    // The host detaches trackers left over from the previous session.
    tracker.attach(session);
    tracker.handle(PointerEvent::Press {
        position: point(90.0, 250.0),
        button: PointerButton::Primary,
    });
    assert!(tracker.detach_stale(controller.session()));
    assert!(!tracker.is_drawing());
    assert_eq!(tracker.handle(PointerEvent::Leave), None);
}

#[test]
fn trace_from_a_directory() {
    let dir = std::env::temp_dir().join(format!("kanji_trace_tracing_{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("05341.svg"),
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="109" height="109">
<g><path id="s1" d="{}"/><path id="s2" d="{}"/></g>
</svg>"#,
            CROSS[0], CROSS[1]
        ),
    )
    .unwrap();

    let loader = CharacterLoader::new(
        DirectorySource::new(&dir),
        CompilerOptions::DEFAULT,
        Normalizer::default(),
    );
    let (mut controller, _recorder) = controller();
    controller.change_target('十');
    block_on(controller.start_tracing(&loader, TraceMode::AllHints)).unwrap();

    let strokes = controller.strokes().to_vec();
    assert_eq!(strokes.len(), 2);
    for stroke in &strokes {
        assert_eq!(controller.submit_stroke(stroke.clone()), Ok(VerifyResult::Correct));
    }
    assert_eq!(controller.state(), TraceState::Complete { success: true });

    fs::remove_dir_all(&dir).unwrap();
}
