use crate::commands::SelftestCmd;
use crate::CommandError;

use futures::executor::block_on;
use kanji_trace::algorithms::Normalizer;
use kanji_trace::path::CompilerOptions;
use kanji_trace::session::{
    CharacterLoader, DirectorySource, StrokeController, TraceMode, TraceOptions, TraceState,
};


/// Traces every reference stroke with itself. All verdicts should be correct.
pub fn selftest(mut cmd: SelftestCmd) -> Result<(), CommandError> {
    let loader = CharacterLoader::new(
        DirectorySource::new(&cmd.dir),
        CompilerOptions::DEFAULT,
        Normalizer::default(),
    );

    let mut controller = StrokeController::new(TraceOptions::DEFAULT);
    controller.change_target(cmd.character);
    block_on(controller.start_tracing(&loader, TraceMode::AllHints))?;

    while let TraceState::AwaitingAction { stroke } = controller.state() {
        let candidate = match controller.current_stroke() {
            Some(reference) => reference.clone(),
            None => break,
        };

        let result = controller.submit_stroke(candidate)?;
        write!(&mut *cmd.output, "stroke {}: {:?}", stroke, result)?;
        if let Some(s) = controller.engine().similarities() {
            write!(
                &mut *cmd.output,
                " (image {:.3} over {} pixels, length {:.3}, angle {:.3})",
                s.image, s.compared_pixels, s.length, s.angular
            )?;
        }
        writeln!(&mut *cmd.output)?;

        if !result.is_correct() {
            break;
        }
    }

    if let Some(path) = &cmd.render {
        controller.engine().reference_surface().image().save(path)?;
        log::info!("Wrote the last reference surface to {:?}", path);
    }

    match controller.state() {
        TraceState::Complete { success: true } => {
            writeln!(&mut *cmd.output, "ok")?;
            Ok(())
        }
        _ => Err(CommandError::Failed),
    }
}
