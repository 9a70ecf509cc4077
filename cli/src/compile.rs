use crate::commands::CompileCmd;
use crate::CommandError;

use futures::executor::block_on;
use kanji_trace::algorithms::Normalizer;
use kanji_trace::path::CompilerOptions;
use kanji_trace::session::{CharacterLoader, DirectorySource};


pub fn compile(mut cmd: CompileCmd) -> Result<(), CommandError> {
    let loader = CharacterLoader::new(
        DirectorySource::new(&cmd.dir),
        CompilerOptions::DEFAULT.with_tolerance(cmd.tolerance),
        Normalizer::default(),
    );

    let character = block_on(loader.load(cmd.character))?;

    for error in &character.errors {
        writeln!(&mut *cmd.output, "# stroke {} dropped: {}", error.stroke, error.error)?;
    }

    if cmd.count {
        let vertices: usize = character.strokes.iter().map(|stroke| stroke.len()).sum();
        writeln!(&mut *cmd.output, "strokes: {}", character.strokes.len())?;
        writeln!(&mut *cmd.output, "vertices: {}", vertices)?;

        return Ok(());
    }

    for stroke in &character.strokes {
        for (i, p) in stroke.iter().enumerate() {
            let cmd_char = if i == 0 { 'M' } else { 'L' };
            write!(&mut *cmd.output, "{} {} {} ", cmd_char, p.x, p.y)?;
        }
        writeln!(&mut *cmd.output)?;
    }

    Ok(())
}
