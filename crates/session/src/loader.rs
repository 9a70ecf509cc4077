use crate::algorithms::{Normalizer, PolygonSet};
use crate::error::ResourceFetchError;
use crate::path::{compile_strokes, CompilerOptions, StrokeError};
use crate::source::VectorSource;

/// The normalized strokes of a character.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledCharacter {
    pub character: char,
    pub strokes: PolygonSet,
    /// Strokes that failed to compile and were dropped from `strokes`.
    pub errors: Vec<StrokeError>,
}

/// Fetches, compiles and normalizes characters.
#[derive(Clone, Debug)]
pub struct CharacterLoader<S> {
    source: S,
    compiler: CompilerOptions,
    normalizer: Normalizer,
}

impl<S: VectorSource> CharacterLoader<S> {
    pub fn new(source: S, compiler: CompilerOptions, normalizer: Normalizer) -> Self {
        CharacterLoader {
            source,
            compiler,
            normalizer,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub async fn load(&self, character: char) -> Result<CompiledCharacter, ResourceFetchError> {
        let strokes = self.source.fetch(character).await?;
        Ok(self.compile(character, &strokes))
    }

    /// The synchronous half of [`load`](Self::load), for path data obtained elsewhere.
    pub fn compile<T: AsRef<str>>(&self, character: char, strokes: &[T]) -> CompiledCharacter {
        let compiled = compile_strokes(&self.compiler, strokes);
        let mut set = PolygonSet::new(compiled.polygons);
        self.normalizer.normalize(&mut set);

        log::debug!(
            "Loaded {:?}: {} strokes, {} dropped",
            character,
            set.len(),
            compiled.errors.len()
        );

        CompiledCharacter {
            character,
            strokes: set,
            errors: compiled.errors,
        }
    }
}

#[cfg(test)]
use crate::source::MemorySource;
#[cfg(test)]
use futures::executor::block_on;

#[test]
fn load_and_normalize() {
    let source = MemorySource::new().with_character('十', &["M 10 50 L 90 50", "M 50 10 L 50 90"]);
    let loader = CharacterLoader::new(source, CompilerOptions::DEFAULT, Normalizer::default());

    let character = block_on(loader.load('十')).unwrap();
    assert_eq!(character.character, '十');
    assert!(character.strokes.is_normalized());
    assert_eq!(character.strokes.len(), 2);
    assert!(character.errors.is_empty());

    // Both strokes are 320 pixels long once scaled.
    assert_eq!(character.strokes[0].len(), 64);
    assert_eq!(character.strokes[1].len(), 64);
}

#[test]
fn failing_strokes_are_reported() {
    let source = MemorySource::new().with_character('x', &["M 0 0 Q 1 1 2 2", "M 10 50 L 90 50"]);
    let loader = CharacterLoader::new(source, CompilerOptions::DEFAULT, Normalizer::default());

    let character = block_on(loader.load('x')).unwrap();
    assert_eq!(character.strokes.len(), 1);
    assert_eq!(character.errors.len(), 1);
    assert_eq!(character.errors[0].stroke, 0);

    assert!(matches!(
        block_on(loader.load('y')),
        Err(ResourceFetchError::NotFound { character: 'y', .. })
    ));
}
