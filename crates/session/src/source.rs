//! Where the outline of a character comes from.

use crate::error::ResourceFetchError;

use futures::future::{self, BoxFuture};
use regex::Regex;

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Provides the path data strings (one per stroke, in drawing order) of a character.
pub trait VectorSource {
    fn fetch(&self, character: char) -> BoxFuture<'_, Result<Vec<String>, ResourceFetchError>>;
}

impl<S: VectorSource + ?Sized> VectorSource for &S {
    fn fetch(&self, character: char) -> BoxFuture<'_, Result<Vec<String>, ResourceFetchError>> {
        (**self).fetch(character)
    }
}

/// Naming scheme of the per-character outline files.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct DirectorySourceOptions {
    /// Left-padding character of the hexadecimal code point.
    ///
    /// Default value: `'0'`.
    pub prefix: char,

    /// Minimum length of the file name, without extension.
    ///
    /// Default value: `5`.
    pub file_name_len: usize,

    /// Default value: `"svg"`.
    pub extension: Cow<'static, str>,
}

impl DirectorySourceOptions {
    pub const DEFAULT: Self = DirectorySourceOptions {
        prefix: '0',
        file_name_len: 5,
        extension: Cow::Borrowed("svg"),
    };

    pub const fn with_prefix(mut self, prefix: char) -> Self {
        self.prefix = prefix;
        self
    }

    pub const fn with_file_name_len(mut self, len: usize) -> Self {
        self.file_name_len = len;
        self
    }

    pub fn with_extension<E: Into<Cow<'static, str>>>(mut self, extension: E) -> Self {
        self.extension = extension.into();
        self
    }
}

impl Default for DirectorySourceOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// File name of the outline of `character`.
///
/// ```
/// use kanji_trace_session::{resource_file_name, DirectorySourceOptions};
///
/// assert_eq!(resource_file_name('日', &DirectorySourceOptions::DEFAULT), "065e5.svg");
/// assert_eq!(resource_file_name('a', &DirectorySourceOptions::DEFAULT), "00061.svg");
/// ```
pub fn resource_file_name(character: char, options: &DirectorySourceOptions) -> String {
    let code = format!("{:02x}", character as u32);
    let padding = options.file_name_len.saturating_sub(code.len());

    let mut name = String::with_capacity(options.file_name_len + options.extension.len() + 1);
    name.extend(std::iter::repeat(options.prefix).take(padding));
    name.push_str(&code);
    name.push('.');
    name.push_str(&options.extension);

    name
}

/// Every `d="..."` attribute of an SVG document, in document order.
pub fn extract_path_data(document: &str) -> Vec<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r#"\sd="([^"]+)""#).expect("valid pattern"));

    pattern
        .captures_iter(document)
        .map(|captures| captures[1].to_string())
        .collect()
}

/// Reads one SVG file per character from a directory.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    root: PathBuf,
    options: DirectorySourceOptions,
}

impl DirectorySource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self::with_options(root, DirectorySourceOptions::DEFAULT)
    }

    pub fn with_options<P: Into<PathBuf>>(root: P, options: DirectorySourceOptions) -> Self {
        DirectorySource {
            root: root.into(),
            options,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn options(&self) -> &DirectorySourceOptions {
        &self.options
    }

    pub fn path_for(&self, character: char) -> PathBuf {
        self.root.join(resource_file_name(character, &self.options))
    }

    fn read(&self, character: char) -> Result<Vec<String>, ResourceFetchError> {
        let path = self.path_for(character);
        let document = match fs::read_to_string(&path) {
            Ok(document) => document,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ResourceFetchError::NotFound {
                    character,
                    location: path.display().to_string(),
                });
            }
            Err(source) => {
                return Err(ResourceFetchError::Io { path, source });
            }
        };

        let strokes = extract_path_data(&document);
        if strokes.is_empty() {
            return Err(ResourceFetchError::NoPathData { character });
        }

        log::trace!("Read {} strokes from {:?}", strokes.len(), path);

        Ok(strokes)
    }
}

impl VectorSource for DirectorySource {
    fn fetch(&self, character: char) -> BoxFuture<'_, Result<Vec<String>, ResourceFetchError>> {
        Box::pin(future::ready(self.read(character)))
    }
}

/// Path data kept in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    characters: HashMap<char, Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        MemorySource::default()
    }

    pub fn with_character<S: AsRef<str>>(mut self, character: char, strokes: &[S]) -> Self {
        self.insert(character, strokes.iter().map(|s| s.as_ref().to_string()).collect());
        self
    }

    /// Returns the previous strokes of this character, if any.
    pub fn insert(&mut self, character: char, strokes: Vec<String>) -> Option<Vec<String>> {
        self.characters.insert(character, strokes)
    }

    pub fn remove(&mut self, character: char) -> Option<Vec<String>> {
        self.characters.remove(&character)
    }

    pub fn contains(&self, character: char) -> bool {
        self.characters.contains_key(&character)
    }

    fn get(&self, character: char) -> Result<Vec<String>, ResourceFetchError> {
        match self.characters.get(&character) {
            None => Err(ResourceFetchError::NotFound {
                character,
                location: "memory".to_string(),
            }),
            Some(strokes) if strokes.is_empty() => {
                Err(ResourceFetchError::NoPathData { character })
            }
            Some(strokes) => Ok(strokes.clone()),
        }
    }
}

impl VectorSource for MemorySource {
    fn fetch(&self, character: char) -> BoxFuture<'_, Result<Vec<String>, ResourceFetchError>> {
        Box::pin(future::ready(self.get(character)))
    }
}

#[cfg(test)]
use futures::executor::block_on;

#[cfg(test)]
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("kanji_trace_{}_{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn file_names() {
    let options = DirectorySourceOptions::DEFAULT;
    assert_eq!(resource_file_name('一', &options), "04e00.svg");
    assert_eq!(resource_file_name('\u{1}', &options), "00001.svg");
    assert_eq!(resource_file_name('\u{20b9f}', &options), "20b9f.svg");

    let options = DirectorySourceOptions::DEFAULT
        .with_prefix('_')
        .with_file_name_len(8)
        .with_extension("txt");
    assert_eq!(resource_file_name('日', &options), "___065e5.txt");

    // Longer code points are never truncated.
    let options = DirectorySourceOptions::DEFAULT.with_file_name_len(2);
    assert_eq!(resource_file_name('日', &options), "65e5.svg");
}

#[test]
fn path_data_in_document_order() {
    let document = r#"<svg xmlns="http://www.w3.org/2000/svg">
<g id="kvg:StrokePaths_04e8c">
    <path id="kvg:04e8c-s1" kvg:type="㇐" d="M32.5,28.6c2.2,0.5,4.6,0.4,6.9,0.1"/>
    <path id="kvg:04e8c-s2" d="M14,72.5 c3.5,0.9,7.6,0.8,11.2,0.5" kvg:type="㇐" />
</g>
<text transform="matrix(1 0 0 1 25 24)">1</text>
</svg>"#;

    assert_eq!(
        extract_path_data(document),
        vec![
            "M32.5,28.6c2.2,0.5,4.6,0.4,6.9,0.1".to_string(),
            "M14,72.5 c3.5,0.9,7.6,0.8,11.2,0.5".to_string(),
        ]
    );
    assert!(extract_path_data("<svg></svg>").is_empty());
}

#[test]
fn directory_source() {
    let dir = scratch_dir("directory_source");
    fs::write(
        dir.join("04e00.svg"),
        r#"<svg><path d="M 10 50 L 90 50"/></svg>"#,
    )
    .unwrap();
    fs::write(dir.join("04e8c.svg"), "<svg></svg>").unwrap();

    let source = DirectorySource::new(&dir);
    assert_eq!(
        block_on(source.fetch('一')).unwrap(),
        vec!["M 10 50 L 90 50".to_string()]
    );

    match block_on(source.fetch('二')) {
        Err(ResourceFetchError::NoPathData { character }) => assert_eq!(character, '二'),
        other => panic!("{:?}", other),
    }

    match block_on(source.fetch('三')) {
        Err(ResourceFetchError::NotFound { character, location }) => {
            assert_eq!(character, '三');
            assert!(location.ends_with("04e09.svg"));
        }
        other => panic!("{:?}", other),
    }

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn memory_source() {
    let mut source = MemorySource::new().with_character('一', &["M 0 0 L 1 0"]);
    source.insert('二', Vec::new());

    assert!(source.contains('一'));
    assert_eq!(block_on(source.fetch('一')).unwrap().len(), 1);
    assert!(matches!(
        block_on(source.fetch('二')),
        Err(ResourceFetchError::NoPathData { .. })
    ));
    assert!(matches!(
        block_on(source.fetch('三')),
        Err(ResourceFetchError::NotFound { .. })
    ));

    // Sources are usable through a reference.
    let by_ref = &source;
    assert!(block_on(VectorSource::fetch(&by_ref, '一')).is_ok());
}
