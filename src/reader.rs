//! Reading a config stream into a record.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use accfg_syntax::LineReader;
use serde::{Deserialize, Serialize};

use crate::bind::bind_key;
use crate::error::Error;
use crate::include::resolve_include;
use crate::record::Record;
use crate::schema::SchemaCache;

/// Label used for streams read without a file name.
const INPUT_NAME: &str = "<input>";

/// Reader settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    /// Maximum nesting of sections and includes together (default: 64)
    pub max_depth: usize,

    /// Honor `include` lines (default: true)
    pub includes: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            includes: true,
        }
    }
}

/// Reads config files and streams into records.
#[derive(Debug, Clone, Default)]
pub struct Reader {
    options: ReaderOptions,
}

impl Reader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ReaderOptions) -> Self {
        Self { options }
    }

    /// Read the file at `path` into `target`.
    ///
    /// Fields the file does not mention keep their current values.
    /// Relative includes are resolved against the directory of `path`.
    pub fn read<R: Record>(&self, path: impl AsRef<Path>, target: &mut R) -> Result<(), Error> {
        let mut cache = SchemaCache::new();
        read_file(path.as_ref(), target, &mut cache, &self.options, 0)
    }

    /// Read an in-memory stream into `target`.
    ///
    /// Errors name the stream `<input>`, and relative includes are resolved
    /// against the current directory.
    pub fn read_from<I: Read, R: Record>(&self, input: I, target: &mut R) -> Result<(), Error> {
        self.read_named(INPUT_NAME, input, target)
    }

    /// Read a stream into `target`, labelling it `name` in errors and
    /// resolving relative includes against `name`'s directory.
    pub fn read_named<I: Read, R: Record>(
        &self,
        name: impl Into<PathBuf>,
        input: I,
        target: &mut R,
    ) -> Result<(), Error> {
        let mut cache = SchemaCache::new();
        Session::new(name.into(), BufReader::new(input), &mut cache, &self.options, 0).run(target)
    }
}

fn read_file(
    path: &Path,
    target: &mut dyn Record,
    cache: &mut SchemaCache,
    options: &ReaderOptions,
    depth: usize,
) -> Result<(), Error> {
    tracing::debug!(path = %path.display(), depth, "reading config");
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Session::new(path.to_path_buf(), BufReader::new(file), cache, options, depth).run(target)
}

/// State of one file being read: the top-level stream or one include.
pub(crate) struct Session<'s, B> {
    file: PathBuf,
    pub(crate) lines: LineReader<B>,
    cache: &'s mut SchemaCache,
    options: &'s ReaderOptions,
    depth: usize,
}

impl<'s, B: BufRead> Session<'s, B> {
    fn new(
        file: PathBuf,
        input: B,
        cache: &'s mut SchemaCache,
        options: &'s ReaderOptions,
        depth: usize,
    ) -> Self {
        Self {
            file,
            lines: LineReader::new(input),
            cache,
            options,
            depth,
        }
    }

    /// Read the whole stream, tagging any failure with this file and line.
    fn run(mut self, target: &mut dyn Record) -> Result<(), Error> {
        self.read_config(target, None).map_err(|source| Error::Parse {
            line: self.lines.line(),
            file: self.file,
            source: Box::new(source),
        })
    }

    /// Bind lines into `target` until the stream ends, or until the `}`
    /// closing `section` when reading a section body.
    pub(crate) fn read_config(
        &mut self,
        target: &mut dyn Record,
        section: Option<&str>,
    ) -> Result<(), Error> {
        let keys = self.cache.key_map(target);

        while let Some(line) = self.lines.next_line()? {
            let Some(key) = line.key() else {
                continue;
            };
            if section.is_some() && line.is_block_end() {
                return Ok(());
            }

            // a missing value binds as ""
            let value = line.value().unwrap_or_default();
            tracing::trace!(line = line.number, key, value, "dispatch");

            if value == "{" {
                self.read_section(target, &keys, key)?;
            } else if key == "include" {
                self.include(value, target)?;
            } else {
                bind_key(target, &keys, key, value, line.extra())?;
            }
        }

        match section {
            Some(name) => Err(Error::UnclosedBlock(name.to_string())),
            None => Ok(()),
        }
    }

    /// Read a section body into a nested record one level deeper.
    pub(crate) fn read_nested(&mut self, target: &mut dyn Record, section: &str) -> Result<(), Error> {
        self.check_depth()?;
        self.depth += 1;
        let result = self.read_config(target, Some(section));
        self.depth -= 1;
        result
    }

    fn check_depth(&self) -> Result<(), Error> {
        if self.depth >= self.options.max_depth {
            return Err(Error::TooDeep(self.options.max_depth));
        }
        Ok(())
    }

    /// Read another file into the same record.
    fn include(&mut self, file: &str, target: &mut dyn Record) -> Result<(), Error> {
        if !self.options.includes {
            return Err(Error::IncludeDisabled);
        }
        self.check_depth()?;

        let path = resolve_include(&self.file, file);
        tracing::debug!(from = %self.file.display(), path = %path.display(), "include");
        read_file(&path, target, self.cache, self.options, self.depth + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Limits {
        size: u32,
        name: String,
    }
    crate::record!(Limits { size, name });

    #[derive(Debug, Default)]
    struct Outer {
        limits: Limits,
        size: u32,
    }
    crate::record!(Outer { limits, size });

    #[test]
    fn test_options_default() {
        let options = ReaderOptions::default();
        assert_eq!(options.max_depth, 64);
        assert!(options.includes);
    }

    #[test]
    fn test_options_deserialize_partial() {
        let options: ReaderOptions = serde_json::from_str(r#"{"includes": false}"#).unwrap();
        assert_eq!(options.max_depth, 64);
        assert!(!options.includes);
    }

    #[test]
    fn test_read_nested_restores_depth() {
        let mut outer = Outer::default();
        let text = "limits {\n size 3\n}\nsize 4\n";
        Reader::new().read_from(text.as_bytes(), &mut outer).unwrap();
        assert_eq!(outer.limits.size, 3);
        assert_eq!(outer.size, 4);
    }

    #[test]
    fn test_max_depth_zero_rejects_sections() {
        let reader = Reader::with_options(ReaderOptions {
            max_depth: 0,
            includes: true,
        });
        let mut outer = Outer::default();
        let err = reader
            .read_from("limits {\n}\n".as_bytes(), &mut outer)
            .unwrap_err();
        assert!(matches!(err.root(), Error::TooDeep(0)));
    }

    #[test]
    fn test_parse_error_names_stream() {
        let mut limits = Limits::default();
        let err = Reader::new()
            .read_named("limits.conf", "name x\n\nbogus 1\n".as_bytes(), &mut limits)
            .unwrap_err();
        match err {
            Error::Parse { file, line, source } => {
                assert_eq!(file, PathBuf::from("limits.conf"));
                assert_eq!(line, 3);
                assert!(matches!(*source, Error::InvalidParam(ref k) if k == "bogus"));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(limits.name, "x");
    }
}
