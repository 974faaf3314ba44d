//! Purpose: Resolve where CLI input comes from (inline argument, file, or stdin).
//! Exports: `InputSource`, `InputSourceError`, `resolve_input_source`.
//! Role: Keep `text` and `json` commands aligned on one input-selection rule.
//! Invariants: Inline input wins; `-f -` means stdin; bare stdin is used only when piped.
//! Invariants: Open failures carry the path and map to NotFound/Permission/Io.

use std::io::{self, Read};
use std::path::PathBuf;

use jsonsafe::api::Error;

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum InputSource {
    Inline(String),
    File(PathBuf),
    Stdin,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum InputSourceError {
    Missing,
}

pub(crate) fn resolve_input_source(
    inline: Option<String>,
    file: Option<String>,
    stdin_is_terminal: bool,
) -> Result<InputSource, InputSourceError> {
    if let Some(inline) = inline {
        return Ok(InputSource::Inline(inline));
    }
    match file.as_deref() {
        Some("-") => Ok(InputSource::Stdin),
        Some(path) => Ok(InputSource::File(PathBuf::from(path))),
        None if stdin_is_terminal => Err(InputSourceError::Missing),
        None => Ok(InputSource::Stdin),
    }
}

impl InputSource {
    /// Label used in notices and logs.
    pub(crate) fn label(&self) -> String {
        match self {
            InputSource::Inline(_) => "inline".to_string(),
            InputSource::File(path) => path.display().to_string(),
            InputSource::Stdin => "-".to_string(),
        }
    }

    pub(crate) fn open(self) -> Result<Box<dyn Read>, Error> {
        match self {
            InputSource::Inline(text) => Ok(Box::new(io::Cursor::new(text.into_bytes()))),
            InputSource::File(path) => {
                let file = std::fs::File::open(&path).map_err(|err| Error::from_open(err, path))?;
                Ok(Box::new(file))
            }
            InputSource::Stdin => Ok(Box::new(io::stdin())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{InputSource, InputSourceError, resolve_input_source};
    use jsonsafe::api::ErrorKind;
    use std::io::Read;
    use std::path::PathBuf;

    #[test]
    fn inline_takes_precedence() {
        let source = resolve_input_source(Some("x".to_string()), None, true);
        assert_eq!(source, Ok(InputSource::Inline("x".to_string())));
    }

    #[test]
    fn dash_file_means_stdin() {
        let source = resolve_input_source(None, Some("-".to_string()), true);
        assert_eq!(source, Ok(InputSource::Stdin));
    }

    #[test]
    fn file_path_is_kept() {
        let source = resolve_input_source(None, Some("in.jsonl".to_string()), false);
        assert_eq!(source, Ok(InputSource::File(PathBuf::from("in.jsonl"))));
    }

    #[test]
    fn terminal_stdin_without_input_is_missing() {
        assert_eq!(
            resolve_input_source(None, None, true),
            Err(InputSourceError::Missing)
        );
        assert_eq!(resolve_input_source(None, None, false), Ok(InputSource::Stdin));
    }

    #[test]
    fn open_reads_inline_and_reports_missing_files() {
        let mut text = String::new();
        InputSource::Inline("a\"b".to_string())
            .open()
            .expect("open inline")
            .read_to_string(&mut text)
            .expect("read");
        assert_eq!(text, "a\"b");

        let temp = tempfile::tempdir().expect("tempdir");
        let missing = temp.path().join("nope.txt");
        let err = match InputSource::File(missing.clone()).open() {
            Ok(_) => panic!("missing file opened"),
            Err(err) => err,
        };
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.path(), Some(missing.as_path()));
    }
}
