//! Purpose: Print errors and notices on stderr for `jsonsafe`.
//! Exports: `Stderr`, `usage_summary`, `usage_hint`, `with_default_hint`.
//! Role: The single switch between human text (terminal) and JSON lines (pipes, logs).
//! Invariants: Off a terminal, every diagnostic is exactly one JSON line.
//! Invariants: Error context fields are identical in text and JSON form.
use std::error::Error as StdError;
use std::ffi::OsStr;
use std::io::{self, IsTerminal};

use clap::CommandFactory;
use jsonsafe::api::{Error, ErrorKind};
use serde_json::{Map, Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::notice::Notice;
use crate::{Cli, ColorMode};

const RED: &str = "31";
const YELLOW: &str = "33";

#[derive(Copy, Clone, Debug)]
pub(crate) struct Stderr {
    json: bool,
    color: bool,
}

impl Stderr {
    pub(crate) fn detect(color_mode: ColorMode) -> Self {
        let is_tty = io::stderr().is_terminal();
        Self {
            json: !is_tty,
            color: color_mode.use_color(is_tty),
        }
    }

    pub(crate) fn error(self, err: &Error) {
        if self.json {
            eprintln!("{}", error_json(err));
        } else {
            eprintln!("{}", error_text(err, self.color));
        }
    }

    pub(crate) fn notice(self, notice: &Notice<'_>) {
        if self.json {
            eprintln!("{}", notice.to_json(&now_rfc3339()));
        } else {
            eprintln!(
                "{} {} (source: {})",
                paint("notice:", YELLOW, self.color),
                notice.message(),
                notice.source()
            );
        }
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string())
}

fn paint(label: &str, code: &str, enabled: bool) -> String {
    if enabled {
        format!("\u{1b}[{code}m{label}\u{1b}[0m")
    } else {
        label.to_string()
    }
}

fn headline(err: &Error) -> &str {
    err.message().unwrap_or(match err.kind() {
        ErrorKind::Internal => "internal error",
        ErrorKind::Usage => "usage error",
        ErrorKind::NotFound => "not found",
        ErrorKind::Permission => "permission denied",
        ErrorKind::Io => "i/o error",
        ErrorKind::Parse => "invalid input",
    })
}

/// Context shown under the headline, in display order.
fn context(err: &Error) -> Vec<(&'static str, Value)> {
    let mut fields = Vec::new();
    if let Some(hint) = err.hint() {
        fields.push(("hint", json!(hint)));
    }
    if let Some(path) = err.path() {
        fields.push(("path", json!(path.display().to_string())));
    }
    if let Some(record) = err.record() {
        fields.push(("record", json!(record)));
    }
    if let Some(line) = err.line() {
        fields.push(("line", json!(line)));
    }
    fields
}

fn causes(err: &Error) -> Vec<String> {
    std::iter::successors(err.source(), |&cause| cause.source())
        .map(|cause| cause.to_string())
        .collect()
}

pub(crate) fn error_json(err: &Error) -> Value {
    let mut body = Map::new();
    body.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    body.insert("message".to_string(), json!(headline(err)));
    for (key, value) in context(err) {
        body.insert(key.to_string(), value);
    }
    let causes = causes(err);
    if !causes.is_empty() {
        body.insert("causes".to_string(), json!(causes));
    }
    json!({ "error": body })
}

pub(crate) fn error_text(err: &Error, color: bool) -> String {
    let mut text = format!("{} {}", paint("error:", RED, color), headline(err));
    let first_cause = causes(err)
        .into_iter()
        .next()
        .map(|cause| ("caused by", json!(cause)));
    for (label, value) in context(err).into_iter().chain(first_cause) {
        let shown = match value {
            Value::String(s) => s,
            other => other.to_string(),
        };
        let label = paint(&format!("{label}:"), YELLOW, color);
        text.push_str(&format!("\n{label} {shown}"));
    }
    text
}

/// First line of a clap error without its `error:` prefix.
pub(crate) fn usage_summary(err: &clap::Error) -> String {
    err.to_string()
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.strip_prefix("error:").unwrap_or(line).trim().to_string())
        .unwrap_or_else(|| "invalid arguments".to_string())
}

/// Points at `--help` for the first subcommand named on the command line.
pub(crate) fn usage_hint<I>(args: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<OsStr>,
{
    let cli = Cli::command();
    let named = args
        .into_iter()
        .skip(1)
        .find_map(|arg| cli.find_subcommand(arg).map(|sub| sub.get_name().to_string()));
    match named {
        Some(name) => format!("Try `jsonsafe {name} --help`."),
        None => "Try `jsonsafe --help`.".to_string(),
    }
}

pub(crate) fn with_default_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    let hint = match err.kind() {
        ErrorKind::NotFound => "Input file not found. Check the --file path.",
        ErrorKind::Permission => "Permission denied. Check read permissions on the input file.",
        ErrorKind::Io => "I/O error. Check the input path and the output pipe.",
        ErrorKind::Parse => "Check that the input is UTF-8 text or JSON as the command expects.",
        ErrorKind::Internal => {
            "Unexpected internal failure. Retry with RUST_LOG=debug and share the command if it persists."
        }
        ErrorKind::Usage => return err,
    };
    err.with_hint(hint)
}
