//! Purpose: Frame an input stream into JSON records for `jsonsafe json`.
//! Exports: `IngestMode`, `ErrorPolicy`, `IngestConfig`, `IngestOutcome`, `FailureKind`,
//! `IngestFailure`, `ingest`.
//! Role: Record framing and the stop/skip policy; escaping and output stay in main.
//! Invariants: At most `max_record_bytes` of a record are held in memory; the rest of an
//! oversized line is drained without being kept.
//! Invariants: Under skip, an open multi-line record is abandoned only at a column-0 `{` or `[`.
//! Invariants: Snippets are cut on UTF-8 character boundaries.
use std::io::{BufRead, BufReader, Read};

use bstr::ByteSlice;
use clap::ValueEnum;
use jsonsafe::api::{Error, ErrorKind};
use serde::de::DeserializeOwned;
use serde_json::Value;

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(text)
}

/// Input framing, selected with `--in`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum IngestMode {
    /// One value per line; a line opening `{` or `[` may continue on the next lines.
    Auto,
    /// Strictly one value per line.
    Jsonl,
    /// The whole input is one value.
    Json,
}

impl IngestMode {
    pub fn as_str(self) -> &'static str {
        match self {
            IngestMode::Auto => "auto",
            IngestMode::Jsonl => "jsonl",
            IngestMode::Json => "json",
        }
    }
}

/// What to do with a record that cannot be read, selected with `--errors`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ErrorPolicy {
    Stop,
    Skip,
}

#[derive(Copy, Clone, Debug)]
pub struct IngestConfig {
    pub mode: IngestMode,
    pub errors: ErrorPolicy,
    pub max_record_bytes: usize,
    pub max_snippet_bytes: usize,
}

#[derive(Copy, Clone, Debug, Default)]
pub struct IngestOutcome {
    pub records_total: u64,
    pub ok: u64,
    pub failed: u64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FailureKind {
    Parse,
    Oversize,
    Utf8,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Parse => "Parse",
            FailureKind::Oversize => "Oversize",
            FailureKind::Utf8 => "Utf8",
        }
    }

    fn message(self) -> &'static str {
        match self {
            FailureKind::Parse => "invalid json input",
            FailureKind::Oversize => "record exceeds size limit",
            FailureKind::Utf8 => "invalid utf-8 input",
        }
    }
}

/// A record that could not be turned into a value.
#[derive(Clone, Debug)]
pub struct IngestFailure {
    /// 1-based record number, counting good and bad records.
    pub record: u64,
    /// First input line of the record; absent in `json` mode.
    pub line: Option<u64>,
    pub kind: FailureKind,
    pub snippet: String,
}

fn stop_error(failure: &IngestFailure) -> Error {
    let mut err = Error::new(ErrorKind::Parse)
        .with_message(failure.kind.message())
        .with_record(failure.record);
    if let Some(line) = failure.line {
        err = err.with_line(line);
    }
    match failure.kind {
        FailureKind::Oversize => err.with_hint("Raise --max-record-bytes or use --errors skip."),
        FailureKind::Parse | FailureKind::Utf8 => err.with_hint(
            "Use --errors skip to continue or select the correct input mode with --in.",
        ),
    }
}

fn read_error(err: std::io::Error) -> Error {
    Error::new(ErrorKind::Io)
        .with_message("failed to read input")
        .with_source(err)
}

pub fn ingest<R, F, N>(
    reader: R,
    config: IngestConfig,
    mut on_value: F,
    mut on_failure: N,
) -> Result<IngestOutcome, Error>
where
    R: Read,
    F: FnMut(Value) -> Result<(), Error>,
    N: FnMut(IngestFailure),
{
    let mut outcome = IngestOutcome::default();
    let mut sink = Sink {
        config,
        outcome: &mut outcome,
        on_value: &mut on_value,
        on_failure: &mut on_failure,
    };
    match config.mode {
        IngestMode::Auto | IngestMode::Jsonl => ingest_lines(reader, &mut sink)?,
        IngestMode::Json => ingest_document(reader, &mut sink)?,
    }
    outcome.records_total = outcome.ok + outcome.failed;
    Ok(outcome)
}

/// Applies the error policy and keeps the counters.
struct Sink<'a, F, N> {
    config: IngestConfig,
    outcome: &'a mut IngestOutcome,
    on_value: &'a mut F,
    on_failure: &'a mut N,
}

impl<F, N> Sink<'_, F, N>
where
    F: FnMut(Value) -> Result<(), Error>,
    N: FnMut(IngestFailure),
{
    fn value(&mut self, record: u64, value: Value) -> Result<(), Error> {
        tracing::debug!(record, "parsed record");
        (self.on_value)(value)?;
        self.outcome.ok += 1;
        Ok(())
    }

    fn fail(
        &mut self,
        record: u64,
        line: Option<u64>,
        kind: FailureKind,
        text: &str,
    ) -> Result<(), Error> {
        let failure = IngestFailure {
            record,
            line,
            kind,
            snippet: truncate_snippet(text, self.config.max_snippet_bytes),
        };
        if self.config.errors == ErrorPolicy::Stop {
            return Err(stop_error(&failure));
        }
        tracing::debug!(record, line, kind = kind.as_str(), "skipping record");
        self.outcome.failed += 1;
        (self.on_failure)(failure);
        Ok(())
    }
}

enum Line {
    Text(String),
    /// Oversized or not UTF-8; `head` is a lossy view of what was kept.
    Rejected { kind: FailureKind, head: String },
}

/// Reads one line, keeping at most `limit` content bytes (plus the line ending) in `raw`.
fn read_bounded_line<R: BufRead>(
    reader: &mut R,
    raw: &mut Vec<u8>,
    limit: usize,
) -> Result<Option<Line>, Error> {
    raw.clear();
    let cap = (limit as u64).saturating_add(2);
    let read = reader
        .by_ref()
        .take(cap)
        .read_until(b'\n', raw)
        .map_err(read_error)?;
    if read == 0 {
        return Ok(None);
    }
    let truncated = raw.last() != Some(&b'\n') && read as u64 == cap;
    let content = raw.trim_end_with(|ch| ch == '\n' || ch == '\r');
    if truncated || content.len() > limit {
        let head = content.to_str_lossy().into_owned();
        if truncated {
            drain_line(reader)?;
        }
        return Ok(Some(Line::Rejected {
            kind: FailureKind::Oversize,
            head,
        }));
    }
    Ok(Some(match content.to_str() {
        Ok(text) => Line::Text(text.to_string()),
        Err(_) => Line::Rejected {
            kind: FailureKind::Utf8,
            head: content.to_str_lossy().into_owned(),
        },
    }))
}

fn drain_line<R: BufRead>(reader: &mut R) -> Result<(), Error> {
    loop {
        let buf = reader.fill_buf().map_err(read_error)?;
        if buf.is_empty() {
            return Ok(());
        }
        if let Some(pos) = buf.find_byte(b'\n') {
            reader.consume(pos + 1);
            return Ok(());
        }
        let len = buf.len();
        reader.consume(len);
    }
}

/// A multi-line record still waiting for its closing line.
struct OpenRecord {
    record: u64,
    first_line: u64,
    text: String,
}

fn ingest_lines<R, F, N>(reader: R, sink: &mut Sink<'_, F, N>) -> Result<(), Error>
where
    R: Read,
    F: FnMut(Value) -> Result<(), Error>,
    N: FnMut(IngestFailure),
{
    let limit = sink.config.max_record_bytes;
    let multiline = sink.config.mode == IngestMode::Auto;
    let mut reader = BufReader::new(reader);
    let mut raw = Vec::new();
    let mut record = 0u64;
    let mut line_no = 0u64;
    let mut open: Option<OpenRecord> = None;

    while let Some(line) = read_bounded_line(&mut reader, &mut raw, limit)? {
        line_no += 1;
        let text = match line {
            Line::Text(text) => text,
            Line::Rejected { kind, head } => {
                // A bad line ends any open record; it fails in that record's name.
                match open.take() {
                    Some(pending) => {
                        sink.fail(pending.record, Some(pending.first_line), kind, &pending.text)?
                    }
                    None => {
                        record += 1;
                        sink.fail(record, Some(line_no), kind, &head)?;
                    }
                }
                continue;
            }
        };

        if let Some(mut pending) = open.take() {
            let resync = sink.config.errors == ErrorPolicy::Skip && opens_record(&text);
            if !resync {
                if pending.text.len() + 1 + text.len() > limit {
                    let first_line = Some(pending.first_line);
                    sink.fail(pending.record, first_line, FailureKind::Oversize, &pending.text)?;
                    continue;
                }
                pending.text.push('\n');
                pending.text.push_str(&text);
                match decode::<Value>(&pending.text) {
                    Ok(value) => sink.value(pending.record, value)?,
                    Err(_) => open = Some(pending),
                }
                continue;
            }
            let first_line = Some(pending.first_line);
            sink.fail(pending.record, first_line, FailureKind::Parse, &pending.text)?;
        }

        if text.trim().is_empty() {
            continue;
        }
        record += 1;
        match decode::<Value>(&text) {
            Ok(value) => sink.value(record, value)?,
            Err(_) if multiline && starts_container(&text) => {
                open = Some(OpenRecord {
                    record,
                    first_line: line_no,
                    text,
                });
            }
            Err(_) => sink.fail(record, Some(line_no), FailureKind::Parse, &text)?,
        }
    }

    if let Some(pending) = open {
        sink.fail(
            pending.record,
            Some(pending.first_line),
            FailureKind::Parse,
            &pending.text,
        )?;
    }
    Ok(())
}

fn ingest_document<R, F, N>(reader: R, sink: &mut Sink<'_, F, N>) -> Result<(), Error>
where
    R: Read,
    F: FnMut(Value) -> Result<(), Error>,
    N: FnMut(IngestFailure),
{
    let limit = sink.config.max_record_bytes;
    let mut bytes = Vec::new();
    reader
        .take((limit as u64).saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(read_error)?;
    if bytes.len() > limit {
        let head = bytes.to_str_lossy().into_owned();
        return sink.fail(1, None, FailureKind::Oversize, &head);
    }
    if bytes.trim().is_empty() {
        return Ok(());
    }
    let text = match bytes.to_str() {
        Ok(text) => text,
        Err(_) => {
            let head = bytes.to_str_lossy().into_owned();
            return sink.fail(1, None, FailureKind::Utf8, &head);
        }
    };
    match decode::<Value>(text) {
        Ok(value) => sink.value(1, value),
        Err(_) => sink.fail(1, None, FailureKind::Parse, text),
    }
}

/// First line of a multi-line value, indentation allowed.
fn starts_container(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with('{') || trimmed.starts_with('[')
}

/// A new top-level value: `{` or `[` in column 0. Indented brackets are nested members.
fn opens_record(line: &str) -> bool {
    line.starts_with('{') || line.starts_with('[')
}

fn truncate_snippet(input: &str, max: usize) -> String {
    const ELLIPSIS: &str = "...";
    if input.len() <= max {
        return input.to_string();
    }
    if max <= ELLIPSIS.len() {
        return ELLIPSIS[..max].to_string();
    }
    let mut end = max - ELLIPSIS.len();
    while !input.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{ELLIPSIS}", &input[..end])
}
