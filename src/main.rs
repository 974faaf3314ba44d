//! Purpose: `jsonsafe` CLI entry point.
//! Role: Binary crate root; parses args, runs commands, writes results on stdout.
//! Invariants: stdout carries only command output (escaped text or JSON records).
//! Invariants: Diagnostics go to stderr through `diagnostics::Stderr`.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::io::{self, BufWriter, IsTerminal, Read, Write};

use clap::{
    CommandFactory, Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

mod command_dispatch;
mod diagnostics;
mod ingest;
mod input_source;
mod notice;

use diagnostics::{Stderr, usage_hint, usage_summary, with_default_hint};
use ingest::{ErrorPolicy, IngestConfig, IngestMode, IngestOutcome, ingest};
use input_source::{InputSource, InputSourceError, resolve_input_source};
use jsonsafe::api::{Error, ErrorKind, to_exit_code, to_json_safe, to_json_safe_nested};
use notice::Notice;

const DEFAULT_MAX_RECORD_BYTES: usize = 1024 * 1024;
const DEFAULT_MAX_SNIPPET_BYTES: usize = 200;

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            Stderr::detect(color_mode).error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let exit_code = match err.kind() {
                ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => 0,
                ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 2,
                _ => {
                    let usage = Error::new(ErrorKind::Usage)
                        .with_message(usage_summary(&err))
                        .with_hint(usage_hint(std::env::args_os()));
                    return Err((usage, ColorMode::Auto));
                }
            };
            err.print().map_err(|io_err| {
                let err = Error::new(ErrorKind::Io)
                    .with_message("failed to write help")
                    .with_source(io_err);
                (err, ColorMode::Auto)
            })?;
            return Ok(RunOutcome::with_code(exit_code));
        }
    };

    let color_mode = cli.color;
    tracing::debug!(?color_mode, "parsed arguments");

    command_dispatch::dispatch_command(cli.command, color_mode)
        .map_err(|err| (with_default_hint(err), color_mode))
}

#[derive(Parser)]
#[command(
    name = "jsonsafe",
    version,
    about = "Prepare text for embedding inside JSON string literals",
    help_template = r#"{about-with-newline}
{before-help}USAGE
  {usage}

COMMANDS
{subcommands}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    before_help = r#"Text values are rewritten in a fixed order:
  - double quotes become single quotes
  - newline, carriage return and tab become \n, \r and \t
  - backslashes are left as they are
Anything that is not text (numbers, booleans, null, arrays, objects) passes through.
"#,
    after_help = r#"EXAMPLES
  $ jsonsafe text 'he said "hi"'                 # he said 'hi'
  $ printf 'a\tb\n' | jsonsafe text --chomp       # a\tb
  $ jsonsafe json '"line1\nline2"'               # "line1\\nline2"
  $ jq -c '.rows[]' data.json | jsonsafe json --nested

LEARN MORE
  $ jsonsafe <command> --help"#,
    arg_required_else_help = true,
    disable_help_subcommand = false
)]
struct Cli {
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Escape raw text",
        long_about = r#"Escape raw text for use inside a JSON string literal.

Reads TEXT, a file (-f/--file, use - for stdin), or piped stdin, and prints the
escaped text followed by a newline."#,
        after_help = r#"EXAMPLES
  $ jsonsafe text 'say "cheese"'
  $ jsonsafe text -f notes.txt
  $ cat notes.txt | jsonsafe text --chomp"#
    )]
    Text {
        #[arg(help = "Inline text")]
        text: Option<String>,
        #[arg(
            short = 'f',
            long = "file",
            help = "Input file path (use - for stdin)",
            conflicts_with = "text",
            value_hint = ValueHint::FilePath
        )]
        file: Option<String>,
        #[arg(long, help = "Drop one trailing line ending before escaping")]
        chomp: bool,
    },
    #[command(
        about = "Escape string values in JSON input",
        long_about = r#"Escape JSON string values.

Each input record is a JSON value. String records are escaped; every other value
passes through unchanged unless --nested is given, in which case strings inside
arrays and object values are escaped too (object keys are never changed)."#,
        after_help = r#"EXAMPLES
  $ jsonsafe json '"tab\there"'
  $ jsonsafe json -r '"say \"hi\""'               # raw text: say 'hi'
  $ jsonsafe json --nested -f rows.jsonl
  $ jsonsafe json --in json --pretty -f doc.json --nested

NOTES
  - `--in auto` reads JSON lines and joins multi-line objects/arrays
  - `--errors skip` continues past bad records and reports them on stderr
  - a multi-line value ends a skipped record only at a `{` or `[` in column 0
  - `--in`, `--errors` and `--max-record-bytes` apply to file/stdin input, not DATA"#
    )]
    Json {
        #[arg(help = "Inline JSON value")]
        data: Option<String>,
        #[arg(
            short = 'f',
            long = "file",
            help = "Input file path (JSON value or stream; use - for stdin)",
            conflicts_with = "data",
            value_hint = ValueHint::FilePath
        )]
        file: Option<String>,
        #[arg(
            long = "in",
            value_enum,
            default_value = "auto",
            conflicts_with = "data",
            help = "Input framing: auto|jsonl|json"
        )]
        input: IngestMode,
        #[arg(
            short = 'e',
            long,
            value_enum,
            default_value = "stop",
            conflicts_with = "data",
            help = "Bad record policy: stop|skip"
        )]
        errors: ErrorPolicy,
        #[arg(long, help = "Also escape strings inside arrays and object values")]
        nested: bool,
        #[arg(long, help = "Pretty-print JSON output")]
        pretty: bool,
        #[arg(
            short = 'r',
            long = "raw-output",
            help = "Print string results as raw text instead of JSON strings"
        )]
        raw_output: bool,
        #[arg(
            long,
            default_value_t = DEFAULT_MAX_RECORD_BYTES,
            conflicts_with = "data",
            help = "Largest accepted record in bytes"
        )]
        max_record_bytes: usize,
    },
    #[command(about = "Print a shell completion script")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
    #[command(about = "Print version info")]
    Version,
}

#[derive(Copy, Clone, Debug)]
struct OutputOptions {
    nested: bool,
    pretty: bool,
    raw_output: bool,
}

fn escape_value(value: Value, nested: bool) -> Value {
    if nested {
        to_json_safe_nested(value)
    } else {
        to_json_safe(value)
    }
}

fn render_value(value: &Value, options: OutputOptions) -> String {
    match value {
        Value::String(text) if options.raw_output => text.clone(),
        _ if options.pretty => format!("{value:#}"),
        _ => value.to_string(),
    }
}

fn output_error(err: io::Error) -> Error {
    Error::new(ErrorKind::Io)
        .with_message("failed to write output")
        .with_source(err)
}

fn write_line(out: &mut impl Write, line: &str) -> Result<(), Error> {
    writeln!(out, "{line}").map_err(output_error)
}

fn flush_output(out: &mut impl Write) -> Result<(), Error> {
    out.flush().map_err(output_error)
}

fn read_text_input(source: InputSource) -> Result<String, Error> {
    if let InputSource::Inline(text) = source {
        return Ok(text);
    }
    let label = source.label();
    let mut bytes = Vec::new();
    source.open()?.read_to_end(&mut bytes).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read input")
            .with_source(err)
    })?;
    String::from_utf8(bytes).map_err(|err| {
        Error::new(ErrorKind::Parse)
            .with_message(format!("input is not valid utf-8 (source: {label})"))
            .with_source(err)
    })
}

fn chomp_line_ending(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}

fn resolve_source(
    inline: Option<String>,
    file: Option<String>,
    cmd: &str,
) -> Result<InputSource, Error> {
    resolve_input_source(inline, file, io::stdin().is_terminal()).map_err(|err| match err {
        InputSourceError::Missing => {
            let what = if cmd == "json" { "JSON" } else { "text" };
            Error::new(ErrorKind::Usage)
                .with_message(format!("missing {what} input"))
                .with_hint(format!(
                    "Provide {what} inline, via --file, or pipe it to stdin (see `jsonsafe {cmd} --help`)."
                ))
        }
    })
}

fn parse_inline_json(data: &str) -> Result<Value, Error> {
    serde_json::from_str(data).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid json")
            .with_hint("Provide a single JSON value (e.g. '\"a\\tb\"').")
            .with_source(err)
    })
}

struct JsonStream<'a> {
    source: &'a str,
    config: IngestConfig,
    output: OutputOptions,
    stderr: Stderr,
}

fn escape_json_stream<R: Read, W: Write>(
    reader: R,
    out: &mut W,
    stream: JsonStream<'_>,
) -> Result<IngestOutcome, Error> {
    let JsonStream {
        source,
        config,
        output,
        stderr,
    } = stream;
    let outcome = ingest(
        reader,
        config,
        |value| {
            let escaped = escape_value(value, output.nested);
            write_line(&mut *out, &render_value(&escaped, output))
        },
        |failure| {
            stderr.notice(&Notice::Skipped {
                source,
                mode: config.mode,
                failure: &failure,
            })
        },
    )?;

    if outcome.failed > 0 {
        stderr.notice(&Notice::Summary {
            source,
            outcome: &outcome,
        });
    }
    tracing::debug!(
        total = outcome.records_total,
        ok = outcome.ok,
        failed = outcome.failed,
        source,
        "finished json input"
    );
    Ok(outcome)
}

fn emit_version_output() -> Result<(), Error> {
    let mut out = BufWriter::new(io::stdout().lock());
    let line = if io::stdout().is_terminal() {
        format!("jsonsafe {}", env!("CARGO_PKG_VERSION"))
    } else {
        json!({"name": "jsonsafe", "version": env!("CARGO_PKG_VERSION")}).to_string()
    };
    write_line(&mut out, &line)?;
    flush_output(&mut out)
}

#[cfg(test)]
mod tests {
    use super::{Cli, OutputOptions, chomp_line_ending, render_value};
    use clap::CommandFactory;
    use serde_json::json;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn chomp_drops_one_line_ending() {
        assert_eq!(chomp_line_ending("a\n"), "a");
        assert_eq!(chomp_line_ending("a\r\n"), "a");
        assert_eq!(chomp_line_ending("a\n\n"), "a\n");
        assert_eq!(chomp_line_ending("a"), "a");
    }

    #[test]
    fn raw_output_only_applies_to_strings() {
        let options = OutputOptions {
            nested: false,
            pretty: false,
            raw_output: true,
        };
        assert_eq!(render_value(&json!("a\\nb"), options), "a\\nb");
        assert_eq!(render_value(&json!({"k": 1}), options), "{\"k\":1}");
    }

    #[test]
    fn pretty_output_indents_containers() {
        let options = OutputOptions {
            nested: false,
            pretty: true,
            raw_output: false,
        };
        assert_eq!(
            render_value(&json!({"k": [1]}), options),
            "{\n  \"k\": [\n    1\n  ]\n}"
        );
        assert_eq!(render_value(&json!("s"), options), "\"s\"");
    }
}
