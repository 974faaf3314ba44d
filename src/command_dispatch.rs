//! Purpose: Hold top-level CLI command dispatch for `jsonsafe`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Each command writes its results to stdout through one buffered writer.
//! Invariants: Helpers in `main.rs` remain the source of command business logic.

use super::*;

pub(super) fn dispatch_command(command: Command, color_mode: ColorMode) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "jsonsafe", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output()?;
            Ok(RunOutcome::ok())
        }
        Command::Text { text, file, chomp } => {
            let source = resolve_source(text, file, "text")?;
            let label = source.label();
            let raw = read_text_input(source)?;
            let input = if chomp {
                chomp_line_ending(&raw)
            } else {
                raw.as_str()
            };
            if input.contains('\\') {
                tracing::debug!(source = %label, "input contains backslashes; they are left as-is");
            }
            let escaped = jsonsafe::api::escape_text(input);
            tracing::debug!(
                source = %label,
                input_bytes = input.len(),
                output_bytes = escaped.len(),
                "escaped text"
            );

            let mut out = BufWriter::new(io::stdout().lock());
            write_line(&mut out, &escaped)?;
            flush_output(&mut out)?;
            Ok(RunOutcome::ok())
        }
        Command::Json {
            data,
            file,
            input,
            errors,
            nested,
            pretty,
            raw_output,
            max_record_bytes,
        } => {
            let output = OutputOptions {
                nested,
                pretty,
                raw_output,
            };
            let mut out = BufWriter::new(io::stdout().lock());
            if let Some(data) = data {
                let escaped = escape_value(parse_inline_json(&data)?, nested);
                write_line(&mut out, &render_value(&escaped, output))?;
                flush_output(&mut out)?;
                return Ok(RunOutcome::ok());
            }
            if max_record_bytes == 0 {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message("--max-record-bytes must be greater than zero")
                    .with_hint(format!("The default is {DEFAULT_MAX_RECORD_BYTES}.")));
            }

            let source = resolve_source(None, file, "json")?;
            let label = source.label();
            let reader = source.open()?;
            let stream = JsonStream {
                source: &label,
                config: IngestConfig {
                    mode: input,
                    errors,
                    max_record_bytes,
                    max_snippet_bytes: DEFAULT_MAX_SNIPPET_BYTES,
                },
                output,
                stderr: Stderr::detect(color_mode),
            };
            escape_json_stream(reader, &mut out, stream)?;
            flush_output(&mut out)?;
            Ok(RunOutcome::ok())
        }
    }
}
