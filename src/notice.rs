//! Purpose: Describe the non-fatal notices `jsonsafe json --errors skip` reports on stderr.
//! Exports: `Notice`.
//! Role: Owns notice wording and the JSON schema; `diagnostics` decides how to print them.
//! Invariants: Schema is `{"notice":{kind,time,cmd,source,message,details}}`; fields are additive-only.
use serde_json::{Value, json};

use crate::ingest::{FailureKind, IngestFailure, IngestMode, IngestOutcome};

pub(crate) enum Notice<'a> {
    /// One record was skipped.
    Skipped {
        source: &'a str,
        mode: IngestMode,
        failure: &'a IngestFailure,
    },
    /// End of a run that skipped at least one record.
    Summary {
        source: &'a str,
        outcome: &'a IngestOutcome,
    },
}

impl Notice<'_> {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Notice::Skipped { .. } => "ingest_skip",
            Notice::Summary { .. } => "ingest_summary",
        }
    }

    pub(crate) fn source(&self) -> &str {
        match self {
            Notice::Skipped { source, .. } | Notice::Summary { source, .. } => source,
        }
    }

    pub(crate) fn message(&self) -> String {
        match self {
            Notice::Skipped { failure, .. } => match failure.kind {
                FailureKind::Parse => "Skipped invalid JSON.".to_string(),
                FailureKind::Oversize => "Skipped oversized record.".to_string(),
                FailureKind::Utf8 => "Skipped record that is not valid UTF-8.".to_string(),
            },
            Notice::Summary { outcome, .. } => {
                let plural = if outcome.failed == 1 { "" } else { "s" };
                format!("Finished with {} skipped record{plural}.", outcome.failed)
            }
        }
    }

    fn details(&self) -> Value {
        match self {
            Notice::Skipped { mode, failure, .. } => json!({
                "mode": mode.as_str(),
                "record": failure.record,
                "line": failure.line,
                "error_kind": failure.kind.as_str(),
                "snippet": failure.snippet,
            }),
            Notice::Summary { outcome, .. } => json!({
                "total": outcome.records_total,
                "ok": outcome.ok,
                "failed": outcome.failed,
            }),
        }
    }

    pub(crate) fn to_json(&self, time: &str) -> Value {
        json!({
            "notice": {
                "kind": self.kind(),
                "time": time,
                "cmd": "json",
                "source": self.source(),
                "message": self.message(),
                "details": self.details(),
            }
        })
    }
}
