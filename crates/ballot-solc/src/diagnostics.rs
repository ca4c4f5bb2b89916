use crate::error::SolcError;
use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolcDiagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub details: DiagnosticDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticDetails {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub code_snippet: Option<String>,
}

impl SolcDiagnostic {
    pub fn is_error(&self) -> bool {
        self.kind == DiagnosticKind::Error
    }
}

/// Parses the human readable diagnostics `solc` prints on stderr.
pub fn parse_solc_diagnostics(stderr: &str) -> Result<Vec<SolcDiagnostic>, SolcError> {
    let header_regex = Regex::new(r"(?m)^(Warning|Error|\w+Error): (.+)$")?;
    let details_regex = Regex::new(r"(?ms)--> (.+?):(\d+):(\d+):\n((?:.|\n)*?)(?:\n\n|\z)")?;

    let headers = header_regex.captures_iter(stderr).collect::<Vec<_>>();
    let mut diagnostics = Vec::with_capacity(headers.len());

    for (index, header) in headers.iter().enumerate() {
        let kind = match &header[1] {
            "Warning" => DiagnosticKind::Warning,
            _ => DiagnosticKind::Error,
        };
        let Some(whole) = header.get(0) else {
            continue;
        };
        let body_end = headers
            .get(index + 1)
            .and_then(|next| next.get(0))
            .map_or(stderr.len(), |next| next.start());
        let body = &stderr[whole.end()..body_end];

        let mut details = DiagnosticDetails::default();
        if let Some(captures) = details_regex.captures(body) {
            details.file = Some(captures[1].trim().to_string());
            details.line = captures[2].parse().ok();
            details.column = captures[3].parse().ok();
            let snippet = captures[4].trim();
            if !snippet.is_empty() {
                details.code_snippet = Some(snippet.to_string());
            }
        }

        diagnostics.push(SolcDiagnostic {
            kind,
            message: header[2].trim().to_string(),
            details,
        });
    }

    Ok(diagnostics)
}

#[cfg(test)]
#[path = "diagnostics_test.rs"]
mod tests;
