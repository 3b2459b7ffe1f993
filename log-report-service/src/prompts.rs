//! Prompt templates and their rendering.
//!
//! Templates are plain data with `{name}` placeholders. Rendering is a single
//! left-to-right pass, so log text that happens to contain `{error_logs}` is
//! copied through verbatim instead of being substituted again.

use crate::config::DEFAULT_REPORT_LOG_MAX_CHARS;
use crate::pipeline::{LogInput, ReportKind};

pub const EXPLAIN_LOG_TEMPLATE: &str = r#"You are a helpful DevOps assistant.
Explain this specific AWS Lightsail server log entry to a junior developer in simple, non-technical terms.

1. What does it mean?
2. Is it an error, warning, or normal traffic?
3. If it's an error, what might be the cause?

Keep it short (max 3 sentences).

Log Entry:
"{log_line}"
"#;

pub const INCIDENT_REPORT_TEMPLATE: &str = r#"You are a Senior Site Reliability Engineer.
Analyze the following Web Server Access Logs and Error Logs to create a technical incident report.

**CRITICAL INSTRUCTIONS FOR GENERATION:**
1. **Be Concise:** Keep descriptions short, direct, and to the point. No fluff.
2. **Simple Language:** Use plain English. This report is for a non-technical manager. Avoid heavy jargon.
3. **Strict Structure:** You MUST use the exact headers below.

STRICTLY follow this reporting template structure:

# ⚡ Root Cause
[Explain the primary reason for the issue in 1-2 simple sentences.]

# 🕒 Summary of the Incident
* **Date & Time:** [Extract from logs]
* **What Happened:** [Brief narrative of the event in simple terms]
* **Impact:** [How did this affect the user? e.g., "Site was down," "Slow loading"]

# 🔍 Findings From Logs
[Bullet points only. Cite specific error codes or patterns, explaining them simply.]

# 📈 CPU Utilisation Evidence
[Look for "timeout", "maximum execution time", or "connection refused". State clearly if the server was overloaded. Keep it brief.]

# 🛡️ Actions Taken
[Bullet points of actions to fix the immediate issue.]

# 🔮 Next Steps
[Bullet points of simple preventative measures for the future.]

# ✅ To Summarise
[A 2-3 sentence non-technical summary wrapping up the incident for stakeholders.]

---

**ACCESS LOGS:**
{access_logs}

**ERROR LOGS:**
{error_logs}
"#;

/// Per-variant length bounds, in Unicode scalar values. `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncationPolicy {
    pub explain_max_chars: Option<usize>,
    /// Applied to each of the two batch fields independently.
    pub report_max_chars: Option<usize>,
}

impl Default for TruncationPolicy {
    fn default() -> Self {
        Self {
            explain_max_chars: None,
            report_max_chars: Some(DEFAULT_REPORT_LOG_MAX_CHARS),
        }
    }
}

impl TruncationPolicy {
    pub fn limit_for(&self, kind: ReportKind) -> Option<usize> {
        match kind {
            ReportKind::Explanation => self.explain_max_chars,
            ReportKind::IncidentReport => self.report_max_chars,
        }
    }
}

pub fn template_for(kind: ReportKind) -> &'static str {
    match kind {
        ReportKind::Explanation => EXPLAIN_LOG_TEMPLATE,
        ReportKind::IncidentReport => INCIDENT_REPORT_TEMPLATE,
    }
}

/// Keep the first `max_chars` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

fn bounded(text: &str, limit: Option<usize>) -> &str {
    match limit {
        Some(max_chars) => truncate_chars(text, max_chars),
        None => text,
    }
}

pub fn render_prompt(input: &LogInput, policy: &TruncationPolicy) -> String {
    let kind = input.kind();
    let limit = policy.limit_for(kind);

    match input {
        LogInput::Single { log_line } => {
            fill(template_for(kind), &[("log_line", bounded(log_line, limit))])
        }
        LogInput::Batch {
            access_logs,
            error_logs,
        } => fill(
            template_for(kind),
            &[
                ("access_logs", bounded(access_logs, limit)),
                ("error_logs", bounded(error_logs, limit)),
            ],
        ),
    }
}

fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let capacity = template.len() + values.iter().map(|(_, v)| v.len()).sum::<usize>();
    let mut out = String::with_capacity(capacity);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let substituted = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match substituted {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
