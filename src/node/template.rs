// SPDX-License-Identifier: MIT

//! Prompt template rendering
//!
//! `{key}` placeholders are substituted from the state payload. String
//! values interpolate verbatim; other values render as compact JSON. An
//! unresolved placeholder renders as the empty string and logs a warning,
//! so shared templates can reference optional context keys. Braces that do
//! not delimit a placeholder pass through unchanged.

use serde_json::Value;

use crate::state::WorkflowState;

/// Render a prompt template against the state payload
pub fn render(template: &str, state: &WorkflowState) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if is_placeholder_key(&after[..close]) => {
                let key = &after[..close];
                match state.get(key) {
                    Some(Value::String(s)) => out.push_str(s),
                    Some(value) => out.push_str(&value.to_string()),
                    None => {
                        log::warn!("template placeholder '{{{}}}' not found in state", key);
                    }
                }
                rest = &after[close + 1..];
            }
            // Lone, empty, or malformed braces stay verbatim
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);

    out
}

fn is_placeholder_key(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
