//! Conversions between page text and engine values.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::types::TargetId;

static TARGET_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"cp=(\d+)").expect("target id pattern should be valid"));

/// Extract the target id from a link address (`...&cp=12345`).
pub fn extract_target_id(href: &str) -> Option<TargetId> {
    TARGET_ID_RE
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|m| TargetId::new(m.as_str()))
}

/// Parse a displayed quantity by keeping only its digits. Anything unparsable is 0.
pub fn parse_quantity(text: &str) -> u64 {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Format with `.` thousands separators, the way the game displays amounts.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
