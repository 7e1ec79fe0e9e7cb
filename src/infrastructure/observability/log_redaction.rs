const MAX_VISIBLE_CHARS: usize = 100;

const SENSITIVE_PREFIXES: [&str; 5] = ["Bearer ", "api_key=", "password=", "secret=", "token="];

/// Shortens user text (transcripts, prompts) for log output and masks
/// anything that looks like a credential.
pub fn redact_for_log(text: &str) -> String {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return String::from("[EMPTY]");
    }

    let total_chars = trimmed.chars().count();
    let visible = if total_chars > MAX_VISIBLE_CHARS {
        let head: String = trimmed.chars().take(MAX_VISIBLE_CHARS).collect();
        format!("{}... ({} chars total)", head, total_chars)
    } else {
        trimmed.to_string()
    };

    SENSITIVE_PREFIXES
        .iter()
        .fold(visible, |acc, prefix| mask_after(&acc, prefix))
}

fn mask_after(text: &str, prefix: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(idx) = rest.find(prefix) {
        let value_start = idx + prefix.len();
        let value_end = rest[value_start..]
            .find(|c: char| c.is_whitespace() || matches!(c, '&' | '"' | '\''))
            .map(|i| value_start + i)
            .unwrap_or(rest.len());

        result.push_str(&rest[..value_start]);
        result.push_str("[REDACTED]");
        rest = &rest[value_end..];
    }

    result.push_str(rest);
    result
}
