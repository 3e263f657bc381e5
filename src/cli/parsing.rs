//! CLI parsing helpers for clap value parsers.

/// Parse a source file suffix, adding the leading `.` when omitted.
pub(super) fn parse_extension(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed == "." {
        return Err("extension must not be empty".to_owned());
    }
    if trimmed.chars().any(|c| c.is_whitespace() || c == '/' || c == '\\') {
        return Err(format!("invalid extension '{s}'"));
    }
    if trimmed.starts_with('.') {
        Ok(trimmed.to_owned())
    } else {
        Ok(format!(".{trimmed}"))
    }
}
